use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthError, PasswordHasher, TokenService};
use crate::database::models::{normalize_email, NewUser, PublicUser, User};
use crate::database::{StoreError, UserStore};
use crate::types::Role;

pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of a successful register or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account lifecycle: registration, login and profile lookup
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>, tokens: TokenService) -> Self {
        Self { users, hasher, tokens }
    }

    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&registration.email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(StoreError::Duplicate(format!("email {}", email)).into());
        }

        let password_hash = self.hash_password(registration.password).await?;
        // A concurrent registration that slipped past the lookup still fails here as Duplicate
        let user = self
            .users
            .insert_user(NewUser {
                name: registration.name,
                email,
                password_hash,
                role: Role::User,
            })
            .await?;

        info!("Registered user {}", user.id);
        self.session_for(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_user_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!("Wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<PublicUser, AuthError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject(user_id))?;
        Ok(PublicUser::from(&user))
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AuthError> {
        let issued = self.tokens.issue(user.id, user.role)?;
        Ok(AuthSession {
            user: PublicUser::from(user),
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    // Argon2 is CPU-bound; keep it off the async workers
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}
