use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{AuthError, TokenService};
use crate::database::models::User;
use crate::database::UserStore;
use crate::error::ApiError;
use crate::types::Role;

/// Authenticated user context resolved from the bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// JWT authentication middleware that verifies the token, resolves the
/// user and injects [`AuthUser`] into the request
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = resolve_identity(request.headers(), &state.tokens, state.users.as_ref()).await?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Token → verified subject → stored user
pub async fn resolve_identity(
    headers: &HeaderMap,
    tokens: &TokenService,
    users: &dyn UserStore,
) -> Result<AuthUser, AuthError> {
    let token = extract_bearer(headers).ok_or(AuthError::NoCredential)?;
    let subject = tokens.verify(token)?;

    // Role comes from the stored record, not the token
    let user = users
        .find_user_by_id(subject.user_id)
        .await?
        .ok_or(AuthError::UnknownSubject(subject.user_id))?;

    Ok(AuthUser::from(&user))
}

/// Extract JWT token from Authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Role check layered after [`jwt_auth_middleware`]; never re-verifies the token
pub fn check_roles(allowed: &[Role], user: Option<&AuthUser>) -> Result<(), AuthError> {
    let user = user.ok_or(AuthError::NoCredential)?;
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(user.role))
    }
}

/// Middleware form of [`check_roles`]:
/// `from_fn(|req, next| require_roles(&[Role::Admin], req, next))`
pub async fn require_roles(allowed: &'static [Role], request: Request, next: Next) -> Result<Response, ApiError> {
    check_roles(allowed, request.extensions().get::<AuthUser>())?;
    Ok(next.run(request).await)
}
