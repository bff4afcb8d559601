use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::Role;

use super::{Claims, TokenError};

/// Signing capability behind the token service
pub trait Signer: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JWT signer
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second after `exp`
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl Signer for JwtSigner {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: Role,
}

/// Issues and verifies time-limited identity tokens
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn Signer>,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(signer: Arc<dyn Signer>, lifetime: Duration) -> Self {
        Self { signer, lifetime }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        let lifetime = Duration::seconds(config.jwt_expiry_secs.min(u64::from(u32::MAX)) as i64);
        Self::new(Arc::new(JwtSigner::new(&config.jwt_secret)), lifetime)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.lifetime;
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self.signer.sign(&claims)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<TokenSubject, TokenError> {
        let claims = self.signer.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| TokenError::Invalid(format!("subject '{}' is not a user id", claims.sub)))?;
        Ok(TokenSubject { user_id, role: claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(lifetime: Duration) -> TokenService {
        TokenService::new(Arc::new(JwtSigner::new("test-secret")), lifetime)
    }

    #[test]
    fn issued_token_verifies_to_same_subject() {
        let tokens = service(Duration::hours(1));
        let user_id = Uuid::new_v4();
        let issued = tokens.issue(user_id, Role::Admin).unwrap();
        let subject = tokens.verify(&issued.token).unwrap();
        assert_eq!(subject, TokenSubject { user_id, role: Role::Admin });
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let issued = service(Duration::hours(1)).issue(Uuid::new_v4(), Role::User).unwrap();
        let other = TokenService::new(Arc::new(JwtSigner::new("other-secret")), Duration::hours(1));
        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn past_expiry_is_expired() {
        let tokens = service(Duration::seconds(-5));
        let issued = tokens.issue(Uuid::new_v4(), Role::User).unwrap();
        assert_eq!(tokens.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(service(Duration::hours(1)).verify("not.a.jwt"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let signer = JwtSigner::new("test-secret");
        let now = Utc::now().timestamp();
        let token = signer
            .sign(&Claims { sub: "admin".into(), role: Role::Admin, iat: now, exp: now + 60 })
            .unwrap();
        let tokens = service(Duration::hours(1));
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }
}
