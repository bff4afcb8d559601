pub mod password;
pub mod policy;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::StoreError;
use crate::types::Role;

pub use password::{Argon2Hasher, PasswordHasher};
pub use policy::can_mutate;
pub use token::{IssuedToken, JwtSigner, Signer, TokenService, TokenSubject};

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Authentication and authorization failures.
///
/// `NoCredential`, `InvalidCredential` and `UnknownSubject` are kept apart
/// for logging but surface identically to clients.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No bearer credential on request")]
    NoCredential,

    #[error("Credential rejected: {0}")]
    InvalidCredential(#[from] TokenError),

    #[error("Token subject {0} does not resolve to a user")]
    UnknownSubject(Uuid),

    #[error("Role '{0}' may not access this route")]
    Forbidden(Role),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
