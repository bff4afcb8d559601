pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{check_roles, jwt_auth_middleware, require_roles, resolve_identity, AuthUser};
pub use rate_limit::{rate_limit_middleware, RateLimit};
pub use response::{ApiResponse, ApiResult};
