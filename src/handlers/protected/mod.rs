// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind jwt_auth_middleware, so handlers receive the
// resolved caller as Extension<AuthUser>. Per-question ownership is checked
// in the service layer.

pub mod auth;
pub mod questions;
