// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus read-only question browsing.

pub mod auth;
pub mod categories;
pub mod questions;
