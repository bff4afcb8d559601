// handlers/protected/auth/mod.rs - Authenticated account endpoints

pub mod profile;

pub use profile::profile_get;
