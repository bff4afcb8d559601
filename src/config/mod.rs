use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Page sizes for question listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent the server runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    /// Pool acquire timeout in seconds
    pub connection_timeout: u64,
    /// Attempts allowed for an optimistic upvote write before giving up with a conflict
    pub upvote_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub auth_rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Key rate limits on `X-Forwarded-For` instead of the socket peer
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_secs: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0}")]
    MissingSecret(Environment),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppConfig {
    /// Preset for `APP_ENV`, then individual env var overrides
    pub fn from_env() -> Self {
        let mut config = match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        env_parse("PORT", &mut self.server.port);

        env_parse("FILTER_DEFAULT_LIMIT", &mut self.filter.default_limit);
        env_parse("FILTER_MAX_LIMIT", &mut self.filter.max_limit);

        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = Some(url).filter(|url| !url.trim().is_empty());
        }
        env_parse("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        env_parse("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        env_parse("DATABASE_UPVOTE_MAX_ATTEMPTS", &mut self.database.upvote_max_attempts);

        env_parse("API_ENABLE_RATE_LIMITING", &mut self.api.enable_rate_limiting);
        env_parse("API_RATE_LIMIT_REQUESTS", &mut self.api.rate_limit_requests);
        env_parse("API_AUTH_RATE_LIMIT_REQUESTS", &mut self.api.auth_rate_limit_requests);
        env_parse("API_RATE_LIMIT_WINDOW_SECS", &mut self.api.rate_limit_window_secs);
        env_parse("API_TRUST_PROXY", &mut self.api.trust_proxy);

        env_parse("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(origins) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        env_parse("JWT_EXPIRE_SECS", &mut self.security.jwt_expiry_secs);
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret(self.environment));
        }
        if self.security.jwt_expiry_secs == 0 {
            return Err(invalid("JWT_EXPIRE_SECS", "must be positive"));
        }
        if self.filter.default_limit == 0 || self.filter.default_limit > self.filter.max_limit {
            return Err(invalid(
                "FILTER_DEFAULT_LIMIT",
                format!("must be between 1 and {}", self.filter.max_limit),
            ));
        }
        if self.database.upvote_max_attempts == 0 {
            return Err(invalid("DATABASE_UPVOTE_MAX_ATTEMPTS", "must be at least 1"));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5000 },
            filter: FilterConfig {
                default_limit: 10,
                max_limit: 100,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                upvote_max_attempts: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                auth_rate_limit_requests: 100,
                rate_limit_window_secs: 15 * 60,
                trust_proxy: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-only-secret-change-me".to_string(),
                jwt_expiry_secs: 7 * 24 * 60 * 60, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..Self::production().database
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                ..Self::production().security
            },
            ..Self::production()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 5000 },
            filter: FilterConfig {
                default_limit: 10,
                max_limit: 50,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                upvote_max_attempts: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                auth_rate_limit_requests: 5,
                rate_limit_window_secs: 15 * 60,
                trust_proxy: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_secs: 24 * 60 * 60,
            },
        }
    }
}

/// Overwrite `target` when `key` is set and parses; otherwise keep the preset
fn env_parse<T: FromStr>(key: &str, target: &mut T) {
    let Ok(raw) = env::var(key) else { return };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!("Ignoring unparseable {}='{}'", key, raw),
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
