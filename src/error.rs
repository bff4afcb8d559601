// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{AuthError, TokenError};
use crate::database::StoreError;
use crate::filter::FilterError;
use crate::services::QuestionError;

/// Message for every authentication failure; clients never learn which check failed
pub const NOT_AUTHORIZED: &str = "Not authorized";

const VALIDATION_FAILED: &str = "Validation failed";

/// Every failure a handler can return, with its status and envelope code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    /// Uniqueness violation; clients see a 400
    Duplicate(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    MethodNotAllowed(String),
    Conflict(String),
    TooManyRequests(String),
    /// `detail` only leaves the process in development
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } | ApiError::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } | ApiError::InternalServerError { message, .. } => message,
            ApiError::BadRequest(msg)
            | ApiError::Duplicate(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::Conflict(msg)
            | ApiError::TooManyRequests(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Duplicate(_) => "DUPLICATE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// `{success: false, message, code, timestamp}` plus `errors` or dev-only `detail`
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        match self {
            ApiError::ValidationError { field_errors: Some(field_errors), .. } => {
                body["errors"] = json!(field_errors);
            }
            ApiError::InternalServerError { detail: Some(detail), .. } if crate::is_development!() => {
                body["detail"] = json!(detail);
            }
            _ => {}
        }
        body
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Single-field validation failure with the standard envelope message
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), message.into());
        ApiError::ValidationError {
            message: VALIDATION_FAILED.to_string(),
            field_errors: Some(field_errors),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    fn internal(message: &str, detail: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.to_string(),
            detail: Some(detail.into()),
        }
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => {
                tracing::debug!("Duplicate key: {}", msg);
                ApiError::Duplicate("User already exists".into())
            }
            StoreError::Conflict(msg) => {
                tracing::warn!("Write conflict: {}", msg);
                ApiError::Conflict("Question was modified concurrently, please retry".into())
            }
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::ServiceUnavailable("Database temporarily unavailable".into())
            }
            StoreError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal("An error occurred while processing your request", msg)
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("Database error occurred", sqlx_err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".into()),
            AuthError::NoCredential | AuthError::InvalidCredential(_) | AuthError::UnknownSubject(_) => {
                tracing::debug!("Authentication rejected: {}", err);
                ApiError::Unauthorized(NOT_AUTHORIZED.into())
            }
            AuthError::Forbidden(role) => {
                tracing::debug!("Role '{}' denied", role);
                ApiError::Forbidden("Not authorized to access this route".into())
            }
            AuthError::Hashing(msg) => {
                tracing::error!("Password hashing error: {}", msg);
                ApiError::internal("An error occurred while processing your request", msg)
            }
            AuthError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => {
                tracing::error!("Token signing error: {}", msg);
                ApiError::internal("Failed to issue token", msg)
            }
            other => AuthError::InvalidCredential(other).into(),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::invalid_field(err.field(), err.to_string())
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        match err {
            QuestionError::NotFound(_) => ApiError::not_found("Question not found"),
            QuestionError::Forbidden { action, .. } => {
                tracing::debug!("{}", err);
                ApiError::Forbidden(format!("Not authorized to {} this question", action))
            }
            QuestionError::Filter(filter_err) => filter_err.into(),
            QuestionError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (wire_name(&field), message)
            })
            .collect();
        ApiError::ValidationError {
            message: VALIDATION_FAILED.to_string(),
            field_errors: Some(field_errors),
        }
    }
}

/// Request bodies are camelCase on the wire; validator reports Rust field names
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn authentication_failures_are_indistinguishable() {
        let failures = [
            AuthError::NoCredential,
            AuthError::InvalidCredential(TokenError::Expired),
            AuthError::InvalidCredential(TokenError::Invalid("bad signature".into())),
            AuthError::UnknownSubject(Uuid::new_v4()),
        ];
        for failure in failures {
            let api: ApiError = failure.into();
            assert_eq!(api.status_code(), 401);
            assert_eq!(api.message(), NOT_AUTHORIZED);
        }
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(ApiError::from(StoreError::Duplicate("email".into())).status_code(), 400);
        assert_eq!(ApiError::from(StoreError::Conflict("x".into())).status_code(), 409);
        assert_eq!(ApiError::from(StoreError::Unavailable("timeout".into())).status_code(), 503);
        assert_eq!(ApiError::from(StoreError::QueryError("syntax".into())).status_code(), 500);
    }

    #[test]
    fn validation_fields_use_wire_names() {
        assert_eq!(wire_name("question_text"), "questionText");
        assert_eq!(wire_name("email"), "email");

        let mut errors = validator::ValidationErrors::new();
        errors.add("question_text", validator::ValidationError::new("length"));
        let body = ApiError::from(errors).to_json();
        assert_eq!(body["errors"]["questionText"], "Invalid value for question_text");
        assert!(body["errors"].get("question_text").is_none());
    }

    #[test]
    fn filter_error_carries_field() {
        let api: ApiError = FilterError::EmptySearch.into();
        let body = api.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"]["q"], "Search query is required");
        assert!(body["timestamp"].is_string());
    }
}
