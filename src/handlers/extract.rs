// handlers/extract.rs - Request extraction shared by both tiers

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::types::Difficulty;

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            match rejection {
                JsonRejection::JsonDataError(e) => ApiError::invalid_field("body", e.body_text()),
                other => ApiError::bad_request(other.body_text()),
            }
        })?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string that failed to deserialize answers with the error envelope
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await.map_err(|rejection| {
            tracing::debug!("Rejected query string: {}", rejection.body_text());
            ApiError::invalid_field("query", rejection.body_text())
        })?;
        Ok(ValidatedQuery(value))
    }
}

/// Path ids that are not UUIDs cannot name a stored question
pub fn parse_question_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Question not found"))
}

pub fn parse_difficulty(raw: &str) -> Result<Difficulty, ApiError> {
    raw.parse().map_err(|msg: String| ApiError::invalid_field("difficulty", msg))
}

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}
