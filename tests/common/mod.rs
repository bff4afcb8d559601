#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use interview_qa_api::app::{app, AppState};
use interview_qa_api::auth::{Argon2Hasher, JwtSigner, PasswordHasher, TokenService};
use interview_qa_api::config::AppConfig;
use interview_qa_api::database::models::NewUser;
use interview_qa_api::database::{MemoryStore, UserStore};
use interview_qa_api::types::Role;

pub const SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store, driven in-process
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub hasher: Arc<Argon2Hasher>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config.security.jwt_secret = SECRET.to_string();
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self::build(config, tokens)
    }

    pub fn with_token_lifetime(lifetime: chrono::Duration) -> Self {
        let tokens = TokenService::new(Arc::new(JwtSigner::new(SECRET)), lifetime);
        Self::build(test_config(), tokens)
    }

    fn build(config: AppConfig, tokens: TokenService) -> Self {
        let store = Arc::new(MemoryStore::new());
        // Cheap parameters keep the suite fast
        let hasher = Arc::new(Argon2Hasher::with_params(1024, 1, 1).expect("argon2 params"));
        let state = AppState::with_tokens(store.clone(), hasher.clone(), tokens, config);
        Self {
            router: app(state.clone()),
            state,
            store,
            hasher,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        send(&self.router, build_request(method, uri, token, body)?).await
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request("GET", uri, None, None).await
    }

    /// Register and return (user id, token)
    pub async fn register(&self, name: &str, email: &str) -> Result<(String, String)> {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "password123" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        Ok((
            body["data"]["user"]["id"].as_str().context("user id")?.to_string(),
            body["data"]["token"].as_str().context("token")?.to_string(),
        ))
    }

    /// Seed an admin directly in the store and log in through the API
    pub async fn admin(&self) -> Result<String> {
        let email = format!("admin-{}@example.com", uuid::Uuid::new_v4());
        self.store
            .insert_user(NewUser {
                name: "Admin".into(),
                email: email.clone(),
                password_hash: self.hasher.hash("adminpass")?,
                role: Role::Admin,
            })
            .await?;

        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "adminpass" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {} {}", status, body);
        Ok(body["data"]["token"].as_str().context("token")?.to_string())
    }

    pub async fn create_question(&self, token: &str, body: Value) -> Result<Value> {
        let (status, body) = self.request("POST", "/api/questions", Some(token), Some(body)).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
        Ok(body["data"].clone())
    }
}

pub fn question(company: &str, topic: &str, difficulty: &str) -> Value {
    json!({
        "questionText": format!("Walk through a {} problem you solved at {}", topic, company),
        "company": company,
        "topic": topic,
        "role": "SDE",
        "difficulty": difficulty,
    })
}

pub fn build_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

/// Drive `router` with one request; every response body must be JSON
pub async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let label = format!("{} {}", request.method(), request.uri());
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", label))?
    };
    Ok((status, value))
}
