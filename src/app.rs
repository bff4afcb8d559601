use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{QuestionStore, UserStore};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, rate_limit_middleware, RateLimit};
use crate::services::{AuthService, QuestionService};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub questions: QuestionService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire services over one store that holds both users and questions
    pub fn new<S>(store: Arc<S>, hasher: Arc<dyn PasswordHasher>, config: AppConfig) -> Self
    where
        S: UserStore + QuestionStore + 'static,
    {
        let tokens = TokenService::from_config(&config.security);
        Self::with_tokens(store, hasher, tokens, config)
    }

    pub fn with_tokens<S>(store: Arc<S>, hasher: Arc<dyn PasswordHasher>, tokens: TokenService, config: AppConfig) -> Self
    where
        S: UserStore + QuestionStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let questions: Arc<dyn QuestionStore> = store;

        Self {
            auth: AuthService::new(users.clone(), hasher, tokens.clone()),
            questions: QuestionService::new(
                questions,
                users.clone(),
                config.filter.clone(),
                config.database.upvote_max_attempts,
            ),
            users,
            tokens,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut api = Router::new()
        .merge(auth_routes(&state))
        .merge(question_routes(&state))
        .route("/categories", get(public::categories::categories_get));

    if state.config.api.enable_rate_limiting {
        let limit = RateLimit::general(
            state.config.api.rate_limit_requests,
            Duration::from_secs(state.config.api.rate_limit_window_secs),
        )
        .trust_proxy(state.config.api.trust_proxy);
        api = api.layer(from_fn_with_state(limit, rate_limit_middleware));
    }

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(map_response(method_not_allowed))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use protected::auth as protected_auth;
    use public::auth;

    let mut credentials = Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post));

    if state.config.api.enable_rate_limiting {
        let limit = RateLimit::auth(
            state.config.api.auth_rate_limit_requests,
            Duration::from_secs(state.config.api.rate_limit_window_secs),
        )
        .trust_proxy(state.config.api.trust_proxy);
        credentials = credentials.route_layer(from_fn_with_state(limit, rate_limit_middleware));
    }

    let session = Router::new()
        .route("/auth/profile", get(protected_auth::profile_get))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    credentials.merge(session)
}

fn question_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::put;
    use protected::questions as mutate;
    use public::questions as browse;

    let protected = Router::new()
        .route("/questions", post(mutate::question_create))
        .route("/questions/:id", put(mutate::question_update).delete(mutate::question_delete))
        .route("/questions/:id/upvote", post(mutate::question_upvote))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let public = Router::new()
        .route("/questions", get(browse::questions_list))
        // Static segment wins over `:id`
        .route("/questions/search", get(browse::questions_search))
        .route("/questions/:id", get(browse::question_show))
        .route("/questions/:id/upvotes", get(browse::question_upvotes));

    protected.merge(public)
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Interview Q&A API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/profile (protected)",
                "questions": "/api/questions[/:id] (GET public; POST/PUT/DELETE protected)",
                "search": "/api/questions/search?q= (public)",
                "upvotes": "/api/questions/:id/upvote (protected), /api/questions/:id/upvotes (public)",
                "categories": "/api/categories (public)",
                "health": "/health",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}

/// Give the router's bare 405 the error envelope, keeping its `Allow` header
async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = ApiError::MethodNotAllowed("Method not allowed".to_string()).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}
