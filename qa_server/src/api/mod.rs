//! HTTP API for the admin panel.
//!
//! # Modules
//!
//! - [`auth`]: Login and logout, session cookie handling
//! - [`stats`]: Dashboard data behind the session guard
//! - [`pages`]: Static login and dashboard pages
//! - [`middleware`]: Session guard for JSON endpoints and for pages
//! - [`request_id`]: Request correlation ids
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /            - Login page (public)
//! POST /login       - Verify credentials, start a session (public)
//! GET  /logout      - End the session, redirect to / (public)
//! GET  /dashboard   - Dashboard page (session required, redirects otherwise)
//! GET  /stats       - Dashboard data, ?action=stats|recent_spam|risk|categories (session required)
//! GET  /health      - Database connectivity (public)
//! ```
//!
//! Every JSON answer uses the envelope `{"success": bool, "data"?: ..., "message"?: ...}`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use qa_server::api::{AppState, create_router};
//! use qcall_admin::{AuthManager, SessionStore, StatsService};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let auth_manager: AuthManager = unimplemented!();
//! # let stats_service: StatsService = unimplemented!();
//!
//! let state = AppState::new(
//!     Arc::new(auth_manager),
//!     Arc::new(stats_service),
//!     Arc::new(SessionStore::default()),
//!     "http://localhost:8000".to_string(),
//! );
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! Cross-origin requests are only accepted from the configured `APP_URL`,
//! with credentials, so the session cookie can travel.

pub mod auth;
pub mod middleware;
pub mod pages;
pub mod request_id;
pub mod stats;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use qcall_admin::{AuthManager, SessionGuard, SessionStore, StatsService};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub stats_service: Arc<StatsService>,
    pub sessions: Arc<SessionStore>,
    pub guard: SessionGuard,
    /// Public base URL, the only origin allowed by CORS
    pub app_url: String,
}

impl AppState {
    pub fn new(
        auth_manager: Arc<AuthManager>,
        stats_service: Arc<StatsService>,
        sessions: Arc<SessionStore>,
        app_url: String,
    ) -> Self {
        let guard = SessionGuard::new(sessions.clone(), auth_manager.clone());
        Self {
            auth_manager,
            stats_service,
            sessions,
            guard,
            app_url,
        }
    }
}

/// Create the complete router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use qa_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::login_page))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/health", get(health_check));

    let api_routes = Router::new()
        .route("/stats", get(stats::get_stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin_api,
        ));

    let page_routes = Router::new()
        .route("/dashboard", get(pages::dashboard_page))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin_page,
        ));

    let cors = cors_layer(&state.app_url);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(page_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// CORS restricted to `app_url`; an unusable URL yields a layer that allows no origin
fn cors_layer(app_url: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(app_url.trim_end_matches('/')) {
        Ok(origin) => base.allow_origin(AllowOrigin::exact(origin)),
        Err(_) => {
            tracing::warn!(app_url, "APP_URL is not a valid origin, CORS disabled");
            base
        }
    }
}

/// Failed request, rendered as `{"success": false, "message": ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "message": self.message })),
        )
            .into_response()
    }
}

/// Successful response, rendered as `{"success": true, "data": ...}`
pub fn success<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

/// Health check endpoint for monitoring and load balancers.
///
/// Pings the database; `200 OK` when it answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","database":true,"version":"0.1.0","timestamp":"2025-01-05T10:30:00+00:00"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.stats_service.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "database": db_healthy,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
