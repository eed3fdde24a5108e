//! HTTP API gateway for Navigator.
//!
//! Serves the query endpoint, the saved-session endpoints, and a health
//! check. The browser frontend is served separately and talks to this API
//! cross-origin, so CORS is permissive.
//!
//! Built on Axum.

pub mod api;
pub mod error;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use navigator_agent::AgentGateway;
use navigator_config::AppConfig;
use navigator_core::session::SessionStore;
use navigator_providers::AixplainRegistry;
use navigator_sessions::FileSessionStore;

/// Shared application state for the gateway.
pub struct AppState {
    pub agent: Arc<AgentGateway>,
    pub sessions: Arc<dyn SessionStore>,
}

pub type SharedState = Arc<AppState>;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full router: health, query, and sessions.
///
/// Layers applied:
/// - Request body size limit (1 MB)
/// - Permissive CORS
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(health_handler))
        .merge(api::api_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Wire the aiXplain registry, agent gateway, and session store from config.
pub fn build_state(config: &AppConfig) -> SharedState {
    let registry = Arc::new(AixplainRegistry::from_config(&config.agent));
    let agent = Arc::new(AgentGateway::from_config(registry, &config.agent));
    let sessions = FileSessionStore::new(&config.sessions.dir)
        .with_skip_malformed(config.sessions.skip_malformed)
        .with_io_timeout(config.sessions.io_timeout());

    Arc::new(AppState {
        agent,
        sessions: Arc::new(sessions),
    })
}

/// Start the gateway HTTP server and run until Ctrl-C.
///
/// The agent is not contacted here; the first query acquires it.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config);

    if !config.has_api_key() {
        tracing::warn!("No API key configured; queries will fail until AIXPLAIN_API_KEY is set");
    }

    let app = build_router(state);

    info!(
        addr = %addr,
        agent_id = %config.agent.agent_id,
        sessions_dir = %config.sessions.dir.display(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path) -> SharedState {
        let mut config = AppConfig::default();
        config.sessions.dir = dir.to_path_buf();
        build_state(&config)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = build_router(test_state(tmp.path()));

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn health_does_not_touch_agent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = test_state(tmp.path());
        let app = build_router(state.clone());

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        app.oneshot(req).await.unwrap();

        assert!(!state.agent.is_initialized());
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = build_router(test_state(tmp.path()));

        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/sessions")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "PUT")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = build_router(test_state(tmp.path()));

        let big = format!(r#"{{"question":"{}"}}"#, "a".repeat(MAX_BODY_BYTES + 1));
        let req = Request::builder()
            .method("POST")
            .uri("/api/query")
            .header("content-type", "application/json")
            .body(Body::from(big))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
