//! HTTP API: query and session endpoints.
//!
//! Endpoints:
//!
//! - `POST   /api/query`          Ask the agent a question
//! - `GET    /api/sessions`       All saved sessions, keyed by id
//! - `POST   /api/sessions`       Create an empty session
//! - `GET    /api/sessions/{id}`  One session
//! - `PUT    /api/sessions/{id}`  Replace a session's messages
//! - `DELETE /api/sessions/{id}`  Delete a session

use axum::{
    Router,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use navigator_agent::query::{self, QueryAnswer, QueryRequest};
use navigator_core::error::StoreError;
use navigator_core::message::Message;
use navigator_core::session::{Session, SessionId};

use crate::SharedState;
use crate::error::ApiError;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the API router. Paths are absolute (`/api/...`).
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/query", post(query_handler))
        .route(
            "/api/sessions",
            get(list_sessions_handler).post(create_session_handler),
        )
        .route(
            "/api/sessions/{id}",
            get(get_session_handler)
                .put(update_session_handler)
                .delete(delete_session_handler),
        )
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub answer: QueryAnswer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: BTreeMap<SessionId, Session>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn query_handler(
    State(state): State<SharedState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    info!(history = request.messages.len(), "Query request");

    let answer = query::answer(&state.agent, &request).await?;
    Ok(Json(QueryResponse {
        success: true,
        answer,
    }))
}

async fn list_sessions_handler(
    State(state): State<SharedState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.sessions.list().await?;
    Ok(Json(SessionListResponse { sessions }))
}

async fn create_session_handler(
    State(state): State<SharedState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.sessions.create().await?;
    Ok(Json(SessionResponse { session }))
}

async fn get_session_handler(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Path(id) = id?;
    let id = SessionId(id);
    let session = state
        .sessions
        .get(id)
        .await?
        .ok_or(StoreError::NotFound(id))?;
    Ok(Json(SessionResponse { session }))
}

async fn update_session_handler(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let session = state
        .sessions
        .update(SessionId(id), request.created_at, request.messages)
        .await?;
    Ok(Json(SessionResponse { session }))
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    let id = SessionId(id);
    if state.sessions.delete(id).await? {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(StoreError::NotFound(id).into())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
