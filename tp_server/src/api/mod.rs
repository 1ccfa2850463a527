//! HTTP/WebSocket API for the tournament coordinator.
//!
//! Two client roles, two surfaces:
//!
//! - `POST /api/v1/register` - a bot claims a seat and gets back its
//!   assigned name and private key
//! - `GET /watch` - a spectator upgrades to WebSocket, receives every
//!   table event as a JSON text frame, and answers each `PING` with a
//!   `PONG` carrying the same checkpoint
//!
//! Plus `GET /health` for monitoring. All game state lives in the
//! coordinator task; handlers only pass messages.

pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tourney_poker::{CoordinatorHandle, RegisterError};

/// Application state shared across handlers. Cloning is cheap; it is
/// only a channel sender.
#[derive(Clone)]
pub struct AppState {
    pub handle: CoordinatorHandle,
}

/// Create the complete API router.
///
/// ```text
/// GET  /health            - Health check (public)
/// POST /api/v1/register   - Claim a seat (public)
/// GET  /watch             - Spectator WebSocket (public)
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/watch", get(websocket::watch_handler))
        .nest("/api/v1", Router::new().route("/register", post(register)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    /// Requested name; blank means "name me".
    #[serde(default)]
    name: String,
}

/// Claim a seat for a bot.
///
/// Returns `201 Created` with the assigned unique name and the bot's
/// private key. Refused with `409 Conflict` once the seats are taken
/// or play is underway, and `503 Service Unavailable` after the
/// coordinator has shut down.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> impl IntoResponse {
    match state.handle.register(body.name).await {
        Ok(registered) => (StatusCode::CREATED, Json(json!(registered))),
        Err(e) => {
            let status = match e {
                RegisterError::SeatsFull | RegisterError::InProgress => StatusCode::CONFLICT,
                RegisterError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(json!({ "error": e.to_string() })))
        }
    }
}

/// Health check endpoint for monitoring and load balancers.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
