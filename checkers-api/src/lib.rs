//! Checkers Web API
//!
//! Serves one game session to a browser front-end. The front-end renders
//! [`Snapshot`]s and posts clicks; the oracle side of the game runs in a
//! background task (see [`driver`]).

pub mod config;
pub mod driver;
pub mod oracle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use checkers_core::{Click, Coordinator, HistoryEntry, Snapshot, Square};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::oracle::Oracle;

// =============================================================================
// Session State
// =============================================================================

/// Shared application state
pub struct AppStateInner {
    game: Mutex<Coordinator>,
    pub oracle: Arc<dyn Oracle>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    /// Lock the game session.
    pub fn game(&self) -> MutexGuard<'_, Coordinator> {
        // Coordinator updates replace whole values, so a poisoned lock is
        // still consistent.
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn app_state(game: Coordinator, oracle: Arc<dyn Oracle>) -> AppState {
    Arc::new(AppStateInner {
        game: Mutex::new(game),
        oracle,
    })
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Deserialize)]
struct ClickRequest {
    row: u8,
    col: u8,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("square {row},{col} is off the board")]
    OffBoard { row: u8, col: u8 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorModel {
            detail: self.to_string(),
        });
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.game().snapshot())
}

async fn click(
    State(state): State<AppState>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<Snapshot>, ApiError> {
    let square = Square::new(req.row, req.col).ok_or(ApiError::OffBoard {
        row: req.row,
        col: req.col,
    })?;

    let outcome = state.game().click(square);
    debug!(%square, ?outcome, "click");
    if let Click::Moved(_) = outcome {
        driver::dispatch_pending(&state);
    }

    Ok(Json(state.game().snapshot()))
}

async fn reset_game(State(state): State<AppState>) -> Json<Snapshot> {
    state.game().reset();
    driver::dispatch_pending(&state);
    Json(state.game().snapshot())
}

async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.game().history().to_vec())
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/click", post(click))
        .route("/reset", post(reset_game))
        .route("/history", get(get_history))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}
