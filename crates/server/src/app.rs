//! Axum application builder.
//!
//! Configures routes, middleware, and state for the auction server.
//!
//! # Routes
//!
//! - `GET  /health`, `GET /health/ready` - probes
//! - `POST /api/sessions` - create auction (admin)
//! - `GET  /api/sessions` - lobby list
//! - `POST /api/sessions/{id}/join|leave` - membership
//! - `POST /api/sessions/{id}/players` - draw queue (admin)
//! - `POST /api/sessions/{id}/start|pause|resume|next-player|close-round|reclaim|end|reset` (admin)
//! - `POST /api/sessions/{id}/bid` - bid submission
//! - `GET  /api/sessions/{id}/live-state|participants|summary` - room reads
//! - `POST /api/players/import` - roster import (admin)
//! - `GET  /api/players` - catalogue

use axum::Router;
use axum::routing::{get, post};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health, players, sessions};
use crate::state::ServerState;

/// Create the Axum application with all routes.
pub fn create_app(state: ServerState) -> Router {
    // CORS layer for frontend development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        // Health endpoints
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        // Sessions
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/sessions/{id}/join", post(sessions::join_session))
        .route("/api/sessions/{id}/leave", post(sessions::leave_session))
        .route("/api/sessions/{id}/players", post(sessions::draw_players))
        // Admin session control
        .route("/api/sessions/{id}/start", post(sessions::start_session))
        .route("/api/sessions/{id}/pause", post(sessions::pause_session))
        .route("/api/sessions/{id}/resume", post(sessions::resume_session))
        .route("/api/sessions/{id}/next-player", post(sessions::next_player))
        .route("/api/sessions/{id}/close-round", post(sessions::close_round))
        .route("/api/sessions/{id}/reclaim", post(sessions::reclaim))
        .route("/api/sessions/{id}/end", post(sessions::end_session))
        .route("/api/sessions/{id}/reset", post(sessions::reset_session))
        // Bidding
        .route("/api/sessions/{id}/bid", post(sessions::post_bid))
        // Room reads
        .route("/api/sessions/{id}/live-state", get(sessions::live_state))
        .route(
            "/api/sessions/{id}/participants",
            get(sessions::participants),
        )
        .route("/api/sessions/{id}/summary", get(sessions::summary))
        // Player catalogue
        .route("/api/players", get(players::list_players))
        .route("/api/players/import", post(players::import_players))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}
