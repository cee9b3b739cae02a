//! Health check endpoints.
//!
//! - `GET /health` - Liveness probe (always 200 if the server is up)
//! - `GET /health/ready` - Readiness probe

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::ServerState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: &'static str,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Auctions created.
    pub auctions: u64,
    /// Accepted bids.
    pub bids_accepted: u64,
    /// Rejected bid attempts.
    pub bids_rejected: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the server is ready to take commands.
    pub ready: bool,
}

/// Liveness probe: `GET /health`
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let metrics = &state.metrics;

    Json(HealthResponse {
        status: "healthy",
        uptime_secs: state.uptime_secs(),
        auctions: metrics.auctions(),
        bids_accepted: metrics.accepted(),
        bids_rejected: metrics.rejected(),
    })
}

/// Readiness probe: `GET /health/ready`
///
/// The engine is in-process and ready as soon as the server is.
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            uptime_secs: 60,
            auctions: 2,
            bids_accepted: 40,
            bids_rejected: 7,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"bids_accepted\":40"));
    }
}
