//! Player catalogue endpoints.
//!
//! - `POST /api/players/import` - bulk upsert of roster rows (admin)
//! - `GET /api/players` - the full catalogue

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use auction_core::{ImportReport, ImportRow};
use types::PlayerPoolEntry;

use crate::auth::context_from_headers;
use crate::error::ApiResult;
use crate::state::ServerState;

/// Bulk import request body.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Roster rows, already split out of the uploaded sheet.
    pub rows: Vec<ImportRow>,
}

/// Import roster rows: `POST /api/players/import`
///
/// Partial failure is the expected outcome; the report carries per-row
/// errors alongside the aggregate counts.
pub async fn import_players(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<ImportRequest>,
) -> ApiResult<Json<ImportReport>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let report = state.engine.import_players(&ctx, &req.rows)?;
    Ok(Json(report))
}

/// List the catalogue: `GET /api/players`
pub async fn list_players(State(state): State<ServerState>) -> Json<Vec<PlayerPoolEntry>> {
    Json(state.engine.list_players())
}
