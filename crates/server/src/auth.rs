//! Admin credential extraction.
//!
//! The client presents its credential in a request header; the engine
//! decides what it authorizes. No role flag in a request body is ever
//! consulted.

use auction_core::{AuctionEngine, AuthContext};
use axum::http::HeaderMap;

/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Resolve the authorization context for a request.
pub fn context_from_headers(engine: &AuctionEngine, headers: &HeaderMap) -> AuthContext {
    let token = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    engine.authorize(token)
}
