//! Items API routes
//!
//! Wires the items domain to HTTP. Writes require the bearer token.

use axum::{Router, middleware};
use axum_helpers::{BearerAuth, require_bearer};
use domain_items::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let auth = BearerAuth::new(state.config.auth.api_token.clone());

    handlers::router(state.item_service())
        .layer(middleware::from_fn_with_state(auth, require_bearer))
}
