//! API routes module
//!
//! Mounted at the root by `axum_helpers::create_router`.

pub mod geo;
pub mod health;
pub mod items;

use axum::Router;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/items", items::router(state))
        .nest("/geo", geo::router(state))
        .merge(health::router(state.clone()))
}
