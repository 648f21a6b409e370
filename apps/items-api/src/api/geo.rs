//! Geo API routes

use axum::Router;
use domain_geo::handlers;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.geocoder.clone())
}
