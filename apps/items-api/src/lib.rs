//! Items API
//!
//! HTTP service over the items and geo domains.
//!
//! ```text
//! Client (camelCase JSON)
//!   ↓ case conversion, CORS, security headers, tracing
//! /items  ── bearer auth on writes ──▶ ItemService ──▶ ItemRepository
//!                                          │
//!                                          ▼ item.created
//!                                       EventBus ──▶ GeoLookupHandler ──▶ zippopotam.us
//! /geo/location ──────────────────────────────────▶ RetryingGeocoder
//! /health, /ready
//! ```

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use axum::Router;

pub use config::Config;
pub use state::AppState;

/// Full application router: API routes, docs and the shared middleware.
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is set but invalid.
pub fn build_router(state: &AppState) -> std::io::Result<Router> {
    axum_helpers::create_router::<openapi::ApiDoc>(api::routes(state))
}
