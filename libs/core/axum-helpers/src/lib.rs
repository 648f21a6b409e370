//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's axum services.
//!
//! - **[`server`]**: router assembly with OpenAPI docs, health, graceful shutdown
//! - **[`http`]**: middleware (bearer auth, JSON key casing, CORS, security headers)
//! - **[`errors`]**: `AppError` and the uniform JSON error body
//! - **[`extractors`]**: `UuidPath` and `ValidatedJson`
//! - **[`casing`]**: camelCase / snake_case key conversion for JSON values
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//!
//! let router = create_router::<ApiDoc>(api_routes)?;
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod casing;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ReadinessResult, ShutdownCoordinator, create_app,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{BearerAuth, case_convert, require_bearer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};
