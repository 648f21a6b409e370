//! HTTP middleware: bearer auth, key-case conversion, CORS and security
//! headers.
//!
//! ```ignore
//! use axum_helpers::http::{case_convert, security_headers};
//!
//! let app = Router::new()
//!     .merge(routes)
//!     .layer(axum::middleware::from_fn(case_convert))
//!     .layer(axum::middleware::from_fn(security_headers));
//! ```

pub mod auth;
pub mod case_convert;
pub mod cors;
pub mod security;

pub use auth::{BearerAuth, require_bearer};
pub use case_convert::case_convert;
pub use cors::{create_cors_layer, create_permissive_cors_layer, parse_origins};
pub use security::security_headers;
