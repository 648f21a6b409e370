//! MongoDB connection management.
//!
//! Configuration from the environment, connecting with retry, and a ping
//! based health check for readiness endpoints.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongodb::connect_with_retry(&config, &resilience::TokioSleeper).await?;
//! let db = client.database(&config.database);
//! ```

pub mod mongodb;

pub use self::mongodb::{MongoConfig, MongoError};
