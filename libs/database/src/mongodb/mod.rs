mod config;
mod connector;
mod error;
mod health;

pub use config::MongoConfig;
pub use connector::{connect, connect_with_retry};
pub use error::MongoError;
pub use health::{HealthStatus, check_health, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
