use mongodb::error::ErrorKind;
use resilience::Retryable;

#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl Retryable for MongoError {
    /// A malformed connection string will not fix itself; anything else
    /// during connect (DNS, refused, server selection timeout) might.
    fn is_transient(&self) -> bool {
        match self {
            MongoError::Mongo(e) => !matches!(
                *e.kind,
                ErrorKind::InvalidArgument { .. } | ErrorKind::Authentication { .. }
            ),
            MongoError::ConnectionFailed(_) => true,
        }
    }
}
