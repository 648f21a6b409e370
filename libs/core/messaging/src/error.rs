//! Error types for publishing and handling events.

use thiserror::Error;

/// Error returned by an [`EventHandler`](crate::EventHandler).
///
/// The bus only logs these; they never reach the publisher.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The payload did not match what the handler expects
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The handler's own work failed
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    pub fn failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error returned to a publisher.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to serialize payload for topic '{topic}': {source}")]
    Serialize {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_failed_with_source_keeps_chain() {
        let io = std::io::Error::other("disk gone");
        let err = HandlerError::failed_with_source("could not persist", io);

        assert_eq!(err.to_string(), "could not persist");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk gone"));
    }

    #[test]
    fn test_payload_error_from_serde() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: HandlerError = serde_err.into();
        assert!(err.to_string().starts_with("invalid event payload"));
    }
}
