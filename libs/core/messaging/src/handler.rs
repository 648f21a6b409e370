//! Subscriber trait and test doubles.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::{Event, HandlerError};

/// A subscriber to one or more topics.
///
/// # Example
///
/// ```rust,ignore
/// struct WelcomeMail {
///     mailer: Arc<dyn Mailer>,
/// }
///
/// #[async_trait]
/// impl EventHandler for WelcomeMail {
///     async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
///         let payload: UserCreated = event.decode()?;
///         self.mailer
///             .send(&payload.email)
///             .await
///             .map_err(|e| HandlerError::failed_with_source("welcome mail", e))
///     }
///
///     fn name(&self) -> &'static str {
///         "welcome_mail"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;

    /// Used as the `handler` field in dispatch logs.
    fn name(&self) -> &'static str;
}

/// Remembers every event it receives (for testing).
#[derive(Debug, Default)]
pub struct RecordingHandler {
    received: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Event> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording_handler"
    }
}

/// A handler that always fails (for testing).
#[derive(Debug, Clone)]
pub struct FailingHandler {
    error_message: String,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
        }
    }
}

#[async_trait]
impl EventHandler for FailingHandler {
    async fn handle(&self, _event: &Event) -> Result<(), HandlerError> {
        Err(HandlerError::failed(&self.error_message))
    }

    fn name(&self) -> &'static str {
        "failing_handler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_recording_handler() {
        let handler = RecordingHandler::new();
        let event = Event::new("t", json!({ "n": 1 }));

        handler.handle(&event).await.unwrap();
        handler.handle(&event).await.unwrap();

        assert_eq!(handler.count(), 2);
        assert_eq!(handler.received()[0].payload, json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn test_failing_handler() {
        let handler = FailingHandler::new("boom");
        let err = handler.handle(&Event::new("t", json!(null))).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(handler.name(), "failing_handler");
    }
}
