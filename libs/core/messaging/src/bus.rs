use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::{BusError, Event, EventHandler};

/// How `publish` treats the tasks it spawns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Return as soon as handlers are scheduled.
    #[default]
    Background,
    /// Wait for every handler of this publish before returning.
    Inline,
}

/// Topic registry and dispatcher.
///
/// Handlers registered after a `publish` call are not invoked for it. Each
/// handler runs on its own task, so a slow or failing handler does not hold
/// up the others.
///
/// Dropping the bus aborts handler tasks that are still running.
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    mode: DispatchMode,
    in_flight: Mutex<JoinSet<()>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_mode(DispatchMode::Background)
    }

    pub fn with_mode(mode: DispatchMode) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            mode,
            in_flight: Mutex::new(JoinSet::new()),
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Register `handler` for `topic`. The same handler may be registered
    /// for several topics.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let topic = topic.into();
        debug!(topic = %topic, handler = handler.name(), "Subscribing event handler");

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_default()
            .push(handler);
    }

    pub fn handler_count(&self, topic: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Serialize `payload` and publish it under `topic`.
    ///
    /// Returns the number of handlers the event was dispatched to. Handler
    /// outcomes are never reported here.
    pub async fn publish<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        payload: &T,
    ) -> Result<usize, BusError> {
        let payload = serde_json::to_value(payload).map_err(|source| BusError::Serialize {
            topic: topic.to_string(),
            source,
        })?;

        Ok(self.publish_event(Event::new(topic, payload)).await)
    }

    /// Publish an already-built event.
    pub async fn publish_event(&self, event: Event) -> usize {
        let handlers = self.snapshot(&event.topic);
        if handlers.is_empty() {
            debug!(topic = %event.topic, "No handlers subscribed");
            return 0;
        }

        let count = handlers.len();
        let event = Arc::new(event);
        debug!(topic = %event.topic, handlers = count, "Publishing event");

        match self.mode {
            DispatchMode::Background => {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                // Reap finished tasks so the set does not grow without bound.
                while in_flight.try_join_next().is_some() {}
                for handler in handlers {
                    in_flight.spawn(dispatch(handler, Arc::clone(&event)));
                }
            }
            DispatchMode::Inline => {
                let mut tasks = JoinSet::new();
                for handler in handlers {
                    tasks.spawn(dispatch(handler, Arc::clone(&event)));
                }
                while tasks.join_next().await.is_some() {}
            }
        }

        count
    }

    /// Wait until every background handler task has finished, including
    /// tasks spawned by handlers that publish while the bus drains.
    pub async fn drain(&self) {
        loop {
            let mut tasks = std::mem::take(
                &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if tasks.is_empty() {
                return;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    error!(error = %e, "Event handler task did not complete");
                }
            }
        }
    }

    fn snapshot(&self, topic: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("EventBus")
            .field("mode", &self.mode)
            .field("topics", &topics)
            .finish()
    }
}

/// Run one handler for one event. Errors and panics stop here.
async fn dispatch(handler: Arc<dyn EventHandler>, event: Arc<Event>) {
    let name = handler.name();
    let span = info_span!("event_handler", handler = name, topic = %event.topic);

    async move {
        match AssertUnwindSafe(handler.handle(&event)).catch_unwind().await {
            Ok(Ok(())) => debug!("Event handled"),
            Ok(Err(e)) => warn!(error = %e, "Event handler failed"),
            Err(panic) => error!(panic = %panic_message(panic.as_ref()), "Event handler panicked"),
        }
    }
    .instrument(span)
    .await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailingHandler, HandlerError, RecordingHandler};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler for PanickingHandler {
        async fn handle(&self, _event: &Event) -> Result<(), HandlerError> {
            panic!("handler exploded");
        }

        fn name(&self) -> &'static str {
            "panicking_handler"
        }
    }

    /// Blocks until released, to prove publish does not wait.
    struct GatedHandler {
        gate: Arc<Notify>,
        inner: RecordingHandler,
    }

    #[async_trait]
    impl EventHandler for GatedHandler {
        async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
            self.gate.notified().await;
            self.inner.handle(event).await
        }

        fn name(&self) -> &'static str {
            "gated_handler"
        }
    }

    /// Publishes a follow-up event from inside a handler.
    struct ChainingHandler {
        bus: Arc<EventBus>,
    }

    #[async_trait]
    impl EventHandler for ChainingHandler {
        async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
            self.bus.publish("second", &event.payload).await.map_err(|e| {
                HandlerError::failed_with_source("chain", e)
            })?;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "chaining_handler"
        }
    }

    #[tokio::test]
    async fn test_every_handler_runs_once_even_if_one_fails() {
        let bus = EventBus::new();
        let first = Arc::new(RecordingHandler::new());
        let second = Arc::new(RecordingHandler::new());

        bus.subscribe("item.created", first.clone());
        bus.subscribe("item.created", Arc::new(FailingHandler::new("boom")));
        bus.subscribe("item.created", Arc::new(PanickingHandler));
        bus.subscribe("item.created", second.clone());

        let dispatched = bus.publish("item.created", &json!({ "id": 1 })).await.unwrap();
        bus.drain().await;

        assert_eq!(dispatched, 4);
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 1);
        assert_eq!(first.received()[0].payload, json!({ "id": 1 }));
    }

    #[tokio::test]
    async fn test_handlers_only_receive_their_topic() {
        let bus = EventBus::new();
        let created = Arc::new(RecordingHandler::new());
        let deleted = Arc::new(RecordingHandler::new());
        bus.subscribe("item.created", created.clone());
        bus.subscribe("item.deleted", deleted.clone());

        bus.publish("item.created", &json!({})).await.unwrap();
        bus.drain().await;

        assert_eq!(created.count(), 1);
        assert_eq!(deleted.count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_publish() {
        let bus = EventBus::with_mode(DispatchMode::Inline);
        let early = Arc::new(RecordingHandler::new());
        let late = Arc::new(RecordingHandler::new());

        bus.subscribe("topic", early.clone());
        bus.publish("topic", &1).await.unwrap();
        bus.subscribe("topic", late.clone());
        bus.publish("topic", &2).await.unwrap();

        assert_eq!(early.count(), 2);
        assert_eq!(late.count(), 1);
        assert_eq!(late.received()[0].payload, json!(2));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish("nobody", &json!({})).await.unwrap(), 0);
        bus.drain().await;
    }

    #[tokio::test]
    async fn test_background_publish_does_not_wait_for_handlers() {
        let bus = EventBus::new();
        let gate = Arc::new(Notify::new());
        let handler = Arc::new(GatedHandler {
            gate: gate.clone(),
            inner: RecordingHandler::new(),
        });
        bus.subscribe("slow", handler.clone());

        let published =
            tokio::time::timeout(Duration::from_secs(1), bus.publish("slow", &json!({}))).await;
        assert!(published.is_ok(), "publish blocked on a handler");
        assert_eq!(handler.inner.count(), 0);

        gate.notify_one();
        bus.drain().await;
        assert_eq!(handler.inner.count(), 1);
    }

    #[tokio::test]
    async fn test_inline_mode_waits_for_handlers() {
        let bus = EventBus::with_mode(DispatchMode::Inline);
        let handler = Arc::new(RecordingHandler::new());
        bus.subscribe("t", handler.clone());
        bus.subscribe("t", Arc::new(PanickingHandler));

        bus.publish("t", &json!("x")).await.unwrap();

        assert_eq!(handler.count(), 1);
    }

    #[tokio::test]
    async fn test_drain_waits_for_events_published_by_handlers() {
        let bus = Arc::new(EventBus::new());
        let downstream = Arc::new(RecordingHandler::new());
        bus.subscribe("first", Arc::new(ChainingHandler { bus: bus.clone() }));
        bus.subscribe("second", downstream.clone());

        bus.publish("first", &json!({ "n": 1 })).await.unwrap();
        bus.drain().await;

        assert_eq!(downstream.count(), 1);
    }

    #[tokio::test]
    async fn test_handler_count() {
        let bus = EventBus::new();
        assert_eq!(bus.handler_count("t"), 0);
        bus.subscribe("t", Arc::new(RecordingHandler::new()));
        bus.subscribe("t", Arc::new(RecordingHandler::new()));
        assert_eq!(bus.handler_count("t"), 2);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
