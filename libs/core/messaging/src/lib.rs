//! In-process publish/subscribe.
//!
//! Publishers hand a serializable payload to the [`EventBus`] under a topic
//! name. Every [`EventHandler`] subscribed to that topic at publish time is
//! run on its own tokio task; the publisher does not wait for them unless
//! the bus runs in [`DispatchMode::Inline`].
//!
//! ```text
//!  publish("item.created", payload)
//!        │
//!        ▼
//! ┌──────────────┐  snapshot   ┌──────────┐  spawn  ┌───────────┐
//! │   EventBus   │────────────▶│ handlers │────────▶│ task/each │
//! └──────────────┘             └──────────┘         └───────────┘
//!                                                   errors/panics logged
//! ```
//!
//! A handler error or panic is logged at the dispatch boundary and never
//! reaches the publisher or the other handlers. There is no retry at this
//! level; handlers that need one bring their own.
//!
//! # Example
//!
//! ```ignore
//! use messaging::{Event, EventBus, EventHandler, HandlerError};
//!
//! struct AuditLog;
//!
//! #[async_trait]
//! impl EventHandler for AuditLog {
//!     async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
//!         tracing::info!(topic = %event.topic, "audit");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "audit_log"
//!     }
//! }
//!
//! let bus = Arc::new(EventBus::new());
//! bus.subscribe("item.created", Arc::new(AuditLog));
//! bus.publish("item.created", &json!({ "item_id": id })).await?;
//! ```

mod bus;
mod error;
mod event;
mod handler;

pub use bus::{DispatchMode, EventBus};
pub use error::{BusError, HandlerError};
pub use event::Event;
pub use handler::{EventHandler, FailingHandler, RecordingHandler};
