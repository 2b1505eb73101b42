//! # brokerwatch-adapters
//!
//! Fetches raw broker objects and projects them into comparable readings.
//!
//! The crate has two halves:
//!
//! - **Fetching** (`rabbitmq` feature) - [`rabbitmq::RabbitMqAdapter`] talks to
//!   the RabbitMQ Management API and returns every object as a [`RawObject`],
//!   always as a sequence even when a single named object was requested.
//! - **Projection** - [`Projector`] implementations decode the fields that
//!   matter for change detection out of a [`RawObject`] and decide whether the
//!   resulting reading should be tracked at all.
//!
//! ## Quick Start (RabbitMQ)
//!
//! ```rust,no_run
//! use brokerwatch_adapters::rabbitmq::RabbitMqAdapter;
//! use brokerwatch_adapters::{Projector, QueueProjector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = RabbitMqAdapter::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .build()?;
//!
//!     let projector = QueueProjector::default();
//!     for raw in adapter.fetch_queues(None).await? {
//!         let reading = projector.project(&raw)?;
//!         if projector.filter(&reading) {
//!             println!("{}", reading);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod projection;

#[cfg(feature = "rabbitmq")]
pub mod rabbitmq;

pub use error::AdapterError;
pub use projection::{
    ConnectionDetailProjector, ConnectionProjector, Projector, QueueProjector,
    DEFAULT_EXCLUDE_PREFIX,
};

// Re-export types for convenience
pub use brokerwatch_types::{ConnectionDetail, ConnectionReading, QueueReading, Reading};

/// One queue or connection exactly as the broker returned it.
pub type RawObject = serde_json::Map<String, serde_json::Value>;
