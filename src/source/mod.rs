//! Object source abstraction for fetching raw broker objects.
//!
//! This module provides a trait-based abstraction over "one authenticated
//! request to the broker" so the polling loop can be driven by the live
//! management API or by a scripted sequence of responses in tests.

mod rabbitmq;

#[cfg(test)]
mod replay;

pub use rabbitmq::RabbitMqSource;

#[cfg(test)]
pub use replay::ReplaySource;

use std::fmt::Debug;

use async_trait::async_trait;
use brokerwatch_adapters::{AdapterError, RawObject};

/// Trait for fetching one full listing of broker objects.
///
/// Implementations perform exactly one request per call and never retry;
/// a failure is returned to the caller as-is. A lookup by name that matches
/// a single object still yields a one-element `Vec`.
///
/// # Example
///
/// ```no_run
/// use brokerwatch::{ObjectSource, RabbitMqSource};
/// use brokerwatch_adapters::rabbitmq::{ObjectKind, RabbitMqAdapter};
///
/// # tokio_test::block_on(async {
/// let adapter = RabbitMqAdapter::builder()
///     .endpoint("http://localhost:15672")
///     .build()
///     .unwrap();
/// let source = RabbitMqSource::new(adapter, ObjectKind::Queues);
/// let queues = source.fetch(None).await.unwrap();
/// println!("Got {} queues", queues.len());
/// # });
/// ```
#[async_trait]
pub trait ObjectSource: Send + Sync + Debug {
    /// Fetch every object, or only the object named `target`.
    async fn fetch(&self, target: Option<&str>) -> Result<Vec<RawObject>, AdapterError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log lines.
    fn description(&self) -> &str;
}
