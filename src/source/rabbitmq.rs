//! Management API data source.

use async_trait::async_trait;
use brokerwatch_adapters::rabbitmq::{ObjectKind, RabbitMqAdapter};
use brokerwatch_adapters::{AdapterError, RawObject};

use super::ObjectSource;

/// A source that lists one kind of object from the RabbitMQ Management API.
#[derive(Debug, Clone)]
pub struct RabbitMqSource {
    adapter: RabbitMqAdapter,
    kind: ObjectKind,
    description: String,
}

impl RabbitMqSource {
    /// Create a source listing `kind` objects through `adapter`.
    pub fn new(adapter: RabbitMqAdapter, kind: ObjectKind) -> Self {
        let description = format!("rabbitmq {}: {}", kind.as_str(), adapter.endpoint());
        Self {
            adapter,
            kind,
            description,
        }
    }
}

#[async_trait]
impl ObjectSource for RabbitMqSource {
    async fn fetch(&self, target: Option<&str>) -> Result<Vec<RawObject>, AdapterError> {
        self.adapter.fetch(self.kind, target).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}
