//! RabbitMQ adapter using the Management HTTP API.
//!
//! This adapter fetches queue and connection objects from RabbitMQ by querying
//! the Management API, which is typically available on port 15672.
//!
//! ## Endpoints
//!
//! - **Queues**: `/api/queues/<vhost>/` lists every queue in the vhost,
//!   `/api/queues/<vhost>/<name>` returns a single queue object
//! - **Connections**: `/api/connections/` lists every connection,
//!   `/api/connections/<name>` returns a single connection object
//!
//! Both shapes are normalized to a `Vec<RawObject>`, so callers never have to
//! special-case a single-object response.
//!
//! ## Example
//!
//! ```rust,no_run
//! use brokerwatch_adapters::rabbitmq::RabbitMqAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = RabbitMqAdapter::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .vhost("/")
//!         .build()?;
//!
//!     let connections = adapter.fetch_connections(None).await?;
//!     println!("{} open connections", connections.len());
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{AdapterError, RawObject};

/// Which kind of broker object to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Queues,
    Connections,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Queues => "queues",
            ObjectKind::Connections => "connections",
        }
    }
}

/// RabbitMQ adapter for fetching queue and connection objects.
#[derive(Debug, Clone)]
pub struct RabbitMqAdapter {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
    vhost: String,
}

impl RabbitMqAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> RabbitMqAdapterBuilder {
        RabbitMqAdapterBuilder::default()
    }

    /// The Management API base URL, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch all queues in the configured vhost, or just `queue_name`.
    pub async fn fetch_queues(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<RawObject>, AdapterError> {
        self.fetch(ObjectKind::Queues, queue_name).await
    }

    /// Fetch all connections, or just `connection_name`.
    pub async fn fetch_connections(
        &self,
        connection_name: Option<&str>,
    ) -> Result<Vec<RawObject>, AdapterError> {
        self.fetch(ObjectKind::Connections, connection_name).await
    }

    /// Fetch objects of the given kind, optionally narrowed to a single name.
    pub async fn fetch(
        &self,
        kind: ObjectKind,
        name: Option<&str>,
    ) -> Result<Vec<RawObject>, AdapterError> {
        let url = self.url_for(kind, name);
        debug!(url = %url, user = %self.username, "calling management API");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AdapterError::transport(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "management API returned an error");
            return Err(AdapterError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::transport(e, &url))?;
        let objects = decode_payload(&body)?;
        debug!(url = %url, count = objects.len(), "fetched {}", kind.as_str());

        Ok(objects)
    }

    fn url_for(&self, kind: ObjectKind, name: Option<&str>) -> String {
        let name = name.map(urlencoded).unwrap_or_default();
        match kind {
            ObjectKind::Queues => format!(
                "{}/api/queues/{}/{}",
                self.endpoint,
                urlencoded(&self.vhost),
                name
            ),
            ObjectKind::Connections => format!("{}/api/connections/{}", self.endpoint, name),
        }
    }
}

/// Builder for RabbitMqAdapter.
#[derive(Debug, Default)]
pub struct RabbitMqAdapterBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    vhost: Option<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl RabbitMqAdapterBuilder {
    /// Set the Management API endpoint (e.g., "http://localhost:15672").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the vhost to query (default: "/").
    pub fn vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// Management endpoints behind self-signed certificates are common in
    /// cluster deployments.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<RabbitMqAdapter, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:15672".to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| AdapterError::transport(e, &endpoint))?;

        Ok(RabbitMqAdapter {
            client,
            endpoint,
            username: self.username.unwrap_or_else(|| "guest".to_string()),
            password: self.password.unwrap_or_else(|| "guest".to_string()),
            vhost: self.vhost.unwrap_or_else(|| "/".to_string()),
        })
    }
}

// Percent-encode the characters that would break a single path segment
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ' ' => out.push_str("%20"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            c => out.push(c),
        }
    }
    out
}

/// A listing returns an array, a lookup by name returns one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<RawObject>),
    One(RawObject),
}

fn decode_payload(body: &str) -> Result<Vec<RawObject>, AdapterError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| AdapterError::Parse(e.to_string()))?;

    Ok(match payload {
        Payload::Many(objects) => objects,
        Payload::One(object) => vec![object],
    })
}
