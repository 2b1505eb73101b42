//! Projection of raw broker objects into comparable readings.
//!
//! Each projector decodes a [`RawObject`] into a private field struct, then
//! builds its reading from the typed fields. A key that is absent (or `null`)
//! is a broker API contract violation and surfaces as
//! [`AdapterError::MissingField`]; a key of the wrong JSON type surfaces as
//! [`AdapterError::InvalidField`].

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::Value;

use brokerwatch_types::{ConnectionDetail, ConnectionReading, QueueReading, Reading};

use crate::{AdapterError, RawObject};

/// Queues whose names start with this prefix are skipped by default.
///
/// Celery creates a large number of short-lived bookkeeping queues that would
/// otherwise drown out the application queues.
pub const DEFAULT_EXCLUDE_PREFIX: &str = "celery";

/// Maps a raw broker object to a reading and decides whether to keep it.
pub trait Projector {
    /// The reading type this projector produces.
    type Reading: Reading;

    /// Decode the fields relevant for change detection.
    fn project(&self, raw: &RawObject) -> Result<Self::Reading, AdapterError>;

    /// Whether a projected reading should be part of the snapshot.
    ///
    /// Applied after projection, since it inspects projected fields.
    fn filter(&self, _reading: &Self::Reading) -> bool {
        true
    }
}

/// Projects queues to `(name, state, messages_ready, messages_unacknowledged)`.
#[derive(Debug, Clone)]
pub struct QueueProjector {
    exclude_prefix: Option<String>,
}

impl QueueProjector {
    /// Create a projector that skips queue names starting with `prefix`.
    pub fn with_exclude_prefix(prefix: impl Into<String>) -> Self {
        Self {
            exclude_prefix: Some(prefix.into()),
        }
    }

    /// Create a projector that keeps every queue.
    pub fn unfiltered() -> Self {
        Self {
            exclude_prefix: None,
        }
    }

    pub fn exclude_prefix(&self) -> Option<&str> {
        self.exclude_prefix.as_deref()
    }
}

impl Default for QueueProjector {
    fn default() -> Self {
        Self::with_exclude_prefix(DEFAULT_EXCLUDE_PREFIX)
    }
}

impl Projector for QueueProjector {
    type Reading = QueueReading;

    fn project(&self, raw: &RawObject) -> Result<QueueReading, AdapterError> {
        let fields: QueueFields = decode(raw)?;
        Ok(QueueReading {
            name: take(fields.name, "name", "a string")?,
            state: take(fields.state, "state", "a string")?,
            messages_ready: take(fields.messages_ready, "messages_ready", COUNT)?,
            messages_unacknowledged: take(
                fields.messages_unacknowledged,
                "messages_unacknowledged",
                COUNT,
            )?,
        })
    }

    fn filter(&self, reading: &QueueReading) -> bool {
        match &self.exclude_prefix {
            Some(prefix) => !reading.name.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Projects connections to `(name, state, send_rate, recv_rate)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionProjector;

impl Projector for ConnectionProjector {
    type Reading = ConnectionReading;

    fn project(&self, raw: &RawObject) -> Result<ConnectionReading, AdapterError> {
        let fields: ConnectionFields = decode(raw)?;
        Ok(ConnectionReading {
            name: take(fields.name, "name", "a string")?,
            state: take(fields.state, "state", "a string")?,
            send_rate: rate(fields.send_oct_details, "send_oct_details")?.into(),
            recv_rate: rate(fields.recv_oct_details, "recv_oct_details")?.into(),
        })
    }
}

/// Projects connections to `(name, state, channels, send_rate, recv_rate)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionDetailProjector;

impl Projector for ConnectionDetailProjector {
    type Reading = ConnectionDetail;

    fn project(&self, raw: &RawObject) -> Result<ConnectionDetail, AdapterError> {
        let fields: ConnectionDetailFields = decode(raw)?;
        Ok(ConnectionDetail {
            name: take(fields.name, "name", "a string")?,
            state: take(fields.state, "state", "a string")?,
            channels: take(fields.channels, "channels", COUNT)?,
            send_rate: rate(fields.send_oct_details, "send_oct_details")?.into(),
            recv_rate: rate(fields.recv_oct_details, "recv_oct_details")?.into(),
        })
    }
}

const COUNT: &str = "a non-negative integer";

/// A field value that either decoded as `T` or held some other JSON value.
///
/// Wrapped in `Option`, so `None` covers both an absent key and `null`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Typed<T> {
    Valid(T),
    Invalid(#[allow(dead_code)] IgnoredAny),
}

/// Queue object from the Management API.
#[derive(Debug, Deserialize)]
struct QueueFields {
    name: Option<Typed<String>>,
    state: Option<Typed<String>>,
    messages_ready: Option<Typed<u64>>,
    messages_unacknowledged: Option<Typed<u64>>,
}

/// Connection object from the Management API.
#[derive(Debug, Deserialize)]
struct ConnectionFields {
    name: Option<Typed<String>>,
    state: Option<Typed<String>>,
    send_oct_details: Option<Typed<RateDetails>>,
    recv_oct_details: Option<Typed<RateDetails>>,
}

/// Connection object including the channel count.
#[derive(Debug, Deserialize)]
struct ConnectionDetailFields {
    name: Option<Typed<String>>,
    state: Option<Typed<String>>,
    channels: Option<Typed<u64>>,
    send_oct_details: Option<Typed<RateDetails>>,
    recv_oct_details: Option<Typed<RateDetails>>,
}

#[derive(Debug, Deserialize)]
struct RateDetails {
    rate: Option<Typed<f64>>,
}

fn decode<T: DeserializeOwned>(raw: &RawObject) -> Result<T, AdapterError> {
    serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|e| AdapterError::Parse(e.to_string()))
}

fn take<T>(
    value: Option<Typed<T>>,
    field: &str,
    expected: &'static str,
) -> Result<T, AdapterError> {
    match value {
        Some(Typed::Valid(value)) => Ok(value),
        Some(Typed::Invalid(_)) => Err(AdapterError::invalid(field, expected)),
        None => Err(AdapterError::missing(field)),
    }
}

/// Read `<details>.rate`, e.g. `send_oct_details.rate`.
fn rate(details: Option<Typed<RateDetails>>, field: &str) -> Result<f64, AdapterError> {
    let details = take(details, field, "an object")?;
    take(details.rate, &format!("{}.rate", field), "a number")
}
