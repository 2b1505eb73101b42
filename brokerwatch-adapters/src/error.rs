//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when fetching or projecting broker objects.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The management API answered with a non-success status.
    #[error("got error http {status} from {url}")]
    Status { status: u16, url: String },

    /// HTTP request failed.
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// Timeout waiting for response.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The broker returned an object without a field the projection needs.
    #[error("missing field `{field}` in broker object")]
    MissingField { field: String },

    /// A field was present but had the wrong JSON type.
    #[error("field `{field}` is not {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl AdapterError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        AdapterError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, expected: &'static str) -> Self {
        AdapterError::InvalidField {
            field: field.into(),
            expected,
        }
    }
}

#[cfg(feature = "rabbitmq")]
impl AdapterError {
    /// Classify a transport failure for the request to `url`.
    pub(crate) fn transport(err: reqwest::Error, url: &str) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            AdapterError::Timeout { url }
        } else if err.is_connect() {
            AdapterError::Connection {
                url,
                message: err.to_string(),
            }
        } else {
            AdapterError::Http {
                url,
                message: err.to_string(),
            }
        }
    }
}
