//! Errors that end a monitoring run.

use std::io;

use brokerwatch_adapters::AdapterError;
use thiserror::Error;

/// A failure inside a poll cycle.
///
/// Every variant is fatal to the loop: there is no retry, the process exits
/// non-zero and an external supervisor is expected to restart it.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Fetching or projecting broker objects failed.
    #[error(transparent)]
    Fetch(#[from] AdapterError),

    /// Writing a change line to the output stream failed.
    #[error("failed to write change line: {0}")]
    Emit(#[from] io::Error),
}
