//! # brokerwatch
//!
//! Polls the RabbitMQ management API on a fixed interval and writes only the
//! queues or connections that changed since the previous poll.
//!
//! The broker already knows its full state; this crate turns repeated full
//! listings into a low-noise, append-only change log that downstream log and
//! metric pipelines can tail.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             Monitor                              │
//! │  ┌──────────┐    ┌───────────┐    ┌──────────┐    ┌───────────┐  │
//! │  │  source  │───▶│ projector │───▶│ snapshot │───▶│  emitter  │  │
//! │  │ (fetch)  │    │ (readings)│    │  (diff)  │    │  (stdout) │  │
//! │  └──────────┘    └───────────┘    └──────────┘    └───────────┘  │
//! │        ▲                                                         │
//! │        └──────────────── sleep(interval) ◀───────────────────────│
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`ObjectSource`] trait and the management API source
//! - **[`monitor`]**: the [`Monitor`] loop that owns the previous snapshot
//! - **[`emitter`]**: [`LineEmitter`], one flushed line per changed reading
//! - **[`info`]**: one-shot listings without diffing
//! - **[`config`]**: layered [`Settings`] from file, environment and flags
//!
//! Projection and the snapshot types live in `brokerwatch-adapters` and
//! `brokerwatch-types`.
//!
//! ## Usage
//!
//! ```bash
//! # Stream queue changes every 10 seconds
//! brokerwatch queues --endpoint https://mozart.example.org:15673 --username guest --passwd guest
//!
//! # Stream changes of a single connection every 5 seconds
//! brokerwatch connections -e http://localhost:15672 -c "127.0.0.1:46542 -> 127.0.0.1:5672" -i 5
//!
//! # Print every queue once
//! brokerwatch queue-info -e http://localhost:15672
//! ```
//!
//! ## Output
//!
//! ```text
//! 2020-05-21T22:37:29+00:00 user_rules_dataset running 0 0
//! 2020-05-22T02:24:32+00:00 127.0.0.1:41446 -> 127.0.0.1:5672 running 45.6 0.0
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod info;
pub mod monitor;
pub mod source;

// Re-export main types for convenience
pub use config::{Overrides, Settings, SettingsError};
pub use emitter::{format_timestamp, timestamp_now, LineEmitter};
pub use error::MonitorError;
pub use info::print_listing;
pub use monitor::{Monitor, DEFAULT_INTERVAL};
pub use source::{ObjectSource, RabbitMqSource};
