//! # brokerwatch-types
//!
//! Core types for turning repeated full broker snapshots into a change log.
//!
//! A poll of the broker yields a list of objects (queues or connections).
//! Each object is reduced to a fixed-shape [`Reading`], the readings of one
//! poll are collected into a [`Snapshot`], and two consecutive snapshots are
//! compared to produce a [`ChangeSet`].
//!
//! ## Design Goals
//!
//! - **Zero dependencies**: plain std collections, no serialization framework
//! - **Exact snapshot keys**: a reading changes whenever any projected field does
//! - **Order independent**: snapshots are hash sets, duplicates collapse silently
//!
//! ## Example
//!
//! ```rust
//! use brokerwatch_types::{QueueReading, Snapshot};
//!
//! let previous: Snapshot<QueueReading> = [QueueReading::new("jobs", "running", 0, 0)]
//!     .into_iter()
//!     .collect();
//! let current: Snapshot<QueueReading> = [QueueReading::new("jobs", "running", 5, 0)]
//!     .into_iter()
//!     .collect();
//!
//! let changes = current.changes_since(&previous);
//! assert_eq!(changes.added().len(), 1);
//! assert_eq!(changes.removed().len(), 1);
//! ```

mod reading;
mod snapshot;

pub use reading::*;
pub use snapshot::*;
