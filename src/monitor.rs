//! The polling loop: fetch, project, diff, emit, sleep.

use std::io::Write;
use std::time::Duration;

use brokerwatch_adapters::Projector;
use brokerwatch_types::Snapshot;
use tracing::{debug, info};

use crate::emitter::{timestamp_now, LineEmitter};
use crate::error::MonitorError;
use crate::source::ObjectSource;

/// Default time between the end of one cycle and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Polls a source and emits only the readings that changed since the last poll.
///
/// The monitor owns the previous snapshot. Cycles never overlap: the next
/// fetch starts only after the current cycle has emitted and slept, so there
/// is at most one request in flight against the broker.
///
/// # Example
///
/// ```rust,no_run
/// use brokerwatch::{LineEmitter, Monitor, RabbitMqSource};
/// use brokerwatch_adapters::rabbitmq::{ObjectKind, RabbitMqAdapter};
/// use brokerwatch_adapters::QueueProjector;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let adapter = RabbitMqAdapter::builder()
///         .endpoint("http://localhost:15672")
///         .build()?;
///
///     let monitor = Monitor::new(
///         RabbitMqSource::new(adapter, ObjectKind::Queues),
///         QueueProjector::default(),
///         LineEmitter::stdout(),
///     )
///     .interval(Duration::from_secs(5));
///
///     // Runs until a fetch fails
///     monitor.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Monitor<S, P: Projector, W: Write> {
    source: S,
    projector: P,
    emitter: LineEmitter<W>,
    target: Option<String>,
    interval: Duration,
    previous: Snapshot<P::Reading>,
}

impl<S, P, W> Monitor<S, P, W>
where
    S: ObjectSource,
    P: Projector,
    W: Write,
{
    /// Create a monitor with an empty previous snapshot.
    ///
    /// The first cycle therefore reports every reading it sees.
    pub fn new(source: S, projector: P, emitter: LineEmitter<W>) -> Self {
        Self {
            source,
            projector,
            emitter,
            target: None,
            interval: DEFAULT_INTERVAL,
            previous: Snapshot::new(),
        }
    }

    /// Only watch the object with this name.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the sleep between cycles (default: 10 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The snapshot taken by the most recent successful cycle.
    pub fn previous(&self) -> &Snapshot<P::Reading> {
        &self.previous
    }

    pub fn into_emitter(self) -> LineEmitter<W> {
        self.emitter
    }

    /// Run one cycle stamped with the current time.
    ///
    /// Returns the number of lines emitted.
    pub async fn poll_once(&mut self) -> Result<usize, MonitorError> {
        let timestamp = timestamp_now();
        self.poll_at(&timestamp).await
    }

    /// Run one cycle stamped with `timestamp`.
    pub async fn poll_at(&mut self, timestamp: &str) -> Result<usize, MonitorError> {
        let objects = self.source.fetch(self.target.as_deref()).await?;

        let mut current = Snapshot::new();
        for raw in &objects {
            let reading = self.projector.project(raw)?;
            if self.projector.filter(&reading) {
                current.insert(reading);
            }
        }

        let changes = current.changes_since(&self.previous);
        debug!(
            fetched = objects.len(),
            tracked = current.len(),
            added = changes.added().len(),
            removed = changes.removed().len(),
            "poll cycle"
        );

        let added = changes.into_added();
        for reading in &added {
            self.emitter.emit(timestamp, reading)?;
        }

        self.previous = current;
        Ok(added.len())
    }

    /// Poll forever, sleeping `interval` after each cycle.
    ///
    /// Only returns when a cycle fails; the error is fatal to the run.
    pub async fn run(mut self) -> Result<(), MonitorError> {
        info!(
            source = self.source.description(),
            target = self.target.as_deref().unwrap_or("*"),
            interval_secs = self.interval.as_secs_f64(),
            "starting monitor"
        );

        loop {
            self.poll_once().await?;
            tokio::time::sleep(self.interval).await;
        }
    }
}
