//! One-shot listings: fetch once, print every projected object, exit.

use std::io::Write;

use brokerwatch_adapters::Projector;
use tracing::debug;

use crate::emitter::LineEmitter;
use crate::error::MonitorError;
use crate::source::ObjectSource;

/// Fetch once and print one line per object, in the order the broker sent them.
///
/// Unlike the monitor there is no timestamp, no deduplication and the
/// projector's filter is not applied. Returns the number of lines printed.
pub async fn print_listing<S, P, W>(
    source: &S,
    projector: &P,
    target: Option<&str>,
    emitter: &mut LineEmitter<W>,
) -> Result<usize, MonitorError>
where
    S: ObjectSource,
    P: Projector,
    W: Write,
{
    let objects = source.fetch(target).await?;
    debug!(source = source.description(), count = objects.len(), "listing");

    for raw in &objects {
        let reading = projector.project(raw)?;
        emitter.emit_plain(&reading)?;
    }

    Ok(objects.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;
    use brokerwatch_adapters::{AdapterError, ConnectionDetailProjector, QueueProjector};
    use serde_json::json;

    #[tokio::test]
    async fn test_queue_listing_keeps_order_and_celery() {
        let source = ReplaySource::new().respond(vec![
            json!({"name": "standard_product", "state": "running", "messages_ready": 2, "messages_unacknowledged": 1}),
            json!({"name": "celery@worker.pidbox", "state": "running", "messages_ready": 0, "messages_unacknowledged": 0}),
            json!({"name": "standard_product", "state": "running", "messages_ready": 2, "messages_unacknowledged": 1}),
        ]);
        let mut emitter = LineEmitter::new(Vec::new());

        let printed = print_listing(&source, &QueueProjector::default(), None, &mut emitter)
            .await
            .unwrap();

        assert_eq!(printed, 3);
        assert_eq!(
            String::from_utf8(emitter.into_inner()).unwrap(),
            "standard_product running 2 1\n\
             celery@worker.pidbox running 0 0\n\
             standard_product running 2 1\n"
        );
    }

    #[tokio::test]
    async fn test_connection_listing_is_verbose() {
        let source = ReplaySource::new().respond(vec![json!({
            "name": "127.0.0.1:46222 -> 127.0.0.1:5672",
            "state": "running",
            "channels": 2,
            "send_oct_details": { "rate": 45.6 },
            "recv_oct_details": { "rate": 0.0 }
        })]);
        let mut emitter = LineEmitter::new(Vec::new());

        print_listing(
            &source,
            &ConnectionDetailProjector,
            Some("127.0.0.1:46222 -> 127.0.0.1:5672"),
            &mut emitter,
        )
        .await
        .unwrap();

        assert_eq!(
            String::from_utf8(emitter.into_inner()).unwrap(),
            "127.0.0.1:46222 -> 127.0.0.1:5672 running 2 45.6 0.0\n"
        );
        assert_eq!(
            source.targets(),
            vec![Some("127.0.0.1:46222 -> 127.0.0.1:5672".to_string())]
        );
    }

    #[tokio::test]
    async fn test_listing_propagates_fetch_error() {
        let source = ReplaySource::new().fail(AdapterError::Status {
            status: 404,
            url: "http://localhost:15672/api/queues/%2F/nope".to_string(),
        });
        let mut emitter = LineEmitter::new(Vec::new());

        let err = print_listing(&source, &QueueProjector::default(), Some("nope"), &mut emitter)
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::Fetch(AdapterError::Status { status: 404, .. })));
        assert!(emitter.get_ref().is_empty());
    }
}
