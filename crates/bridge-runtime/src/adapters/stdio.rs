//! # Stdio Transport
//!
//! Newline-delimited JSON between the agent and the consumer.
//!
//! - Inbound: one event per line on the reader. Only inbound kinds are
//!   published; unknown and outbound kinds are dropped quietly, garbage
//!   (invalid UTF-8 included) is logged. Only end of input or a read error
//!   ends the pump.
//! - Outbound: every outbound event on the bus becomes one line on the
//!   writer, flushed immediately.

use bridge_telemetry::metrics;
use shared_bus::{wire, BridgeEvent, EventFilter, EventPublisher, InMemoryEventBus, Subscription, WireError};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Read events from `reader` until end of input.
///
/// Returns the number of events published.
pub async fn pump_inbound<R>(mut reader: R, publisher: &dyn EventPublisher) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut accepted = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                metrics::record_line_rejected("malformed");
                warn!(error = %e, bytes = buf.len(), "Dropping inbound line that is not UTF-8");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match wire::decode_inbound(line) {
            Ok(event) => {
                let kind = event.kind().wire_name();
                metrics::record_event_received(kind);
                debug!(kind, "Inbound event");
                publisher.publish(event);
                accepted += 1;
            }
            Err(e) => {
                metrics::record_line_rejected(rejection_reason(&e));
                if e.is_ignorable() {
                    debug!(error = %e, "Ignoring inbound line");
                } else {
                    warn!(error = %e, "Dropping malformed inbound line");
                }
            }
        }
    }

    info!(accepted, "Consumer input closed");
    Ok(accepted)
}

fn rejection_reason(e: &WireError) -> &'static str {
    match e {
        WireError::UnknownKind(_) => "unknown_kind",
        WireError::WrongDirection(_) => "wrong_direction",
        WireError::MissingKind | WireError::Malformed(_) => "malformed",
    }
}

/// Forwards outbound events from the bus to the consumer.
pub struct OutboundWriter<W> {
    subscription: Subscription,
    writer: W,
}

impl<W> OutboundWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Subscribe now; events published before `run` starts are buffered.
    pub fn new(bus: &InMemoryEventBus, writer: W) -> Self {
        Self {
            subscription: bus.subscribe(EventFilter::outbound()),
            writer,
        }
    }

    /// Write events until shutdown, then drain what is already queued.
    ///
    /// A write error means the consumer is gone and ends the loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> io::Result<()> {
        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => self.write_event(&event).await?,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        while let Ok(Some(event)) = self.subscription.try_recv() {
            self.write_event(&event).await?;
        }
        self.writer.flush().await
    }

    async fn write_event(&mut self, event: &BridgeEvent) -> io::Result<()> {
        let kind = event.kind().wire_name();
        let line = match wire::encode(event) {
            Ok(line) => line,
            Err(e) => {
                error!(kind, error = %e, "Failed to encode outbound event");
                return Ok(());
            }
        };

        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        metrics::record_event_sent(kind);
        debug!(kind, "Outbound event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventKind, FavoritesResponse};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_pump_publishes_inbound_and_skips_rest() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        let input = concat!(
            "{\"kind\":\"ready\"}\n",
            "\n",
            "{\"kind\":\"openOptions\",\"payload\":{}}\n",
            "{\"kind\":\"favoritesResponse\",\"payload\":{\"favorites\":[]}}\n",
            "garbage\n",
            "{\"kind\":\"favoritesQuery\"}\n",
        );
        let accepted = pump_inbound(BufReader::new(input.as_bytes()), &bus).await.unwrap();

        assert_eq!(accepted, 2);
        assert_eq!(sub.try_recv().unwrap(), Some(BridgeEvent::Ready));
        assert_eq!(sub.try_recv().unwrap(), Some(BridgeEvent::FavoritesQuery));
        assert_eq!(sub.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_pump_survives_invalid_utf8() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(b"{\"kind\":\"favoritesQuery\"}\n");
        input.extend_from_slice(b"{\"kind\":\"ready\"}");
        let accepted = pump_inbound(BufReader::new(input.as_slice()), &bus).await.unwrap();

        assert_eq!(accepted, 2);
        assert_eq!(sub.try_recv().unwrap(), Some(BridgeEvent::FavoritesQuery));
        assert_eq!(sub.try_recv().unwrap(), Some(BridgeEvent::Ready));
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(rejection_reason(&wire::decode("nope").unwrap_err()), "malformed");
        assert_eq!(
            rejection_reason(&wire::decode(r#"{"kind":"x"}"#).unwrap_err()),
            "unknown_kind"
        );
        assert_eq!(
            rejection_reason(&WireError::WrongDirection(EventKind::ApiResponse)),
            "wrong_direction"
        );
    }

    #[tokio::test]
    async fn test_writer_emits_one_line_per_outbound_event() {
        let bus = Arc::new(InMemoryEventBus::new());
        let (client, server) = tokio::io::duplex(4096);
        let writer = OutboundWriter::new(&bus, server);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        bus.publish(BridgeEvent::Ready);
        bus.publish(BridgeEvent::FavoritesResponse(FavoritesResponse {
            favorites: vec![json!(1)],
        }));

        let task = tokio::spawn(writer.run(shutdown_rx));
        let mut lines = BufReader::new(client).lines();
        let line = lines.next_line().await.unwrap().unwrap();

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], json!("favoritesResponse"));
        assert_eq!(value["payload"]["favorites"], json!([1]));

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writer_drains_queue_on_shutdown() {
        let bus = InMemoryEventBus::new();
        let (client, server) = tokio::io::duplex(4096);
        let writer = OutboundWriter::new(&bus, server);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        bus.publish(BridgeEvent::FavoritesResponse(FavoritesResponse { favorites: vec![] }));
        bus.publish(BridgeEvent::FavoritesResponse(FavoritesResponse { favorites: vec![] }));
        shutdown_tx.send(true).unwrap();

        writer.run(shutdown_rx).await.unwrap();

        let mut lines = BufReader::new(client).lines();
        assert!(lines.next_line().await.unwrap().is_some());
        assert!(lines.next_line().await.unwrap().is_some());
        assert_eq!(lines.next_line().await.unwrap(), None);
    }
}
