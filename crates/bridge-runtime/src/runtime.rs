//! # Bridge Runtime
//!
//! Starts every long-running task and serves one consumer over a pair of
//! byte streams.
//!
//! ## Startup Sequence
//!
//! 1. Outbound writer subscribes (nothing published later is missed)
//! 2. Handlers and the gateway adapter subscribe, then spawn
//! 3. Rate cache refresher spawns and refreshes immediately
//! 4. Inbound pump runs until end of input or interrupt
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the shutdown channel
//! 2. Wait for tasks, bounded by [`SHUTDOWN_GRACE`]
//! 3. Drain queued outbound events to the writer
//! 4. Log final metrics

use crate::adapters::{pump_inbound, OutboundWriter};
use crate::container::BridgeContainer;
use crate::handlers::{InitSyncHandler, UserDataHandler};
use pb_03_api_gateway::GatewayBusAdapter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Upper bound on waiting for tasks after the shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Why [`BridgeRuntime::serve`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The consumer closed its side.
    InputClosed,
    /// The interrupt future completed (e.g. Ctrl+C).
    Interrupted,
}

pub struct BridgeRuntime {
    container: Arc<BridgeContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl BridgeRuntime {
    pub fn new(container: BridgeContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    pub fn container(&self) -> Arc<BridgeContainer> {
        Arc::clone(&self.container)
    }

    /// Spawn handlers, the gateway adapter and the rate refresher.
    pub fn start(&mut self) {
        let container = &self.container;
        let bus = &container.event_bus;

        let user_data =
            UserDataHandler::new(bus, container.publisher(), container.repository.clone());
        let init_sync = InitSyncHandler::new(
            bus,
            container.publisher(),
            container.repository.clone(),
            container.config.init.fallback_delay(),
        );
        let gateway = GatewayBusAdapter::new(bus, Arc::clone(&container.api_gateway));
        let rate_cache = Arc::clone(&container.rate_cache);

        let rx = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(user_data.run(rx)));

        let rx = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            init_sync.run(rx).await;
        }));

        let rx = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(gateway.run(rx)));

        let rx = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(rate_cache.run(rx)));

        info!(
            data_dir = %container.config.storage.data_dir.display(),
            ttl_ms = container.config.rates.ttl_ms,
            init_fallback_ms = ?container.config.init.fallback_delay_ms,
            "Bridge started"
        );
    }

    /// Serve one consumer until its input ends or `interrupt` completes.
    pub async fn serve<R, W, S>(mut self, reader: R, writer: W, interrupt: S) -> StopReason
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        let outbound = OutboundWriter::new(&self.container.event_bus, writer);
        let writer_task = tokio::spawn(outbound.run(self.shutdown_rx.clone()));

        self.start();

        let publisher = self.container.publisher();
        let reason = tokio::select! {
            result = pump_inbound(reader, publisher.as_ref()) => {
                if let Err(e) = result {
                    warn!(error = %e, "Consumer input failed");
                }
                StopReason::InputClosed
            }
            () = interrupt => StopReason::Interrupted,
        };
        info!(?reason, "Stopping bridge");

        self.shutdown().await;

        match writer_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Consumer output closed early"),
            Err(e) => error!(error = %e, "Outbound writer task failed"),
        }

        reason
    }

    /// Signal shutdown and wait for every spawned task.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks = std::mem::take(&mut self.tasks);
        let joined = tokio::time::timeout(SHUTDOWN_GRACE, async {
            for task in tasks {
                if let Err(e) = task.await {
                    error!(error = %e, "Task ended abnormally");
                }
            }
        })
        .await;
        if joined.is_err() {
            warn!(grace_ms = SHUTDOWN_GRACE.as_millis() as u64, "Tasks still running after grace period");
        }

        match bridge_telemetry::encode_metrics() {
            Ok(text) => info!("Final metrics:\n{}", text),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }

        info!("Shutdown complete");
    }
}
