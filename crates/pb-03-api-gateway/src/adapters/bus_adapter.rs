//! Event bus adapter for the gateway.
//!
//! Subscribes to `apiFetch` and `priceLookup` and dispatches them to the
//! service. Results are published by the service itself.

use crate::service::ApiGatewayService;
use shared_bus::{BridgeEvent, EventFilter, EventKind, InMemoryEventBus, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct GatewayBusAdapter {
    subscription: Subscription,
    service: Arc<ApiGatewayService>,
}

impl GatewayBusAdapter {
    /// Subscribe now, so requests published before `run` is polled are
    /// not missed.
    pub fn new(bus: &InMemoryEventBus, service: Arc<ApiGatewayService>) -> Self {
        let filter = EventFilter::kinds(vec![EventKind::ApiFetch, EventKind::PriceLookup]);
        Self {
            subscription: bus.subscribe(filter),
            service,
        }
    }

    /// Dispatch until the bus closes or `shutdown` flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Gateway started listening for requests");

        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        warn!("Event bus closed, gateway stopping");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Gateway stopped");
    }

    fn handle_event(&self, event: BridgeEvent) {
        match event {
            BridgeEvent::ApiFetch(request) => {
                self.service.handle_fetch(request);
            }
            BridgeEvent::PriceLookup(request) => {
                self.service.handle_price_lookup(request);
            }
            other => debug!(kind = other.kind().wire_name(), "Ignoring event"),
        }
    }
}
