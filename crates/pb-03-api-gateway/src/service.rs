//! # API Gateway Service
//!
//! Forwards credentialed lookups and price lookups on behalf of the
//! consumer and publishes correlated results on the bus.
//!
//! Every accepted `apiFetch` produces exactly one `apiResponse` with the
//! caller's correlation id and kind. Each request runs on its own task,
//! so responses for different ids arrive in completion order.

use crate::domain::classify::{classify, is_auth_rejection, parse_price_body};
use crate::domain::{GatewayConfig, InFlightRegistry};
use crate::metrics;
use pb_01_persistent_store::BridgeRepository;
use serde_json::Value;
use shared_bus::{
    ApiFetchRequest, ApiResponse, AuthInvalidNotice, BridgeEvent, EventPublisher,
    PriceLookupRequest, PriceResponse,
};
use shared_types::{ApiErrorCode, HttpClient, PriceSource};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ApiGatewayService {
    repo: BridgeRepository,
    publisher: Arc<dyn EventPublisher>,
    http: Arc<dyn HttpClient>,
    config: GatewayConfig,
    in_flight: InFlightRegistry,
}

impl ApiGatewayService {
    pub fn new(
        repo: BridgeRepository,
        publisher: Arc<dyn EventPublisher>,
        http: Arc<dyn HttpClient>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            repo,
            publisher,
            http,
            config,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    // =========================================================================
    // CREDENTIALED LOOKUPS
    // =========================================================================

    /// Dispatch one `apiFetch`.
    ///
    /// Without a stored key the `NO_API_KEY` response is published before
    /// this returns and no task is spawned.
    pub fn handle_fetch(self: &Arc<Self>, request: ApiFetchRequest) -> Option<JoinHandle<()>> {
        let Some(api_key) = self.repo.api_key() else {
            debug!(
                correlation_id = %request.correlation_id,
                kind = %request.kind,
                "No API key stored, rejecting without a network call"
            );
            self.respond(&request, Err(ApiErrorCode::NoApiKey));
            return None;
        };

        if !self.in_flight.register(&request.correlation_id, request.kind) {
            metrics::record_collision();
        }

        let service = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = service.forward(&request, &api_key).await;
            service.in_flight.complete(&request.correlation_id);
            service.respond(&request, result);
        }))
    }

    /// Issue the remote call and classify the outcome.
    async fn forward(&self, request: &ApiFetchRequest, api_key: &str) -> Result<Value, ApiErrorCode> {
        let url = match self.config.api_url(request.kind, api_key, &request.subject_ids) {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    correlation_id = %request.correlation_id,
                    error = %e,
                    "Cannot build API URL from configured base"
                );
                return Err(ApiErrorCode::NetworkError);
            }
        };

        let response = match self.http.get(url.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    correlation_id = %request.correlation_id,
                    kind = %request.kind,
                    error = %e,
                    "API request failed before a response arrived"
                );
                return Err(ApiErrorCode::NetworkError);
            }
        };

        if is_auth_rejection(&response) {
            warn!(
                correlation_id = %request.correlation_id,
                status = response.status,
                "API key rejected by remote"
            );
            metrics::record_auth_invalid();
            self.publisher.publish(BridgeEvent::AuthInvalid(AuthInvalidNotice {
                status: response.status,
                body: response.body.clone(),
            }));
        }

        classify(&response)
    }

    fn respond(&self, request: &ApiFetchRequest, result: Result<Value, ApiErrorCode>) {
        let outcome = match &result {
            Ok(_) => "success",
            Err(code) => code.label(),
        };
        metrics::record_request(request.kind.as_str(), outcome);
        debug!(
            correlation_id = %request.correlation_id,
            kind = %request.kind,
            outcome,
            "Publishing API response"
        );

        self.publisher.publish(BridgeEvent::ApiResponse(ApiResponse::from_result(
            request.correlation_id.clone(),
            request.kind,
            result,
        )));
    }

    // =========================================================================
    // PRICE LOOKUPS
    // =========================================================================

    /// Query both price sources independently.
    ///
    /// Requests missing either id are dropped. Returns the two spawned
    /// lookups (steampy, steamcici).
    pub fn handle_price_lookup(
        self: &Arc<Self>,
        request: PriceLookupRequest,
    ) -> Option<(JoinHandle<()>, JoinHandle<()>)> {
        if request.primary_id.is_empty() || request.secondary_id.is_empty() {
            debug!(container_id = %request.container_id, "Ignoring price lookup with empty id");
            return None;
        }
        info!(
            primary_id = %request.primary_id,
            secondary_id = %request.secondary_id,
            container_id = %request.container_id,
            "Price lookup"
        );

        let request = Arc::new(request);
        let steampy = {
            let service = Arc::clone(self);
            let request = Arc::clone(&request);
            tokio::spawn(async move { service.lookup(PriceSource::Steampy, &request).await })
        };
        let steamcici = {
            let service = Arc::clone(self);
            tokio::spawn(async move { service.lookup(PriceSource::Steamcici, &request).await })
        };
        Some((steampy, steamcici))
    }

    async fn lookup(&self, source: PriceSource, request: &PriceLookupRequest) {
        let url = match source {
            PriceSource::Steampy => self
                .config
                .steampy_lookup_url(&request.primary_id, &request.secondary_id),
            PriceSource::Steamcici => self.config.steamcici_lookup_url(&request.primary_id),
        };

        let response = match url {
            Ok(url) => self.http.get(url.as_str()).await.map_err(|e| e.to_string()),
            Err(e) => Err(format!("invalid lookup URL: {e}")),
        };
        let data = match response {
            Ok(response) => {
                let parsed = parse_price_body(&response);
                if parsed.is_none() {
                    warn!(%source, status = response.status, "Price response is not JSON");
                }
                parsed
            }
            Err(e) => {
                warn!(%source, error = %e, "Price lookup failed");
                None
            }
        };

        metrics::record_price_lookup(source.as_str(), data.is_some());
        let secondary_id = match source {
            PriceSource::Steampy => None,
            PriceSource::Steamcici => Some(request.secondary_id.clone()),
        };

        self.publisher.publish(BridgeEvent::PriceResponse(PriceResponse {
            source,
            container_id: request.container_id.clone(),
            secondary_id,
            success: data.is_some(),
            data,
        }));
    }
}
