//! reqwest-backed implementation of the `HttpClient` port.

use crate::container::config::HttpSettings;
use async_trait::async_trait;
use reqwest::Client;
use shared_types::{HttpClient, HttpResponse, TransportError};
use tracing::trace;

/// Shared connection pool for every outbound GET.
///
/// Only a connect timeout is set here. The rate cache bounds its own
/// fetches and the gateway deliberately has no bound.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.without_url().to_string()))?;

        trace!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse::new(status, body))
    }
}

/// URLs carry the API key, so they are stripped before the error travels on.
fn map_send_error(e: reqwest::Error) -> TransportError {
    let e = e.without_url();
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connection(format!("cannot connect: {e}"))
    } else {
        // Redirect loops, builder errors and the like; the request never got a response.
        TransportError::Connection(e.to_string())
    }
}
