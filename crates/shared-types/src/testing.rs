//! Test doubles for the outbound ports.
//!
//! Enabled for this crate's tests and, downstream, through the
//! `test-utils` feature.

use crate::entities::TimestampMs;
use crate::http::{HttpClient, HttpResponse, TransportError};
use crate::time::TimeSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Canned behaviour for one route.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        response: HttpResponse,
        delay: Duration,
    },
    Fail {
        error: TransportError,
        delay: Duration,
    },
    /// Never completes.
    Hang,
}

impl Reply {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            response: HttpResponse::new(status, body),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn fail(error: TransportError) -> Self {
        Self::Fail {
            error,
            delay: Duration::ZERO,
        }
    }

    pub fn hang() -> Self {
        Self::Hang
    }

    /// Delay completion by `delay`. No effect on `Hang`.
    #[must_use]
    pub fn after(self, delay: Duration) -> Self {
        match self {
            Self::Respond { response, .. } => Self::Respond { response, delay },
            Self::Fail { error, .. } => Self::Fail { error, delay },
            Self::Hang => Self::Hang,
        }
    }
}

/// HTTP client that answers from a script and records every URL it saw.
///
/// Routes are matched by substring, first match wins. A URL with no
/// matching route fails with `TransportError::Connection`.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, Reply)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set_route`].
    #[must_use]
    pub fn route(self, pattern: impl Into<String>, reply: Reply) -> Self {
        self.set_route(pattern, reply);
        self
    }

    /// Add a route, or replace the reply of an existing identical pattern.
    pub fn set_route(&self, pattern: impl Into<String>, reply: Reply) {
        let pattern = pattern.into();
        let mut routes = self.routes.lock();
        match routes.iter_mut().find(|(p, _)| *p == pattern) {
            Some(route) => route.1 = reply,
            None => routes.push((pattern, reply)),
        }
    }

    /// Every URL requested so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of requested URLs containing `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls.lock().iter().filter(|u| u.contains(pattern)).count()
    }

    fn reply_for(&self, url: &str) -> Option<Reply> {
        self.routes
            .lock()
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.lock().push(url.to_string());

        let Some(reply) = self.reply_for(url) else {
            return Err(TransportError::Connection(format!(
                "no scripted route for {url}"
            )));
        };

        match reply {
            Reply::Respond { response, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Reply::Fail { error, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Err(error)
            }
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: TimestampMs) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: TimestampMs) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}
