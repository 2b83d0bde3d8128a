//! In-flight request registry.
//!
//! Correlation ids belong to the caller; the gateway never rejects or
//! rewrites one. This registry only tracks what is outstanding so that a
//! caller reusing an id while the first request is still running gets
//! a warning in the logs.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::ApiKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

struct InFlight {
    kind: ApiKind,
    /// Requests sharing this id that have not completed.
    outstanding: u32,
    started_at: Instant,
}

/// Statistics for the in-flight registry
#[derive(Debug, Default)]
pub struct InFlightStats {
    pub total_registered: AtomicU64,
    pub total_completed: AtomicU64,
    /// Registrations whose id was already outstanding.
    pub total_collisions: AtomicU64,
}

#[derive(Default)]
pub struct InFlightRegistry {
    in_flight: DashMap<String, InFlight>,
    stats: InFlightStats,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request as started.
    ///
    /// Returns `false` when the id was already outstanding. Both requests
    /// are still served.
    pub fn register(&self, correlation_id: &str, kind: ApiKind) -> bool {
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        match self.in_flight.entry(correlation_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.outstanding += 1;
                self.stats.total_collisions.fetch_add(1, Ordering::Relaxed);
                warn!(
                    correlation_id,
                    kind = %kind,
                    existing_kind = %existing.kind,
                    outstanding = existing.outstanding,
                    "Correlation id reused while a request is still in flight"
                );
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(InFlight {
                    kind,
                    outstanding: 1,
                    started_at: Instant::now(),
                });
                debug!(correlation_id, kind = %kind, "Registered in-flight request");
                true
            }
        }
    }

    /// Record one request with this id as finished.
    ///
    /// Returns the time since the id was first registered, or `None` for
    /// an id that was not outstanding.
    pub fn complete(&self, correlation_id: &str) -> Option<Duration> {
        let Entry::Occupied(mut entry) = self.in_flight.entry(correlation_id.to_string()) else {
            warn!(correlation_id, "Completion for unknown correlation id");
            return None;
        };

        let elapsed = entry.get().started_at.elapsed();
        entry.get_mut().outstanding -= 1;
        if entry.get().outstanding == 0 {
            entry.remove();
        }
        self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
        Some(elapsed)
    }

    pub fn is_in_flight(&self, correlation_id: &str) -> bool {
        self.in_flight.contains_key(correlation_id)
    }

    /// Number of distinct outstanding ids.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> &InFlightStats {
        &self.stats
    }
}
