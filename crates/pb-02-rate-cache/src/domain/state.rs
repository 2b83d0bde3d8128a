use std::fmt;

/// Freshness of the cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Younger than the TTL. Refresh is a no-op.
    Fresh,
    /// At least TTL old, or never fetched.
    Stale,
}

/// Rate source, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateTier {
    Primary,
    Secondary,
}

impl RateTier {
    pub const ORDER: [RateTier; 2] = [Self::Primary, Self::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for RateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot was fresh; nothing fetched.
    Fresh,
    /// A new snapshot from this tier was stored.
    Refreshed(RateTier),
    /// Both tiers failed; the previous snapshot is untouched.
    Exhausted,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Refreshed(RateTier::Primary) => "primary",
            Self::Refreshed(RateTier::Secondary) => "secondary",
            Self::Exhausted => "exhausted",
        }
    }
}
