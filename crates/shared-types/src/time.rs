//! Time source trait for testability.

use crate::entities::TimestampMs;

/// Wall-clock source in Unix epoch milliseconds.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> TimestampMs {
        // Clock before Unix epoch - return 0 rather than panic
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_is_after_2020() {
        assert!(SystemTimeSource.now_ms() > 1_577_836_800_000);
    }
}
