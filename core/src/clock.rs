//! Desk clock: the single source of timestamps for commands and records.

use crate::types::Timestamp;
use chrono::{Duration, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum DeskClock {
    /// Real wall-clock time.
    System,
    /// Deterministic time: every reading returns `next`, then moves it
    /// forward by `step`. Used by tests and demo runs.
    Stepped { next: Timestamp, step: Duration },
}

impl DeskClock {
    pub fn system() -> Self {
        Self::System
    }

    pub fn stepped(start: Timestamp, step: Duration) -> Self {
        Self::Stepped { next: start, step }
    }

    /// Stepped clock starting at 2025-01-01T00:00:00Z, one second per reading.
    pub fn fixed_test() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        Self::stepped(start, Duration::seconds(1))
    }

    pub fn now(&mut self) -> Timestamp {
        match self {
            Self::System => Utc::now(),
            Self::Stepped { next, step } => {
                let current = *next;
                *next = current + *step;
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_clock_is_strictly_increasing() {
        let mut clock = DeskClock::fixed_test();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::seconds(1));
    }
}
