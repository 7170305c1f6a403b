//! Sliding-window restart statistics used by supervision strategies.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// A sliding-window counter of failure timestamps for one supervised child.
///
/// `ExponentialBackoff` consults `consecutive_failures()` to compute the
/// next restart delay; all strategies consult `failures_within(window)` to
/// decide whether a restart-rate limit has been exceeded.
#[derive(Debug, Clone, Default)]
pub struct RestartStatistics {
    failures: VecDeque<DateTime<Utc>>,
}

impl RestartStatistics {
    /// An empty statistics window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure at the current time.
    pub fn record_failure(&mut self) {
        self.failures.push_back(Utc::now());
    }

    /// Number of failures recorded within the trailing `window`.
    pub fn failures_within(&self, window: Duration) -> usize {
        let cutoff = Utc::now() - chrono::Duration::from_std(window).unwrap_or_default();
        self.failures.iter().filter(|t| **t >= cutoff).count()
    }

    /// Number of *consecutive* failures, i.e. failures with no idle gap of
    /// `idle_reset` or more between them. Used by `ExponentialBackoff` to
    /// compute `2^min(n, cap)` and to decide when to reset its counter
    /// after a sufficiently long idle period.
    pub fn consecutive_failures(&self, idle_reset: Duration) -> u32 {
        let idle_reset = chrono::Duration::from_std(idle_reset).unwrap_or_default();
        let mut count = 0u32;
        let mut prev: Option<DateTime<Utc>> = None;
        for &ts in self.failures.iter().rev() {
            match prev {
                Some(p) if p - ts > idle_reset => break,
                _ => {}
            }
            count += 1;
            prev = Some(ts);
        }
        count
    }

    /// Discard all recorded failures (used after an idle-window reset or a
    /// deliberate strategy reset).
    pub fn clear(&mut self) {
        self.failures.clear();
    }

    /// Total failures ever recorded in this window (unbounded history is
    /// not retained past what `prune` keeps).
    pub fn total(&self) -> usize {
        self.failures.len()
    }

    /// Drop entries older than `window` to bound memory for long-lived
    /// supervisors.
    pub fn prune(&mut self, window: Duration) {
        let cutoff = Utc::now() - chrono::Duration::from_std(window).unwrap_or_default();
        while let Some(front) = self.failures.front() {
            if *front < cutoff {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }
}
