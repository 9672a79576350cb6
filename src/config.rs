//! Configuration for the reviews cache.

use std::time::Duration;

/// Tunables for [`ReviewsCache`](crate::ReviewsCache) and its background refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsConfig {
    /// Maximum number of first-parent steps taken while resolving an owner.
    /// Walks that hit the cap resolve to the empty owner.
    pub max_ancestry_depth: usize,
    /// How often a [`RefreshWorkerThread`](crate::RefreshWorkerThread) checks
    /// the staleness flag.
    pub refresh_interval: Duration,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            max_ancestry_depth: 1024,
            refresh_interval: Duration::from_secs(5),
        }
    }
}

impl ReviewsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ancestry walk cap.
    pub fn with_max_ancestry_depth(mut self, depth: usize) -> Self {
        self.max_ancestry_depth = depth;
        self
    }

    /// Set the background refresh poll interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}
