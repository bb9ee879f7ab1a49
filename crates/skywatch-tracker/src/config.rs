//! Tuning knobs for the tracking supervisor.

use std::time::Duration;

/// Smallest poll interval the supervisor accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration shared by the registry and the update hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Delay between the end of one lookup and the start of the next.
    pub poll_interval: Duration,
    /// Per-subscriber buffer before a slow client starts skipping updates.
    pub broadcast_capacity: usize,
}

impl TrackerConfig {
    /// Clamp values into their supported ranges.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
            broadcast_capacity: self.broadcast_capacity.max(1),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            broadcast_capacity: 256,
        }
    }
}
