//! Fan-out of aircraft updates to every connected subscriber.
//!
//! Every poller publishes into one [`UpdateHub`]; every `WebSocket`
//! connection holds one [`Subscription`]. There is no per-key filtering:
//! all subscribers see all updates, tagged by key.
//!
//! Publishing never blocks. Each subscriber has a bounded buffer; if a
//! client falls behind by more than the buffer, it skips to the newest
//! updates instead of stalling the pollers.

use skywatch_types::AircraftUpdate;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

/// Broadcast point for aircraft updates.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct UpdateHub {
    tx: broadcast::Sender<AircraftUpdate>,
}

impl UpdateHub {
    /// Create a hub whose subscribers buffer up to `capacity` updates.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an update to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. Returns 0 when
    /// nobody is connected (this is not an error).
    pub fn publish(&self, update: AircraftUpdate) -> usize {
        // send only fails when there are zero receivers.
        self.tx.send(update).unwrap_or(0)
    }

    /// Register a new subscriber.
    ///
    /// The subscriber sees every update published after this call.
    /// Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            skipped: 0,
        }
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscriber's view of the hub.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<AircraftUpdate>,
    skipped: u64,
}

impl Subscription {
    /// Wait for the next update.
    ///
    /// Lagged gaps are skipped transparently. Returns `None` once the hub
    /// and all its clones have been dropped. Cancel-safe, so it can be
    /// used as a `tokio::select!` branch.
    pub async fn recv(&mut self) -> Option<AircraftUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(n)) => self.record_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered update without waiting.
    pub fn try_recv(&mut self) -> Option<AircraftUpdate> {
        loop {
            match self.rx.try_recv() {
                Ok(update) => return Some(update),
                Err(TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Total updates this subscriber has missed by falling behind.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    fn record_lag(&mut self, n: u64) {
        self.skipped = self.skipped.saturating_add(n);
        debug!(skipped = n, "subscriber lagged, skipping ahead");
    }
}
