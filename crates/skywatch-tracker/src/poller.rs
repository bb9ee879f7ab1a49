//! The per-key polling task.
//!
//! A [`Poller`] is spawned by the registry for each `start_tracking`
//! call. It owns a clone of its cancellation token, which it only ever
//! observes; the registry alone cancels it.

use std::time::Duration;

use skywatch_types::{AircraftUpdate, SearchType, TrackingKey};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::hub::UpdateHub;
use crate::lookup::SharedLookup;

/// Counters describing one poller's lifetime, returned when it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerReport {
    /// The key the poller tracked.
    pub key: TrackingKey,
    /// Registry generation of this poller.
    pub generation: u64,
    /// Lookups that completed (successfully or not).
    pub cycles: u64,
    /// Updates published to the hub.
    pub published: u64,
    /// Cycles where the provider had no data for the key.
    pub not_found: u64,
    /// Cycles where the lookup failed.
    pub errors: u64,
}

impl PollerReport {
    const fn new(key: TrackingKey, generation: u64) -> Self {
        Self {
            key,
            generation,
            cycles: 0,
            published: 0,
            not_found: 0,
            errors: 0,
        }
    }
}

/// A cancellable loop that looks up one aircraft at a fixed interval.
pub struct Poller {
    key: TrackingKey,
    generation: u64,
    token: CancellationToken,
    lookup: SharedLookup,
    hub: UpdateHub,
    interval: Duration,
}

impl Poller {
    /// Bind a poller to its key and cancellation token.
    pub const fn new(
        key: TrackingKey,
        generation: u64,
        token: CancellationToken,
        lookup: SharedLookup,
        hub: UpdateHub,
        interval: Duration,
    ) -> Self {
        Self {
            key,
            generation,
            token,
            lookup,
            hub,
            interval,
        }
    }

    /// Run until the token is cancelled.
    ///
    /// Each cycle looks the key up, publishes any record found, then
    /// waits one interval. Both the lookup and the wait are abandoned as
    /// soon as the token fires, and a record that arrives after
    /// cancellation is dropped rather than published.
    pub async fn run(self) -> PollerReport {
        let mut report = PollerReport::new(self.key.clone(), self.generation);
        debug!(
            registration = %self.key,
            generation = self.generation,
            interval_ms = self.interval.as_millis(),
            "poller started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                outcome = self.lookup.lookup(SearchType::Registration, self.key.as_str()) => outcome,
            };
            report.cycles = report.cycles.saturating_add(1);

            match outcome {
                Ok(Some(aircraft)) => {
                    if self.token.is_cancelled() {
                        break;
                    }
                    let receivers = self
                        .hub
                        .publish(AircraftUpdate::new(self.key.clone(), aircraft));
                    report.published = report.published.saturating_add(1);
                    trace!(registration = %self.key, receivers, "aircraft update published");
                }
                Ok(None) => {
                    report.not_found = report.not_found.saturating_add(1);
                    trace!(registration = %self.key, "no airborne data this cycle");
                }
                Err(e) => {
                    report.errors = report.errors.saturating_add(1);
                    warn!(
                        registration = %self.key,
                        generation = self.generation,
                        error = %e,
                        "lookup failed, retrying next cycle"
                    );
                }
            }

            tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!(
            registration = %report.key,
            generation = report.generation,
            cycles = report.cycles,
            published = report.published,
            not_found = report.not_found,
            errors = report.errors,
            "poller stopped"
        );
        report
    }
}
