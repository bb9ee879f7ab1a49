//! Tracking registry: one cancellable poller per tracking key.
//!
//! The registry is the only owner of poller cancellation tokens. All
//! mutation happens under a single async mutex, so the
//! check-existing / cancel-old / install-new sequence of
//! [`TrackingRegistry::start_tracking`] is atomic with respect to any
//! other start or stop for the same key.
//!
//! Every poller token is a child of one root token, which lets
//! [`TrackingRegistry::shutdown`] stop everything with a single cancel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use skywatch_types::TrackingKey;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::hub::UpdateHub;
use crate::lookup::SharedLookup;
use crate::poller::{Poller, PollerReport};

/// Result of a [`TrackingRegistry::start_tracking`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingStarted {
    /// The key now being tracked.
    pub key: TrackingKey,
    /// Generation number of the newly spawned poller.
    pub generation: u64,
    /// Whether an existing poller for the key was cancelled.
    pub replaced: bool,
}

/// Observability snapshot of one active tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerStatus {
    /// The tracked key.
    pub registration: TrackingKey,
    /// Generation number of the running poller.
    pub generation: u64,
    /// When the running poller was spawned.
    pub started_at: DateTime<Utc>,
}

struct ActiveTracker {
    token: CancellationToken,
    generation: u64,
    started_at: DateTime<Utc>,
    task: JoinHandle<PollerReport>,
}

#[derive(Default)]
struct RegistryInner {
    trackers: HashMap<TrackingKey, ActiveTracker>,
    /// Cancelled pollers that may not have exited yet.
    retiring: Vec<JoinHandle<PollerReport>>,
    next_generation: u64,
}

impl RegistryInner {
    fn prune(&mut self) {
        self.trackers.retain(|key, tracker| {
            let alive = !tracker.task.is_finished();
            if !alive {
                debug!(
                    registration = %key,
                    generation = tracker.generation,
                    "pruned finished tracker"
                );
            }
            alive
        });
        self.retiring.retain(|task| !task.is_finished());
    }

    fn retire(&mut self, tracker: ActiveTracker) -> u64 {
        tracker.token.cancel();
        self.retiring.push(tracker.task);
        tracker.generation
    }
}

/// Supervisor mapping tracking keys to their active pollers.
pub struct TrackingRegistry {
    lookup: SharedLookup,
    hub: UpdateHub,
    poll_interval: Duration,
    root: CancellationToken,
    inner: Mutex<RegistryInner>,
}

impl TrackingRegistry {
    /// Create an empty registry whose pollers use `lookup` and publish to `hub`.
    pub fn new(lookup: SharedLookup, hub: UpdateHub, config: &TrackerConfig) -> Self {
        Self {
            lookup,
            hub,
            poll_interval: config.poll_interval,
            root: CancellationToken::new(),
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// The hub pollers publish into.
    pub const fn hub(&self) -> &UpdateHub {
        &self.hub
    }

    /// Start, or restart, tracking `key`.
    ///
    /// An existing poller for the key is cancelled but not awaited; it
    /// stops within one poll interval. A fresh poller is always spawned.
    pub async fn start_tracking(&self, key: TrackingKey) -> TrackingStarted {
        let mut inner = self.inner.lock().await;
        inner.prune();

        let replaced = inner
            .trackers
            .remove(&key)
            .map(|old| inner.retire(old));

        inner.next_generation = inner.next_generation.saturating_add(1);
        let generation = inner.next_generation;

        let token = self.root.child_token();
        let poller = Poller::new(
            key.clone(),
            generation,
            token.clone(),
            Arc::clone(&self.lookup),
            self.hub.clone(),
            self.poll_interval,
        );
        let task = tokio::spawn(poller.run());

        inner.trackers.insert(
            key.clone(),
            ActiveTracker {
                token,
                generation,
                started_at: Utc::now(),
                task,
            },
        );

        info!(
            registration = %key,
            generation,
            replaced_generation = replaced,
            active = inner.trackers.len(),
            "tracking started"
        );

        TrackingStarted {
            key,
            generation,
            replaced: replaced.is_some(),
        }
    }

    /// Stop tracking `key`.
    ///
    /// Returns whether a poller was running. Stopping an unknown key is a
    /// no-op.
    pub async fn stop_tracking(&self, key: &TrackingKey) -> bool {
        let mut inner = self.inner.lock().await;
        inner.prune();

        let Some(tracker) = inner.trackers.remove(key) else {
            debug!(registration = %key, "stop requested for untracked key");
            return false;
        };
        let generation = inner.retire(tracker);

        info!(
            registration = %key,
            generation,
            active = inner.trackers.len(),
            "tracking stopped"
        );
        true
    }

    /// Whether a live poller exists for `key`.
    pub async fn is_tracking(&self, key: &TrackingKey) -> bool {
        let inner = self.inner.lock().await;
        inner
            .trackers
            .get(key)
            .is_some_and(|tracker| !tracker.task.is_finished())
    }

    /// Number of live pollers.
    pub async fn active_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.prune();
        inner.trackers.len()
    }

    /// Snapshot of all live pollers, sorted by key.
    pub async fn status(&self) -> Vec<TrackerStatus> {
        let mut inner = self.inner.lock().await;
        inner.prune();

        let mut status: Vec<TrackerStatus> = inner
            .trackers
            .iter()
            .map(|(key, tracker)| TrackerStatus {
                registration: key.clone(),
                generation: tracker.generation,
                started_at: tracker.started_at,
            })
            .collect();
        status.sort_by(|a, b| a.registration.cmp(&b.registration));
        status
    }

    /// Cancel every poller and wait for all of them to exit.
    ///
    /// Pollers spawned after shutdown start already cancelled and exit
    /// immediately.
    pub async fn shutdown(&self) -> Vec<PollerReport> {
        self.root.cancel();

        let tasks: Vec<JoinHandle<PollerReport>> = {
            let mut inner = self.inner.lock().await;
            let mut tasks: Vec<JoinHandle<PollerReport>> = inner
                .trackers
                .drain()
                .map(|(_, tracker)| tracker.task)
                .collect();
            tasks.append(&mut inner.retiring);
            tasks
        };

        let mut reports = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "poller task ended abnormally"),
            }
        }

        info!(stopped = reports.len(), "tracking registry shut down");
        reports
    }
}
