//! Shared application state for the relay server.
//!
//! [`AppState`] owns the tracking registry (and through it the update
//! hub), the lookup client used for one-shot searches, the session
//! store, and the server-wide shutdown token.

use std::time::Duration;

use axum::http::HeaderMap;
use skywatch_tracker::{SharedLookup, TrackerConfig, TrackingRegistry, UpdateHub};
use tokio_util::sync::CancellationToken;

use crate::auth::{self, SessionStore, SharedPassword};
use crate::pages::{PageError, Pages};

/// Login settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// The shared password every user logs in with.
    pub password: SharedPassword,
    /// How long a login stays valid.
    pub session_ttl: Duration,
    /// Whether the session cookie is marked `Secure`.
    pub secure_cookie: bool,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
pub struct AppState {
    /// Per-key pollers and their fan-out hub.
    pub registry: TrackingRegistry,
    /// Client for one-shot lookups (the same one pollers use).
    pub lookup: SharedLookup,
    /// Live login sessions.
    pub sessions: SessionStore,
    /// Login settings.
    pub auth: AuthSettings,
    /// Rendered HTML pages.
    pub pages: Pages,
    /// Delay between lookups for each tracked key.
    pub poll_interval: Duration,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the application state around a lookup client.
    pub fn new(
        lookup: SharedLookup,
        auth: AuthSettings,
        tracker: &TrackerConfig,
    ) -> Result<Self, PageError> {
        let tracker = tracker.clone().normalized();
        let hub = UpdateHub::new(tracker.broadcast_capacity);
        Ok(Self {
            registry: TrackingRegistry::new(lookup.clone(), hub, &tracker),
            lookup,
            sessions: SessionStore::new(auth.session_ttl),
            auth,
            pages: Pages::new()?,
            poll_interval: tracker.poll_interval,
            shutdown: CancellationToken::new(),
        })
    }

    /// Whether the request headers carry a live session cookie.
    pub async fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        match auth::session_id(headers) {
            Some(session) => self.sessions.is_active(&session).await,
            None => false,
        }
    }

    /// The hub every poller publishes into.
    pub const fn hub(&self) -> &UpdateHub {
        self.registry.hub()
    }
}
