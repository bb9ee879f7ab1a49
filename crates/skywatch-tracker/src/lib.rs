//! Live-tracking supervisor for the SkyWatch relay.
//!
//! This crate owns the concurrency core of the relay:
//!
//! - **[`TrackingRegistry`]** maps each tracking key to the cancellation
//!   token of its single active poller. Start and stop are the only ways
//!   entries change.
//! - **[`Poller`]** is the per-key background task. It calls the
//!   [`AircraftLookup`] at a fixed interval and publishes every record it
//!   gets back until its token is cancelled.
//! - **[`UpdateHub`]** fans each published [`AircraftUpdate`] out to every
//!   connected subscriber via [`tokio::sync::broadcast`].
//!
//! # Architecture
//!
//! ```text
//! start(K) --> Registry --spawn--> Poller(K) --lookup--> provider
//!                 |                    |
//!              cancel              publish(K, state)
//!                 |                    v
//! stop(K)  -------+               UpdateHub --> subscriber 1..n
//! ```
//!
//! Cancelling a superseded poller never waits for it to exit, so a poller
//! that is mid-publish when it is replaced may deliver one last update.
//! Updates are tagged by key and idempotent, so consumers converge on the
//! new poller's stream within one interval.
//!
//! [`AircraftUpdate`]: skywatch_types::AircraftUpdate

pub mod config;
pub mod error;
pub mod hub;
pub mod lookup;
pub mod poller;
pub mod registry;

// Re-export primary types for convenience.
pub use config::{MIN_POLL_INTERVAL, TrackerConfig};
pub use error::LookupError;
pub use hub::{Subscription, UpdateHub};
pub use lookup::{AircraftLookup, LookupFuture, LookupResult, SharedLookup};
pub use poller::{Poller, PollerReport};
pub use registry::{TrackerStatus, TrackingRegistry, TrackingStarted};
