//! The seam between the tracker and the aircraft data provider.
//!
//! Pollers hold the client as `Arc<dyn AircraftLookup>`, so the method
//! returns a boxed future rather than being an `async fn` (which would
//! not be dyn-compatible).

use std::sync::Arc;

use futures::future::BoxFuture;
use skywatch_types::{AircraftState, SearchType};

use crate::error::LookupError;

/// Outcome of one lookup: a record, `None` when the provider has no
/// current data, or a transient error.
pub type LookupResult = Result<Option<AircraftState>, LookupError>;

/// Boxed future returned by [`AircraftLookup::lookup`].
pub type LookupFuture<'a> = BoxFuture<'a, LookupResult>;

/// Shared handle to a lookup client.
pub type SharedLookup = Arc<dyn AircraftLookup>;

/// A source of live aircraft state.
pub trait AircraftLookup: Send + Sync {
    /// Search the provider for the first aircraft matching `value`.
    fn lookup<'a>(&'a self, search_type: SearchType, value: &'a str) -> LookupFuture<'a>;
}
