//! Shared type definitions for the SkyWatch relay.
//!
//! This crate is the single source of truth for the values that cross
//! crate and process boundaries: the tracking key, the aircraft record
//! returned by the data provider, and the JSON messages exchanged with
//! clients over HTTP and `WebSocket`.
//!
//! # Modules
//!
//! - [`key`] -- Validated tracking key (aircraft registration)
//! - [`aircraft`] -- Provider aircraft record, search types, tagged updates
//! - [`messages`] -- Client commands, server push events, one-shot lookup bodies

pub mod aircraft;
pub mod key;
pub mod messages;

// Re-export all public types at crate root for convenience.
pub use aircraft::{AircraftState, AircraftUpdate, SearchType};
pub use key::{KeyError, MAX_KEY_LEN, TrackingKey};
pub use messages::{ClientCommand, LookupRequest, LookupResponse, NOT_FOUND_MESSAGE, ServerEvent};
