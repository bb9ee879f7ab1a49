//! ADS-B provider client for the SkyWatch relay.
//!
//! Implements [`AircraftLookup`](skywatch_tracker::AircraftLookup) over
//! the provider's REST API:
//!
//! ```text
//! GET {scheme}://{host}/v2/{search_type}/{value}/
//! x-rapidapi-key:  <api key>
//! x-rapidapi-host: <host>
//! ```
//!
//! The response carries matching aircraft in an `ac` array. The first
//! entry is the answer; an absent or empty array means the aircraft is
//! not currently airborne or transmitting.

mod client;

pub use client::{AdsbClient, ProviderConfig, ProviderError, extract_first_aircraft};
