//! JSON messages exchanged with clients.
//!
//! `WebSocket` frames in both directions are internally tagged by a
//! `type` field. The one-shot lookup endpoint uses plain request and
//! response bodies with the camel-case field names the browser client
//! already sends.

use serde::{Deserialize, Serialize};

use crate::aircraft::{AircraftState, AircraftUpdate, SearchType};
use crate::key::TrackingKey;

/// Message returned when the provider has no current data for a search.
pub const NOT_FOUND_MESSAGE: &str =
    "No aircraft found. The aircraft may not be airborne or transmitting data at this time.";

/// A command sent by a client over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Begin (or restart) continuous tracking of an aircraft.
    StartTracking {
        /// The aircraft registration to poll.
        registration: TrackingKey,
    },
    /// Stop continuous tracking of an aircraft.
    StopTracking {
        /// The aircraft registration to stop polling.
        registration: TrackingKey,
    },
}

/// An event pushed by the server over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A poller produced a fresh record. Broadcast to every client.
    AircraftUpdate(AircraftUpdate),

    /// Acknowledges a `start_tracking` command to the requesting client.
    TrackingStarted {
        /// The key now being tracked.
        registration: TrackingKey,
        /// Monotonic poller generation assigned by the registry.
        generation: u64,
        /// Whether a previous poller for the key was cancelled.
        replaced: bool,
    },

    /// Acknowledges a `stop_tracking` command to the requesting client.
    TrackingStopped {
        /// The key no longer being tracked.
        registration: TrackingKey,
        /// Whether a poller was actually running for the key.
        was_active: bool,
    },

    /// A command from this client could not be processed.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// Body of `POST /api/aircraft`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Which provider index to search.
    pub search_type: SearchType,
    /// The identifier to search for.
    pub search_value: String,
}

/// Response body of `POST /api/aircraft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Whether an aircraft record was found.
    pub success: bool,
    /// The provider record, when found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AircraftState>,
    /// Explanation when no record is returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LookupResponse {
    /// A successful lookup carrying the provider record.
    pub const fn found(data: AircraftState) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// The provider had no current data.
    pub fn not_found() -> Self {
        Self::failure(NOT_FOUND_MESSAGE)
    }

    /// A failed lookup with an explanatory message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}
