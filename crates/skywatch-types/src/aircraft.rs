//! Aircraft records as returned by the ADS-B data provider.
//!
//! The relay treats the provider record as opaque: it is passed through
//! to clients exactly as received. The accessors on [`AircraftState`]
//! exist for logging and tests, not for reshaping the payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::key::TrackingKey;

/// Which provider index a one-shot lookup searches.
///
/// Serialized as the provider's path segment (`registration`, `hex`,
/// `callsign`, `sqk`, `type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Tail number, e.g. `N12345`.
    Registration,
    /// 24-bit ICAO transponder address in hex, e.g. `a1b2c3`.
    Hex,
    /// Flight callsign, e.g. `UAL123`.
    Callsign,
    /// Transponder squawk code, e.g. `7700`.
    #[serde(rename = "sqk", alias = "squawk")]
    Squawk,
    /// ICAO aircraft type designator, e.g. `B738`.
    Type,
}

impl SearchType {
    /// The provider URL path segment for this search type.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Hex => "hex",
            Self::Callsign => "callsign",
            Self::Squawk => "sqk",
            Self::Type => "type",
        }
    }
}

/// A single aircraft record, passed through unmodified from the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AircraftState(Map<String, Value>);

impl AircraftState {
    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Borrow the raw record.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Registration (`r`).
    pub fn registration(&self) -> Option<&str> {
        self.0.get("r").and_then(Value::as_str)
    }

    /// ICAO type designator (`t`).
    pub fn aircraft_type(&self) -> Option<&str> {
        self.0.get("t").and_then(Value::as_str)
    }

    /// Flight callsign with the provider's space padding removed.
    pub fn flight(&self) -> Option<&str> {
        self.0.get("flight").and_then(Value::as_str).map(str::trim)
    }

    /// Latitude and longitude, when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.0.get("lat").and_then(Value::as_f64)?;
        let lon = self.0.get("lon").and_then(Value::as_f64)?;
        Some((lat, lon))
    }

    /// Barometric altitude in feet. `None` when on the ground or absent.
    pub fn altitude_baro_ft(&self) -> Option<i64> {
        self.0.get("alt_baro").and_then(Value::as_i64)
    }

    /// Ground speed in knots (`gs`).
    pub fn ground_speed_kt(&self) -> Option<f64> {
        self.0.get("gs").and_then(Value::as_f64)
    }

    /// True track in degrees (`track`).
    pub fn track_deg(&self) -> Option<f64> {
        self.0.get("track").and_then(Value::as_f64)
    }
}

/// An aircraft record tagged with the tracking key that produced it.
///
/// This is the unit published on the broadcast hub by each poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftUpdate {
    /// The key of the poller that produced this record.
    pub registration: TrackingKey,
    /// The provider record, unmodified.
    #[serde(rename = "data")]
    pub aircraft: AircraftState,
    /// When the relay received the record from the provider.
    pub observed_at: DateTime<Utc>,
}

impl AircraftUpdate {
    /// Tag a record with its key, stamped with the current time.
    pub fn new(registration: TrackingKey, aircraft: AircraftState) -> Self {
        Self {
            registration,
            aircraft,
            observed_at: Utc::now(),
        }
    }
}
