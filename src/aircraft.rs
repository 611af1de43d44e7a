use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::geodesy::{Coordinate, distance_km};

const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;

/// An aircraft annotated with its distance from the map center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftRecord {
    pub icao24: String,
    pub callsign: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Rounded to one decimal place.
    pub distance_km: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("state has no position")]
    MissingPosition,

    #[error("unexpected state layout: {0}")]
    Shape(&'static str),
}

impl AircraftRecord {
    pub fn from_state(state: &Value, center: Coordinate) -> Result<Self, StateError> {
        let state = state
            .as_array()
            .ok_or(StateError::Shape("state is not an array"))?;
        if state.len() <= LATITUDE {
            return Err(StateError::Shape("too few fields"));
        }
        let icao24 = state[ICAO24]
            .as_str()
            .ok_or(StateError::Shape("icao24 is not a string"))?;
        let callsign = match &state[CALLSIGN] {
            Value::Null => None,
            Value::String(s) => normalize_callsign(s),
            _ => return Err(StateError::Shape("callsign is not a string")),
        };
        let longitude = coordinate(&state[LONGITUDE])?;
        let latitude = coordinate(&state[LATITUDE])?;

        let distance = distance_km(center, Coordinate::new(latitude, longitude));
        Ok(AircraftRecord {
            icao24: icao24.to_string(),
            callsign,
            latitude,
            longitude,
            distance_km: round_tenth(distance),
        })
    }

    /// Callsign when known, the transponder address otherwise.
    pub fn label(&self) -> &str {
        self.callsign.as_deref().unwrap_or(&self.icao24)
    }
}

fn normalize_callsign(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn coordinate(value: &Value) -> Result<f64, StateError> {
    match value {
        Value::Null => Err(StateError::MissingPosition),
        v => v.as_f64().ok_or(StateError::Shape("position is not a number")),
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
