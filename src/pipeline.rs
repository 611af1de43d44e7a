//! The proximity refresh: locate, fetch, annotate with distance, sort, summarize.

use std::sync::Arc;

use tracing::{debug, info};

use crate::aircraft::AircraftRecord;
use crate::geodesy::Coordinate;
use crate::locate::Locator;
use crate::opensky::{RawAircraftState, StateSource};

pub const NO_AIRCRAFT: &str = "No aircraft detected nearby.";

/// The outcome of one refresh.
#[derive(Debug, Clone)]
pub struct Refresh {
    pub center: Coordinate,
    /// False when the center is the fallback origin.
    pub located: bool,
    pub summary: String,
    /// Nearest first.
    pub aircraft: Vec<AircraftRecord>,
}

impl Refresh {
    pub fn nearest(&self) -> Option<&AircraftRecord> {
        self.aircraft.first()
    }
}

#[derive(Clone)]
pub struct Pipeline {
    locator: Arc<dyn Locator>,
    source: Arc<dyn StateSource>,
}

impl Pipeline {
    pub fn new(locator: Arc<dyn Locator>, source: Arc<dyn StateSource>) -> Self {
        Pipeline { locator, source }
    }

    /// Never fails: unreachable services degrade to the origin and an empty list.
    pub async fn refresh(&self) -> Refresh {
        let (center, located) = match self.locator.locate().await {
            Some(c) => (c, true),
            None => {
                info!("Could not determine current location, defaulting to (0,0)");
                (Coordinate::ORIGIN, false)
            }
        };

        let states = self
            .source
            .fetch_states(None)
            .await
            .and_then(|resp| resp.states)
            .unwrap_or_default();

        let aircraft = nearest_first(center, &states);
        let summary = summarize(&aircraft);
        info!(aircraft = aircraft.len(), %summary, "refresh complete");

        Refresh { center, located, summary, aircraft }
    }
}

/// Parses every usable state and orders them by distance from `center`.
/// Equal distances keep their input order.
pub fn nearest_first(center: Coordinate, states: &[RawAircraftState]) -> Vec<AircraftRecord> {
    let mut aircraft: Vec<AircraftRecord> = states
        .iter()
        .filter_map(|state| match AircraftRecord::from_state(state, center) {
            Ok(rec) => Some(rec),
            Err(e) => {
                debug!(icao24 = ?state.get(0), "Skipping state entry: {}", e);
                None
            }
        })
        .collect();
    aircraft.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    aircraft
}

pub fn summarize(aircraft: &[AircraftRecord]) -> String {
    match aircraft.first() {
        Some(n) => format!("{} — {:.1} km", n.label(), n.distance_km),
        None => NO_AIRCRAFT.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geodesy::BoundingBox;
    use crate::opensky::{OpenSkyClient, StatesResponse};
    use crate::test_support::spawn_server;
    use axum::{Json, Router, routing::get};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    pub struct StubLocator(pub Option<Coordinate>);

    #[async_trait]
    impl Locator for StubLocator {
        async fn locate(&self) -> Option<Coordinate> {
            self.0
        }
    }

    pub struct StubSource(pub Option<StatesResponse>);

    #[async_trait]
    impl StateSource for StubSource {
        async fn fetch_states(&self, _bbox: Option<&BoundingBox>) -> Option<StatesResponse> {
            self.0.clone()
        }
    }

    pub fn states(v: Value) -> StatesResponse {
        serde_json::from_value(json!({ "time": 0, "states": v })).unwrap()
    }

    pub fn pipeline(center: Option<Coordinate>, resp: Option<StatesResponse>) -> Pipeline {
        Pipeline::new(Arc::new(StubLocator(center)), Arc::new(StubSource(resp)))
    }

    fn row(icao24: &str, callsign: Value, lon: Value, lat: Value) -> Value {
        json!([icao24, callsign, "Country", null, null, lon, lat, null, false,
               null, null, null, null, null, null, null, null])
    }

    #[tokio::test]
    async fn test_single_aircraft() {
        let resp = states(json!([row("abc123", json!("CALL123"), json!(2.1), json!(48.1))]));
        let out = pipeline(Some(Coordinate::new(48.0, 2.0)), Some(resp)).refresh().await;

        assert!(out.located);
        assert_eq!(out.aircraft.len(), 1);
        assert!(out.aircraft[0].distance_km > 0.0);
        assert!(out.summary.contains("CALL123"));
        assert!(out.summary.ends_with(" km"));
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let out = pipeline(Some(Coordinate::new(48.0, 2.0)), None).refresh().await;
        assert!(out.aircraft.is_empty());
        assert_eq!(out.summary, NO_AIRCRAFT);
    }

    #[tokio::test]
    async fn test_nothing_reachable() {
        let out = pipeline(None, None).refresh().await;
        assert_eq!(out.center, Coordinate::ORIGIN);
        assert!(!out.located);
        assert!(out.aircraft.is_empty());
        assert_eq!(out.summary, NO_AIRCRAFT);
    }

    #[tokio::test]
    async fn test_null_states() {
        let out = pipeline(None, Some(states(Value::Null))).refresh().await;
        assert!(out.aircraft.is_empty());
        assert_eq!(out.summary, NO_AIRCRAFT);
    }

    #[tokio::test]
    async fn test_null_latitude_is_dropped() {
        let resp = states(json!([
            row("aaa111", json!("FIRST"), json!(2.1), Value::Null),
            row("bbb222", json!("SECOND"), json!(2.2), json!(48.2)),
            json!(["ccc333"]),
        ]));
        let out = pipeline(Some(Coordinate::new(48.0, 2.0)), Some(resp)).refresh().await;
        assert_eq!(out.aircraft.len(), 1);
        assert_eq!(out.aircraft[0].icao24, "bbb222");
    }

    #[tokio::test]
    async fn test_malformed_entries_from_opensky_are_skipped_individually() {
        let base = spawn_server(|_| {
            Router::new().route(
                "/states/all",
                get(|| async {
                    Json(json!({
                        "time": 1.7e9,
                        "states": [
                            ["abc123", "CALL123", "Country", null, null, 2.1, 48.1, null, false,
                             null, null, null, null, null, null, null, null],
                            5,
                            null,
                            {"icao24": "def456"}
                        ]
                    }))
                }),
            )
        })
        .await;
        let pipeline = Pipeline::new(
            Arc::new(StubLocator(Some(Coordinate::new(48.0, 2.0)))),
            Arc::new(OpenSkyClient::new(reqwest::Client::new(), &base)),
        );

        let out = pipeline.refresh().await;
        assert_eq!(out.aircraft.len(), 1);
        assert_eq!(out.aircraft[0].icao24, "abc123");
        assert!(out.summary.starts_with("CALL123 — "));
    }

    #[test]
    fn test_sorted_by_distance() {
        let center = Coordinate::new(48.0, 2.0);
        let raw = states(json!([
            row("far", json!("FAR"), json!(4.0), json!(50.0)),
            row("near", json!("NEAR"), json!(2.05), json!(48.05)),
            row("mid", json!("MID"), json!(3.0), json!(49.0)),
        ]))
        .states
        .unwrap();
        let out = nearest_first(center, &raw);
        let order: Vec<_> = out.iter().map(|a| a.icao24.as_str()).collect();
        assert_eq!(order, ["near", "mid", "far"]);
        assert_eq!(summarize(&out), format!("NEAR — {:.1} km", out[0].distance_km));
    }

    #[test]
    fn test_equal_distances_keep_input_order() {
        let center = Coordinate::new(48.0, 2.0);
        let raw = states(json!([
            row("x2", json!("SECOND"), json!(3.0), json!(49.0)),
            row("x1", json!("FIRST"), json!(2.5), json!(48.5)),
            row("x3", json!("THIRD"), json!(3.0), json!(49.0)),
            row("x4", json!("FOURTH"), json!(3.0), json!(49.0)),
        ]))
        .states
        .unwrap();
        let out = nearest_first(center, &raw);
        let order: Vec<_> = out.iter().map(|a| a.icao24.as_str()).collect();
        assert_eq!(order, ["x1", "x2", "x3", "x4"]);
    }

    #[test]
    fn test_summary_falls_back_to_icao24() {
        let center = Coordinate::new(48.0, 2.0);
        let raw = states(json!([row("4ca7b3", json!("   "), json!(2.0), json!(48.0))]))
            .states
            .unwrap();
        let out = nearest_first(center, &raw);
        assert_eq!(summarize(&out), "4ca7b3 — 0.0 km");
    }
}
