//! Client for the OpenSky Network `states/all` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::geodesy::BoundingBox;

pub const DEFAULT_OPENSKY_URL: &str = "https://opensky-network.org/api";

/// One state vector, normally an array positional as OpenSky sends it:
/// icao24, callsign, origin_country, time_position, last_contact, longitude, latitude,
/// baro_altitude, on_ground, velocity, true_track, vertical_rate, sensors, geo_altitude,
/// squawk, spi, position_source.
/// Kept untyped so a single malformed entry is rejected on its own, not with the whole batch.
pub type RawAircraftState = serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatesResponse {
    pub time: Option<f64>,
    pub states: Option<Vec<RawAircraftState>>,
}

/// Source of raw aircraft states.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// `None` on any failure; the failure is logged, not returned.
    async fn fetch_states(&self, bbox: Option<&BoundingBox>) -> Option<StatesResponse>;
}

pub struct OpenSkyClient {
    client: reqwest::Client,
    url: String,
}

impl OpenSkyClient {
    /// `base_url` is the API root, e.g. [`DEFAULT_OPENSKY_URL`].
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        let url = format!("{}/states/all", base_url.trim_end_matches('/'));
        OpenSkyClient { client, url }
    }

    async fn try_fetch_states(&self, bbox: Option<&BoundingBox>) -> Result<StatesResponse> {
        let params = bbox.map(BoundingBox::query_pairs).unwrap_or_default();
        info!(url = %self.url, ?params, "Requesting OpenSky states");

        self.client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(Error::http(&self.url))?
            .json()
            .await
            .map_err(Error::http(&self.url))
    }
}

#[async_trait]
impl StateSource for OpenSkyClient {
    async fn fetch_states(&self, bbox: Option<&BoundingBox>) -> Option<StatesResponse> {
        match self.try_fetch_states(bbox).await {
            Ok(resp) => Some(resp),
            Err(e) => {
                error!("Failed to fetch OpenSky states: {}", e);
                None
            }
        }
    }
}
