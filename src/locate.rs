use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json/";

/// Resolves the position the map should be centered on.
#[async_trait]
pub trait Locator: Send + Sync {
    /// `None` means the location is unknown; callers pick their own fallback.
    async fn locate(&self) -> Option<Coordinate>;
}

/// Looks up the public IP of this host with an ip-api style service.
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        IpLocator { client, url: url.into() }
    }

    async fn try_locate(&self) -> Result<Coordinate> {
        let resp: IpApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(Error::http(&self.url))?
            .json()
            .await
            .map_err(Error::http(&self.url))?;

        if resp.status != "success" {
            let reason = resp.message.unwrap_or(resp.status);
            return Err(Error::Geolocation(reason));
        }
        match (resp.lat, resp.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(Error::Geolocation("response has no coordinates".to_string())),
        }
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Option<Coordinate> {
        match self.try_locate().await {
            Ok(center) => {
                info!(lat = center.lat, lon = center.lon, "detected location");
                Some(center)
            }
            Err(e) => {
                error!("Geolocation failed: {}", e);
                None
            }
        }
    }
}

/// Always reports the same position, for hosts where IP lookup is blocked or misleading.
pub struct FixedLocator(pub Coordinate);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Option<Coordinate> {
        Some(self.0)
    }
}
