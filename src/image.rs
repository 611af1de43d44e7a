//! Looks up a representative picture for an aircraft through the MediaWiki page-images API.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Error, Result};

pub const DEFAULT_IMAGE_SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Debug, Clone)]
pub struct AircraftImage {
    pub source_url: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AircraftImage {
    pub fn data_uri(&self) -> String {
        let b64 = general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.content_type, b64)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    original: Option<Original>,
}

#[derive(Debug, Deserialize)]
struct Original {
    source: Option<String>,
}

pub struct ImageSearch {
    client: reqwest::Client,
    api_url: String,
}

impl ImageSearch {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        ImageSearch { client, api_url: api_url.into() }
    }

    /// `None` when nothing was found or anything on the way failed.
    pub async fn fetch_image(&self, query: &str) -> Option<AircraftImage> {
        match self.try_fetch_image(query).await {
            Ok(image) => Some(image),
            Err(e) => {
                error!("Failed to fetch image for {}: {}", query, e);
                None
            }
        }
    }

    async fn try_fetch_image(&self, query: &str) -> Result<AircraftImage> {
        let resp: QueryResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "pageimages"),
                ("pilicense", "any"),
                ("piprop", "original"),
                ("titles", query),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(Error::http(&self.api_url))?
            .json()
            .await
            .map_err(Error::http(&self.api_url))?;

        let image_url = resp
            .query
            .into_iter()
            .flat_map(|q| q.pages.into_values())
            .find_map(|page| page.original.and_then(|o| o.source))
            .ok_or_else(|| Error::NoImage(query.to_string()))?;

        info!("Fetching image for {} from {}", query, image_url);
        let resp = self
            .client
            .get(&image_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(Error::http(&image_url))?;

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_type = match content_type {
            Some(ct) if ct.starts_with("image/") => ct,
            other => {
                return Err(Error::NotAnImage { url: image_url, content_type: other });
            }
        };
        let bytes = resp.bytes().await.map_err(Error::http(&image_url))?;

        Ok(AircraftImage {
            source_url: image_url,
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
