//! Drives the pipeline on a timer and publishes each result for the display surfaces.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::image::{AircraftImage, ImageSearch};
use crate::map::{MapArtifact, compose_map};
use crate::pipeline::{Pipeline, Refresh};

/// Everything one refresh produced.
#[derive(Debug)]
pub struct Snapshot {
    pub refresh: Refresh,
    pub map: MapArtifact,
    /// Where the map was written, if writing succeeded.
    pub map_path: Option<PathBuf>,
    pub image: Option<AircraftImage>,
    /// Seconds since the unix epoch.
    pub refreshed_at: u64,
}

/// Slot holding the most recent snapshot. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct LatestResult(Arc<RwLock<Option<Arc<Snapshot>>>>);

impl LatestResult {
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }
}

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub highlight_radius_km: f64,
    pub zoom: u8,
    /// `None` keeps the map in memory only.
    pub path: Option<PathBuf>,
}

pub struct Shell {
    pipeline: Pipeline,
    map: MapSettings,
    images: Option<ImageSearch>,
    latest: LatestResult,
    busy: Mutex<()>,
}

impl Shell {
    pub fn new(pipeline: Pipeline, map: MapSettings, images: Option<ImageSearch>) -> Self {
        Shell {
            pipeline,
            map,
            images,
            latest: LatestResult::default(),
            busy: Mutex::new(()),
        }
    }

    pub fn latest(&self) -> LatestResult {
        self.latest.clone()
    }

    /// Runs one refresh and publishes it. Returns `None` without doing anything if
    /// another refresh is still in flight.
    pub async fn refresh_now(&self) -> Option<Arc<Snapshot>> {
        let Ok(_guard) = self.busy.try_lock() else {
            debug!("refresh already in flight, skipping");
            return None;
        };

        let refresh = self.pipeline.refresh().await;
        let map = compose_map(
            refresh.center,
            &refresh.aircraft,
            self.map.highlight_radius_km,
            self.map.zoom,
        );

        let map_path = self.map.path.as_ref().and_then(|path| match map.write_to(path) {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                error!("Failed to render or load map: {}", e);
                None
            }
        });

        let image = match (&self.images, refresh.nearest()) {
            (Some(search), Some(nearest)) => search.fetch_image(nearest.label()).await,
            _ => None,
        };

        let refreshed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let snapshot = Arc::new(Snapshot { refresh, map, map_path, image, refreshed_at });
        self.latest.publish(snapshot.clone());
        Some(snapshot)
    }

    /// Refreshes immediately, then every `interval`. Ticks missed while a refresh is
    /// slow are dropped rather than queued.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(?interval, "starting refresh timer");
        loop {
            ticker.tick().await;
            self.refresh_now().await;
        }
    }
}
