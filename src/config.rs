use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::geodesy::Coordinate;
use crate::image::DEFAULT_IMAGE_SEARCH_URL;
use crate::locate::DEFAULT_GEOLOCATION_URL;
use crate::map::MAP_FILE_NAME;
use crate::opensky::DEFAULT_OPENSKY_URL;

const USER_AGENT: &str = concat!("aircraft-tracker/", env!("CARGO_PKG_VERSION"));

/// Shows the aircraft nearest to you on a map.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "OPENSKY_URL", default_value = DEFAULT_OPENSKY_URL)]
    pub opensky_url: String,

    #[arg(long, env = "GEOLOCATION_URL", default_value = DEFAULT_GEOLOCATION_URL)]
    pub geolocation_url: String,

    #[arg(long, env = "IMAGE_SEARCH_URL", default_value = DEFAULT_IMAGE_SEARCH_URL)]
    pub image_search_url: String,

    /// Use this "lat,lon" instead of looking up the host's IP location.
    #[arg(long)]
    pub center: Option<Coordinate>,

    #[arg(long, default_value_t = 30)]
    pub refresh_interval_secs: u64,

    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,

    #[arg(long, default_value_t = 50.0)]
    pub highlight_radius_km: f64,

    #[arg(long, default_value_t = 8)]
    pub zoom: u8,

    /// Where to write the map; defaults to aircraft_map.html in the temp directory.
    #[arg(long)]
    pub map_path: Option<PathBuf>,

    /// Do not look up aircraft pictures.
    #[arg(long)]
    pub no_images: bool,

    /// Refresh once, print the summary and exit without serving.
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn map_path(&self) -> PathBuf {
        self.map_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(MAP_FILE_NAME))
    }

    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
    }
}
