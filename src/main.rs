use std::sync::Arc;

use clap::Parser;
use tracing::info;
use usvg::fontdb;

use aircraft_tracker::config::Config;
use aircraft_tracker::image::ImageSearch;
use aircraft_tracker::locate::{FixedLocator, IpLocator, Locator};
use aircraft_tracker::logging;
use aircraft_tracker::opensky::OpenSkyClient;
use aircraft_tracker::pipeline::Pipeline;
use aircraft_tracker::server::{self, AppState};
use aircraft_tracker::shell::{MapSettings, Shell};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    logging::init();
    info!("Starting Aircraft Tracker");

    let client = config.http_client()?;
    let locator: Arc<dyn Locator> = match config.center {
        Some(center) => {
            info!(%center, "using fixed center");
            Arc::new(FixedLocator(center))
        }
        None => Arc::new(IpLocator::new(client.clone(), &config.geolocation_url)),
    };
    let source = Arc::new(OpenSkyClient::new(client.clone(), &config.opensky_url));
    let images = (!config.no_images).then(|| ImageSearch::new(client.clone(), &config.image_search_url));

    let shell = Arc::new(Shell::new(
        Pipeline::new(locator, source),
        MapSettings {
            highlight_radius_km: config.highlight_radius_km,
            zoom: config.zoom,
            path: Some(config.map_path()),
        },
        images,
    ));

    if config.once {
        if let Some(snap) = shell.refresh_now().await {
            println!("{}", snap.refresh.summary);
            if let Some(path) = &snap.map_path {
                println!("map: {}", path.display());
            }
        }
        return Ok(());
    }

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    let mut usvg_options = usvg::Options::default();
    usvg_options.fontdb = Arc::new(fontdb);

    tokio::spawn(shell.clone().run(config.refresh_interval()));

    let app = server::router(AppState {
        shell,
        usvg_options: Arc::new(usvg_options),
    });

    let addr = config.listen_addr();
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
