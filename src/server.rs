use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::aircraft::AircraftRecord;
use crate::geodesy::Coordinate;
use crate::panel::{render_panel_svg, svg_to_png};
use crate::shell::{Shell, Snapshot};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const NOT_READY: &str = "no refresh has completed yet";

#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
    pub usvg_options: Arc<usvg::Options<'static>>,
}

#[derive(Serialize)]
struct SummaryView<'a> {
    summary: &'a str,
    center: Coordinate,
    located: bool,
    refreshed_at: u64,
    aircraft: &'a [AircraftRecord],
}

impl<'a> From<&'a Snapshot> for SummaryView<'a> {
    fn from(s: &'a Snapshot) -> Self {
        SummaryView {
            summary: &s.refresh.summary,
            center: s.refresh.center,
            located: s.refresh.located,
            refreshed_at: s.refreshed_at,
            aircraft: &s.refresh.aircraft,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/summary", get(summary))
        .route("/panel.svg", get(panel_svg))
        .route("/panel.png", get(panel_png))
        .route("/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    match state.shell.latest().get() {
        Some(snap) => Html(snap.map.html().to_string()),
        None => Html(
            "<h1>Aircraft Tracker</h1><p>Waiting for the first refresh.</p>\
             <ul><li><a href='/summary'>/summary</a></li><li><a href='/panel.svg'>/panel.svg</a></li>\
             <li><a href='/panel.png'>/panel.png</a></li></ul>"
                .to_string(),
        ),
    }
}

async fn summary(State(state): State<AppState>) -> Response {
    match state.shell.latest().get() {
        Some(snap) => Json(SummaryView::from(snap.as_ref())).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response(),
    }
}

async fn panel_svg(State(state): State<AppState>) -> Response {
    let Some(snap) = state.shell.latest().get() else {
        return (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response();
    };
    let svg = render_panel_svg(&snap.refresh, snap.image.as_ref());
    (
        [(header::CONTENT_TYPE, "image/svg+xml"), (header::CACHE_CONTROL, NO_CACHE)],
        svg,
    )
        .into_response()
}

async fn panel_png(State(state): State<AppState>) -> Response {
    let Some(snap) = state.shell.latest().get() else {
        return (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response();
    };

    let start = std::time::Instant::now();
    let svg = render_panel_svg(&snap.refresh, snap.image.as_ref());
    match svg_to_png(&svg, &state.usvg_options) {
        Ok(png) => {
            info!("Panel rendered (PNG): {:?}", start.elapsed());
            (
                [(header::CONTENT_TYPE, "image/png"), (header::CACHE_CONTROL, NO_CACHE)],
                png,
            )
                .into_response()
        }
        Err(e) => {
            error!("Error rendering PNG: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error rendering PNG: {}", e))
                .into_response()
        }
    }
}

async fn refresh(State(state): State<AppState>) -> Response {
    match state.shell.refresh_now().await {
        Some(snap) => Json(SummaryView::from(snap.as_ref())).into_response(),
        None => (StatusCode::CONFLICT, "refresh already in progress").into_response(),
    }
}
