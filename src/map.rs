//! Leaflet map document with one marker per aircraft and a highlight circle around the center.

use std::path::Path;

use tracing::{debug, warn};

use crate::aircraft::AircraftRecord;
use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

pub const MAP_FILE_NAME: &str = "aircraft_map.html";

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Clone)]
pub struct MapArtifact {
    html: String,
    markers: usize,
    highlight: bool,
}

impl MapArtifact {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn marker_count(&self) -> usize {
        self.markers
    }

    pub fn has_highlight(&self) -> bool {
        self.highlight
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.html).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "wrote map");
        Ok(())
    }
}

pub fn compose_map(
    center: Coordinate,
    aircraft: &[AircraftRecord],
    highlight_radius_km: f64,
    zoom: u8,
) -> MapArtifact {
    let mut layers = String::new();

    let mut markers = 0;
    for ac in aircraft {
        let popup = format!("{}<br>{:.1} km", escape_html(ac.label()), ac.distance_km);
        layers.push_str(&format!(
            "L.circleMarker([{}, {}], {{radius: 5, color: 'blue'}}).bindPopup({}).addTo(map);\n",
            ac.latitude,
            ac.longitude,
            js_string(&popup)
        ));
        markers += 1;
    }

    let highlight = match highlight_circle(center, highlight_radius_km) {
        Ok(circle) => {
            layers.push_str(&circle);
            true
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>Aircraft near {center}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <link rel="stylesheet" href="{css}" />
  <script src="{js}"></script>
  <style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
  <div id="map"></div>
  <script>
var map = L.map('map').setView([{lat}, {lon}], {zoom});
L.tileLayer({tiles}, {{maxZoom: 19, attribution: {attribution}}}).addTo(map);
{layers}  </script>
</body>
</html>
"#,
        center = center,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        lat = center.lat,
        lon = center.lon,
        zoom = zoom,
        tiles = js_string(TILE_URL),
        attribution = js_string(ATTRIBUTION),
        layers = layers,
    );

    MapArtifact { html, markers, highlight }
}

fn highlight_circle(center: Coordinate, radius_km: f64) -> Result<String> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(Error::Overlay(format!("invalid radius {radius_km} km")));
    }
    Ok(format!(
        "L.circle([{}, {}], {{radius: {}, color: 'red', fill: false}}).addTo(map);\n",
        center.lat,
        center.lon,
        radius_km * 1000.0
    ))
}

/// A JavaScript string literal that is also safe inside a `<script>` element.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao24: &str, callsign: Option<&str>, lat: f64, lon: f64, d: f64) -> AircraftRecord {
        AircraftRecord {
            icao24: icao24.to_string(),
            callsign: callsign.map(str::to_string),
            latitude: lat,
            longitude: lon,
            distance_km: d,
        }
    }

    #[test]
    fn test_compose_map_with_markers() {
        let aircraft = vec![
            record("abc123", Some("CALL123"), 48.1, 2.1, 10.0),
            record("def456", None, 47.9, 1.9, 20.0),
        ];
        let map = compose_map(Coordinate::new(48.0, 2.0), &aircraft, 50.0, 6);

        assert_eq!(map.marker_count(), 2);
        assert!(map.has_highlight());
        let html = map.html();
        assert!(html.contains("setView([48, 2], 6)"));
        assert!(html.contains("CALL123<br>10.0 km"));
        assert!(html.contains("def456<br>20.0 km"));
        assert!(html.contains("L.circleMarker([48.1, 2.1]"));
        assert!(html.contains("L.circle([48, 2], {radius: 50000"));
        assert_eq!(html.lines().filter(|l| l.starts_with("L.circleMarker(")).count(), 2);
    }

    #[test]
    fn test_empty_map_still_has_highlight() {
        let map = compose_map(Coordinate::ORIGIN, &[], 50.0, 8);
        assert_eq!(map.marker_count(), 0);
        assert!(map.has_highlight());
        assert!(!map.html().contains("L.circleMarker"));
        assert!(map.html().contains("L.circle([0, 0]"));
    }

    #[test]
    fn test_bad_radius_keeps_markers() {
        let aircraft = vec![record("abc123", Some("CALL123"), 48.1, 2.1, 10.0)];
        for radius in [f64::NAN, f64::INFINITY, -1.0] {
            let map = compose_map(Coordinate::new(48.0, 2.0), &aircraft, radius, 8);
            assert!(!map.has_highlight());
            assert_eq!(map.marker_count(), 1);
            assert!(map.html().contains("CALL123"));
            assert!(!map.html().contains("L.circle(["));
        }
    }

    #[test]
    fn test_labels_are_escaped() {
        let aircraft = vec![record("x", Some("</script><b>"), 1.0, 1.0, 1.0)];
        let map = compose_map(Coordinate::ORIGIN, &aircraft, 50.0, 8);
        assert!(!map.html().contains("</script><b>"));
        assert!(map.html().contains("&lt;/script&gt;&lt;b&gt;"));
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MAP_FILE_NAME);
        let map = compose_map(Coordinate::new(48.0, 2.0), &[], 50.0, 8);
        map.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), map.html());

        let missing = dir.path().join("no/such/dir/map.html");
        assert!(matches!(map.write_to(&missing), Err(Error::Io { .. })));
    }
}
