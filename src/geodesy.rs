use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use geo::{Distance, Geodesic, Point};
use serde::Serialize;

/// A WGS84 position in decimal degrees. Values are not range checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    fn point(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lon\", got {s:?}"))?;
        let lat = lat.trim().parse::<f64>().map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lon = lon.trim().parse::<f64>().map_err(|e| format!("bad longitude {lon:?}: {e}"))?;
        Ok(Coordinate { lat, lon })
    }
}

/// Optional query bounds for the states endpoint. Missing bounds are left out of the request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub lamin: Option<f64>,
    pub lamax: Option<f64>,
    pub lomin: Option<f64>,
    pub lomax: Option<f64>,
}

impl BoundingBox {
    pub fn query_pairs(&self) -> Vec<(&'static str, f64)> {
        [
            ("lamin", self.lamin),
            ("lamax", self.lamax),
            ("lomin", self.lomin),
            ("lomax", self.lomax),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// Geodesic distance on the WGS84 ellipsoid, in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    // solve in a fixed argument order so that swapping a and b is bit-identical
    let (from, to) = match a.lat.total_cmp(&b.lat).then(a.lon.total_cmp(&b.lon)) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    Geodesic.distance(from.point(), to.point()) / 1000.0
}
