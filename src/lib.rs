pub mod aircraft;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod image;
pub mod locate;
pub mod logging;
pub mod map;
pub mod opensky;
pub mod panel;
pub mod pipeline;
pub mod server;
pub mod shell;

#[cfg(test)]
mod test_support;

pub use aircraft::AircraftRecord;
pub use error::{Error, Result};
pub use geodesy::{BoundingBox, Coordinate, distance_km};
pub use pipeline::{Pipeline, Refresh};
