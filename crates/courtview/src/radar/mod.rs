//! Canonical radar space: configuration, derived geometry, and the cached
//! static court background.

mod canvas;
mod config;
mod geometry;

pub use canvas::RadarCanvas;
pub use config::{RadarConfig, RadarIoError, RadarStyle};
pub use geometry::{RadarConfigError, RadarGeometry};
