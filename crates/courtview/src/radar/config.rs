//! Radar view configuration, loadable from JSON.

use courtview_core::Rgb;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum RadarIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Palette of the radar view. Defaults follow the usual indoor volleyball
/// look: blue free zone, orange court, white lines, dark net.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarStyle {
    pub free_zone: Rgb,
    pub court: Rgb,
    pub line: Rgb,
    pub net: Rgb,
    pub marker: Rgb,
    pub marker_outline: Rgb,
    pub label: Rgb,
    pub toggle_on: Rgb,
    pub toggle_off: Rgb,
    pub guidance: Rgb,
}

impl Default for RadarStyle {
    fn default() -> Self {
        Self {
            free_zone: Rgb::new(30, 144, 255),
            court: Rgb::new(255, 180, 100),
            line: Rgb::WHITE,
            net: Rgb::new(50, 50, 50),
            marker: Rgb::new(220, 20, 60),
            marker_outline: Rgb::WHITE,
            label: Rgb::BLACK,
            toggle_on: Rgb::new(0, 200, 0),
            toggle_off: Rgb::new(90, 90, 90),
            guidance: Rgb::new(255, 0, 255),
        }
    }
}

/// Real-world court dimensions, scale and line styling.
///
/// Lengths ending in `_m` are meters, `_px` are canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub court_width_m: f32,
    pub court_length_m: f32,
    /// Free-zone margin drawn around the court on every side.
    pub free_zone_m: f32,
    pub px_per_meter: f32,
    /// Distance of each attack line from the center line.
    pub attack_line_m: f32,
    /// How far the net line extends past each side line.
    pub net_overhang_px: i32,
    /// Length of the corner extension ticks.
    pub tick_len_px: i32,
    pub line_thickness_px: u32,
    pub net_thickness_px: u32,
    pub style: RadarStyle,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            court_width_m: 9.0,
            court_length_m: 18.0,
            free_zone_m: 2.0,
            px_per_meter: 40.0,
            attack_line_m: 3.0,
            net_overhang_px: 20,
            tick_len_px: 10,
            line_thickness_px: 2,
            net_thickness_px: 4,
            style: RadarStyle::default(),
        }
    }
}

impl RadarConfig {
    /// Load a JSON config from disk. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RadarIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RadarIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
