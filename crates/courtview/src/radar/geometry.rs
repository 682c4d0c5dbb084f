use courtview_core::MAX_CANVAS_SIDE;
use nalgebra::Point2;

use super::RadarConfig;
use crate::selection::Phase;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RadarConfigError {
    #[error("court dimensions must be finite and > 0 (got {width} x {length} m)")]
    InvalidCourtSize { width: f32, length: f32 },
    #[error("free zone must be finite and >= 0 (got {0} m)")]
    InvalidFreeZone(f32),
    #[error("scale must be finite and > 0 (got {0} px/m)")]
    InvalidScale(f32),
    #[error("radar canvas {width} x {height} px exceeds {max} px per side")]
    CanvasTooLarge { width: f32, height: f32, max: usize },
}

/// Canonical radar space derived from a [`RadarConfig`].
///
/// Fixed for the lifetime of a session; every projected coordinate lives in
/// `[0, width) x [0, height)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarGeometry {
    pub court_width_m: f32,
    pub court_length_m: f32,
    pub free_zone_m: f32,
    pub px_per_meter: f32,
    /// Canvas size in pixels.
    pub width: usize,
    pub height: usize,
    /// Court offset from the canvas edges in pixels.
    pub margin_x: i32,
    pub margin_y: i32,
    /// Distance of each attack line from the center line in pixels.
    pub attack_line_px: i32,
}

impl RadarGeometry {
    pub fn from_config(cfg: &RadarConfig) -> Result<Self, RadarConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(cfg.court_width_m) || !positive(cfg.court_length_m) {
            return Err(RadarConfigError::InvalidCourtSize {
                width: cfg.court_width_m,
                length: cfg.court_length_m,
            });
        }
        if !cfg.free_zone_m.is_finite() || cfg.free_zone_m < 0.0 {
            return Err(RadarConfigError::InvalidFreeZone(cfg.free_zone_m));
        }
        if !positive(cfg.px_per_meter) {
            return Err(RadarConfigError::InvalidScale(cfg.px_per_meter));
        }

        let s = cfg.px_per_meter;
        let width = ((cfg.court_width_m + 2.0 * cfg.free_zone_m) * s).round();
        let height = ((cfg.court_length_m + 2.0 * cfg.free_zone_m) * s).round();
        let max = MAX_CANVAS_SIDE as f32;
        if !(width <= max && height <= max) {
            return Err(RadarConfigError::CanvasTooLarge {
                width,
                height,
                max: MAX_CANVAS_SIDE,
            });
        }
        let margin = (cfg.free_zone_m * s).round() as i32;

        Ok(Self {
            court_width_m: cfg.court_width_m,
            court_length_m: cfg.court_length_m,
            free_zone_m: cfg.free_zone_m,
            px_per_meter: s,
            width: width as usize,
            height: height as usize,
            margin_x: margin,
            margin_y: margin,
            attack_line_px: (cfg.attack_line_m * s).round() as i32,
        })
    }

    /// Court rectangle corners inside the margins, `[TL, TR, BR, BL]`.
    pub fn court_corners(&self) -> [Point2<f32>; 4] {
        let (w, h) = (self.width as f32, self.height as f32);
        let (mx, my) = (self.margin_x as f32, self.margin_y as f32);
        [
            Point2::new(mx, my),
            Point2::new(w - mx, my),
            Point2::new(w - mx, h - my),
            Point2::new(mx, h - my),
        ]
    }

    /// Geometric center of the canvas.
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Pixel row of the center (net) line.
    #[inline]
    pub fn center_row(&self) -> i32 {
        (self.height / 2) as i32
    }

    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f32 && p.y < self.height as f32
    }

    /// Where the `point_index`-th point of `phase` is expected to land in
    /// canonical space.
    ///
    /// Perimeter points follow `[TL, TR, BR, BL]`; line points go left end
    /// then right end. The near attack line is the one on the bottom half.
    pub fn expected_point(&self, phase: Phase, point_index: usize) -> Option<Point2<f32>> {
        if point_index >= phase.required_points() {
            return None;
        }
        if phase == Phase::Perimeter {
            return Some(self.court_corners()[point_index]);
        }

        let center = self.center_row();
        let row = match phase {
            Phase::NearLine => center.saturating_add(self.attack_line_px),
            Phase::CenterLine => center,
            Phase::FarLine => center.saturating_sub(self.attack_line_px),
            Phase::Perimeter => return None,
        };
        let x = if point_index == 0 {
            self.margin_x
        } else {
            self.width as i32 - self.margin_x
        };
        Some(Point2::new(x as f32, row as f32))
    }
}
