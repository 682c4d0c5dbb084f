//! Core geometry and raster utilities for court calibration.
//!
//! This crate is intentionally small and knows nothing about courts. It
//! provides the exact 4-point homography solver, quadrilateral corner
//! ordering, and an owned RGB raster with the handful of `imageproc` drawing
//! primitives the radar view needs.

mod canvas;
mod glyphs;
mod homography;
mod logger;
mod order;

pub use canvas::{Rgb, RgbCanvas, MAX_CANVAS_SIDE};
pub use glyphs::{text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use homography::{homography_from_4pt, Homography};
pub use order::{order_quad, order_quad_by_x, QuadCorner};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LEVEL_ENV};
