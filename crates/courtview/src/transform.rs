//! Image-space to canonical radar-space perspective transform.

use courtview_core::{homography_from_4pt, order_quad, Homography};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::radar::RadarGeometry;
use crate::selection::ImagePoint;

/// How the court's long axis appears in the camera image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Long axis runs up/down the image (camera behind a baseline).
    #[default]
    Vertical,
    /// Long axis runs across the image (camera at the side line).
    Horizontal,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransformError {
    #[error("need 4 perimeter points to derive a transform, got {got}")]
    NotEnoughPoints { got: usize },
    #[error("ill-conditioned calibration: perimeter points do not span a quadrilateral")]
    IllConditioned,
}

/// Canonical destinations for the ordered source corners `[TL, TR, BR, BL]`.
///
/// In horizontal orientation the source quad is relabelled by a quarter turn:
/// image top-right lands on the canonical bottom-left and image bottom-left on
/// the canonical top-right.
pub fn destination_corners(geometry: &RadarGeometry, orientation: Orientation) -> [Point2<f32>; 4] {
    let [tl, tr, br, bl] = geometry.court_corners();
    match orientation {
        Orientation::Vertical => [tl, tr, br, bl],
        Orientation::Horizontal => [tl, bl, br, tr],
    }
}

/// Projective mapping from camera pixels to canonical radar pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveTransform {
    homography: Homography,
    orientation: Orientation,
}

impl PerspectiveTransform {
    /// Solve the exact 4-point homography from the perimeter points.
    ///
    /// Only the first four points are used; they are put into canonical
    /// corner order first, so click order does not matter.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(perimeter, geometry), fields(points = perimeter.len()))
    )]
    pub fn derive(
        perimeter: &[ImagePoint],
        orientation: Orientation,
        geometry: &RadarGeometry,
    ) -> Result<Self, TransformError> {
        let src: &[ImagePoint; 4] = perimeter
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(TransformError::NotEnoughPoints {
                got: perimeter.len(),
            })?;

        let src = order_quad(src);
        let dst = destination_corners(geometry, orientation);

        let homography = homography_from_4pt(&src, &dst)
            .filter(Homography::is_finite)
            .ok_or(TransformError::IllConditioned)?;

        log::debug!(
            "derived {} perspective transform: {:?}",
            orientation.as_str(),
            homography.to_array()
        );

        Ok(Self {
            homography,
            orientation,
        })
    }

    /// Homogeneous multiply plus perspective divide.
    #[inline]
    pub fn apply(&self, p: ImagePoint) -> Point2<f32> {
        self.homography.apply(p)
    }

    #[inline]
    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Inverse mapping, canonical radar pixels back to camera pixels.
    pub fn inverse(&self) -> Option<Homography> {
        self.homography.inverse()
    }
}
