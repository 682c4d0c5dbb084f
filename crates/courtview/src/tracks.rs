//! Uniform view over tracker output.
//!
//! Upstream trackers report boxes in different shapes; each shape gets a
//! small adapter and [`TrackedObject`] tags them so a frame's snapshot can
//! mix sources.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::selection::ImagePoint;

/// Axis-aligned box in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn from_ltrb(ltrb: [f32; 4]) -> Self {
        Self {
            left: ltrb[0],
            top: ltrb[1],
            right: ltrb[2],
            bottom: ltrb[3],
        }
    }

    /// Where the object touches the floor: horizontal center, bottom edge.
    #[inline]
    pub fn ground_point(&self) -> ImagePoint {
        Point2::new((self.left + self.right) / 2.0, self.bottom)
    }
}

/// What the projection layer needs from a track.
pub trait TrackView {
    fn track_id(&self) -> u64;
    fn is_confirmed(&self) -> bool;
    fn bounding_box(&self) -> BoundingBox;

    fn ground_point(&self) -> ImagePoint {
        self.bounding_box().ground_point()
    }
}

/// Tracker output with a confirmation flag and a left/top/right/bottom box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LtrbTrack {
    pub id: u64,
    pub confirmed: bool,
    pub ltrb: [f32; 4],
}

impl TrackView for LtrbTrack {
    fn track_id(&self) -> u64 {
        self.id
    }

    fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_ltrb(self.ltrb)
    }
}

/// Tracker output as box center plus size. Such trackers only report
/// established tracks, so these are always confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterSizeTrack {
    pub id: u64,
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl TrackView for CenterSizeTrack {
    fn track_id(&self) -> u64 {
        self.id
    }

    fn is_confirmed(&self) -> bool {
        true
    }

    fn bounding_box(&self) -> BoundingBox {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        BoundingBox {
            left: self.cx - hw,
            top: self.cy - hh,
            right: self.cx + hw,
            bottom: self.cy + hh,
        }
    }
}

/// A track from any supported upstream shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackedObject {
    Ltrb(LtrbTrack),
    CenterSize(CenterSizeTrack),
}

impl TrackView for TrackedObject {
    fn track_id(&self) -> u64 {
        match self {
            TrackedObject::Ltrb(t) => t.track_id(),
            TrackedObject::CenterSize(t) => t.track_id(),
        }
    }

    fn is_confirmed(&self) -> bool {
        match self {
            TrackedObject::Ltrb(t) => t.is_confirmed(),
            TrackedObject::CenterSize(t) => t.is_confirmed(),
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        match self {
            TrackedObject::Ltrb(t) => t.bounding_box(),
            TrackedObject::CenterSize(t) => t.bounding_box(),
        }
    }
}

impl From<LtrbTrack> for TrackedObject {
    fn from(t: LtrbTrack) -> Self {
        TrackedObject::Ltrb(t)
    }
}

impl From<CenterSizeTrack> for TrackedObject {
    fn from(t: CenterSizeTrack) -> Self {
        TrackedObject::CenterSize(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_point_is_bottom_center() {
        let b = BoundingBox::from_ltrb([100.0, 50.0, 140.0, 210.0]);
        assert_eq!(b.ground_point(), Point2::new(120.0, 210.0));
    }

    #[test]
    fn both_shapes_describe_the_same_box() {
        let a = LtrbTrack {
            id: 7,
            confirmed: true,
            ltrb: [100.0, 50.0, 140.0, 210.0],
        };
        let b = CenterSizeTrack {
            id: 7,
            cx: 120.0,
            cy: 130.0,
            width: 40.0,
            height: 160.0,
        };
        let (a, b): (TrackedObject, TrackedObject) = (a.into(), b.into());
        assert_eq!(a.bounding_box(), b.bounding_box());
        assert_eq!(a.ground_point(), b.ground_point());
        assert_eq!(a.track_id(), b.track_id());
    }

    #[test]
    fn confirmation_follows_the_source() {
        let tentative = TrackedObject::Ltrb(LtrbTrack {
            id: 1,
            confirmed: false,
            ltrb: [0.0; 4],
        });
        assert!(!tentative.is_confirmed());
        let detected = TrackedObject::CenterSize(CenterSizeTrack {
            id: 2,
            cx: 0.0,
            cy: 0.0,
            width: 1.0,
            height: 1.0,
        });
        assert!(detected.is_confirmed());
    }

    #[test]
    fn tagged_json_decodes_mixed_snapshot() {
        let raw = r#"[
            { "kind": "ltrb", "id": 3, "confirmed": true, "ltrb": [1, 2, 3, 4] },
            { "kind": "center_size", "id": 4, "cx": 10, "cy": 10, "width": 2, "height": 4 }
        ]"#;
        let tracks: Vec<TrackedObject> = serde_json::from_str(raw).expect("valid snapshot");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].ground_point(), Point2::new(10.0, 12.0));
    }
}
