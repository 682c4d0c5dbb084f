//! Per-frame mapping of image points into final radar display coordinates.
//!
//! The pipeline is: perspective transform, canvas bounds check, zone filter,
//! optional 180° side inversion, optional left/right mirror. Points exactly
//! on the center line belong to neither half: they pass the `All` zone and
//! are rejected by `Left` and `Right`.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::radar::RadarGeometry;
use crate::selection::ImagePoint;
use crate::store::Settings;
use crate::transform::{Orientation, PerspectiveTransform, TransformError};

/// Which half of the court the operator wants to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    #[default]
    All,
    Left,
    Right,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::All => "all",
            Zone::Left => "left",
            Zone::Right => "right",
        }
    }

    /// `All -> Left -> Right -> All`.
    pub fn cycled(self) -> Self {
        match self {
            Zone::All => Zone::Left,
            Zone::Left => Zone::Right,
            Zone::Right => Zone::All,
        }
    }
}

const KEY_ORIENTATION: &str = "orientation";
const KEY_ZONE: &str = "zone";
const KEY_INVERT: &str = "invert_sides";
const KEY_MIRROR: &str = "mirror_left_right";

/// Operator-toggleable display settings. Owned by the caller and passed by
/// reference into every projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFilterState {
    pub orientation: Orientation,
    pub zone: Zone,
    pub invert_sides: bool,
    pub mirror_left_right: bool,
}

impl ZoneFilterState {
    /// Whether the active zone keeps canonical point `p`.
    ///
    /// Vertical views split the canvas by x. Horizontal views split it by y:
    /// screen-left is canonical top, screen-right is canonical bottom.
    pub fn zone_admits(&self, p: Point2<f32>, geometry: &RadarGeometry) -> bool {
        let c = geometry.center();
        let (v, mid) = match self.orientation {
            Orientation::Vertical => (p.x, c.x),
            Orientation::Horizontal => (p.y, c.y),
        };
        match self.zone {
            Zone::All => true,
            Zone::Left => v < mid,
            Zone::Right => v > mid,
        }
    }

    /// Read settings written by [`ZoneFilterState::write_settings`].
    /// Missing or ill-typed entries keep their defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut out = Self::default();
        if let Some(o) = settings
            .get(KEY_ORIENTATION)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
        {
            out.orientation = o;
        }
        if let Some(z) = settings
            .get(KEY_ZONE)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
        {
            out.zone = z;
        }
        if let Some(b) = settings.get(KEY_INVERT).and_then(Value::as_bool) {
            out.invert_sides = b;
        }
        if let Some(b) = settings.get(KEY_MIRROR).and_then(Value::as_bool) {
            out.mirror_left_right = b;
        }
        out
    }

    /// Store this state in `settings`, leaving unrelated keys untouched.
    pub fn write_settings(&self, settings: &mut Settings) {
        settings.insert(
            KEY_ORIENTATION.to_owned(),
            Value::from(self.orientation.as_str()),
        );
        settings.insert(KEY_ZONE.to_owned(), Value::from(self.zone.as_str()));
        settings.insert(KEY_INVERT.to_owned(), Value::from(self.invert_sides));
        settings.insert(KEY_MIRROR.to_owned(), Value::from(self.mirror_left_right));
    }
}

/// Rotate a canonical point 180° about the canvas center.
#[inline]
pub fn invert_point(p: Point2<f32>, geometry: &RadarGeometry) -> Point2<f32> {
    Point2::new(
        geometry.width as f32 - p.x,
        geometry.height as f32 - p.y,
    )
}

/// Reflect a canonical point about the vertical center axis.
#[inline]
pub fn mirror_point(p: Point2<f32>, geometry: &RadarGeometry) -> Point2<f32> {
    Point2::new(geometry.width as f32 - p.x, p.y)
}

/// Outcome of projecting one image point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Final display coordinate, or the raw canonical point when excluded.
    pub point: Point2<f32>,
    pub included: bool,
}

/// Map `p` through `transform` and the zone/invert/mirror adjustments.
///
/// Without a transform the pipeline fails open: the point comes back
/// unmodified and included, so inclusion-only callers keep working before a
/// calibration exists.
pub fn project(
    p: ImagePoint,
    transform: Option<&PerspectiveTransform>,
    geometry: &RadarGeometry,
    state: &ZoneFilterState,
) -> Projection {
    let Some(t) = transform else {
        return Projection {
            point: p,
            included: true,
        };
    };

    let raw = t.apply(p);
    if !geometry.contains(raw) || !state.zone_admits(raw, geometry) {
        return Projection {
            point: raw,
            included: false,
        };
    }

    let mut q = raw;
    if state.invert_sides {
        q = invert_point(q, geometry);
    }
    if state.mirror_left_right {
        q = mirror_point(q, geometry);
    }
    Projection {
        point: q,
        included: true,
    }
}

/// Holds the current calibration and re-derives the transform when the
/// perimeter or the orientation changes.
#[derive(Clone, Debug)]
pub struct RadarProjector {
    geometry: RadarGeometry,
    perimeter: Option<[ImagePoint; 4]>,
    transform: Option<PerspectiveTransform>,
}

impl RadarProjector {
    pub fn new(geometry: RadarGeometry) -> Self {
        Self {
            geometry,
            perimeter: None,
            transform: None,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &RadarGeometry {
        &self.geometry
    }

    #[inline]
    pub fn transform(&self) -> Option<&PerspectiveTransform> {
        self.transform.as_ref()
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.transform.is_some()
    }

    /// Install a new perimeter. On error the transform is left undefined and
    /// projection falls back to fail-open inclusion.
    pub fn calibrate(
        &mut self,
        perimeter: &[ImagePoint],
        orientation: Orientation,
    ) -> Result<(), TransformError> {
        self.transform = None;
        self.perimeter = perimeter.get(..4).and_then(|s| s.try_into().ok());
        let result = PerspectiveTransform::derive(perimeter, orientation, &self.geometry);
        match result {
            Ok(t) => {
                log::info!("calibration installed ({} view)", orientation.as_str());
                self.transform = Some(t);
                Ok(())
            }
            Err(e) => {
                log::warn!("calibration rejected: {e}");
                Err(e)
            }
        }
    }

    /// Re-derive the transform if `state` asks for a different orientation
    /// than the current one. No-op before calibration.
    pub fn sync_orientation(&mut self, state: &ZoneFilterState) -> Result<(), TransformError> {
        let Some(perimeter) = self.perimeter else {
            return Ok(());
        };
        if self.transform.map(|t| t.orientation()) == Some(state.orientation) {
            return Ok(());
        }
        self.calibrate(&perimeter, state.orientation)
    }

    /// Forget the calibration.
    pub fn clear(&mut self) {
        self.perimeter = None;
        self.transform = None;
    }

    #[inline]
    pub fn project(&self, p: ImagePoint, state: &ZoneFilterState) -> Projection {
        project(p, self.transform.as_ref(), &self.geometry, state)
    }

    /// Inclusion test only; always `true` before calibration.
    #[inline]
    pub fn accepts(&self, p: ImagePoint, state: &ZoneFilterState) -> bool {
        self.project(p, state).included
    }

    /// Position filter for an upstream detector, evaluated against a
    /// snapshot of `state`.
    pub fn roi_filter(&self, state: ZoneFilterState) -> impl Fn(ImagePoint) -> bool + '_ {
        move |p| self.accepts(p, &state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::RadarConfig;
    use approx::assert_abs_diff_eq;

    fn geometry() -> RadarGeometry {
        RadarGeometry::from_config(&RadarConfig::default()).expect("default config")
    }

    fn rect_perimeter() -> [ImagePoint; 4] {
        [
            Point2::new(100.0, 100.0),
            Point2::new(500.0, 100.0),
            Point2::new(500.0, 400.0),
            Point2::new(100.0, 400.0),
        ]
    }

    fn calibrated() -> RadarProjector {
        let mut p = RadarProjector::new(geometry());
        p.calibrate(&rect_perimeter(), Orientation::Vertical)
            .expect("valid perimeter");
        p
    }

    #[test]
    fn uncalibrated_pipeline_fails_open() {
        let p = RadarProjector::new(geometry());
        let state = ZoneFilterState {
            zone: Zone::Left,
            invert_sides: true,
            ..ZoneFilterState::default()
        };
        let q = Point2::new(5000.0, -40.0);
        assert_eq!(
            p.project(q, &state),
            Projection {
                point: q,
                included: true
            }
        );
        assert!(p.accepts(q, &state));
    }

    #[test]
    fn court_center_projects_to_canvas_center() {
        let p = calibrated();
        let out = p.project(Point2::new(300.0, 250.0), &ZoneFilterState::default());
        assert!(out.included);
        assert_abs_diff_eq!(out.point.x, 260.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.point.y, 440.0, epsilon = 1e-3);
    }

    #[test]
    fn out_of_canvas_points_are_excluded_whatever_the_toggles() {
        let p = calibrated();
        // far to the left of the court: canonical x < 0
        let q = Point2::new(-200.0, 250.0);
        for zone in [Zone::All, Zone::Left, Zone::Right] {
            for invert_sides in [false, true] {
                for mirror_left_right in [false, true] {
                    let state = ZoneFilterState {
                        zone,
                        invert_sides,
                        mirror_left_right,
                        ..ZoneFilterState::default()
                    };
                    assert!(!p.project(q, &state).included);
                }
            }
        }
    }

    #[test]
    fn vertical_zones_split_on_x() {
        let g = geometry();
        let left = ZoneFilterState {
            zone: Zone::Left,
            ..ZoneFilterState::default()
        };
        let right = ZoneFilterState {
            zone: Zone::Right,
            ..ZoneFilterState::default()
        };
        assert!(left.zone_admits(Point2::new(100.0, 700.0), &g));
        assert!(!right.zone_admits(Point2::new(100.0, 700.0), &g));
        assert!(right.zone_admits(Point2::new(400.0, 10.0), &g));
        assert!(!left.zone_admits(Point2::new(400.0, 10.0), &g));
    }

    #[test]
    fn horizontal_zones_split_on_y() {
        let g = geometry();
        let left = ZoneFilterState {
            orientation: Orientation::Horizontal,
            zone: Zone::Left,
            ..ZoneFilterState::default()
        };
        let right = ZoneFilterState {
            zone: Zone::Right,
            ..left
        };
        // top of the canvas is screen-left
        assert!(left.zone_admits(Point2::new(500.0, 100.0), &g));
        assert!(!right.zone_admits(Point2::new(500.0, 100.0), &g));
        assert!(right.zone_admits(Point2::new(10.0, 800.0), &g));
    }

    #[test]
    fn center_line_belongs_to_neither_half() {
        let g = geometry();
        let on_line = Point2::new(260.0, 300.0);
        for (zone, admitted) in [(Zone::All, true), (Zone::Left, false), (Zone::Right, false)] {
            let state = ZoneFilterState {
                zone,
                ..ZoneFilterState::default()
            };
            assert_eq!(state.zone_admits(on_line, &g), admitted, "{zone:?}");
        }
        let horizontal = ZoneFilterState {
            orientation: Orientation::Horizontal,
            zone: Zone::Left,
            ..ZoneFilterState::default()
        };
        assert!(!horizontal.zone_admits(Point2::new(10.0, 440.0), &g));
    }

    #[test]
    fn invert_and_mirror_are_involutions() {
        let g = geometry();
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(123.5, 777.25),
            Point2::new(519.0, 1.0),
        ] {
            let ii = invert_point(invert_point(p, &g), &g);
            assert_abs_diff_eq!(ii.x, p.x, epsilon = 1e-4);
            assert_abs_diff_eq!(ii.y, p.y, epsilon = 1e-4);
            let mm = mirror_point(mirror_point(p, &g), &g);
            assert_abs_diff_eq!(mm.x, p.x, epsilon = 1e-4);
            assert_abs_diff_eq!(mm.y, p.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn invert_then_mirror_is_a_vertical_flip() {
        let p = calibrated();
        let q = Point2::new(100.0, 100.0); // top-left corner -> (80, 80)
        let state = ZoneFilterState {
            invert_sides: true,
            mirror_left_right: true,
            ..ZoneFilterState::default()
        };
        let out = p.project(q, &state);
        assert!(out.included);
        assert_abs_diff_eq!(out.point.x, 80.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.point.y, 800.0, epsilon = 1e-3);
    }

    #[test]
    fn zone_filter_runs_before_inversion() {
        let p = calibrated();
        // left half of the court in canonical space
        let q = Point2::new(150.0, 250.0);
        let state = ZoneFilterState {
            zone: Zone::Left,
            invert_sides: true,
            ..ZoneFilterState::default()
        };
        let out = p.project(q, &state);
        assert!(out.included);
        // after inversion it is displayed on the right
        assert!(out.point.x > p.geometry().center().x);
    }

    #[test]
    fn orientation_change_rederives_transform() {
        let mut p = calibrated();
        let before = *p.transform().expect("calibrated");
        let state = ZoneFilterState {
            orientation: Orientation::Horizontal,
            ..ZoneFilterState::default()
        };
        p.sync_orientation(&state).expect("valid");
        let after = *p.transform().expect("still calibrated");
        assert_eq!(after.orientation(), Orientation::Horizontal);
        assert_ne!(before, after);

        // image top-right now lands on canonical bottom-left
        let out = after.apply(Point2::new(500.0, 100.0));
        assert_abs_diff_eq!(out.x, 80.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.y, 800.0, epsilon = 1e-3);
    }

    #[test]
    fn failed_calibration_leaves_pipeline_fail_open() {
        let mut p = calibrated();
        let err = p.calibrate(&rect_perimeter()[..2], Orientation::Vertical);
        assert_eq!(err, Err(TransformError::NotEnoughPoints { got: 2 }));
        assert!(!p.is_calibrated());
        assert!(p.accepts(Point2::new(-1e6, -1e6), &ZoneFilterState::default()));
        // nothing to re-derive from
        assert_eq!(p.sync_orientation(&ZoneFilterState::default()), Ok(()));
    }

    #[test]
    fn roi_filter_uses_state_snapshot() {
        let p = calibrated();
        let state = ZoneFilterState {
            zone: Zone::Right,
            ..ZoneFilterState::default()
        };
        let keep = p.roi_filter(state);
        assert!(keep(Point2::new(450.0, 250.0)));
        assert!(!keep(Point2::new(150.0, 250.0)));
    }

    #[test]
    fn settings_round_trip_and_preserve_unknown_keys() {
        let state = ZoneFilterState {
            orientation: Orientation::Horizontal,
            zone: Zone::Right,
            invert_sides: true,
            mirror_left_right: false,
        };
        let mut settings = Settings::new();
        settings.insert("fps".to_owned(), Value::from(30));
        state.write_settings(&mut settings);
        assert_eq!(settings.get("fps"), Some(&Value::from(30)));
        assert_eq!(settings.get("zone"), Some(&Value::from("right")));
        assert_eq!(ZoneFilterState::from_settings(&settings), state);
    }

    #[test]
    fn bad_settings_fall_back_to_defaults() {
        let mut settings = Settings::new();
        settings.insert("orientation".to_owned(), Value::from("diagonal"));
        settings.insert("invert_sides".to_owned(), Value::from("yes"));
        settings.insert("zone".to_owned(), Value::from("left"));
        let state = ZoneFilterState::from_settings(&settings);
        assert_eq!(state.orientation, Orientation::Vertical);
        assert!(!state.invert_sides);
        assert_eq!(state.zone, Zone::Left);
    }
}
