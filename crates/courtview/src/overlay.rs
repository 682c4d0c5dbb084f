//! Per-frame drawing of projected tracks on the radar, the invert/mirror
//! toggle controls, and track boxes on the camera frame.

use courtview_core::{text_width, Rgb, RgbCanvas, GLYPH_HEIGHT};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::projection::{RadarProjector, ZoneFilterState};
use crate::radar::RadarStyle;
use crate::tracks::TrackView;

const MARKER_RADIUS_PX: u32 = 8;
const MARKER_OUTLINE_PX: u32 = 2;
const LABEL_SCALE: u32 = 2;

const FRAME_BOX_COLOR: Rgb = Rgb::new(0, 255, 0);
const FRAME_LABEL_COLOR: Rgb = Rgb::BLACK;
const FRAME_LABEL_PAD_PX: i32 = 3;

/// Which display flag a toggle control flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Toggle {
    InvertSides,
    MirrorLeftRight,
}

impl Toggle {
    pub fn is_on(self, state: &ZoneFilterState) -> bool {
        match self {
            Toggle::InvertSides => state.invert_sides,
            Toggle::MirrorLeftRight => state.mirror_left_right,
        }
    }

    pub fn flip(self, state: &mut ZoneFilterState) {
        match self {
            Toggle::InvertSides => state.invert_sides = !state.invert_sides,
            Toggle::MirrorLeftRight => state.mirror_left_right = !state.mirror_left_right,
        }
    }
}

/// A clickable rectangle in radar-canvas pixels, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleControl {
    pub toggle: Toggle,
    pub label: &'static str,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ToggleControl {
    pub fn contains(&self, p: Point2<f32>) -> bool {
        let (x, y) = (p.x.floor() as i32, p.y.floor() as i32);
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Fixed-position controls, top-left of the free zone.
pub static TOGGLE_CONTROLS: [ToggleControl; 2] = [
    ToggleControl {
        toggle: Toggle::InvertSides,
        label: "INV",
        left: 10,
        top: 10,
        right: 69,
        bottom: 37,
    },
    ToggleControl {
        toggle: Toggle::MirrorLeftRight,
        label: "MIR",
        left: 80,
        top: 10,
        right: 139,
        bottom: 37,
    },
];

/// Control under `p`, if any.
pub fn hit_test(p: Point2<f32>) -> Option<&'static ToggleControl> {
    TOGGLE_CONTROLS.iter().find(|c| c.contains(p))
}

/// Flip the flag of the control under a radar click. Returns which one flipped.
pub fn handle_radar_click(p: Point2<f32>, state: &mut ZoneFilterState) -> Option<Toggle> {
    let control = hit_test(p)?;
    control.toggle.flip(state);
    log::debug!(
        "{:?} switched {}",
        control.toggle,
        if control.toggle.is_on(state) { "on" } else { "off" }
    );
    Some(control.toggle)
}

/// Draw every included, confirmed track on a copy of `canvas`, then the
/// toggle controls.
///
/// Tracks are only placed once `projector` is calibrated; before that the
/// result is the canvas plus the controls.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip_all, fields(tracks = tracks.len()))
)]
pub fn render_tracks<T: TrackView>(
    canvas: &RgbCanvas,
    tracks: &[T],
    projector: &RadarProjector,
    state: &ZoneFilterState,
    style: &RadarStyle,
) -> RgbCanvas {
    let mut out = canvas.clone();

    if projector.is_calibrated() {
        for track in tracks.iter().filter(|t| t.is_confirmed()) {
            let proj = projector.project(track.ground_point(), state);
            if !proj.included {
                continue;
            }
            draw_marker(&mut out, proj.point, track.track_id(), style);
        }
    }

    for control in &TOGGLE_CONTROLS {
        draw_control(&mut out, control, control.toggle.is_on(state), style);
    }
    out
}

fn draw_marker(out: &mut RgbCanvas, p: Point2<f32>, id: u64, style: &RadarStyle) {
    let c = (p.x.round() as i32, p.y.round() as i32);
    out.fill_circle(c, MARKER_RADIUS_PX, style.marker);
    out.stroke_circle(c, MARKER_RADIUS_PX, style.marker_outline, MARKER_OUTLINE_PX);

    let label = id.to_string();
    let w = text_width(&label, LABEL_SCALE) as i32;
    let r = MARKER_RADIUS_PX as i32;
    let lift = r + 2 + (GLYPH_HEIGHT as i32) * LABEL_SCALE as i32;
    out.draw_text(
        (c.0.saturating_sub(w / 2), c.1.saturating_sub(lift)),
        &label,
        style.label,
        LABEL_SCALE,
    );
}

fn draw_control(out: &mut RgbCanvas, c: &ToggleControl, on: bool, style: &RadarStyle) {
    let fill = if on { style.toggle_on } else { style.toggle_off };
    out.fill_rect(c.left, c.top, c.right, c.bottom, fill);
    out.stroke_rect(c.left, c.top, c.right, c.bottom, style.line, 1);

    let w = text_width(c.label, LABEL_SCALE) as i32;
    let h = (GLYPH_HEIGHT as u32 * LABEL_SCALE) as i32;
    let x = (c.left + c.right + 1 - w) / 2;
    let y = (c.top + c.bottom + 1 - h) / 2;
    out.draw_text((x, y), c.label, style.line, LABEL_SCALE);
}

/// Draw each confirmed track's box and an `ID n` tag on a copy of the camera frame.
pub fn render_frame_tracks<T: TrackView>(frame: &RgbCanvas, tracks: &[T]) -> RgbCanvas {
    let mut out = frame.clone();
    for track in tracks.iter().filter(|t| t.is_confirmed()) {
        let b = track.bounding_box();
        let (x0, y0) = (b.left as i32, b.top as i32);
        let (x1, y1) = (b.right as i32, b.bottom as i32);
        out.stroke_rect(x0, y0, x1, y1, FRAME_BOX_COLOR, 2);

        let label = format!("ID {}", track.track_id());
        let w = text_width(&label, LABEL_SCALE) as i32;
        let h = (GLYPH_HEIGHT as u32 * LABEL_SCALE) as i32;
        let pad = FRAME_LABEL_PAD_PX;
        let tag_top = y0.saturating_sub(h + 2 * pad);
        out.fill_rect(x0, tag_top, x0.saturating_add(w + 2 * pad), y0, FRAME_BOX_COLOR);
        out.draw_text(
            (x0.saturating_add(pad), tag_top.saturating_add(pad)),
            &label,
            FRAME_LABEL_COLOR,
            LABEL_SCALE,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::{RadarCanvas, RadarConfig};
    use crate::tracks::LtrbTrack;
    use crate::transform::Orientation;

    fn setup() -> (RadarCanvas, RadarProjector) {
        let radar = RadarCanvas::new(RadarConfig::default()).expect("default config");
        let mut projector = RadarProjector::new(*radar.geometry());
        let rect = [
            Point2::new(100.0, 100.0),
            Point2::new(500.0, 100.0),
            Point2::new(500.0, 400.0),
            Point2::new(100.0, 400.0),
        ];
        projector
            .calibrate(&rect, Orientation::Vertical)
            .expect("calibration");
        (radar, projector)
    }

    /// Track whose ground point lands on image `(x, y)`.
    fn track_at(id: u64, x: f32, y: f32, confirmed: bool) -> LtrbTrack {
        LtrbTrack {
            id,
            confirmed,
            ltrb: [x - 10.0, y - 60.0, x + 10.0, y],
        }
    }

    #[test]
    fn included_track_gets_a_marker() {
        let (radar, projector) = setup();
        let style = radar.config().style;
        let bg = radar.static_image();
        // image center maps to the radar center (260, 440)
        let tracks = [track_at(3, 300.0, 250.0, true)];
        let out = render_tracks(&bg, &tracks, &projector, &ZoneFilterState::default(), &style);
        assert_eq!(out.pixel(260, 440), Some(style.marker));
        assert_eq!(out.pixel(260 + 8, 440), Some(style.marker_outline));
    }

    #[test]
    fn unconfirmed_tracks_are_skipped() {
        let (radar, projector) = setup();
        let style = radar.config().style;
        let bg = radar.static_image();
        let tracks = [track_at(3, 300.0, 250.0, false)];
        let out = render_tracks(&bg, &tracks, &projector, &ZoneFilterState::default(), &style);
        assert_eq!(out.pixel(260, 440), bg.pixel(260, 440));
    }

    #[test]
    fn out_of_bounds_track_is_never_drawn() {
        let (radar, projector) = setup();
        let style = radar.config().style;
        let bg = radar.static_image();
        let tracks = [track_at(1, 300.0, 2000.0, true)];
        for invert_sides in [false, true] {
            for mirror_left_right in [false, true] {
                let state = ZoneFilterState {
                    invert_sides,
                    mirror_left_right,
                    ..ZoneFilterState::default()
                };
                let out = render_tracks(&bg, &tracks, &projector, &state, &style);
                let expected = render_tracks::<LtrbTrack>(&bg, &[], &projector, &state, &style);
                assert_eq!(out, expected);
            }
        }
    }

    #[test]
    fn uncalibrated_projector_draws_only_controls() {
        let radar = RadarCanvas::new(RadarConfig::default()).expect("default config");
        let projector = RadarProjector::new(*radar.geometry());
        let style = radar.config().style;
        let bg = radar.static_image();
        let tracks = [track_at(3, 300.0, 250.0, true)];
        let state = ZoneFilterState::default();
        let out = render_tracks(&bg, &tracks, &projector, &state, &style);
        let controls_only = render_tracks::<LtrbTrack>(&bg, &[], &projector, &state, &style);
        assert_eq!(out, controls_only);
    }

    #[test]
    fn controls_reflect_state() {
        let (radar, projector) = setup();
        let style = radar.config().style;
        let bg = radar.static_image();
        let state = ZoneFilterState {
            invert_sides: true,
            ..ZoneFilterState::default()
        };
        let out = render_tracks::<LtrbTrack>(&bg, &[], &projector, &state, &style);
        assert_eq!(out.pixel(12, 12), Some(style.toggle_on));
        assert_eq!(out.pixel(82, 12), Some(style.toggle_off));
    }

    #[test]
    fn clicks_flip_the_matching_flag() {
        let mut state = ZoneFilterState::default();
        assert_eq!(
            handle_radar_click(Point2::new(30.0, 20.0), &mut state),
            Some(Toggle::InvertSides)
        );
        assert!(state.invert_sides);
        assert_eq!(
            handle_radar_click(Point2::new(139.5, 37.9), &mut state),
            Some(Toggle::MirrorLeftRight)
        );
        assert!(state.mirror_left_right);
        assert_eq!(handle_radar_click(Point2::new(75.0, 20.0), &mut state), None);
        assert_eq!(handle_radar_click(Point2::new(260.0, 440.0), &mut state), None);

        handle_radar_click(Point2::new(30.0, 20.0), &mut state);
        assert!(!state.invert_sides);
    }

    #[test]
    fn frame_boxes_mark_confirmed_tracks() {
        let frame = RgbCanvas::new(200, 200, Rgb::BLACK).expect("canvas");
        let tracks = [track_at(4, 100.0, 150.0, true), track_at(5, 40.0, 150.0, false)];
        let out = render_frame_tracks(&frame, &tracks);
        assert_eq!(out.pixel(90, 120), Some(FRAME_BOX_COLOR));
        assert_eq!(out.pixel(30, 120), Some(Rgb::BLACK));
        assert_eq!(frame.pixel(90, 120), Some(Rgb::BLACK));
    }

    #[test]
    fn frame_boxes_far_outside_the_frame_are_clipped() {
        let frame = RgbCanvas::new(64, 64, Rgb::BLACK).expect("canvas");
        let tracks = [
            LtrbTrack {
                id: 1,
                confirmed: true,
                ltrb: [-3e9, 0.0, 3e9, 10.0],
            },
            LtrbTrack {
                id: 2,
                confirmed: true,
                ltrb: [f32::MIN, f32::MIN, f32::MAX, f32::MAX],
            },
        ];
        let out = render_frame_tracks(&frame, &tracks);
        // bottom edge of the first box crosses the whole frame
        assert_eq!(out.pixel(0, 10), Some(FRAME_BOX_COLOR));
        assert_eq!(out.pixel(63, 10), Some(FRAME_BOX_COLOR));
        assert_eq!(out.pixel(32, 30), Some(Rgb::BLACK));
    }
}
