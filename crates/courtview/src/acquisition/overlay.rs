use courtview_core::{order_quad, Rgb, RgbCanvas};
use serde::{Deserialize, Serialize};

use super::{Acquisition, AcquisitionState};
use crate::selection::{CourtSelection, ImagePoint, Phase};

/// Colors and sizes for the acquisition overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionStyle {
    /// Committed phases (read-only context).
    pub context: Rgb,
    /// The buffer being filled.
    pub active: Rgb,
    pub label: Rgb,
    pub point_radius_px: u32,
    pub line_thickness_px: u32,
    pub label_scale: u32,
}

impl Default for AcquisitionStyle {
    fn default() -> Self {
        Self {
            context: Rgb::new(0, 200, 0),
            active: Rgb::new(255, 255, 0),
            label: Rgb::WHITE,
            point_radius_px: 5,
            line_thickness_px: 2,
            label_scale: 2,
        }
    }
}

/// Draw the acquisition state over a copy of `frame` with the default style.
pub fn render_acquisition(frame: &RgbCanvas, acq: &Acquisition) -> RgbCanvas {
    render_acquisition_with(frame, acq, &AcquisitionStyle::default())
}

/// Committed phases are drawn in the context color with their phase digit;
/// the active buffer (if any) in the highlight color on top.
pub fn render_acquisition_with(
    frame: &RgbCanvas,
    acq: &Acquisition,
    style: &AcquisitionStyle,
) -> RgbCanvas {
    let mut out = frame.clone();
    match acq.state() {
        AcquisitionState::Collecting {
            phase,
            buffer,
            context,
        }
        | AcquisitionState::Editing {
            phase,
            buffer,
            context,
            ..
        } => {
            draw_context(&mut out, context, style);
            draw_phase(&mut out, *phase, buffer, style.active, style);
        }
        AcquisitionState::Reviewing(sel) | AcquisitionState::Confirmed(sel) => {
            draw_context(&mut out, sel, style);
        }
        AcquisitionState::Cancelled => {}
    }
    out
}

fn draw_context(out: &mut RgbCanvas, sel: &CourtSelection, style: &AcquisitionStyle) {
    for phase in Phase::ALL {
        let Some(points) = sel.get(phase) else {
            continue;
        };
        draw_phase(out, phase, points, style.context, style);
        if let Some(first) = points.first() {
            let (x, y) = px(*first);
            let r = style.point_radius_px as i32 + 2;
            out.draw_text(
                (x.saturating_add(r), y.saturating_add(r)),
                &phase.index().to_string(),
                style.label,
                style.label_scale,
            );
        }
    }
}

fn draw_phase(
    out: &mut RgbCanvas,
    phase: Phase,
    points: &[ImagePoint],
    color: Rgb,
    style: &AcquisitionStyle,
) {
    let t = style.line_thickness_px;
    let complete = points.len() == phase.required_points();

    if phase == Phase::Perimeter && complete {
        if let Ok(quad) = <[ImagePoint; 4]>::try_from(points) {
            let quad = order_quad(&quad);
            for i in 0..4 {
                out.draw_line(px(quad[i]), px(quad[(i + 1) % 4]), color, t);
            }
        }
    } else {
        for pair in points.windows(2) {
            out.draw_line(px(pair[0]), px(pair[1]), color, t);
        }
    }

    for p in points {
        out.fill_circle(px(*p), style.point_radius_px, color);
    }
}

#[inline]
fn px(p: ImagePoint) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::AcquisitionEvent;
    use nalgebra::Point2;

    fn frame() -> RgbCanvas {
        RgbCanvas::new(200, 200, Rgb::BLACK).expect("canvas")
    }

    fn click(acq: &mut Acquisition, x: f32, y: f32) {
        acq.handle(AcquisitionEvent::PointerDown(Point2::new(x, y)));
    }

    #[test]
    fn frame_is_not_modified() {
        let f = frame();
        let mut acq = Acquisition::new();
        click(&mut acq, 50.0, 50.0);
        let out = render_acquisition(&f, &acq);
        assert_ne!(out, f);
        assert_eq!(f.pixel(50, 50), Some(Rgb::BLACK));
    }

    #[test]
    fn active_buffer_uses_highlight_color() {
        let style = AcquisitionStyle::default();
        let mut acq = Acquisition::new();
        click(&mut acq, 20.0, 20.0);
        click(&mut acq, 120.0, 20.0);
        let out = render_acquisition(&frame(), &acq);
        assert_eq!(out.pixel(20, 20), Some(style.active));
        // segment between the two clicks
        assert_eq!(out.pixel(70, 20), Some(style.active));
    }

    #[test]
    fn committed_perimeter_is_closed_context_polygon() {
        let style = AcquisitionStyle::default();
        let mut acq = Acquisition::new();
        // clicked out of order; drawn as an ordered quad
        for (x, y) in [(20.0, 20.0), (180.0, 180.0), (180.0, 20.0), (20.0, 180.0)] {
            click(&mut acq, x, y);
        }
        acq.handle(AcquisitionEvent::Confirm);
        click(&mut acq, 60.0, 100.0);

        let out = render_acquisition(&frame(), &acq);
        assert_eq!(out.pixel(100, 20), Some(style.context));
        assert_eq!(out.pixel(180, 100), Some(style.context));
        assert_eq!(out.pixel(100, 180), Some(style.context));
        assert_eq!(out.pixel(20, 100), Some(style.context));
        // no diagonal from the click order
        assert_eq!(out.pixel(100, 100), Some(Rgb::BLACK));
        assert_eq!(out.pixel(60, 100), Some(style.active));
    }

    #[test]
    fn clicks_far_off_frame_are_clipped() {
        let style = AcquisitionStyle::default();
        let mut acq = Acquisition::new();
        click(&mut acq, -1e12, 100.0);
        click(&mut acq, 1e12, 100.0);
        click(&mut acq, f32::MAX, f32::MAX);
        let out = render_acquisition(&frame(), &acq);
        assert_eq!(out.pixel(0, 100), Some(style.active));
        assert_eq!(out.pixel(199, 100), Some(style.active));
    }

    #[test]
    fn cancelled_session_draws_nothing() {
        let f = frame();
        let mut acq = Acquisition::new();
        click(&mut acq, 50.0, 50.0);
        acq.handle(AcquisitionEvent::Quit);
        assert_eq!(render_acquisition(&f, &acq), f);
    }
}
