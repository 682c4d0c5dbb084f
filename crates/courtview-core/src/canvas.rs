use image::RgbImage;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::glyphs;

/// Largest accepted canvas side in pixels.
pub const MAX_CANVAS_SIDE: usize = 16_384;

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb(c.0)
    }
}

/// Owned row-major RGB raster, 3 bytes per pixel.
///
/// Drawing goes through `imageproc`; `data` is moved into an `RgbImage` for
/// the duration of each primitive. Shapes are clipped to the canvas before
/// rasterizing, so coordinates far off-canvas cost nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RgbCanvas {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // len = w*h*3
}

fn buffer_len(width: usize, height: usize) -> Option<usize> {
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return None;
    }
    width.checked_mul(height)?.checked_mul(3)
}

impl RgbCanvas {
    /// Uniformly filled canvas. `None` if a side exceeds [`MAX_CANVAS_SIDE`].
    pub fn new(width: usize, height: usize, fill: Rgb) -> Option<Self> {
        let len = buffer_len(width, height)?;
        let data = fill.0.iter().copied().cycle().take(len).collect();
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing RGB buffer. Returns `None` if the length does not match.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if data.len() != buffer_len(width, height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * 3)
    }

    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        let o = self.offset(x, y)?;
        Some(Rgb([self.data[o], self.data[o + 1], self.data[o + 2]]))
    }

    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(o) = self.offset(x, y) {
            self.data[o..o + 3].copy_from_slice(&color.0);
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&color.0);
        }
    }

    fn with_view(&mut self, draw: impl FnOnce(&mut RgbImage)) {
        let (w, h) = (self.width as u32, self.height as u32);
        let data = std::mem::take(&mut self.data);
        match RgbImage::from_raw(w, h, data) {
            Some(mut img) => {
                draw(&mut img);
                self.data = img.into_raw();
            }
            None => log::warn!("canvas buffer does not match {w}x{h}, drawing skipped"),
        }
    }

    /// Fill the rectangle spanned by two opposite corners, both inclusive.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        let xa = x0.min(x1).max(0);
        let ya = y0.min(y1).max(0);
        let xb = i64::from(x0.max(x1)).min(self.width as i64 - 1);
        let yb = i64::from(y0.max(y1)).min(self.height as i64 - 1);
        if i64::from(xa) > xb || i64::from(ya) > yb {
            return;
        }
        let size = ((xb - i64::from(xa) + 1) as u32, (yb - i64::from(ya) + 1) as u32);
        let rect = Rect::at(xa, ya).of_size(size.0, size.1);
        self.with_view(|img| draw_filled_rect_mut(img, rect, color.into()));
    }

    /// Outline a rectangle with bands of the given thickness centred on its edges.
    pub fn stroke_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb, thickness: u32) {
        let (lo, hi) = brush(thickness);
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (ya, yb) = (y0.min(y1), y0.max(y1));
        let (l, r) = (xa.saturating_add(lo), xb.saturating_add(hi));
        self.fill_rect(l, ya.saturating_add(lo), r, ya.saturating_add(hi), color);
        self.fill_rect(l, yb.saturating_add(lo), r, yb.saturating_add(hi), color);
        let (t, b) = (ya.saturating_add(lo), yb.saturating_add(hi));
        self.fill_rect(xa.saturating_add(lo), t, xa.saturating_add(hi), b, color);
        self.fill_rect(xb.saturating_add(lo), t, xb.saturating_add(hi), b, color);
    }

    /// Line segment with a band of `thickness` pixels across its minor axis.
    ///
    /// The segment is clipped to the canvas (widened by the band) first.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb, thickness: u32) {
        let (lo, hi) = brush(thickness);
        let margin = f64::from(hi - lo + 1);
        let bounds = (
            -margin,
            -margin,
            self.width as f64 - 1.0 + margin,
            self.height as f64 - 1.0 + margin,
        );
        let a = (f64::from(from.0), f64::from(from.1));
        let b = (f64::from(to.0), f64::from(to.1));
        let Some((a, b)) = clip_segment(a, b, bounds) else {
            return;
        };

        let snap = |p: (f64, f64)| (p.0.round() as f32, p.1.round() as f32);
        let (a, b) = (snap(a), snap(b));
        let steep = (b.1 - a.1).abs() > (b.0 - a.0).abs();
        let c: image::Rgb<u8> = color.into();
        self.with_view(|img| {
            for o in lo..=hi {
                let o = o as f32;
                let (dx, dy) = if steep { (o, 0.0) } else { (0.0, o) };
                draw_line_segment_mut(img, (a.0 + dx, a.1 + dy), (b.0 + dx, b.1 + dy), c);
            }
        });
    }

    pub fn fill_circle(&mut self, center: (i32, i32), radius: u32, color: Rgb) {
        if !self.touches(center, radius) {
            return;
        }
        let r = radius as i32;
        self.with_view(|img| draw_filled_circle_mut(img, center, r, color.into()));
    }

    /// Ring from `radius - thickness + 1` to `radius`, inclusive.
    pub fn stroke_circle(&mut self, center: (i32, i32), radius: u32, color: Rgb, thickness: u32) {
        if !self.touches(center, radius) {
            return;
        }
        let r = radius as i32;
        let inner = r - thickness.clamp(1, radius.max(1)) as i32 + 1;
        self.with_view(|img| {
            for ri in inner..=r {
                draw_hollow_circle_mut(img, center, ri, color.into());
            }
        });
    }

    /// Whether a circle's bounding square overlaps the canvas.
    fn touches(&self, center: (i32, i32), radius: u32) -> bool {
        if radius as usize > MAX_CANVAS_SIDE {
            return false;
        }
        let (cx, cy, r) = (i64::from(center.0), i64::from(center.1), i64::from(radius));
        cx + r >= 0 && cy + r >= 0 && cx - r < self.width as i64 && cy - r < self.height as i64
    }

    /// Render `text` with the built-in bitmap font, top-left anchored.
    ///
    /// Characters without a glyph are drawn as blanks.
    pub fn draw_text(&mut self, origin: (i32, i32), text: &str, color: Rgb, scale: u32) {
        let s = scale.clamp(1, 64) as i32;
        let advance = (glyphs::GLYPH_WIDTH as i32 + 1) * s;
        let mut pen_x = origin.0;
        for ch in text.chars() {
            if pen_x >= self.width as i32 {
                break;
            }
            if let Some(rows) = glyphs::glyph(ch) {
                for (gy, bits) in rows.iter().enumerate() {
                    for gx in glyphs::lit_columns(*bits) {
                        let x = pen_x.saturating_add(gx as i32 * s);
                        let y = origin.1.saturating_add(gy as i32 * s);
                        self.fill_rect(x, y, x.saturating_add(s - 1), y.saturating_add(s - 1), color);
                    }
                }
            }
            pen_x = pen_x.saturating_add(advance);
        }
    }
}

/// Band offsets `lo..=hi` for a stroke of `thickness` pixels.
fn brush(thickness: u32) -> (i32, i32) {
    let t = thickness.clamp(1, 64) as i32;
    (-(t - 1) / 2, t / 2)
}

/// Liang-Barsky clip of `a -> b` against `(xmin, ymin, xmax, ymax)`.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, a.0 - xmin),
        (dx, xmax - a.0),
        (-dy, a.1 - ymin),
        (dy, ymax - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}
