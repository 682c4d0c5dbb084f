//! Canonical ordering of quadrilateral corners.
//!
//! Both functions return corners as `[top-left, top-right, bottom-right,
//! bottom-left]` in image coordinates (y grows downwards). They always return
//! a permutation of the input and never panic, even for collinear or repeated
//! points; ties are broken by input index.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Named position inside a canonically ordered quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadCorner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl QuadCorner {
    pub const ALL: [QuadCorner; 4] = [
        QuadCorner::TopLeft,
        QuadCorner::TopRight,
        QuadCorner::BottomRight,
        QuadCorner::BottomLeft,
    ];

    /// Index of this corner in `[TL, TR, BR, BL]` order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            QuadCorner::TopLeft => 0,
            QuadCorner::TopRight => 1,
            QuadCorner::BottomRight => 2,
            QuadCorner::BottomLeft => 3,
        }
    }
}

/// Order by coordinate sum and difference.
///
/// The minimum of `x + y` is top-left and the maximum is bottom-right. Of the
/// two remaining points the one with the smaller `y - x` is top-right.
pub fn order_quad(pts: &[Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let sum = |i: usize| pts[i].x + pts[i].y;
    let diff = |i: usize| pts[i].y - pts[i].x;

    let mut tl = 0;
    for i in 1..4 {
        if sum(i) < sum(tl) {
            tl = i;
        }
    }

    let mut br = usize::MAX;
    for i in (0..4).filter(|&i| i != tl) {
        if br == usize::MAX || sum(i) > sum(br) {
            br = i;
        }
    }

    // tl != br, so exactly two indices remain
    let mut rest = [0usize; 2];
    let mut n = 0;
    for i in (0..4).filter(|&i| i != tl && i != br) {
        rest[n] = i;
        n += 1;
    }
    let [a, b] = rest;
    let (tr, bl) = if diff(b) < diff(a) { (b, a) } else { (a, b) };

    [pts[tl], pts[tr], pts[br], pts[bl]]
}

/// Order by splitting into a left and a right pair along x, then ordering
/// each pair by y.
pub fn order_quad_by_x(pts: &[Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let mut idx = [0usize, 1, 2, 3];
    idx.sort_by(|&a, &b| pts[a].x.total_cmp(&pts[b].x));

    let by_y = |a: usize, b: usize| {
        if pts[b].y < pts[a].y {
            (b, a)
        } else {
            (a, b)
        }
    };
    let (tl, bl) = by_y(idx[0], idx[1]);
    let (tr, br) = by_y(idx[2], idx[3]);

    [pts[tl], pts[tr], pts[br], pts[bl]]
}
