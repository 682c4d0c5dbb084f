//! Phase table and the operator's per-phase point selection.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A coordinate in camera-frame pixel space.
pub type ImagePoint = Point2<f32>;

/// Number of points in a complete, flattened selection.
pub const TOTAL_POINTS: usize = 10;

/// Point-acquisition phases, in collection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The 4 corners of the playing court.
    Perimeter,
    /// Both ends of the attack line closest to the camera.
    NearLine,
    /// Both ends of the center (net) line.
    CenterLine,
    /// Both ends of the attack line furthest from the camera.
    FarLine,
}

/// Static description of one acquisition phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseSpec {
    pub phase: Phase,
    pub index: usize,
    pub required_points: usize,
    pub label: &'static str,
}

pub const PHASES: [PhaseSpec; 4] = [
    PhaseSpec {
        phase: Phase::Perimeter,
        index: 0,
        required_points: 4,
        label: "Click the 4 corners of the court",
    },
    PhaseSpec {
        phase: Phase::NearLine,
        index: 1,
        required_points: 2,
        label: "Click both ends of the near attack line",
    },
    PhaseSpec {
        phase: Phase::CenterLine,
        index: 2,
        required_points: 2,
        label: "Click both ends of the center (net) line",
    },
    PhaseSpec {
        phase: Phase::FarLine,
        index: 3,
        required_points: 2,
        label: "Click both ends of the far attack line",
    },
];

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Perimeter,
        Phase::NearLine,
        Phase::CenterLine,
        Phase::FarLine,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Phase::Perimeter => 0,
            Phase::NearLine => 1,
            Phase::CenterLine => 2,
            Phase::FarLine => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Phase> {
        Phase::ALL.get(index).copied()
    }

    #[inline]
    pub fn spec(self) -> &'static PhaseSpec {
        &PHASES[self.index()]
    }

    #[inline]
    pub fn required_points(self) -> usize {
        self.spec().required_points
    }

    pub fn next(self) -> Option<Phase> {
        Phase::from_index(self.index() + 1)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{phase:?} needs exactly {expected} points, got {got}")]
    WrongPhaseCount {
        phase: Phase,
        expected: usize,
        got: usize,
    },
    #[error("a complete selection has {expected} points, got {got}")]
    WrongTotalCount { expected: usize, got: usize },
    #[error("{0:?} has not been marked")]
    MissingPhase(Phase),
}

/// Committed points of each phase; a phase is either absent or holds exactly
/// its required number of points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourtSelection {
    phases: [Option<Vec<ImagePoint>>; 4],
}

impl CourtSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, phase: Phase) -> Option<&[ImagePoint]> {
        self.phases[phase.index()].as_deref()
    }

    /// Commit `points` for `phase`, replacing any previous value.
    pub fn set(&mut self, phase: Phase, points: Vec<ImagePoint>) -> Result<(), SelectionError> {
        let expected = phase.required_points();
        if points.len() != expected {
            return Err(SelectionError::WrongPhaseCount {
                phase,
                expected,
                got: points.len(),
            });
        }
        self.phases[phase.index()] = Some(points);
        Ok(())
    }

    /// Remove and return the points of `phase`.
    pub fn take(&mut self, phase: Phase) -> Option<Vec<ImagePoint>> {
        self.phases[phase.index()].take()
    }

    /// Restore a phase to a previously taken value (which may be absent).
    pub(crate) fn restore(&mut self, phase: Phase, points: Option<Vec<ImagePoint>>) {
        self.phases[phase.index()] = points;
    }

    pub fn is_complete(&self) -> bool {
        self.phases.iter().all(Option::is_some)
    }

    /// All 10 points in phase order, or `None` if any phase is missing.
    pub fn flatten(&self) -> Option<Vec<ImagePoint>> {
        self.try_flatten().ok()
    }

    /// Like [`CourtSelection::flatten`], naming the first missing phase.
    pub fn try_flatten(&self) -> Result<Vec<ImagePoint>, SelectionError> {
        let mut out = Vec::with_capacity(TOTAL_POINTS);
        for phase in Phase::ALL {
            let pts = self.get(phase).ok_or(SelectionError::MissingPhase(phase))?;
            out.extend_from_slice(pts);
        }
        Ok(out)
    }

    /// Split a flattened 10-point list back into phases.
    pub fn from_flat(points: &[ImagePoint]) -> Result<Self, SelectionError> {
        if points.len() != TOTAL_POINTS {
            return Err(SelectionError::WrongTotalCount {
                expected: TOTAL_POINTS,
                got: points.len(),
            });
        }
        let mut sel = Self::new();
        let mut start = 0;
        for phase in Phase::ALL {
            let end = start + phase.required_points();
            sel.set(phase, points[start..end].to_vec())?;
            start = end;
        }
        Ok(sel)
    }

    /// The 4 perimeter points, in click order.
    pub fn perimeter(&self) -> Option<[ImagePoint; 4]> {
        self.get(Phase::Perimeter)?.try_into().ok()
    }
}
