//! Operator-driven point acquisition.
//!
//! [`Acquisition`] is a pure state machine: the display layer feeds it
//! [`AcquisitionEvent`]s and re-renders from its state (see
//! [`render_acquisition`]). Phases are collected in order, then the whole
//! selection is reviewed; any single phase can be redone from review before
//! the final confirm.
//!
//! ```text
//! Collecting(0) -> Collecting(1) -> Collecting(2) -> Collecting(3) -> Reviewing
//! Reviewing --digit k--> Editing(k) --confirm/quit--> Reviewing
//! Reviewing --confirm--> Confirmed
//! any --close--> Cancelled
//! ```

mod overlay;

pub use overlay::{render_acquisition, render_acquisition_with, AcquisitionStyle};

use crate::selection::{CourtSelection, ImagePoint, Phase};

/// Operator input, already decoded from pointer and key events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AcquisitionEvent {
    /// Pointer pressed at an image coordinate.
    PointerDown(ImagePoint),
    /// Clear the active phase buffer.
    Reset,
    /// Commit the active phase, or accept the reviewed selection.
    Confirm,
    /// Abandon the session; while editing, abandon only the edit.
    Quit,
    /// The window went away.
    Close,
    /// Redo phase `k` from review.
    SelectPhase(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionState {
    Collecting {
        phase: Phase,
        buffer: Vec<ImagePoint>,
        /// Phases committed so far.
        context: CourtSelection,
    },
    Reviewing(CourtSelection),
    Editing {
        phase: Phase,
        buffer: Vec<ImagePoint>,
        /// The selection with `phase` cleared.
        context: CourtSelection,
        /// Value of `phase` before the edit, restored on cancel.
        original: Option<Vec<ImagePoint>>,
    },
    Cancelled,
    Confirmed(CourtSelection),
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionState::Cancelled | AcquisitionState::Confirmed(_)
        )
    }
}

/// What an event did to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Not applicable in the current state; nothing changed.
    Ignored,
    /// State changed; re-render.
    Consumed,
    /// A terminal state was reached.
    Finished,
}

/// Snapshot of the active phase for the prompt line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub collected: usize,
    pub required: usize,
    pub editing: bool,
}

/// How a finished session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Confirmed(CourtSelection),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Acquisition {
    state: AcquisitionState,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition {
    /// Fresh session, collecting the perimeter.
    pub fn new() -> Self {
        Self {
            state: AcquisitionState::Collecting {
                phase: Phase::Perimeter,
                buffer: Vec::new(),
                context: CourtSelection::new(),
            },
        }
    }

    /// Start in review with a previously stored selection. Falls back to a
    /// fresh session if the selection is incomplete.
    pub fn resume(selection: CourtSelection) -> Self {
        if !selection.is_complete() {
            log::warn!("stored selection is incomplete; starting over");
            return Self::new();
        }
        Self {
            state: AcquisitionState::Reviewing(selection),
        }
    }

    #[inline]
    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// `Some` once the session has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            AcquisitionState::Confirmed(sel) => Some(Outcome::Confirmed(sel.clone())),
            AcquisitionState::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }

    /// Consume the machine, yielding the confirmed selection if there is one.
    pub fn into_selection(self) -> Option<CourtSelection> {
        match self.state {
            AcquisitionState::Confirmed(sel) => Some(sel),
            _ => None,
        }
    }

    /// The phase whose buffer is being filled, if any.
    pub fn active_phase(&self) -> Option<Phase> {
        match &self.state {
            AcquisitionState::Collecting { phase, .. } | AcquisitionState::Editing { phase, .. } => {
                Some(*phase)
            }
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        let (phase, buffer, editing) = match &self.state {
            AcquisitionState::Collecting { phase, buffer, .. } => (*phase, buffer, false),
            AcquisitionState::Editing { phase, buffer, .. } => (*phase, buffer, true),
            _ => return None,
        };
        Some(Progress {
            phase,
            collected: buffer.len(),
            required: phase.required_points(),
            editing,
        })
    }

    /// Instruction line for the operator.
    pub fn prompt(&self) -> String {
        match &self.state {
            AcquisitionState::Collecting { phase, buffer, .. } => format!(
                "{} ({}/{}) - Enter to confirm, r to reset, q to quit",
                phase.spec().label,
                buffer.len(),
                phase.required_points()
            ),
            AcquisitionState::Editing { phase, buffer, .. } => format!(
                "Editing: {} ({}/{}) - Enter to confirm, r to reset, q to discard edit",
                phase.spec().label,
                buffer.len(),
                phase.required_points()
            ),
            AcquisitionState::Reviewing(_) => {
                "Review the court - Enter to accept, 0-3 to redo a phase, q to quit".to_owned()
            }
            AcquisitionState::Confirmed(_) => "Calibration confirmed".to_owned(),
            AcquisitionState::Cancelled => "Calibration cancelled".to_owned(),
        }
    }

    /// Feed one event. Events that do not apply leave the state untouched.
    pub fn handle(&mut self, event: AcquisitionEvent) -> Dispatch {
        if self.state.is_terminal() {
            return Dispatch::Ignored;
        }
        if event == AcquisitionEvent::Close {
            log::info!("acquisition closed; discarding selection");
            self.state = AcquisitionState::Cancelled;
            return Dispatch::Finished;
        }

        let state = std::mem::replace(&mut self.state, AcquisitionState::Cancelled);
        let (next, dispatch) = step(state, event);
        self.state = next;
        dispatch
    }
}

fn step(state: AcquisitionState, event: AcquisitionEvent) -> (AcquisitionState, Dispatch) {
    use AcquisitionEvent as E;
    use AcquisitionState as S;

    match (state, event) {
        (S::Collecting { phase, mut buffer, context }, E::PointerDown(p)) => {
            let d = push_point(phase, &mut buffer, p);
            (S::Collecting { phase, buffer, context }, d)
        }
        (S::Editing { phase, mut buffer, context, original }, E::PointerDown(p)) => {
            let d = push_point(phase, &mut buffer, p);
            (S::Editing { phase, buffer, context, original }, d)
        }

        (S::Collecting { phase, buffer, context }, E::Reset) => {
            let d = reset_dispatch(&buffer);
            (S::Collecting { phase, buffer: Vec::new(), context }, d)
        }
        (S::Editing { phase, buffer, context, original }, E::Reset) => {
            let d = reset_dispatch(&buffer);
            (S::Editing { phase, buffer: Vec::new(), context, original }, d)
        }

        (S::Collecting { phase, buffer, mut context }, E::Confirm) => {
            if buffer.len() != phase.required_points() {
                return (S::Collecting { phase, buffer, context }, Dispatch::Ignored);
            }
            if let Err(e) = context.set(phase, buffer.clone()) {
                log::warn!("cannot commit {phase:?}: {e}");
                return (S::Collecting { phase, buffer, context }, Dispatch::Ignored);
            }
            log::info!("committed {phase:?} ({} points)", phase.required_points());
            let next = match phase.next() {
                Some(phase) => S::Collecting {
                    phase,
                    buffer: Vec::new(),
                    context,
                },
                None => S::Reviewing(context),
            };
            (next, Dispatch::Consumed)
        }
        (S::Editing { phase, buffer, mut context, original }, E::Confirm) => {
            if buffer.len() != phase.required_points() {
                return (S::Editing { phase, buffer, context, original }, Dispatch::Ignored);
            }
            if let Err(e) = context.set(phase, buffer.clone()) {
                log::warn!("cannot commit edit of {phase:?}: {e}");
                return (S::Editing { phase, buffer, context, original }, Dispatch::Ignored);
            }
            log::info!("replaced {phase:?}");
            (S::Reviewing(context), Dispatch::Consumed)
        }

        (S::Collecting { .. }, E::Quit) => {
            log::info!("acquisition cancelled during collection");
            (S::Cancelled, Dispatch::Finished)
        }
        (S::Editing { phase, mut context, original, .. }, E::Quit) => {
            log::info!("edit of {phase:?} discarded");
            context.restore(phase, original);
            (S::Reviewing(context), Dispatch::Consumed)
        }

        (S::Reviewing(sel), E::Confirm) => {
            log::info!("court selection confirmed");
            (S::Confirmed(sel), Dispatch::Finished)
        }
        (S::Reviewing(mut sel), E::SelectPhase(k)) => match Phase::from_index(k) {
            Some(phase) => {
                log::debug!("editing {phase:?}");
                let original = sel.take(phase);
                (
                    S::Editing {
                        phase,
                        buffer: Vec::new(),
                        context: sel,
                        original,
                    },
                    Dispatch::Consumed,
                )
            }
            None => (S::Reviewing(sel), Dispatch::Ignored),
        },
        (S::Reviewing(_), E::Quit) => {
            log::info!("acquisition cancelled during review");
            (S::Cancelled, Dispatch::Finished)
        }

        (state, _) => (state, Dispatch::Ignored),
    }
}

fn push_point(phase: Phase, buffer: &mut Vec<ImagePoint>, p: ImagePoint) -> Dispatch {
    if buffer.len() >= phase.required_points() {
        return Dispatch::Ignored;
    }
    buffer.push(p);
    Dispatch::Consumed
}

fn reset_dispatch(buffer: &[ImagePoint]) -> Dispatch {
    if buffer.is_empty() {
        Dispatch::Ignored
    } else {
        Dispatch::Consumed
    }
}
