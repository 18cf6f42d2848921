//! Drag interpretation.
//!
//! [`GestureInterpreter`] turns a begin/change/end drag sequence into offset
//! updates and a final [`SnapDecision`]. It only computes; the carousel
//! applies the results, notifies the host and pauses or resumes autoplay.
use tracing::debug;

use crate::position::PagePosition;

/// Release velocity, in units per second, above which a drag flings.
pub const FLING_VELOCITY_THRESHOLD: f32 = 500.0;

/// Fraction of a page a slow drag must cover to change page.
pub const SNAP_PROGRESS_THRESHOLD: f32 = 0.5;

/// A single event from a horizontal drag source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
    /// The pointer went down and started dragging.
    Begin,
    /// The pointer moved. `translation_x` is the total movement since begin.
    Change {
        /// Horizontal movement since the drag began.
        translation_x: f32,
    },
    /// The pointer was released.
    End {
        /// Horizontal movement since the drag began.
        translation_x: f32,
        /// Horizontal release velocity. Positive moves toward earlier pages.
        velocity_x: f32,
    },
}

/// Data captured for the drag in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSession {
    /// Offset at the moment the drag began.
    pub start_offset: f32,
    /// Latest translation reported for this drag.
    pub translation_x: f32,
}

/// Where the interpreter is in a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A drag began and has not been released yet.
    Dragging(GestureSession),
}

/// Outcome of a released drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapDecision {
    /// Page nearest to the offset the drag started from.
    pub start_page: i64,
    /// Page to settle on.
    pub target_page: i64,
    /// Resting offset of `target_page`.
    pub target_offset: f32,
    /// `target_page` folded into the item range.
    pub index: usize,
}

impl SnapDecision {
    /// Whether the drag ends on a different page than it started from.
    pub fn changed_page(&self) -> bool {
        self.target_page != self.start_page
    }
}

/// Begin/change/end state machine for horizontal drags.
#[derive(Clone, Copy, Debug, Default)]
pub struct GestureInterpreter {
    state: GestureState,
}

impl GestureInterpreter {
    /// Creates an idle interpreter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Starts a drag from `offset`. A begin during a drag restarts it.
    pub fn begin(&mut self, offset: f32) {
        if self.is_dragging() {
            debug!("drag restarted before release");
        }
        self.state = GestureState::Dragging(GestureSession {
            start_offset: offset,
            translation_x: 0.0,
        });
    }

    /// Returns the offset the carousel should show for `translation_x`.
    ///
    /// Past a non-looping bound the overshoot is damped. Returns `None` when
    /// no drag is in progress.
    pub fn update(&mut self, position: &PagePosition, translation_x: f32) -> Option<f32> {
        let GestureState::Dragging(session) = &mut self.state else {
            debug!(translation_x, "drag change without begin ignored");
            return None;
        };
        session.translation_x = translation_x;
        Some(position.rubber_band(session.start_offset + translation_x))
    }

    /// Finishes the drag and decides which page to settle on.
    ///
    /// A release faster than [`FLING_VELOCITY_THRESHOLD`] moves one page
    /// against the velocity. Slower releases move one page in the drag
    /// direction when the drag covered more than [`SNAP_PROGRESS_THRESHOLD`]
    /// of a page, measured modulo the page width, and snap back otherwise.
    /// Returns `None` when no drag is in progress.
    pub fn end(
        &mut self,
        position: &PagePosition,
        translation_x: f32,
        velocity_x: f32,
    ) -> Option<SnapDecision> {
        let GestureState::Dragging(session) = std::mem::take(&mut self.state) else {
            debug!(translation_x, velocity_x, "drag end without begin ignored");
            return None;
        };

        let start_page = position.current_page(session.start_offset);
        let page_width = position.page_width();
        let step = if velocity_x.abs() > FLING_VELOCITY_THRESHOLD {
            if velocity_x > 0.0 { -1 } else { 1 }
        } else {
            let progress = (translation_x.abs() % page_width) / page_width;
            if progress > SNAP_PROGRESS_THRESHOLD {
                if translation_x > 0.0 { -1 } else { 1 }
            } else {
                0
            }
        };
        let target_page = position.bound_page(start_page + step);
        let decision = SnapDecision {
            start_page,
            target_page,
            target_offset: position.offset_for_page(target_page),
            index: position.normalize(target_page),
        };
        debug!(translation_x, velocity_x, ?decision, "drag released");
        Some(decision)
    }

    /// Drops any drag in progress.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}
