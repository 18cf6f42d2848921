//! Imperative page navigation.
//!
//! Every navigation call requests a transition on the shared offset and
//! returns as soon as the request is made. Continuations passed as
//! `on_issued` run at that point, not when the transition settles.
use std::{sync::Arc, time::Duration};

use carousel_ui::{AnimatedValue, Callback, TimingConfig};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{args::CarouselArgs, position::PagePosition};

/// Transition time per page crossed by [`PagingController::scroll_to`].
pub const PAGE_TRAVERSAL_DURATION: Duration = Duration::from_millis(250);

/// Result of a navigation request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Navigation {
    /// A timed transition toward `target` was requested.
    Animated {
        /// Offset the transition settles on.
        target: f32,
        /// Length of the transition.
        duration: Duration,
    },
    /// The offset was moved to `target` without a transition.
    Immediate {
        /// New offset.
        target: f32,
    },
    /// Nothing to navigate: the carousel has at most one item.
    Noop,
    /// The adjacent page lies past a non-looping bound.
    Blocked,
}

impl Navigation {
    /// Whether the offset was or will be moved.
    pub fn is_issued(&self) -> bool {
        matches!(self, Self::Animated { .. } | Self::Immediate { .. })
    }
}

/// Geometry and timing shared by every clone of a controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Page arithmetic.
    pub position: PagePosition,
    /// Transition timing; `None` uses [`TimingConfig::default`].
    pub animation: Option<TimingConfig>,
}

impl ControllerConfig {
    /// Derives the controller config from carousel args.
    pub fn from_args(args: &CarouselArgs) -> Self {
        Self {
            position: PagePosition::from_args(args),
            animation: args.animation,
        }
    }

    fn timing(&self) -> TimingConfig {
        self.animation.unwrap_or_default()
    }
}

/// Navigates a carousel by moving its offset.
///
/// Clones share the offset and the configuration, so a clone handed out
/// before [`configure`](Self::configure) keeps working with the new
/// geometry.
#[derive(Clone)]
pub struct PagingController {
    offset: AnimatedValue,
    config: Arc<RwLock<ControllerConfig>>,
}

impl PagingController {
    /// Creates a controller driving `offset`.
    pub fn new(offset: AnimatedValue, config: ControllerConfig) -> Self {
        Self {
            offset,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Replaces geometry and timing for every clone.
    pub fn configure(&self, config: ControllerConfig) {
        *self.config.write() = config;
    }

    /// Returns the current configuration.
    pub fn config(&self) -> ControllerConfig {
        *self.config.read()
    }

    pub(crate) fn shared_config(&self) -> Arc<RwLock<ControllerConfig>> {
        self.config.clone()
    }

    /// The offset this controller drives.
    pub fn offset(&self) -> &AnimatedValue {
        &self.offset
    }

    /// Page nearest to the current offset, not folded into the item range.
    pub fn current_page(&self) -> i64 {
        self.config().position.current_page(self.offset.get())
    }

    /// Item index of the page nearest to the current offset.
    pub fn current_index(&self) -> usize {
        let position = self.config().position;
        position.normalize(position.current_page(self.offset.get()))
    }

    /// Moves to the item at `index`.
    ///
    /// Any index is accepted and folded into the item range; without looping
    /// the result is additionally clamped. While looping the shorter way
    /// around is taken. Animated moves last [`PAGE_TRAVERSAL_DURATION`] per
    /// page crossed. `on_issued` always runs, including for carousels with a
    /// single item.
    pub fn scroll_to(
        &self,
        index: i64,
        animated: bool,
        on_issued: Option<&Callback>,
    ) -> Navigation {
        let config = self.config();
        let position = config.position;
        if !position.is_navigable() {
            trace!(index, "scroll_to ignored, nothing to navigate");
            notify(on_issued);
            return Navigation::Noop;
        }

        let target_index = position.bound_page(position.normalize(index) as i64);
        let current_offset = self.offset.get();
        let current_index = position.normalize(position.current_page(current_offset)) as i64;
        let diff = position.shortest_diff(current_index, target_index);
        let target = current_offset - diff as f32 * position.page_width();

        let navigation = if animated {
            let duration = PAGE_TRAVERSAL_DURATION * diff.unsigned_abs() as u32;
            self.offset
                .animate_to(target, config.timing().with_duration(duration));
            Navigation::Animated { target, duration }
        } else {
            self.offset.set(target);
            Navigation::Immediate { target }
        };
        debug!(index, target_index, diff, ?navigation, "scroll_to");

        notify(on_issued);
        navigation
    }

    /// Steps one page forward.
    ///
    /// Past the last page of a non-looping carousel nothing happens and
    /// `on_issued` is not called.
    pub fn next(&self, on_issued: Option<&Callback>) -> Navigation {
        self.step(1, on_issued)
    }

    /// Steps one page backward.
    ///
    /// Before the first page of a non-looping carousel nothing happens and
    /// `on_issued` is not called.
    pub fn prev(&self, on_issued: Option<&Callback>) -> Navigation {
        self.step(-1, on_issued)
    }

    fn step(&self, delta: i64, on_issued: Option<&Callback>) -> Navigation {
        let config = self.config();
        let position = config.position;
        if !position.is_navigable() {
            trace!(delta, "step ignored, nothing to navigate");
            notify(on_issued);
            return Navigation::Noop;
        }

        let page = position.current_page(self.offset.get()) + delta;
        if !position.is_looping() && position.clamp_page(page) != page {
            debug!(page, "step blocked at bound");
            return Navigation::Blocked;
        }

        let target = position.offset_for_page(page);
        let timing = config.timing();
        self.offset.animate_to(target, timing);
        debug!(page, target, "step");

        notify(on_issued);
        Navigation::Animated {
            target,
            duration: timing.duration,
        }
    }
}

fn notify(on_issued: Option<&Callback>) {
    if let Some(callback) = on_issued {
        callback.call();
    }
}
