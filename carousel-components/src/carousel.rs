//! Carousel composition root.
//!
//! ## Usage
//!
//! Create a [`Carousel`] from [`CarouselArgs`] and a timer host, feed it drag
//! events and frame times, and read [`Carousel::placements`] to position the
//! items. Navigation from elsewhere goes through a [`CarouselHandle`].
use std::sync::Arc;

use carousel_ui::{AnimatedValue, Callback, TimerHost};
use tracing::{debug, trace};

use crate::{
    args::{CarouselArgs, ConfigError},
    autoplay::{AutoPlayConfig, AutoPlayScheduler},
    controller::{ControllerConfig, Navigation, PagingController},
    gesture::{DragEvent, GestureInterpreter, SnapDecision},
    layout::{CarouselLayout, ItemPlacement},
    position::PagePosition,
    progress::ProgressReporter,
};

/// Cloneable navigation handle for a [`Carousel`].
///
/// The handle stays valid across [`Carousel::update_args`] and always uses
/// the latest geometry. It does not keep the autoplay timer alive.
#[derive(Clone)]
pub struct CarouselHandle {
    controller: PagingController,
}

impl CarouselHandle {
    /// Moves to the item at `index`. See [`PagingController::scroll_to`].
    pub fn scroll_to(
        &self,
        index: i64,
        animated: bool,
        on_issued: Option<&Callback>,
    ) -> Navigation {
        self.controller.scroll_to(index, animated, on_issued)
    }

    /// Steps one page forward. See [`PagingController::next`].
    pub fn next(&self, on_issued: Option<&Callback>) -> Navigation {
        self.controller.next(on_issued)
    }

    /// Steps one page backward. See [`PagingController::prev`].
    pub fn prev(&self, on_issued: Option<&Callback>) -> Navigation {
        self.controller.prev(on_issued)
    }

    /// Item index of the page nearest to the current offset.
    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }
}

impl std::fmt::Debug for CarouselHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselHandle")
            .field("offset", self.controller.offset())
            .finish()
    }
}

/// A paging carousel: offset, navigation, drags, autoplay and progress.
pub struct Carousel {
    args: CarouselArgs,
    controller: PagingController,
    gesture: GestureInterpreter,
    autoplay: AutoPlayScheduler,
    progress: ProgressReporter,
    layout: CarouselLayout,
}

impl Carousel {
    /// Creates a carousel resting on the first item.
    ///
    /// `args` is not validated; a non-positive page width makes every
    /// computation meaningless. Use [`try_new`](Self::try_new) to check.
    pub fn new(args: CarouselArgs, timers: Arc<dyn TimerHost>) -> Self {
        let offset = AnimatedValue::new(0.0);
        let controller =
            PagingController::new(offset.clone(), ControllerConfig::from_args(&args));
        let progress = ProgressReporter::new(
            offset,
            controller.shared_config(),
            args.on_progress_change.clone(),
        );
        let autoplay =
            AutoPlayScheduler::new(controller.clone(), timers, AutoPlayConfig::from_args(&args));
        debug!(
            data_length = args.data_length,
            page_width = args.page_width(),
            looping = args.looping,
            auto_play = args.auto_play_enabled(),
            "carousel created"
        );
        Self {
            layout: CarouselLayout::from_args(&args),
            args,
            controller,
            gesture: GestureInterpreter::new(),
            autoplay,
            progress,
        }
    }

    /// Validates `args` before creating the carousel.
    pub fn try_new(args: CarouselArgs, timers: Arc<dyn TimerHost>) -> Result<Self, ConfigError> {
        args.validate()?;
        Ok(Self::new(args, timers))
    }

    /// Current args.
    pub fn args(&self) -> &CarouselArgs {
        &self.args
    }

    /// Applies new args in place.
    ///
    /// When page width, item count or wrap mode change, the carousel stays on
    /// the item it was showing (the last one if that item is gone) and the
    /// progress observer is told. A drag in progress keeps its offset and
    /// snaps with the new geometry on release.
    ///
    /// Autoplay is only restarted when its settings change and the progress
    /// observer is only replaced when a different one is passed.
    pub fn update_args(&mut self, args: CarouselArgs) {
        if args == self.args {
            return;
        }
        let previous = self.controller.config().position;
        let config = ControllerConfig::from_args(&args);
        self.controller.configure(config);
        self.autoplay.configure(AutoPlayConfig::from_args(&args));
        if args.on_progress_change != self.args.on_progress_change {
            self.progress.set_observer(args.on_progress_change.clone());
        }
        if !args.gesture_enabled() && self.gesture.is_dragging() {
            debug!("drag dropped, gestures disabled");
            self.gesture.cancel();
        }
        if config.position != previous {
            self.rebase(&previous, &config.position);
        }
        self.layout = CarouselLayout::from_args(&args);
        debug!(
            data_length = args.data_length,
            page_width = args.page_width(),
            looping = args.looping,
            "carousel args updated"
        );
        self.args = args;
    }

    /// Moves the offset onto the page showing the same item under `position`.
    fn rebase(&self, previous: &PagePosition, position: &PagePosition) {
        if self.gesture.is_dragging() {
            self.progress.refresh();
            return;
        }
        let index = previous.normalize(previous.current_page(self.offset().target()));
        let page = position.clamp_page(index as i64);
        let offset = position.offset_for_page(page);
        debug!(index, page, offset, "offset rebased");
        let moved = self.offset().get() != offset;
        self.offset().set(offset);
        if !moved {
            self.progress.refresh();
        }
    }

    /// Returns a navigation handle.
    pub fn handle(&self) -> CarouselHandle {
        CarouselHandle {
            controller: self.controller.clone(),
        }
    }

    /// The shared offset.
    pub fn offset(&self) -> &AnimatedValue {
        self.controller.offset()
    }

    /// The autoplay scheduler.
    pub fn autoplay(&self) -> &AutoPlayScheduler {
        &self.autoplay
    }

    /// Item index of the page nearest to the current offset.
    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }

    /// Fractional page index of the current offset.
    pub fn progress(&self) -> f32 {
        self.progress.progress()
    }

    /// Track geometry.
    pub fn layout(&self) -> &CarouselLayout {
        &self.layout
    }

    /// Item placements for the current offset.
    pub fn placements(&self) -> smallvec::SmallVec<[ItemPlacement; 8]> {
        self.layout.place(self.offset().get())
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Advances running transitions to the given frame time.
    ///
    /// Returns `true` while a transition is still running.
    pub fn tick(&self, frame_nanos: u64) -> bool {
        self.offset().tick(frame_nanos)
    }

    /// Feeds one drag event.
    ///
    /// Returns the snap decision for [`DragEvent::End`].
    pub fn handle_drag(&mut self, event: DragEvent) -> Option<SnapDecision> {
        match event {
            DragEvent::Begin => {
                self.on_drag_begin();
                None
            }
            DragEvent::Change { translation_x } => {
                self.on_drag_change(translation_x);
                None
            }
            DragEvent::End {
                translation_x,
                velocity_x,
            } => self.on_drag_end(translation_x, velocity_x),
        }
    }

    /// Starts a drag: pauses autoplay and notifies `on_begin_snap`.
    pub fn on_drag_begin(&mut self) {
        if !self.args.gesture_enabled() {
            trace!("drag ignored, gestures disabled");
            return;
        }
        self.autoplay.pause();
        let offset = self.offset().get();
        self.gesture.begin(offset);
        if let Some(on_begin_snap) = &self.args.on_begin_snap {
            on_begin_snap.call();
        }
    }

    /// Moves the offset with the drag.
    pub fn on_drag_change(&mut self, translation_x: f32) {
        if !self.args.gesture_enabled() {
            return;
        }
        let position = self.controller.config().position;
        if let Some(offset) = self.gesture.update(&position, translation_x) {
            self.offset().set(offset);
        }
    }

    /// Releases the drag and settles on a page.
    ///
    /// Resumes autoplay, notifies `on_end_snap` with the target index and
    /// `on_snap_to_item` when the target differs from the start page.
    pub fn on_drag_end(&mut self, translation_x: f32, velocity_x: f32) -> Option<SnapDecision> {
        if !self.args.gesture_enabled() {
            return None;
        }
        let position = self.controller.config().position;
        let decision = self.gesture.end(&position, translation_x, velocity_x)?;
        self.offset()
            .animate_to(decision.target_offset, self.args.snap_timing());

        self.autoplay.start();
        if let Some(on_end_snap) = &self.args.on_end_snap {
            on_end_snap.call(decision.index);
        }
        if decision.changed_page()
            && let Some(on_snap_to_item) = &self.args.on_snap_to_item
        {
            on_snap_to_item.call(decision.index);
        }
        Some(decision)
    }
}

impl std::fmt::Debug for Carousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("args", &self.args)
            .field("offset", self.offset())
            .field("gesture", &self.gesture.state())
            .field("autoplay", &self.autoplay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use carousel_ui::{Easing, ManualTimers, TimingConfig};
    use parking_lot::Mutex;

    use super::*;

    const MS: u64 = 1_000_000;

    fn args(n: usize) -> CarouselArgs {
        CarouselArgs::default()
            .data_length(n)
            .item_width(100.0)
            .container_width(100.0)
    }

    fn carousel(args: CarouselArgs) -> (Carousel, Arc<ManualTimers>) {
        let timers = Arc::new(ManualTimers::new());
        (Carousel::new(args, timers.clone()), timers)
    }

    /// Runs any pending transition to completion.
    fn settle(carousel: &Carousel) {
        carousel.tick(0);
        carousel.tick(10_000 * MS);
    }

    fn drag(
        carousel: &mut Carousel,
        translation_x: f32,
        velocity_x: f32,
    ) -> Option<SnapDecision> {
        carousel.handle_drag(DragEvent::Begin);
        carousel.handle_drag(DragEvent::Change { translation_x });
        carousel.handle_drag(DragEvent::End {
            translation_x,
            velocity_x,
        })
    }

    #[derive(Default)]
    struct Events {
        begin: AtomicUsize,
        end: Mutex<Vec<usize>>,
        snap: Mutex<Vec<usize>>,
    }

    fn observed(args: CarouselArgs) -> (CarouselArgs, Arc<Events>) {
        let events = Arc::new(Events::default());
        let (begin, end, snap) = (events.clone(), events.clone(), events.clone());
        let args = args
            .on_begin_snap(move || {
                begin.begin.fetch_add(1, Ordering::SeqCst);
            })
            .on_end_snap(move |index| end.end.lock().push(index))
            .on_snap_to_item(move |index| snap.snap.lock().push(index));
        (args, events)
    }

    #[test]
    fn scroll_to_any_index_without_animation() {
        let (carousel, _timers) = carousel(args(7));
        let handle = carousel.handle();
        for index in [-15, -1, 0, 3, 6, 7, 22] {
            handle.scroll_to(index, false, None);
            assert_eq!(handle.current_index(), index.rem_euclid(7) as usize);
        }
    }

    #[test]
    fn scroll_to_wraps_forward_from_last_page() {
        let (carousel, _timers) = carousel(args(10));
        let handle = carousel.handle();
        carousel.offset().set(-900.0);
        assert_eq!(
            handle.scroll_to(0, true, None),
            Navigation::Animated {
                target: -1000.0,
                duration: Duration::from_millis(250),
            }
        );
        settle(&carousel);
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn next_at_last_page_without_looping_is_blocked() {
        let (carousel, _timers) = carousel(args(5).looping(false));
        let handle = carousel.handle();
        handle.scroll_to(4, false, None);
        assert_eq!(handle.next(None), Navigation::Blocked);
        assert_eq!(carousel.offset().get(), -400.0);
        assert_eq!(handle.current_index(), 4);
    }

    #[test]
    fn drag_past_first_page_is_damped() {
        let (mut carousel, _timers) = carousel(args(5).looping(false));
        carousel.on_drag_begin();
        carousel.on_drag_change(50.0);
        assert!((carousel.offset().get() - 15.0).abs() < 1e-3);
    }

    #[test]
    fn fast_release_moves_back_one_page() {
        let (mut carousel, _timers) = carousel(args(5));
        carousel.handle().scroll_to(2, false, None);
        let decision = drag(&mut carousel, 0.0, 600.0).expect("drag handled");
        assert_eq!(decision.target_page, 1);
        settle(&carousel);
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn release_uses_configured_snap_timing() {
        let timing = TimingConfig::new(Duration::from_millis(120), Easing::Linear);
        let (mut carousel, _timers) = carousel(args(5).animation(timing));
        drag(&mut carousel, -70.0, 0.0);
        assert_eq!(carousel.offset().active_timing(), Some(timing));
        carousel.tick(0);
        carousel.tick(60 * MS);
        assert!((carousel.offset().get() + 85.0).abs() < 1e-3);
    }

    #[test]
    fn progress_follows_offset() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (carousel, _timers) =
            carousel(args(5).on_progress_change(move |progress| sink.lock().push(progress)));
        carousel.offset().set(-150.0);
        assert!((carousel.progress() - 1.5).abs() < 1e-4);
        assert_eq!(*seen.lock(), vec![1.5]);
    }

    #[test]
    fn autoplay_advances_until_paused() {
        let (carousel, timers) = carousel(args(5).auto_play(true));
        for expected in 1..=3 {
            timers.advance(Duration::from_millis(3000));
            settle(&carousel);
            assert_eq!(carousel.current_index(), expected);
        }
        carousel.autoplay().pause();
        timers.advance(Duration::from_millis(9000));
        settle(&carousel);
        assert_eq!(carousel.current_index(), 3);
    }

    #[test]
    fn pause_before_firing_suppresses_it() {
        let (carousel, timers) = carousel(args(5).auto_play(true));
        timers.advance(Duration::from_millis(2999));
        carousel.autoplay().pause();
        timers.advance(Duration::from_millis(1));
        assert_eq!(carousel.offset().target(), 0.0);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn drag_pauses_and_release_restarts_autoplay() {
        let (mut carousel, timers) = carousel(args(5).auto_play(true));
        timers.advance(Duration::from_millis(2000));
        carousel.on_drag_begin();
        assert!(!carousel.autoplay().is_running());
        timers.advance(Duration::from_millis(5000));
        assert_eq!(carousel.offset().target(), 0.0);

        carousel.on_drag_end(0.0, 0.0);
        assert!(carousel.autoplay().is_running());
        settle(&carousel);
        timers.advance(Duration::from_millis(3000));
        assert_eq!(carousel.offset().target(), -100.0);
    }

    #[test]
    fn release_notifies_end_snap_once_and_snap_to_item_on_change() {
        let (args, events) = observed(args(5));
        let (mut carousel, _timers) = carousel(args);

        drag(&mut carousel, -70.0, 0.0);
        settle(&carousel);
        drag(&mut carousel, -20.0, 0.0);
        settle(&carousel);
        drag(&mut carousel, 10.0, 900.0);

        assert_eq!(events.begin.load(Ordering::SeqCst), 3);
        assert_eq!(*events.end.lock(), vec![1, 1, 0]);
        assert_eq!(*events.snap.lock(), vec![1, 0]);
    }

    #[test]
    fn looping_release_before_first_page_reports_last_index() {
        let (args, events) = observed(args(4));
        let (mut carousel, _timers) = carousel(args);
        drag(&mut carousel, 60.0, 0.0);
        assert_eq!(*events.end.lock(), vec![3]);
        assert_eq!(*events.snap.lock(), vec![3]);
        settle(&carousel);
        assert_eq!(carousel.offset().get(), 100.0);
        assert_eq!(carousel.current_index(), 3);
    }

    #[test]
    fn single_item_ignores_drags_and_autoplay() {
        let (args, events) = observed(args(1).auto_play(true));
        let (mut carousel, timers) = carousel(args);
        assert_eq!(drag(&mut carousel, -80.0, -900.0), None);
        assert_eq!(carousel.offset().get(), 0.0);
        assert_eq!(events.begin.load(Ordering::SeqCst), 0);
        assert_eq!(timers.pending(), 0);

        let called = Arc::new(AtomicUsize::new(0));
        let sink = called.clone();
        let continuation = Callback::new(move || {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(carousel.handle().next(Some(&continuation)), Navigation::Noop);
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_args_keeps_item_and_handle() {
        let (mut carousel, timers) = carousel(args(5));
        let handle = carousel.handle();
        handle.scroll_to(2, false, None);

        carousel.update_args(args(5).item_width(50.0).auto_play(true));
        assert_eq!(carousel.offset().get(), -100.0);
        assert_eq!(handle.current_index(), 2);
        assert_eq!(timers.pending(), 1);

        handle.scroll_to(1, false, None);
        assert_eq!(carousel.offset().get(), -50.0);
        assert_eq!(handle.current_index(), 1);
    }

    #[test]
    fn shrinking_bounded_carousel_settles_on_last_item() {
        let (mut carousel, _timers) = carousel(args(5).looping(false));
        carousel.handle().scroll_to(4, false, None);

        carousel.update_args(args(3).looping(false));
        assert_eq!(carousel.offset().get(), -200.0);
        assert_eq!(carousel.controller.current_page(), 2);
        assert_eq!(carousel.current_index(), 2);
        assert_eq!(carousel.handle().next(None), Navigation::Blocked);
    }

    #[test]
    fn leaving_loop_mode_keeps_item_within_bounds() {
        let (mut carousel, _timers) = carousel(args(5));
        carousel.handle().scroll_to(4, false, None);
        assert_eq!(carousel.offset().get(), 100.0);

        carousel.update_args(args(5).looping(false));
        assert_eq!(carousel.offset().get(), -400.0);
        assert_eq!(carousel.current_index(), 4);
        assert_eq!(carousel.progress(), 4.0);
    }

    #[test]
    fn update_args_during_transition_rebases_its_target() {
        let (mut carousel, _timers) = carousel(args(5));
        carousel.handle().scroll_to(2, true, None);
        carousel.tick(0);
        carousel.tick(100 * MS);

        carousel.update_args(args(5).item_width(40.0));
        assert!(!carousel.offset().is_animating());
        assert_eq!(carousel.offset().get(), -80.0);
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn update_args_keeps_drag_offset() {
        let (mut carousel, _timers) = carousel(args(5));
        carousel.on_drag_begin();
        carousel.on_drag_change(-30.0);
        carousel.update_args(args(3));
        assert!(carousel.is_dragging());
        assert_eq!(carousel.offset().get(), -30.0);
    }

    #[test]
    fn update_args_reports_progress_for_new_geometry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let base = args(5).on_progress_change(move |progress| sink.lock().push(progress));
        let (mut carousel, _timers) = carousel(base.clone());
        carousel.handle().scroll_to(4, false, None);
        assert_eq!(*seen.lock(), vec![4.0]);

        carousel.update_args(base.clone().data_length(3));
        assert_eq!(*seen.lock(), vec![4.0, 2.0]);

        carousel.update_args(base.data_length(3).looping(false));
        assert_eq!(*seen.lock(), vec![4.0, 2.0, 2.0]);
        assert_eq!(carousel.progress(), 2.0);
    }

    #[test]
    fn update_args_with_same_autoplay_keeps_timer() {
        let (mut carousel, timers) = carousel(args(5).auto_play(true));
        timers.advance(Duration::from_millis(2000));
        carousel.update_args(args(5).auto_play(true).container_width(300.0));
        timers.advance(Duration::from_millis(1000));
        assert_eq!(carousel.offset().target(), -100.0);
        assert_eq!(carousel.layout().place(0.0)[0].translate_x, 100.0);
    }

    #[test]
    fn update_args_replaces_progress_observer() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let sink = first.clone();
        let (mut carousel, _timers) = carousel(args(5).on_progress_change(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        let sink = second.clone();
        carousel.update_args(args(5).on_progress_change(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        carousel.offset().set(-100.0);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_new_rejects_invalid_args() {
        let timers = Arc::new(ManualTimers::new());
        let result = Carousel::try_new(CarouselArgs::default().data_length(3), timers);
        assert!(matches!(result, Err(ConfigError::InvalidPageWidth { .. })));
    }

    #[test]
    fn dropping_carousel_cancels_autoplay() {
        let (carousel, timers) = carousel(args(5).auto_play(true));
        let handle = carousel.handle();
        drop(carousel);
        assert_eq!(timers.pending(), 0);
        assert_eq!(
            handle.next(None),
            Navigation::Animated {
                target: -100.0,
                duration: Duration::from_millis(500),
            }
        );
    }
}
