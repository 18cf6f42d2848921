//! Timer-driven automatic paging.
//!
//! The scheduler keeps at most one timer pending. When it fires, the
//! scheduler asks the [`PagingController`] for the next (or previous) page and
//! passes its own reschedule as the continuation, so the following timer
//! starts as soon as the step is issued rather than when it settles.
use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use carousel_ui::{Callback, TimerHost, TimerId};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace};

use crate::{
    args::{CarouselArgs, DEFAULT_AUTO_PLAY_INTERVAL},
    controller::{Navigation, PagingController},
};

/// Autoplay settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoPlayConfig {
    /// Whether the timer may run at all.
    pub enabled: bool,
    /// Delay between two advances.
    pub interval: Duration,
    /// Step backwards instead of forwards.
    pub reverse: bool,
}

impl AutoPlayConfig {
    /// Derives autoplay settings from carousel args.
    ///
    /// Autoplay is only enabled when there is more than one item.
    pub fn from_args(args: &CarouselArgs) -> Self {
        Self {
            enabled: args.auto_play_enabled(),
            interval: args.auto_play_interval,
            reverse: args.auto_play_reverse,
        }
    }
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_AUTO_PLAY_INTERVAL,
            reverse: false,
        }
    }
}

struct SchedulerState {
    config: AutoPlayConfig,
    stopped: bool,
    pending: Option<TimerId>,
    /// Bumped on every schedule so a task that lost a race can tell.
    generation: u64,
}

struct SchedulerInner {
    controller: PagingController,
    timers: Arc<dyn TimerHost>,
    state: Mutex<SchedulerState>,
    /// Held by a firing from its `stopped` check until the step is issued,
    /// and by `pause`, so no step starts once `pause` has returned.
    driver: ReentrantMutex<()>,
}

impl SchedulerInner {
    fn schedule_advance(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        if let Some(id) = state.pending.take() {
            self.timers.cancel(id);
        }
        state.generation += 1;
        let generation = state.generation;
        let weak = Arc::downgrade(self);
        let id = self.timers.schedule(
            state.config.interval,
            Callback::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire(generation);
                }
            }),
        );
        trace!(?id, interval = ?state.config.interval, "autoplay scheduled");
        state.pending = Some(id);
    }

    fn fire(self: &Arc<Self>, generation: u64) {
        let _driving = self.driver.lock();
        let reverse = {
            let mut state = self.state.lock();
            if state.generation != generation {
                trace!(generation, "stale autoplay timer ignored");
                return;
            }
            state.pending = None;
            if state.stopped {
                return;
            }
            state.config.reverse
        };

        let reschedule = reschedule_callback(Arc::downgrade(self));
        let navigation = if reverse {
            self.controller.prev(Some(&reschedule))
        } else {
            self.controller.next(Some(&reschedule))
        };
        if navigation == Navigation::Blocked {
            debug!(reverse, "autoplay reached a bound, waiting for restart");
        }
    }

    fn cancel_pending(&self, state: &mut SchedulerState) {
        if let Some(id) = state.pending.take() {
            self.timers.cancel(id);
        }
    }
}

impl Drop for SchedulerInner {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().pending.take() {
            self.timers.cancel(id);
        }
    }
}

fn reschedule_callback(weak: Weak<SchedulerInner>) -> Callback {
    Callback::new(move || {
        if let Some(inner) = weak.upgrade() {
            inner.schedule_advance();
        }
    })
}

/// Advances a carousel on a fixed interval.
///
/// `start` and `pause` are idempotent and do nothing while autoplay is
/// disabled. Dropping the scheduler cancels its pending timer.
pub struct AutoPlayScheduler {
    inner: Arc<SchedulerInner>,
}

impl AutoPlayScheduler {
    /// Creates a scheduler and starts it when `config` is enabled.
    pub fn new(
        controller: PagingController,
        timers: Arc<dyn TimerHost>,
        config: AutoPlayConfig,
    ) -> Self {
        let scheduler = Self {
            inner: Arc::new(SchedulerInner {
                controller,
                timers,
                state: Mutex::new(SchedulerState {
                    config,
                    stopped: true,
                    pending: None,
                    generation: 0,
                }),
                driver: ReentrantMutex::new(()),
            }),
        };
        scheduler.start();
        scheduler
    }

    /// Current settings.
    pub fn config(&self) -> AutoPlayConfig {
        self.inner.state.lock().config
    }

    /// Resumes automatic paging with a full interval.
    pub fn start(&self) {
        {
            let mut state = self.inner.state.lock();
            if !state.config.enabled {
                return;
            }
            state.stopped = false;
        }
        self.inner.schedule_advance();
    }

    /// Stops automatic paging until the next [`start`](Self::start).
    ///
    /// Waits for a firing that is already issuing its step.
    pub fn pause(&self) {
        let _driving = self.inner.driver.lock();
        let mut state = self.inner.state.lock();
        if !state.config.enabled {
            return;
        }
        self.inner.cancel_pending(&mut state);
        state.stopped = true;
    }

    /// Applies new settings.
    ///
    /// Enabling starts the scheduler, disabling stops it, and changing the
    /// interval or direction restarts the wait from zero. Identical settings
    /// leave a running timer untouched.
    pub fn configure(&self, config: AutoPlayConfig) {
        {
            let _driving = self.inner.driver.lock();
            let mut state = self.inner.state.lock();
            if state.config == config {
                return;
            }
            debug!(?config, "autoplay reconfigured");
            self.inner.cancel_pending(&mut state);
            state.config = config;
            state.stopped = true;
        }
        self.start();
    }

    /// Cancels the pending timer and stops, regardless of the enabled flag.
    pub fn teardown(&self) {
        let _driving = self.inner.driver.lock();
        let mut state = self.inner.state.lock();
        self.inner.cancel_pending(&mut state);
        state.stopped = true;
    }

    /// Whether the scheduler is started.
    pub fn is_running(&self) -> bool {
        !self.inner.state.lock().stopped
    }

    /// Whether a timer is waiting to fire.
    pub fn has_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }
}

impl std::fmt::Debug for AutoPlayScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AutoPlayScheduler")
            .field("config", &state.config)
            .field("stopped", &state.stopped)
            .field("pending", &state.pending)
            .finish()
    }
}
