//! Observable scalar with immediate and timed setters.
//!
//! [`AnimatedValue`] is the shared offset cell of a carousel. It can be set
//! immediately or asked to move toward a target over time; the transition is
//! advanced by [`AnimatedValue::tick`] with the host's frame time. Observers
//! registered through [`AnimatedValue::subscribe`] run synchronously after
//! every change, before the mutating call returns.
//!
//! Requesting a transition never waits for it. Callers that need to know
//! where the value is heading read [`AnimatedValue::target`].

use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::trace;

use crate::{easing::TimingConfig, prop::CallbackWith};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: f32,
    to: f32,
    config: TimingConfig,
    /// Frame time of the first tick after the request.
    started_at: Option<u64>,
}

impl Tween {
    fn sample(&self, now_nanos: u64) -> (f32, bool) {
        let Some(started_at) = self.started_at else {
            return (self.from, false);
        };
        let duration = self.config.duration.as_nanos() as f64;
        if duration <= 0.0 {
            return (self.to, true);
        }
        let elapsed = now_nanos.saturating_sub(started_at) as f64;
        let fraction = (elapsed / duration).min(1.0) as f32;
        if fraction >= 1.0 {
            return (self.to, true);
        }
        let eased = self.config.easing.transform(fraction);
        (self.from + (self.to - self.from) * eased, false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ValueState {
    Static(f32),
    Animating { current: f32, tween: Tween },
}

impl ValueState {
    fn current(&self) -> f32 {
        match self {
            ValueState::Static(value) => *value,
            ValueState::Animating { current, .. } => *current,
        }
    }
}

/// Handle returned by [`AnimatedValue::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Observers {
    next_id: u64,
    entries: SmallVec<[(SubscriptionId, CallbackWith<f32>); 2]>,
}

struct Inner {
    state: RwLock<ValueState>,
    observers: RwLock<Observers>,
}

/// Shared scalar that can be set immediately or animated toward a target.
///
/// Clones share the same underlying value.
#[derive(Clone)]
pub struct AnimatedValue {
    inner: Arc<Inner>,
}

impl AnimatedValue {
    /// Creates a static value.
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(ValueState::Static(value)),
                observers: RwLock::new(Observers {
                    next_id: 0,
                    entries: SmallVec::new(),
                }),
            }),
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> f32 {
        self.inner.state.read().current()
    }

    /// Returns the value the cell is settling toward.
    ///
    /// Equal to [`get`](Self::get) when no transition is pending.
    pub fn target(&self) -> f32 {
        match *self.inner.state.read() {
            ValueState::Static(value) => value,
            ValueState::Animating { tween, .. } => tween.to,
        }
    }

    /// Returns `true` while a transition is pending or running.
    pub fn is_animating(&self) -> bool {
        matches!(*self.inner.state.read(), ValueState::Animating { .. })
    }

    /// Returns the timing of the pending transition, if any.
    pub fn active_timing(&self) -> Option<TimingConfig> {
        match *self.inner.state.read() {
            ValueState::Static(_) => None,
            ValueState::Animating { tween, .. } => Some(tween.config),
        }
    }

    /// Sets the value immediately, cancelling any running transition.
    pub fn set(&self, value: f32) {
        let changed = {
            let mut state = self.inner.state.write();
            let previous = state.current();
            *state = ValueState::Static(value);
            previous != value
        };
        if changed {
            self.notify(value);
        }
    }

    /// Starts a timed transition from the current value toward `target`.
    ///
    /// The transition starts on the next [`tick`](Self::tick). A zero duration
    /// settles immediately.
    pub fn animate_to(&self, target: f32, config: TimingConfig) {
        if config.duration.is_zero() {
            self.set(target);
            return;
        }
        let mut state = self.inner.state.write();
        let current = state.current();
        trace!(from = current, to = target, ?config, "transition requested");
        *state = ValueState::Animating {
            current,
            tween: Tween {
                from: current,
                to: target,
                config,
                started_at: None,
            },
        };
    }

    /// Advances a running transition to the given frame time.
    ///
    /// Returns `true` while the transition is still running afterwards.
    pub fn tick(&self, frame_nanos: u64) -> bool {
        let (value, changed, running) = {
            let mut state = self.inner.state.write();
            let ValueState::Animating { current, mut tween } = *state else {
                return false;
            };
            if tween.started_at.is_none() {
                tween.started_at = Some(frame_nanos);
            }
            let (value, finished) = tween.sample(frame_nanos);
            *state = if finished {
                ValueState::Static(value)
            } else {
                ValueState::Animating {
                    current: value,
                    tween,
                }
            };
            (value, value != current, !finished)
        };
        if changed {
            self.notify(value);
        }
        running
    }

    /// Registers an observer called with the new value after every change.
    pub fn subscribe(&self, observer: impl Into<CallbackWith<f32>>) -> SubscriptionId {
        let mut observers = self.inner.observers.write();
        let id = SubscriptionId(observers.next_id);
        observers.next_id += 1;
        observers.entries.push((id, observer.into()));
        id
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .observers
            .write()
            .entries
            .retain(|(entry_id, _)| *entry_id != id);
    }

    fn notify(&self, value: f32) {
        // Snapshot so observers may subscribe or read the value re-entrantly.
        let observers: SmallVec<[CallbackWith<f32>; 2]> = self
            .inner
            .observers
            .read()
            .entries
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.call(value);
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl std::fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("state", &*self.inner.state.read())
            .finish()
    }
}
