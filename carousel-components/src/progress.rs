//! Continuous page progress.
use std::sync::Arc;

use carousel_ui::{AnimatedValue, CallbackWith, SubscriptionId};
use parking_lot::RwLock;
use tracing::trace;

use crate::{controller::ControllerConfig, position::PagePosition};

/// Fractional page index for `offset`.
///
/// Looping carousels fold the result into `[0, n)`; others clamp it to
/// `[0, n - 1]`. An empty carousel always reports 0.
pub fn progress_for(position: &PagePosition, offset: f32) -> f32 {
    let n = position.data_length() as f32;
    if position.data_length() == 0 {
        return 0.0;
    }
    let raw = -offset / position.page_width();
    if position.is_looping() {
        ((raw % n) + n) % n
    } else {
        raw.clamp(0.0, n - 1.0)
    }
}

/// Pushes progress to a host observer on every offset change.
///
/// The observer runs synchronously inside the offset update. Dropping the
/// reporter detaches it.
pub struct ProgressReporter {
    offset: AnimatedValue,
    config: Arc<RwLock<ControllerConfig>>,
    observer: Option<CallbackWith<f32>>,
    subscription: Option<SubscriptionId>,
}

impl ProgressReporter {
    /// Creates a reporter reading geometry from the shared controller config.
    pub(crate) fn new(
        offset: AnimatedValue,
        config: Arc<RwLock<ControllerConfig>>,
        observer: Option<CallbackWith<f32>>,
    ) -> Self {
        let mut reporter = Self {
            offset,
            config,
            observer: None,
            subscription: None,
        };
        reporter.set_observer(observer);
        reporter
    }

    /// Progress for the current offset.
    pub fn progress(&self) -> f32 {
        let position = self.config.read().position;
        progress_for(&position, self.offset.get())
    }

    /// Replaces the host observer. `None` detaches it.
    pub fn set_observer(&mut self, observer: Option<CallbackWith<f32>>) {
        if let Some(id) = self.subscription.take() {
            self.offset.unsubscribe(id);
        }
        self.observer = observer.clone();
        let Some(observer) = observer else {
            return;
        };
        let config = self.config.clone();
        self.subscription = Some(self.offset.subscribe(move |offset: f32| {
            let position = config.read().position;
            let progress = progress_for(&position, offset);
            trace!(offset, progress, "progress");
            observer.call(progress);
        }));
    }

    /// Pushes the current progress to the observer.
    ///
    /// Needed after the geometry changes without the offset moving.
    pub fn refresh(&self) {
        if let Some(observer) = &self.observer {
            let progress = self.progress();
            trace!(progress, "progress refreshed");
            observer.call(progress);
        }
    }

    /// Whether a host observer is attached.
    pub fn is_observed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.offset.unsubscribe(id);
        }
    }
}
