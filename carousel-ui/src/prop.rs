//! Shared callback handles.
//!
//! ## Usage
//!
//! Store host callbacks in carousel args and pass continuations to
//! navigation calls without boxing closures at every call site.
//!
//! Both handles compare by identity: two handles are equal when they share
//! the same closure allocation. Args holding callbacks stay comparable that
//! way without comparing closures.

use std::sync::Arc;

/// Shared `Fn()` handle.
///
/// Used for notifications without a payload (`on_begin_snap`), the
/// "transition issued" continuations of the paging controller and timer
/// tasks.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Runs the callback.
    pub fn call(&self) {
        (self.0)()
    }
}

impl<F> From<F> for Callback
where
    F: Fn() + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Callback {}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback")
    }
}

/// Shared `Fn(T) -> R` handle.
///
/// Index notifications (`on_end_snap`, `on_snap_to_item`) and value
/// observers (`on_progress_change`) use this shape.
pub struct CallbackWith<T, R = ()>(Arc<dyn Fn(T) -> R + Send + Sync>);

impl<T, R> CallbackWith<T, R> {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Runs the callback with `value`.
    pub fn call(&self, value: T) -> R {
        (self.0)(value)
    }
}

impl<T, R, F> From<F> for CallbackWith<T, R>
where
    F: Fn(T) -> R + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

// Derived impls would require `T: Clone` / `T: PartialEq`.
impl<T, R> Clone for CallbackWith<T, R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T, R> PartialEq for CallbackWith<T, R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T, R> Eq for CallbackWith<T, R> {}

impl<T, R> std::fmt::Debug for CallbackWith<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallbackWith")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn callbacks_compare_by_identity() {
        let a = Callback::new(|| {});
        let b = a.clone();
        let c = Callback::new(|| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn callback_with_forwards_argument() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let cb = CallbackWith::new(move |index: usize| {
            sink.store(index, Ordering::SeqCst);
        });
        cb.call(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
