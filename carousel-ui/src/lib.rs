//! Runtime primitives for the carousel paging engine.
//!
//! This crate holds the pieces a carousel needs from its host environment,
//! each with a default implementation:
//!
//! - [`Callback`] and [`CallbackWith`], identity-compared shared closures.
//! - [`AnimatedValue`], an observable scalar with immediate and timed setters.
//! - [`Easing`] and [`TimingConfig`] describing timed transitions.
//! - [`TimerHost`] with [`ManualTimers`] and [`ThreadTimers`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use carousel_ui::{AnimatedValue, Easing, TimingConfig};
//!
//! let offset = AnimatedValue::new(0.0);
//! offset.subscribe(|value: f32| println!("offset is now {value}"));
//! offset.animate_to(-320.0, TimingConfig::new(Duration::from_millis(100), Easing::Linear));
//!
//! offset.tick(0);
//! offset.tick(100_000_000);
//! assert_eq!(offset.get(), -320.0);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod animated;
pub mod easing;
pub mod prop;
pub mod timer;

pub use animated::{AnimatedValue, SubscriptionId};
pub use easing::{DEFAULT_SNAP_DURATION, Easing, TimingConfig};
pub use prop::{Callback, CallbackWith};
pub use timer::{ManualTimers, ThreadTimers, TimerError, TimerHost, TimerId};
