//! Easing curves and timing configuration for timed transitions.

use std::time::Duration;

/// Duration of the default snap transition.
pub const DEFAULT_SNAP_DURATION: Duration = Duration::from_millis(500);

/// Interpolation curve applied to the linear progress of a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    /// Progress is used as-is.
    Linear,
    /// CSS-style cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier {
        /// X of the first control point.
        x1: f32,
        /// Y of the first control point.
        y1: f32,
        /// X of the second control point.
        x2: f32,
        /// Y of the second control point.
        y2: f32,
    },
}

impl Easing {
    /// Ease-out curve used by the default snap transition.
    pub const SNAP: Easing = Easing::CubicBezier {
        x1: 0.25,
        y1: 1.0,
        x2: 0.5,
        y2: 1.0,
    };

    /// Maps a linear fraction in `0.0..=1.0` to an eased fraction.
    pub fn transform(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => fraction,
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                cubic_bezier_easing(fraction, x1, y1, x2, y2)
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::SNAP
    }
}

fn cubic_bezier(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let u = 1.0 - t;
    (u * u * u * a) + (3.0 * u * u * t * b) + (3.0 * u * t * t * c) + (t * t * t * d)
}

fn cubic_bezier_easing(progress: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut t = progress;

    for _ in 0..20 {
        let mid = (lo + hi) * 0.5;
        let mid_x = cubic_bezier(mid, 0.0, x1, x2, 1.0);
        if mid_x < progress {
            lo = mid;
        } else {
            hi = mid;
        }
        t = mid;
    }

    cubic_bezier(t, 0.0, y1, y2, 1.0)
}

/// Duration and curve of a timed transition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Total length of the transition.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub duration: Duration,
    /// Curve applied to the elapsed fraction.
    pub easing: Easing,
}

impl TimingConfig {
    /// Creates a config with the given duration and curve.
    pub const fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }

    /// Returns a copy with a different duration, keeping the curve.
    pub fn with_duration(self, duration: Duration) -> Self {
        Self { duration, ..self }
    }
}

impl Default for TimingConfig {
    /// 500 ms with `cubic-bezier(0.25, 1, 0.5, 1)`.
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_DURATION, Easing::SNAP)
    }
}

/// Serializes a [`Duration`] as whole milliseconds.
#[cfg(feature = "serde")]
pub mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes the duration as milliseconds.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    /// Reads milliseconds into a duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
