//! Carousel configuration.
//!
//! ## Usage
//!
//! Build a [`CarouselArgs`] with its setters, then hand it to
//! [`Carousel::new`](crate::carousel::Carousel::new) or
//! [`Carousel::update_args`](crate::carousel::Carousel::update_args).
use std::time::Duration;

use carousel_ui::{Callback, CallbackWith, TimingConfig};
use derive_setters::Setters;
use thiserror::Error;

/// Default delay between two autoplay advances.
pub const DEFAULT_AUTO_PLAY_INTERVAL: Duration = Duration::from_millis(3000);

/// Errors reported by [`CarouselArgs::validate`] and JSON loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `item_width + spacing` is not a positive finite number.
    #[error("page width must be positive and finite, got {item_width} + {spacing}")]
    InvalidPageWidth {
        /// Configured item width.
        item_width: f32,
        /// Configured spacing.
        spacing: f32,
    },
    /// Autoplay is on but would fire continuously.
    #[error("autoplay interval must be greater than zero")]
    ZeroAutoPlayInterval,
    /// The JSON document could not be parsed.
    #[cfg(feature = "serde")]
    #[error("invalid carousel config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Arguments for configuring a [`Carousel`](crate::carousel::Carousel).
///
/// The defaults describe an empty looping carousel; `data_length` and the
/// widths must be set before the carousel is usable.
#[derive(Clone, PartialEq, Debug, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CarouselArgs {
    /// Number of logical items.
    pub data_length: usize,
    /// Width of a single item.
    pub item_width: f32,
    /// Gap between two neighbouring items.
    pub spacing: f32,
    /// Width of the visible viewport. Items are centered inside it.
    pub container_width: f32,
    /// Whether page indices wrap around. Defaults to `true`.
    pub looping: bool,
    /// Timing for snaps and page steps. `None` uses the default snap timing.
    #[setters(strip_option)]
    pub animation: Option<TimingConfig>,
    /// Whether pages advance automatically. Defaults to `false`.
    pub auto_play: bool,
    /// Delay between two automatic advances. Defaults to 3 seconds.
    #[cfg_attr(feature = "serde", serde(with = "carousel_ui::easing::duration_ms"))]
    pub auto_play_interval: Duration,
    /// Autoplay walks backwards when set.
    pub auto_play_reverse: bool,
    /// Called when a drag starts.
    #[setters(skip)]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_begin_snap: Option<Callback>,
    /// Called on every drag release with the index being snapped to.
    #[setters(skip)]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_end_snap: Option<CallbackWith<usize>>,
    /// Called on drag release only when the release lands on another page.
    #[setters(skip)]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_snap_to_item: Option<CallbackWith<usize>>,
    /// Receives the normalized progress after every offset change.
    #[setters(skip)]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_progress_change: Option<CallbackWith<f32>>,
}

impl Default for CarouselArgs {
    fn default() -> Self {
        Self {
            data_length: 0,
            item_width: 0.0,
            spacing: 0.0,
            container_width: 0.0,
            looping: true,
            animation: None,
            auto_play: false,
            auto_play_interval: DEFAULT_AUTO_PLAY_INTERVAL,
            auto_play_reverse: false,
            on_begin_snap: None,
            on_end_snap: None,
            on_snap_to_item: None,
            on_progress_change: None,
        }
    }
}

impl CarouselArgs {
    /// Distance between the starts of two neighbouring items.
    pub fn page_width(&self) -> f32 {
        self.item_width + self.spacing
    }

    /// Timing used by snaps and page steps.
    pub fn snap_timing(&self) -> TimingConfig {
        self.animation.unwrap_or_default()
    }

    /// Whether drags are interpreted. Needs more than one item.
    pub fn gesture_enabled(&self) -> bool {
        self.data_length > 1
    }

    /// Whether the autoplay timer may run. Needs more than one item.
    pub fn auto_play_enabled(&self) -> bool {
        self.auto_play && self.data_length > 1
    }

    /// Checks the preconditions the engine itself never verifies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let page_width = self.page_width();
        if !page_width.is_finite() || page_width <= 0.0 {
            return Err(ConfigError::InvalidPageWidth {
                item_width: self.item_width,
                spacing: self.spacing,
            });
        }
        if self.auto_play && self.auto_play_interval.is_zero() {
            return Err(ConfigError::ZeroAutoPlayInterval);
        }
        Ok(())
    }

    /// Parses and validates args from a JSON document.
    ///
    /// Missing fields keep their defaults; callbacks are never read.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let args: Self = serde_json::from_str(json)?;
        args.validate()?;
        Ok(args)
    }

    /// Sets the drag-start handler.
    pub fn on_begin_snap<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_begin_snap = Some(Callback::new(handler));
        self
    }

    /// Sets the release handler.
    pub fn on_end_snap<F>(mut self, handler: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_end_snap = Some(CallbackWith::new(handler));
        self
    }

    /// Sets the page-change handler.
    pub fn on_snap_to_item<F>(mut self, handler: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_snap_to_item = Some(CallbackWith::new(handler));
        self
    }

    /// Sets the progress observer.
    pub fn on_progress_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.on_progress_change = Some(CallbackWith::new(handler));
        self
    }

    /// Sets the progress observer using a shared handle.
    pub fn on_progress_change_shared(mut self, handler: impl Into<CallbackWith<f32>>) -> Self {
        self.on_progress_change = Some(handler.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_component_defaults() {
        let args = CarouselArgs::default();
        assert!(args.looping);
        assert!(!args.auto_play);
        assert!(!args.auto_play_reverse);
        assert_eq!(args.auto_play_interval, Duration::from_millis(3000));
        assert_eq!(args.snap_timing(), TimingConfig::default());
    }

    #[test]
    fn page_width_includes_spacing() {
        let args = CarouselArgs::default().item_width(300.0).spacing(20.0);
        assert_eq!(args.page_width(), 320.0);
    }

    #[test]
    fn single_item_disables_interaction() {
        let args = CarouselArgs::default().data_length(1).auto_play(true);
        assert!(!args.gesture_enabled());
        assert!(!args.auto_play_enabled());
        let args = args.data_length(2);
        assert!(args.gesture_enabled());
        assert!(args.auto_play_enabled());
    }

    #[test]
    fn validate_rejects_bad_page_width() {
        let args = CarouselArgs::default().item_width(10.0).spacing(-10.0);
        assert!(matches!(
            args.validate(),
            Err(ConfigError::InvalidPageWidth { .. })
        ));
        let args = CarouselArgs::default().item_width(f32::NAN);
        assert!(args.validate().is_err());
        assert!(CarouselArgs::default().item_width(1.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_interval_only_with_autoplay() {
        let args = CarouselArgs::default()
            .item_width(100.0)
            .auto_play_interval(Duration::ZERO);
        assert!(args.validate().is_ok());
        assert!(matches!(
            args.auto_play(true).validate(),
            Err(ConfigError::ZeroAutoPlayInterval)
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let args = CarouselArgs::from_json(
            r#"{ "data_length": 4, "item_width": 280.0, "spacing": 12.0, "auto_play_interval": 1500 }"#,
        )
        .expect("valid config");
        assert_eq!(args.data_length, 4);
        assert_eq!(args.page_width(), 292.0);
        assert_eq!(args.auto_play_interval, Duration::from_millis(1500));
        assert!(args.looping);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_is_validated() {
        let err = CarouselArgs::from_json(r#"{ "item_width": 0.0 }"#).expect_err("invalid config");
        assert!(matches!(err, ConfigError::InvalidPageWidth { .. }));
        let err = CarouselArgs::from_json("{ not json").expect_err("invalid config");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
