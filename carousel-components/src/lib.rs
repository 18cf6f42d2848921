//! Paging carousel engine.
//!
//! # Usage
//!
//! Describe the carousel with [`args::CarouselArgs`], create a
//! [`carousel::Carousel`] with a timer host, then drive it from the host:
//! forward drag events, call [`carousel::Carousel::tick`] every frame, and
//! position items from [`carousel::Carousel::placements`].
//!
//! # Example
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use carousel_components::{
//!     args::CarouselArgs,
//!     carousel::Carousel,
//!     gesture::DragEvent,
//! };
//! use carousel_ui::ManualTimers;
//!
//! let timers = Arc::new(ManualTimers::new());
//! let args = CarouselArgs::default()
//!     .data_length(4)
//!     .item_width(300.0)
//!     .spacing(20.0)
//!     .container_width(360.0)
//!     .on_snap_to_item(|index| println!("now showing item {index}"));
//! let mut carousel = Carousel::try_new(args, timers.clone()).expect("valid args");
//!
//! carousel.handle_drag(DragEvent::Begin);
//! carousel.handle_drag(DragEvent::Change { translation_x: -200.0 });
//! carousel.handle_drag(DragEvent::End { translation_x: -200.0, velocity_x: 0.0 });
//!
//! carousel.tick(0);
//! carousel.tick(Duration::from_millis(500).as_nanos() as u64);
//! assert_eq!(carousel.current_index(), 1);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod args;
pub mod autoplay;
pub mod carousel;
pub mod controller;
pub mod gesture;
pub mod layout;
pub mod position;
pub mod progress;

pub use args::{CarouselArgs, ConfigError};
pub use carousel::{Carousel, CarouselHandle};
