//! Scripted carousel session.
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use carousel_components::{Carousel, CarouselArgs, CarouselHandle, gesture::DragEvent};
use carousel_ui::{Callback, ManualTimers, ThreadTimers};
use tracing::{debug, info, trace};

const FRAME: Duration = Duration::from_micros(16_667);
const DRAG_FRAMES: u32 = 8;

enum Step {
    Drag { translation_x: f32, velocity_x: f32 },
    ScrollTo(i64),
    Next,
    Prev,
}

fn script(page_width: f32) -> Vec<(Duration, Step)> {
    vec![
        (
            Duration::from_millis(1000),
            Step::Drag {
                translation_x: -0.7 * page_width,
                velocity_x: 0.0,
            },
        ),
        (
            Duration::from_millis(2500),
            Step::Drag {
                translation_x: 0.2 * page_width,
                velocity_x: 800.0,
            },
        ),
        (
            Duration::from_millis(2800),
            Step::Drag {
                translation_x: -0.3 * page_width,
                velocity_x: 0.0,
            },
        ),
        (Duration::from_millis(4000), Step::ScrollTo(3)),
        (Duration::from_millis(5500), Step::Next),
        (Duration::from_millis(7000), Step::Prev),
    ]
}

trait Clock {
    /// Waits one frame and ticks the carousel.
    fn frame(&mut self, carousel: &Carousel);

    fn elapsed(&self) -> Duration;
}

struct SimulatedClock {
    timers: Arc<ManualTimers>,
    now: Duration,
}

impl Clock for SimulatedClock {
    fn frame(&mut self, carousel: &Carousel) {
        self.timers.advance(FRAME);
        self.now += FRAME;
        carousel.tick(self.now.as_nanos() as u64);
    }

    fn elapsed(&self) -> Duration {
        self.now
    }
}

struct WallClock {
    started: Instant,
}

impl Clock for WallClock {
    fn frame(&mut self, carousel: &Carousel) {
        thread::sleep(FRAME);
        carousel.tick(self.started.elapsed().as_nanos() as u64);
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

pub struct Session {
    args: CarouselArgs,
    length: Duration,
    labels: Vec<String>,
}

impl Session {
    pub fn new(args: CarouselArgs, seconds: u64) -> Self {
        let labels = (0..args.data_length).map(|i| format!("Item {i}")).collect();
        Self {
            args,
            length: Duration::from_secs(seconds),
            labels,
        }
    }

    /// Runs on simulated time; finishes as fast as the CPU allows.
    pub fn run_simulated(&self) -> Result<()> {
        let timers = Arc::new(ManualTimers::new());
        let carousel = Carousel::new(self.observed_args(), timers.clone());
        self.run(carousel, SimulatedClock {
            timers,
            now: Duration::ZERO,
        });
        Ok(())
    }

    /// Runs on the wall clock, with autoplay driven by a timer thread.
    pub fn run_realtime(&self) -> Result<()> {
        let timers = Arc::new(ThreadTimers::new()?);
        let carousel = Carousel::new(self.observed_args(), timers);
        self.run(carousel, WallClock {
            started: Instant::now(),
        });
        Ok(())
    }

    fn observed_args(&self) -> CarouselArgs {
        let labels = Arc::new(self.labels.clone());
        self.args
            .clone()
            .on_begin_snap(|| info!("drag started"))
            .on_end_snap(|index| debug!(index, "released"))
            .on_snap_to_item(move |index| {
                let label = labels.get(index).map(String::as_str).unwrap_or("?");
                info!(index, label, "snapped to item");
            })
            .on_progress_change(|progress| trace!(progress, "progress"))
    }

    fn run(&self, mut carousel: Carousel, mut clock: impl Clock) {
        let handle = carousel.handle();
        let mut script = script(self.args.page_width()).into_iter().peekable();
        info!(
            items = self.args.data_length,
            looping = self.args.looping,
            auto_play = self.args.auto_play_enabled(),
            "session started"
        );

        while clock.elapsed() < self.length {
            if let Some((_, step)) = script.next_if(|(at, _)| *at <= clock.elapsed()) {
                self.perform(step, &mut carousel, &handle, &mut clock);
            }
            clock.frame(&carousel);
        }

        self.report(&carousel);
    }

    fn perform(
        &self,
        step: Step,
        carousel: &mut Carousel,
        handle: &CarouselHandle,
        clock: &mut impl Clock,
    ) {
        let issued = Callback::new(|| trace!("transition issued"));
        let navigation = match step {
            Step::Drag {
                translation_x,
                velocity_x,
            } => {
                carousel.handle_drag(DragEvent::Begin);
                for frame in 1..=DRAG_FRAMES {
                    let translation_x = translation_x * frame as f32 / DRAG_FRAMES as f32;
                    carousel.handle_drag(DragEvent::Change { translation_x });
                    clock.frame(carousel);
                }
                let decision = carousel.handle_drag(DragEvent::End {
                    translation_x,
                    velocity_x,
                });
                info!(translation_x, velocity_x, ?decision, "drag finished");
                return;
            }
            Step::ScrollTo(index) => handle.scroll_to(index, true, Some(&issued)),
            Step::Next => handle.next(Some(&issued)),
            Step::Prev => handle.prev(Some(&issued)),
        };
        if navigation.is_issued() {
            info!(?navigation, "navigation issued");
        } else {
            info!(?navigation, "navigation skipped");
        }
    }

    fn report(&self, carousel: &Carousel) {
        let offset = carousel.offset().get();
        info!(
            index = carousel.current_index(),
            progress = carousel.progress(),
            offset,
            "session finished"
        );
        let visible = carousel
            .layout()
            .map_items(&self.labels, offset, |label, index| format!("{label} ({index})"));
        for (placement, label) in visible {
            info!(
                render_index = placement.render_index,
                translate_x = placement.translate_x,
                %label,
                "placement"
            );
        }
    }
}
