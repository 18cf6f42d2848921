//! One-shot timers used by autoplay.
//!
//! ## Usage
//!
//! Hosts that drive everything from their own frame loop use
//! [`ManualTimers`] and call [`ManualTimers::advance`] once per frame. Hosts
//! without a loop can use [`ThreadTimers`], which fires tasks from a
//! background worker thread.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::{debug, trace};

use crate::prop::Callback;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Errors raised while setting up a timer host.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The worker thread could not be started.
    #[error("failed to spawn timer worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Schedules one-shot tasks after a delay.
///
/// Implementations must not hold internal locks while running a task: tasks
/// commonly schedule or cancel other tasks.
pub trait TimerHost: Send + Sync {
    /// Runs `task` once after `delay`, unless cancelled first.
    fn schedule(&self, delay: Duration, task: Callback) -> TimerId;

    /// Cancels a pending task. Unknown or already fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

impl<T: TimerHost + ?Sized> TimerHost for Arc<T> {
    fn schedule(&self, delay: Duration, task: Callback) -> TimerId {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, id: TimerId) {
        (**self).cancel(id)
    }
}

struct PendingTask<T> {
    id: TimerId,
    due: T,
    task: Callback,
}

fn earliest<T: Ord + Copy>(pending: &[PendingTask<T>]) -> Option<usize> {
    pending
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| (entry.due, entry.id))
        .map(|(index, _)| index)
}

struct ManualState {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask<Duration>>,
}

/// Deterministic timer host driven by explicit calls to [`advance`].
///
/// [`advance`]: ManualTimers::advance
pub struct ManualTimers {
    state: Mutex<ManualState>,
}

impl ManualTimers {
    /// Creates a host whose clock starts at zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: Duration::ZERO,
                next_id: 0,
                pending: Vec::new(),
            }),
        }
    }

    /// Returns the elapsed time since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Returns the number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Moves the clock forward, firing every task that comes due.
    ///
    /// Tasks scheduled by a firing task also run if they fall due within the
    /// same window. Returns the number of tasks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.state.lock().now + by;
        let mut fired = 0;
        loop {
            let task = {
                let mut state = self.state.lock();
                match earliest(&state.pending) {
                    Some(index) if state.pending[index].due <= deadline => {
                        let entry = state.pending.remove(index);
                        state.now = entry.due;
                        entry.task
                    }
                    _ => {
                        state.now = deadline;
                        break;
                    }
                }
            };
            task.call();
            fired += 1;
        }
        fired
    }
}

impl Default for ManualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&self, delay: Duration, task: Callback) -> TimerId {
        let mut state = self.state.lock();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let due = state.now + delay;
        trace!(?id, ?due, "manual timer scheduled");
        state.pending.push(PendingTask { id, due, task });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.state.lock().pending.retain(|entry| entry.id != id);
    }
}

struct WorkerQueue {
    next_id: u64,
    pending: Vec<PendingTask<Instant>>,
    shutdown: bool,
}

struct WorkerShared {
    queue: Mutex<WorkerQueue>,
    wake: Condvar,
}

/// Timer host backed by a dedicated worker thread.
///
/// Tasks run on the worker thread, so anything they touch must be
/// `Send + Sync`. Dropping the host stops the worker; pending tasks are
/// discarded.
pub struct ThreadTimers {
    shared: Arc<WorkerShared>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTimers {
    /// Starts the worker thread.
    pub fn new() -> Result<Self, TimerError> {
        let shared = Arc::new(WorkerShared {
            queue: Mutex::new(WorkerQueue {
                next_id: 0,
                pending: Vec::new(),
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("carousel-timers".into())
            .spawn(move || run_worker(&worker_shared))
            .map_err(TimerError::Spawn)?;
        debug!("timer worker started");
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }
}

fn run_worker(shared: &WorkerShared) {
    let mut queue = shared.queue.lock();
    loop {
        if queue.shutdown {
            return;
        }
        let Some(index) = earliest(&queue.pending) else {
            shared.wake.wait(&mut queue);
            continue;
        };
        let due = queue.pending[index].due;
        if due > Instant::now() {
            shared.wake.wait_until(&mut queue, due);
            continue;
        }
        let entry = queue.pending.remove(index);
        drop(queue);
        entry.task.call();
        queue = shared.queue.lock();
    }
}

impl TimerHost for ThreadTimers {
    fn schedule(&self, delay: Duration, task: Callback) -> TimerId {
        let mut queue = self.shared.queue.lock();
        let id = TimerId(queue.next_id);
        queue.next_id += 1;
        queue.pending.push(PendingTask {
            id,
            due: Instant::now() + delay,
            task,
        });
        self.shared.wake.notify_one();
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut queue = self.shared.queue.lock();
        queue.pending.retain(|entry| entry.id != id);
        self.shared.wake.notify_one();
    }
}

impl Drop for ThreadTimers {
    fn drop(&mut self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.shutdown = true;
            queue.pending.clear();
        }
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            // A task may drop the last handle from the worker thread itself.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}
