//! Virtual-time scheduler for deterministic tests of time-based operators.
//!
//! Time only moves when the test says so:
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::{sync::{Arc, Mutex}, time::Duration};
//!
//! let scheduler = TestScheduler::default();
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! observable::timer(7, Duration::from_millis(100), scheduler.clone())
//!   .subscribe(move |v| c_seen.lock().unwrap().push(v));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(seen.lock().unwrap().is_empty());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(*seen.lock().unwrap(), vec![7]);
//! ```

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{Scheduler, TaskHandle};
use crate::{error::RxError, subscription::SubscriptionLike};

enum Job {
  Once(Box<dyn FnOnce() + Send>),
  Repeating { task: Box<dyn FnMut(usize) -> bool + Send>, period: Duration, tick: usize },
}

struct ScheduledTask {
  at: Duration,
  id: usize,
  job: Job,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.at == other.at && self.id == other.id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by id
    other.at.cmp(&self.at).then_with(|| other.id.cmp(&self.id))
  }
}

struct TestState {
  origin: Instant,
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_id: usize,
}

/// A scheduler whose clock only advances through [`advance_by`] and
/// [`flush`]. Due tasks run on the thread that advances the clock, in due
/// time order and FIFO among equal times.
///
/// Clones share one clock and one queue.
///
/// [`advance_by`]: TestScheduler::advance_by
/// [`flush`]: TestScheduler::flush
#[derive(Clone)]
pub struct TestScheduler(Arc<Mutex<TestState>>);

impl Default for TestScheduler {
  fn default() -> Self {
    TestScheduler(Arc::new(Mutex::new(TestState {
      origin: Instant::now(),
      now: Duration::ZERO,
      queue: BinaryHeap::new(),
      next_id: 0,
    })))
  }
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Virtual time elapsed since the scheduler was created.
  pub fn elapsed(&self) -> Duration { self.0.lock().now }

  /// Number of tasks waiting to run, cancelled ones included.
  pub fn pending_tasks(&self) -> usize { self.0.lock().queue.len() }

  /// Move the clock forward by `duration`, running every task that falls
  /// due on the way.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.0.lock().now + duration;
    self.run_until(target);
  }

  /// Run everything currently queued, moving the clock to the latest due
  /// time among the queued tasks. Repeating tasks tick along up to that
  /// point but are not drained.
  pub fn flush(&self) {
    let target = {
      let state = self.0.lock();
      state.queue.iter().map(|t| t.at).max().unwrap_or(state.now)
    };
    self.run_until(target);
  }

  fn push(&self, delay: Duration, job: Job, handle: TaskHandle) {
    let mut state = self.0.lock();
    let id = state.next_id;
    state.next_id += 1;
    let at = state.now + delay;
    state.queue.push(ScheduledTask { at, id, job, handle });
  }

  fn run_until(&self, target: Duration) {
    loop {
      let task = {
        let mut state = self.0.lock();
        match state.queue.peek() {
          Some(task) if task.at <= target => {
            let task = state.queue.pop();
            if let Some(task) = &task {
              state.now = task.at;
            }
            task
          }
          _ => None,
        }
      };
      let Some(ScheduledTask { at, job, handle, .. }) = task else {
        break;
      };
      if handle.is_closed() {
        continue;
      }
      // Tasks run without the state lock so they can schedule more work.
      match job {
        Job::Once(task) => {
          handle.finish();
          task();
        }
        Job::Repeating { mut task, period, tick } => {
          if task(tick) && !handle.is_closed() {
            let mut state = self.0.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.queue.push(ScheduledTask {
              at: at + period,
              id,
              job: Job::Repeating { task, period, tick: tick + 1 },
              handle,
            });
          } else {
            handle.finish();
          }
        }
      }
    }
    let mut state = self.0.lock();
    if state.now < target {
      state.now = target;
    }
  }
}

impl Scheduler for TestScheduler {
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static,
  {
    let handle = TaskHandle::new();
    self.push(delay.unwrap_or_default(), Job::Once(Box::new(task)), handle.clone());
    Ok(handle)
  }

  fn schedule_repeating<T>(
    &self,
    task: T,
    period: Duration,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError>
  where
    T: FnMut(usize) -> bool + Send + 'static,
  {
    let handle = TaskHandle::new();
    let job = Job::Repeating { task: Box::new(task), period, tick: 0 };
    self.push(delay.unwrap_or(period), job, handle.clone());
    Ok(handle)
  }

  fn now(&self) -> Instant {
    let state = self.0.lock();
    state.origin + state.now
  }
}
