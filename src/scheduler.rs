//! Where and when notifications run.
//!
//! Every time-based operator (`interval`, `timer`, `delay`, `debounce` ...)
//! takes a [`Scheduler`] by value. Scheduling can fail, for instance when a
//! thread pool cannot be started; operators turn that failure into a
//! terminal error of the stream they drive.

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};

use futures::future::AbortHandle;

use crate::{error::RxError, subscription::SubscriptionLike};

mod immediate;
mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate::ImmediateScheduler;
pub use test_scheduler::TestScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{SerialScheduler, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// A Scheduler orders tasks and decides on which context they execute.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Run `task` once, after `delay` if one is given.
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static;

  /// Run `task` every `period`, first after `delay` (or after one `period`
  /// when no delay is given). The task receives the tick index and returns
  /// `false` to stop repeating.
  fn schedule_repeating<T>(
    &self,
    task: T,
    period: Duration,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError>
  where
    T: FnMut(usize) -> bool + Send + 'static;

  /// The scheduler's notion of the current time.
  fn now(&self) -> Instant { Instant::now() }
}

/// Cancellation handle of a scheduled task.
///
/// Closing the handle, either by unsubscribing or because the task ran to
/// its end, guarantees that no pending run of the task starts afterwards.
#[derive(Clone, Default)]
pub struct TaskHandle {
  closed: Arc<AtomicBool>,
  abort: Option<AbortHandle>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  pub(crate) fn with_abort(abort: AbortHandle) -> Self {
    TaskHandle { closed: Arc::default(), abort: Some(abort) }
  }

  /// Marks the task as done without aborting a future that is still running.
  pub(crate) fn finish(&self) { self.closed.store(true, Ordering::Release); }
}

impl SubscriptionLike for TaskHandle {
  fn unsubscribe(&mut self) {
    self.closed.store(true, Ordering::Release);
    if let Some(abort) = &self.abort {
      abort.abort();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}
