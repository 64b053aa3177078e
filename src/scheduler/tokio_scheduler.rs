use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use tokio::runtime::Handle;

use super::{Scheduler, TaskHandle};
use crate::{error::RxError, subscription::SubscriptionLike};

/// Runs tasks on a tokio runtime, using tokio timers for delays.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { TokioScheduler { handle } }

  /// Uses the runtime the caller is running in.
  pub fn current() -> Result<Self, RxError> {
    Handle::try_current()
      .map(Self::new)
      .map_err(|e| RxError::SchedulerUnavailable(e.to_string()))
  }
}

impl Scheduler for TokioScheduler {
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static,
  {
    let (abort, registration) = AbortHandle::new_pair();
    let handle = TaskHandle::with_abort(abort);
    let c_handle = handle.clone();
    let fut = async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      if !c_handle.is_closed() {
        c_handle.finish();
        task();
      }
    };
    self.handle.spawn(Abortable::new(fut, registration));
    Ok(handle)
  }

  fn schedule_repeating<T>(
    &self,
    mut task: T,
    period: Duration,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError>
  where
    T: FnMut(usize) -> bool + Send + 'static,
  {
    let (abort, registration) = AbortHandle::new_pair();
    let handle = TaskHandle::with_abort(abort);
    let c_handle = handle.clone();
    let fut = async move {
      tokio::time::sleep(delay.unwrap_or(period)).await;
      let mut tick = 0;
      while !c_handle.is_closed() && task(tick) {
        tick += 1;
        tokio::time::sleep(period).await;
      }
      c_handle.finish();
    };
    self.handle.spawn(Abortable::new(fut, registration));
    Ok(handle)
  }
}
