use std::time::Duration;

use futures::{
  executor::ThreadPool,
  future::{AbortHandle, Abortable},
};
use once_cell::sync::Lazy;

use super::{Scheduler, TaskHandle};
use crate::{error::RxError, subscription::SubscriptionLike};

static DEFAULT_POOL: Lazy<Result<ThreadPool, String>> = Lazy::new(|| {
  ThreadPool::builder()
    .name_prefix("rx-pool-")
    .create()
    .map_err(|e| {
      tracing::error!(error = %e, "failed to start the default thread pool");
      e.to_string()
    })
});

static MAIN_POOL: Lazy<Result<ThreadPool, String>> = Lazy::new(|| {
  serial_pool("rx-main-").map_err(|e| {
    tracing::error!(error = %e, "failed to start the main serial scheduler");
    e.to_string()
  })
});

fn serial_pool(name_prefix: &str) -> std::io::Result<ThreadPool> {
  ThreadPool::builder()
    .pool_size(1)
    .name_prefix(name_prefix)
    .create()
}

fn shared_pool(pool: &'static Lazy<Result<ThreadPool, String>>) -> Result<&'static ThreadPool, RxError> {
  pool
    .as_ref()
    .map_err(|reason| RxError::SchedulerUnavailable(reason.clone()))
}

async fn sleep(duration: Duration) {
  futures_time::task::sleep(futures_time::time::Duration::from(duration)).await;
}

fn spawn_once<T>(pool: &ThreadPool, task: T, delay: Option<Duration>) -> TaskHandle
where
  T: FnOnce() + Send + 'static,
{
  let (abort, registration) = AbortHandle::new_pair();
  let handle = TaskHandle::with_abort(abort);
  let c_handle = handle.clone();
  let fut = async move {
    if let Some(delay) = delay {
      sleep(delay).await;
    }
    if !c_handle.is_closed() {
      c_handle.finish();
      task();
    }
  };
  pool.spawn_ok(async move {
    let _ = Abortable::new(fut, registration).await;
  });
  handle
}

fn spawn_repeating<T>(
  pool: &ThreadPool,
  mut task: T,
  period: Duration,
  delay: Option<Duration>,
) -> TaskHandle
where
  T: FnMut(usize) -> bool + Send + 'static,
{
  let (abort, registration) = AbortHandle::new_pair();
  let handle = TaskHandle::with_abort(abort);
  let c_handle = handle.clone();
  let fut = async move {
    sleep(delay.unwrap_or(period)).await;
    let mut tick = 0;
    while !c_handle.is_closed() && task(tick) {
      tick += 1;
      sleep(period).await;
    }
    c_handle.finish();
  };
  pool.spawn_ok(async move {
    let _ = Abortable::new(fut, registration).await;
  });
  handle
}

/// Runs tasks on a lazily created, process-wide `futures` thread pool.
///
/// Tasks may run concurrently and on any worker thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPoolScheduler;

impl Scheduler for ThreadPoolScheduler {
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static,
  {
    let pool = shared_pool(&DEFAULT_POOL)?;
    tracing::debug!(?delay, "scheduling task on the thread pool");
    Ok(spawn_once(pool, task, delay))
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
    let pool = shared_pool(&DEFAULT_POOL)?;
    tracing::debug!(?period, ?delay, "scheduling repeating task on the thread pool");
    Ok(spawn_repeating(pool, task, period, delay))
  }
}

/// Marshals every task onto one dedicated thread, in submission order.
///
/// [`SerialScheduler::main`] is the process-wide "main" context; `new`
/// creates an independent serial context.
#[derive(Clone)]
pub struct SerialScheduler {
  pool: ThreadPool,
}

impl SerialScheduler {
  pub fn new() -> Result<Self, RxError> {
    serial_pool("rx-serial-")
      .map(|pool| SerialScheduler { pool })
      .map_err(|e| RxError::SchedulerUnavailable(e.to_string()))
  }

  /// The shared main serial context.
  pub fn main() -> Result<Self, RxError> {
    shared_pool(&MAIN_POOL).map(|pool| SerialScheduler { pool: pool.clone() })
  }
}

impl Scheduler for SerialScheduler {
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static,
  {
    Ok(spawn_once(&self.pool, task, delay))
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
    Ok(spawn_repeating(&self.pool, task, period, delay))
  }
}
