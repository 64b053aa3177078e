use std::time::Duration;

use super::{Scheduler, TaskHandle};
use crate::{error::RxError, subscription::SubscriptionLike};

/// Runs every task synchronously on the calling thread, blocking it for the
/// requested delays.
///
/// A repeating task keeps the caller busy until it returns `false`, so pair
/// `interval` on this scheduler with an operator that finishes the stream,
/// such as `take`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, RxError>
  where
    T: FnOnce() + Send + 'static,
  {
    if let Some(delay) = delay {
      std::thread::sleep(delay);
    }
    task();
    let handle = TaskHandle::new();
    handle.finish();
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
    let handle = TaskHandle::new();
    std::thread::sleep(delay.unwrap_or(period));
    let mut tick = 0;
    while !handle.is_closed() && task(tick) {
      tick += 1;
      std::thread::sleep(period);
    }
    handle.finish();
    Ok(handle)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn runs_inline() {
    let hit = Arc::new(Mutex::new(false));
    let c_hit = hit.clone();
    let handle = ImmediateScheduler
      .schedule(move || *c_hit.lock().unwrap() = true, None)
      .unwrap();
    assert!(*hit.lock().unwrap());
    assert!(handle.is_closed());
  }

  #[test]
  fn repeats_until_task_stops() {
    let ticks = Arc::new(Mutex::new(vec![]));
    let c_ticks = ticks.clone();
    ImmediateScheduler
      .schedule_repeating(
        move |i| {
          c_ticks.lock().unwrap().push(i);
          i < 2
        },
        Duration::from_millis(1),
        Some(Duration::ZERO),
      )
      .unwrap();
    assert_eq!(*ticks.lock().unwrap(), vec![0, 1, 2]);
  }
}
