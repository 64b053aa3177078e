use std::time::{Duration, Instant};

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, TaskHandle},
};

/// Creates an observable which will fire at `dur` time into the future,
/// and will repeat every `dur` interval after. Values are the tick index,
/// starting at zero.
///
/// The only error it can raise is the scheduler's failure to start the
/// timer.
pub fn interval<SD>(dur: Duration, scheduler: SD) -> IntervalObservable<SD> {
  IntervalObservable { scheduler, dur, delay: None }
}

/// Creates an observable which will fire at the time specified by `at`,
/// and then will repeat every `dur` interval after.
pub fn interval_at<SD: Scheduler>(at: Instant, dur: Duration, scheduler: SD) -> IntervalObservable<SD> {
  let delay = at.saturating_duration_since(scheduler.now());
  IntervalObservable { scheduler, dur, delay: Some(delay) }
}

#[derive(Clone)]
pub struct IntervalObservable<SD> {
  scheduler: SD,
  dur: Duration,
  delay: Option<Duration>,
}

impl<SD, O> Observable<usize, RxError, O> for IntervalObservable<SD>
where
  O: Observer<usize, RxError> + Send + 'static,
  SD: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { scheduler, dur, delay } = self;
    let observer = MutArc::own(Some(observer));
    let mut c_observer = observer.clone();
    let task = move |seq| {
      if c_observer.is_finished() {
        false
      } else {
        c_observer.next(seq);
        true
      }
    };
    match scheduler.schedule_repeating(task, dur, delay) {
      Ok(handle) => handle,
      Err(e) => {
        observer.error(e);
        let handle = TaskHandle::new();
        handle.finish();
        handle
      }
    }
  }
}

impl<SD> ObservableExt<usize, RxError> for IntervalObservable<SD> {}
