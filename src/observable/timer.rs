use std::time::{Duration, Instant};

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, TaskHandle},
};

/// Returns an observable which will emit a single `item` once after `dur`
/// on `scheduler`, then complete.
pub fn timer<Item, SD>(item: Item, dur: Duration, scheduler: SD) -> TimerObservable<Item, SD> {
  TimerObservable { item, dur, scheduler }
}

/// Like [`timer`], firing at `at`; a timestamp in the past fires at once.
pub fn timer_at<Item, SD: Scheduler>(item: Item, at: Instant, scheduler: SD) -> TimerObservable<Item, SD> {
  let dur = at.saturating_duration_since(scheduler.now());
  TimerObservable { item, dur, scheduler }
}

#[derive(Clone)]
pub struct TimerObservable<Item, SD> {
  item: Item,
  dur: Duration,
  scheduler: SD,
}

impl<Item, O, SD> Observable<Item, RxError, O> for TimerObservable<Item, SD>
where
  O: Observer<Item, RxError> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { item, dur, scheduler } = self;
    let observer = MutArc::own(Some(observer));
    let mut c_observer = observer.clone();
    let task = move || {
      c_observer.next(item);
      c_observer.complete();
    };
    match scheduler.schedule(task, Some(dur)) {
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

impl<Item, SD> ObservableExt<Item, RxError> for TimerObservable<Item, SD> {}
