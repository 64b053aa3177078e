use std::time::Duration;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::Scheduler,
  subscription::{SerialSubscription, SubscriptionLike, ZipSubscription},
};

#[derive(Clone)]
pub struct DebounceOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> DebounceOp<S, SD> {
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    DebounceOp { source, duration, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DebounceOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, DebounceObserver<O, SD, Item>>,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  type Unsub = ZipSubscription<S::Unsub, SerialSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, duration, scheduler } = self;
    let pending = SerialSubscription::new();
    let unsub = source.actual_subscribe(DebounceObserver {
      observer: MutArc::own(Some(observer)),
      scheduler,
      duration,
      trailing_value: MutArc::own(None),
      last_id: 0,
      pending: pending.clone(),
    });
    ZipSubscription::new(unsub, pending)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DebounceOp<S, SD> where S: ObservableExt<Item, Err> {}

pub struct DebounceObserver<O, SD, Item> {
  observer: MutArc<Option<O>>,
  scheduler: SD,
  duration: Duration,
  // Tagged with the id of the value it holds, so a timer that fires late
  // never emits a newer value early.
  trailing_value: MutArc<Option<(usize, Item)>>,
  last_id: usize,
  pending: SerialSubscription,
}

impl<Item, Err, O, SD> Observer<Item, Err> for DebounceObserver<O, SD, Item>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  fn next(&mut self, value: Item) {
    self.last_id += 1;
    let id = self.last_id;
    *self.trailing_value.rc_deref_mut() = Some((id, value));

    let mut observer = self.observer.clone();
    let trailing_value = self.trailing_value.clone();
    let task = move || {
      let value = {
        let mut slot = trailing_value.rc_deref_mut();
        match slot.take() {
          Some((held, value)) if held == id => Some(value),
          other => {
            *slot = other;
            None
          }
        }
      };
      if let Some(value) = value {
        observer.next(value);
      }
    };
    match self.scheduler.schedule(task, Some(self.duration)) {
      Ok(handle) => self.pending.replace(handle),
      Err(e) => {
        self.pending.clone().unsubscribe();
        Observer::<Item, Err>::error(self.observer.clone(), e.into());
      }
    }
  }

  fn error(mut self, err: Err) {
    self.pending.unsubscribe();
    Observer::<Item, Err>::error(self.observer, err);
  }

  fn complete(mut self) {
    self.pending.unsubscribe();
    let trailing = self.trailing_value.rc_deref_mut().take();
    if let Some((_, value)) = trailing {
      self.observer.next(value);
    }
    Observer::<Item, Err>::complete(self.observer);
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.observer) }
}
