use std::time::Duration;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike, ZipSubscription},
};

#[derive(Clone)]
pub struct DelayOp<S, SD> {
  source: S,
  delay: Duration,
  scheduler: SD,
}

impl<S, SD> DelayOp<S, SD> {
  pub(crate) fn new(source: S, delay: Duration, scheduler: SD) -> Self {
    DelayOp { source, delay, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DelayOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, DelayObserver<O, SD>>,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError> + Send + 'static,
{
  type Unsub = ZipSubscription<S::Unsub, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, delay, scheduler } = self;
    let tasks = MultiSubscription::new();
    let observer = DelayObserver {
      observer: Subscriber::new(observer),
      delay,
      scheduler,
      tasks: tasks.clone(),
    };
    let unsub = source.actual_subscribe(observer);
    ZipSubscription::new(unsub, tasks)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DelayOp<S, SD> where S: ObservableExt<Item, Err> {}

/// Schedules one task per notification, each `delay` after it arrived.
/// Tasks with equal due times run in submission order, so values keep
/// their order.
pub struct DelayObserver<O, SD> {
  observer: Subscriber<O>,
  delay: Duration,
  scheduler: SD,
  tasks: MultiSubscription,
}

impl<O, SD: Scheduler> DelayObserver<O, SD> {
  fn defer<Item, Err>(&self, task: impl FnOnce(Subscriber<O>) + Send + 'static)
  where
    O: Observer<Item, Err> + Send + 'static,
    Err: From<RxError> + Send + 'static,
  {
    let observer = self.observer.clone();
    match self.scheduler.schedule(move || task(observer), Some(self.delay)) {
      Ok(handle) => self.tasks.add(handle),
      Err(e) => {
        self.tasks.clone().unsubscribe();
        Observer::<Item, Err>::error(self.observer.clone(), e.into());
      }
    }
  }
}

impl<Item, Err, O, SD> Observer<Item, Err> for DelayObserver<O, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError> + Send + 'static,
{
  fn next(&mut self, value: Item) {
    self.defer::<Item, Err>(move |mut observer| observer.next(value));
  }

  fn error(mut self, err: Err) {
    self.tasks.unsubscribe();
    self.observer.error(err);
  }

  fn complete(self) {
    self.defer::<Item, Err>(|observer| Observer::<Item, Err>::complete(observer));
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.observer) }
}
