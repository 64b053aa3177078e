use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
  error::RxError,
  event::Event,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
};

#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  source: S,
  scheduler: SD,
}

impl<S, SD> ObserveOnOp<S, SD> {
  pub(crate) fn new(source: S, scheduler: SD) -> Self { ObserveOnOp { source, scheduler } }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for ObserveOnOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, ObserveOnObserver<O, SD, Item, Err>>,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError> + Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = MultiSubscription::new();
    let ctx = Arc::new(ObserveOnCtx {
      observer: Subscriber::new(observer),
      scheduler: self.scheduler,
      state: Mutex::new(DrainState { queue: VecDeque::new(), draining: false }),
      subscription: subscription.clone(),
    });
    let unsub = self.source.actual_subscribe(ObserveOnObserver { ctx });
    subscription.add(unsub);
    subscription
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for ObserveOnOp<S, SD> where S: ObservableExt<Item, Err> {}

struct DrainState<Item, Err> {
  queue: VecDeque<Event<Item, Err>>,
  draining: bool,
}

struct ObserveOnCtx<O, SD, Item, Err> {
  observer: Subscriber<O>,
  scheduler: SD,
  state: Mutex<DrainState<Item, Err>>,
  subscription: MultiSubscription,
}

impl<O, SD, Item, Err> ObserveOnCtx<O, SD, Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError> + Send + 'static,
{
  /// Queues `event` and makes sure one drain task is scheduled. At most one
  /// drain runs at a time, so events arrive downstream in upstream order
  /// even on a multi-threaded scheduler.
  fn push(self: &Arc<Self>, event: Event<Item, Err>) {
    {
      let mut state = self.state.lock();
      state.queue.push_back(event);
      if state.draining {
        return;
      }
      state.draining = true;
    }
    let ctx = self.clone();
    match self.scheduler.schedule(move || ctx.drain(), None) {
      Ok(handle) => self.subscription.add(handle),
      Err(e) => {
        self.state.lock().queue.clear();
        self.subscription.clone().unsubscribe();
        Observer::<Item, Err>::error(self.observer.clone(), e.into());
      }
    }
  }

  fn drain(&self) {
    loop {
      let event = {
        let mut state = self.state.lock();
        match state.queue.pop_front() {
          Some(event) if !self.subscription.is_closed() => event,
          _ => {
            state.queue.clear();
            state.draining = false;
            return;
          }
        }
      };
      match event {
        Event::Next(value) => self.observer.clone().next(value),
        Event::Error(err) => self.observer.clone().error(err),
        Event::Completed => Observer::<Item, Err>::complete(self.observer.clone()),
      }
    }
  }
}

pub struct ObserveOnObserver<O, SD, Item, Err> {
  ctx: Arc<ObserveOnCtx<O, SD, Item, Err>>,
}

impl<Item, Err, O, SD> Observer<Item, Err> for ObserveOnObserver<O, SD, Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError> + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.ctx.push(Event::Next(value)) }

  #[inline]
  fn error(self, err: Err) { self.ctx.push(Event::Error(err)) }

  #[inline]
  fn complete(self) { self.ctx.push(Event::Completed) }

  #[inline]
  fn is_finished(&self) -> bool { self.ctx.subscription.is_closed() }
}
