use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::MultiSubscription,
};

#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  source: S,
  scheduler: SD,
}

impl<S, SD> SubscribeOnOp<S, SD> {
  pub(crate) fn new(source: S, scheduler: SD) -> Self { SubscribeOnOp { source, scheduler } }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for SubscribeOnOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, Subscriber<O>> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError> + Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, scheduler } = self;
    let observer = Subscriber::new(observer);
    let subscription = MultiSubscription::new();
    let c_subscription = subscription.clone();
    let c_observer = observer.clone();
    let task = move || c_subscription.add(source.actual_subscribe(c_observer));
    match scheduler.schedule(task, None) {
      Ok(handle) => subscription.add(handle),
      Err(e) => Observer::<Item, Err>::error(observer, e.into()),
    }
    subscription
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for SubscribeOnOp<S, SD> where S: ObservableExt<Item, Err> {}
