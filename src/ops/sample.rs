use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Emits the most recent source value whenever the trigger emits, provided
/// a new value arrived since the previous sample.
#[derive(Clone)]
pub struct SampleOp<S, T, TItem> {
  source: S,
  trigger: T,
  _hint: TypeHint<TItem>,
}

impl<S, T, TItem> SampleOp<S, T, TItem> {
  pub(crate) fn new(source: S, trigger: T) -> Self {
    SampleOp { source, trigger, _hint: TypeHint::new() }
  }
}

impl<Item, Err, O, S, T, TItem> Observable<Item, Err, O> for SampleOp<S, T, TItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SampleObserver<O, Item>>,
  S::Unsub: Send + 'static,
  T: Observable<TItem, Err, SampleTriggerObserver<O, Item>>,
  T::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let fresh = Arc::new(Mutex::new(None));
    let subscription = MultiSubscription::new();
    let source = self.source.actual_subscribe(SampleObserver {
      observer: observer.clone(),
      fresh: fresh.clone(),
      subscription: subscription.clone(),
    });
    subscription.add(source);
    let trigger = self.trigger.actual_subscribe(SampleTriggerObserver {
      observer,
      fresh,
      subscription: subscription.clone(),
    });
    subscription.add(trigger);
    subscription
  }
}

impl<Item, Err, S, T, TItem> ObservableExt<Item, Err> for SampleOp<S, T, TItem>
where
  S: ObservableExt<Item, Err>,
  T: ObservableExt<TItem, Err>,
{
}

pub struct SampleObserver<O, Item> {
  observer: Subscriber<O>,
  fresh: Arc<Mutex<Option<Item>>>,
  subscription: MultiSubscription,
}

impl<Item, Err, O> Observer<Item, Err> for SampleObserver<O, Item>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { *self.fresh.lock() = Some(value); }

  fn error(mut self, err: Err) {
    self.observer.error(err);
    self.subscription.unsubscribe();
  }

  fn complete(mut self) {
    self.observer.complete();
    self.subscription.unsubscribe();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

pub struct SampleTriggerObserver<O, Item> {
  observer: Subscriber<O>,
  fresh: Arc<Mutex<Option<Item>>>,
  subscription: MultiSubscription,
}

impl<TItem, Item, Err, O> Observer<TItem, Err> for SampleTriggerObserver<O, Item>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, _: TItem) {
    let value = self.fresh.lock().take();
    if let Some(value) = value {
      self.observer.next(value);
    }
  }

  fn error(mut self, err: Err) {
    Observer::<Item, Err>::error(self.observer.clone(), err);
    self.subscription.unsubscribe();
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.observer) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  #[test]
  fn samples_only_fresh_values() {
    let mut source = Subject::<i32, ()>::new();
    let mut trigger = Subject::<(), ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    source
      .clone()
      .sample(trigger.clone())
      .subscribe(move |v| c_seen.lock().unwrap().push(v));

    trigger.next(());
    source.next(1);
    source.next(2);
    trigger.next(());
    trigger.next(());
    source.next(3);
    trigger.next(());
    assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
  }

  #[test]
  fn sample_on_interval() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::interval(Duration::from_millis(10), scheduler.clone())
      .sample(observable::interval(Duration::from_millis(23), scheduler.clone()))
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*seen.lock().unwrap(), vec![1, 3, 5, 8]);
  }
}
