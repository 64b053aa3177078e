use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Emits `(value, latest_other)` for every value of the primary source.
///
/// `other` is subscribed first so a synchronous `other` is seen by the
/// earliest primary values. Primary values arriving before `other` emitted
/// are dropped; `other` completing is ignored, its error is not.
#[derive(Clone)]
pub struct WithLatestFromOp<A, B> {
  a: A,
  b: B,
}

impl<A, B> WithLatestFromOp<A, B> {
  pub(crate) fn new(a: A, b: B) -> Self { WithLatestFromOp { a, b } }
}

impl<ItemA, ItemB, Err, O, A, B> Observable<(ItemA, ItemB), Err, O> for WithLatestFromOp<A, B>
where
  O: Observer<(ItemA, ItemB), Err>,
  A: Observable<ItemA, Err, WithLatestFromObserver<O, ItemB>>,
  A::Unsub: Send + 'static,
  B: Observable<ItemB, Err, WithLatestFromOtherObserver<O, ItemA, ItemB>>,
  B::Unsub: Send + 'static,
  ItemB: Clone,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let latest = Arc::new(Mutex::new(None));
    let subscription = MultiSubscription::new();
    let other = self.b.actual_subscribe(WithLatestFromOtherObserver {
      observer: observer.clone(),
      latest: latest.clone(),
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    });
    subscription.add(other);
    let primary = self.a.actual_subscribe(WithLatestFromObserver {
      observer,
      latest,
      subscription: subscription.clone(),
    });
    subscription.add(primary);
    subscription
  }
}

impl<ItemA, ItemB, Err, A, B> ObservableExt<(ItemA, ItemB), Err> for WithLatestFromOp<A, B>
where
  A: ObservableExt<ItemA, Err>,
  B: ObservableExt<ItemB, Err>,
{
}

pub struct WithLatestFromObserver<O, ItemB> {
  observer: Subscriber<O>,
  latest: Arc<Mutex<Option<ItemB>>>,
  subscription: MultiSubscription,
}

impl<ItemA, ItemB, Err, O> Observer<ItemA, Err> for WithLatestFromObserver<O, ItemB>
where
  O: Observer<(ItemA, ItemB), Err>,
  ItemB: Clone,
  Err: Send + 'static,
{
  fn next(&mut self, value: ItemA) {
    let latest = self.latest.lock().clone();
    if let Some(latest) = latest {
      self.observer.next((value, latest));
    }
  }

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

pub struct WithLatestFromOtherObserver<O, ItemA, ItemB> {
  observer: Subscriber<O>,
  latest: Arc<Mutex<Option<ItemB>>>,
  subscription: MultiSubscription,
  _hint: TypeHint<ItemA>,
}

impl<ItemA, ItemB, Err, O> Observer<ItemB, Err> for WithLatestFromOtherObserver<O, ItemA, ItemB>
where
  O: Observer<(ItemA, ItemB), Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: ItemB) { *self.latest.lock() = Some(value); }

  fn error(mut self, err: Err) {
    Observer::<(ItemA, ItemB), Err>::error(self.observer.clone(), err);
    self.subscription.unsubscribe();
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { Observer::<(ItemA, ItemB), Err>::is_finished(&self.observer) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn drops_until_other_emitted() {
    let mut primary = Subject::<i32, ()>::new();
    let mut other = Subject::<&str, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    primary
      .clone()
      .with_latest_from(other.clone())
      .subscribe(move |v| c_seen.lock().unwrap().push(v));

    primary.next(1);
    other.next("a");
    other.next("b");
    primary.next(2);
    other.clone().complete();
    primary.next(3);
    assert_eq!(*seen.lock().unwrap(), vec![(2, "b"), (3, "b")]);
  }

  #[test]
  fn synchronous_other_is_seen_first() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(1..3)
      .with_latest_from(observable::of('z'))
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![(1, 'z'), (2, 'z')]);
  }
}
