use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SerialSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Mirrors the most recent inner observable of an observable of
/// observables.
///
/// When a new inner arrives, the previous inner is unsubscribed before the
/// new one is subscribed, so nothing from a stale inner reaches the
/// downstream. The result completes when the outer source and the current
/// inner have both completed.
#[derive(Clone)]
pub struct SwitchOnNextOp<S, Inner> {
  source: S,
  _hint: TypeHint<Inner>,
}

impl<S, Inner> SwitchOnNextOp<S, Inner> {
  pub(crate) fn new(source: S) -> Self { SwitchOnNextOp { source, _hint: TypeHint::new() } }
}

impl<Item, Err, O, S, Inner> Observable<Item, Err, O> for SwitchOnNextOp<S, Inner>
where
  O: Observer<Item, Err>,
  S: Observable<Inner, Err, SwitchOuterObserver<O, Item>>,
  S::Unsub: Send + 'static,
  Inner: Observable<Item, Err, SwitchInnerObserver<O>>,
  Inner::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = Arc::new(SwitchCtx {
      observer: Subscriber::new(observer),
      state: Mutex::new(SwitchState { generation: 0, inner_active: false, outer_done: false }),
      inner: SerialSubscription::new(),
      subscription: MultiSubscription::new(),
    });
    let subscription = ctx.subscription.clone();
    subscription.add(ctx.inner.clone());
    let outer = self
      .source
      .actual_subscribe(SwitchOuterObserver { ctx, _hint: TypeHint::new() });
    subscription.add(outer);
    subscription
  }
}

impl<Item, Err, S, Inner> ObservableExt<Item, Err> for SwitchOnNextOp<S, Inner>
where
  S: ObservableExt<Inner, Err>,
  Inner: ObservableExt<Item, Err>,
{
}

struct SwitchState {
  generation: usize,
  inner_active: bool,
  outer_done: bool,
}

pub struct SwitchCtx<O> {
  observer: Subscriber<O>,
  state: Mutex<SwitchState>,
  inner: SerialSubscription,
  subscription: MultiSubscription,
}

impl<O> SwitchCtx<O> {
  fn is_current(&self, generation: usize) -> bool { self.state.lock().generation == generation }

  fn fail<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    Observer::<Item, Err>::error(self.observer.clone(), err);
    self.subscription.clone().unsubscribe();
  }

  fn finish<Item, Err>(&self)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    Observer::<Item, Err>::complete(self.observer.clone());
    self.subscription.clone().unsubscribe();
  }
}

pub struct SwitchOuterObserver<O, Item> {
  ctx: Arc<SwitchCtx<O>>,
  _hint: TypeHint<Item>,
}

impl<Item, Err, O, Inner> Observer<Inner, Err> for SwitchOuterObserver<O, Item>
where
  O: Observer<Item, Err>,
  Inner: Observable<Item, Err, SwitchInnerObserver<O>>,
  Inner::Unsub: Send + 'static,
  Err: Send + 'static,
{
  fn next(&mut self, inner: Inner) {
    let generation = {
      let mut state = self.ctx.state.lock();
      state.generation += 1;
      state.inner_active = true;
      state.generation
    };
    // Release the previous inner before the new one starts.
    self.ctx.inner.replace(());
    let unsub = inner.actual_subscribe(SwitchInnerObserver { ctx: self.ctx.clone(), generation });
    if self.ctx.is_current(generation) {
      self.ctx.inner.replace(unsub);
    } else {
      let mut unsub = unsub;
      unsub.unsubscribe();
    }
  }

  fn error(self, err: Err) { self.ctx.fail::<Item, Err>(err) }

  fn complete(self) {
    let finished = {
      let mut state = self.ctx.state.lock();
      state.outer_done = true;
      !state.inner_active
    };
    if finished {
      self.ctx.finish::<Item, Err>();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}

pub struct SwitchInnerObserver<O> {
  ctx: Arc<SwitchCtx<O>>,
  generation: usize,
}

impl<Item, Err, O> Observer<Item, Err> for SwitchInnerObserver<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if self.ctx.is_current(self.generation) {
      self.ctx.observer.clone().next(value);
    }
  }

  fn error(self, err: Err) {
    if self.ctx.is_current(self.generation) {
      self.ctx.fail::<Item, Err>(err);
    }
  }

  fn complete(self) {
    let finished = {
      let mut state = self.ctx.state.lock();
      if state.generation != self.generation {
        return;
      }
      state.inner_active = false;
      state.outer_done
    };
    if finished {
      self.ctx.finish::<Item, Err>();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool {
    !self.ctx.is_current(self.generation) || self.ctx.observer.is_finished()
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  #[test]
  fn follows_the_latest_inner() {
    let mut one = Subject::<&str, ()>::new();
    let mut two = Subject::<&str, ()>::new();
    let mut three = Subject::<&str, ()>::new();
    let mut outer = Subject::<Subject<&str, ()>, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    outer
      .clone()
      .switch_on_next()
      .subscribe(move |v| c_seen.lock().unwrap().push(v));

    outer.next(one.clone());
    one.next("Some text from sequence one");
    outer.next(two.clone());
    two.next("Some text from sequence two");
    one.next("Nobody sees this, sequence one is released");
    outer.next(three.clone());
    two.next("Sequence two is released too");
    three.next("Some text from sequence three");
    outer.next(one.clone());
    one.next("Sequence one is back");

    assert_eq!(
      *seen.lock().unwrap(),
      vec![
        "Some text from sequence one",
        "Some text from sequence two",
        "Some text from sequence three",
        "Sequence one is back",
      ]
    );
    assert!(two.is_empty());
    assert!(three.is_empty());
    assert_eq!(one.subscriber_count(), 1);
  }

  #[test]
  fn completes_after_outer_and_current_inner() {
    let inner = Subject::<i32, ()>::new();
    let mut outer = Subject::<Subject<i32, ()>, ()>::new();
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    outer
      .clone()
      .switch_on_next()
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));

    outer.next(inner.clone());
    outer.clone().complete();
    assert!(events.lock().unwrap().is_empty());
    inner.clone().complete();
    assert_eq!(*events.lock().unwrap(), vec![Event::<i32, ()>::Completed]);
  }

  #[test]
  fn flat_map_latest_drops_slow_inners() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let mut source = Subject::<u64, RxError>::new();
    let c_scheduler = scheduler.clone();
    source
      .clone()
      .flat_map_latest(move |v| observable::timer(v, Duration::from_millis(10), c_scheduler.clone()))
      .subscribe(move |v| c_seen.lock().unwrap().push(v));

    source.next(1);
    scheduler.advance_by(Duration::from_millis(5));
    source.next(2);
    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*seen.lock().unwrap(), vec![2]);
  }
}
