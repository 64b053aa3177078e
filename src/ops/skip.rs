use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct SkipOp<S> {
  source: S,
  count: usize,
}

impl<S> SkipOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { SkipOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for SkipOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(SkipObserver { observer, remaining: self.count })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for SkipOp<S> where S: ObservableExt<Item, Err> {}

pub struct SkipObserver<O> {
  observer: O,
  remaining: usize,
}

impl<Item, Err, O> Observer<Item, Err> for SkipObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.observer.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct SkipWhileOp<S, F> {
  source: S,
  predicate: F,
}

impl<S, F> SkipWhileOp<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self { SkipWhileOp { source, predicate } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for SkipWhileOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipWhileObserver<O, F>>,
  F: FnMut(&Item) -> bool,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(SkipWhileObserver {
      observer,
      predicate: self.predicate,
      done_skipping: false,
    })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for SkipWhileOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct SkipWhileObserver<O, F> {
  observer: O,
  predicate: F,
  done_skipping: bool,
}

impl<Item, Err, O, F> Observer<Item, Err> for SkipWhileObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if !self.done_skipping && !(self.predicate)(&value) {
      self.done_skipping = true;
    }
    if self.done_skipping {
      self.observer.next(value);
    }
  }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct SkipUntilOp<S, N, NItem> {
  source: S,
  notifier: N,
  _hint: TypeHint<NItem>,
}

impl<S, N, NItem> SkipUntilOp<S, N, NItem> {
  pub(crate) fn new(source: S, notifier: N) -> Self {
    SkipUntilOp { source, notifier, _hint: TypeHint::new() }
  }
}

impl<Item, Err, O, S, N, NItem> Observable<Item, Err, O> for SkipUntilOp<S, N, NItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipUntilObserver<O>>,
  S::Unsub: Send + 'static,
  N: Observable<NItem, Err, SkipUntilNotifierObserver<O, Item>>,
  N::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let open = Arc::new(AtomicBool::new(false));
    let subscription = MultiSubscription::new();
    let gate = MultiSubscription::new();
    let notifier = self.notifier.actual_subscribe(SkipUntilNotifierObserver {
      observer: observer.clone(),
      open: open.clone(),
      gate: gate.clone(),
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    });
    gate.add(notifier);
    subscription.add(gate);
    let source = self.source.actual_subscribe(SkipUntilObserver {
      observer,
      open,
      subscription: subscription.clone(),
    });
    subscription.add(source);
    subscription
  }
}

impl<Item, Err, S, N, NItem> ObservableExt<Item, Err> for SkipUntilOp<S, N, NItem>
where
  S: ObservableExt<Item, Err>,
  N: ObservableExt<NItem, Err>,
{
}

pub struct SkipUntilObserver<O> {
  observer: Subscriber<O>,
  open: Arc<AtomicBool>,
  subscription: MultiSubscription,
}

impl<Item, Err, O> Observer<Item, Err> for SkipUntilObserver<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if self.open.load(Ordering::Acquire) {
      self.observer.next(value);
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

pub struct SkipUntilNotifierObserver<O, Item> {
  observer: Subscriber<O>,
  open: Arc<AtomicBool>,
  // The notifier's own subscription, released once the gate opens.
  gate: MultiSubscription,
  subscription: MultiSubscription,
  _hint: TypeHint<Item>,
}

impl<NItem, Err, O, Item> Observer<NItem, Err> for SkipUntilNotifierObserver<O, Item>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, _: NItem) {
    self.open.store(true, Ordering::Release);
    self.gate.unsubscribe();
  }

  fn error(mut self, err: Err) {
    Observer::<Item, Err>::error(self.observer.clone(), err);
    self.subscription.unsubscribe();
  }

  #[inline]
  fn complete(self) {}

  fn is_finished(&self) -> bool {
    self.open.load(Ordering::Acquire) || Observer::<Item, Err>::is_finished(&self.observer)
  }
}
