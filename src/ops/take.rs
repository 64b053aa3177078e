use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = if self.count == 0 {
      observer.complete();
      None
    } else {
      Some(observer)
    };
    self.source.actual_subscribe(TakeObserver { observer, count: self.count, hits: 0 })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeOp<S> where S: ObservableExt<Item, Err> {}

pub struct TakeObserver<O> {
  observer: Option<O>,
  count: usize,
  hits: usize,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = &mut self.observer else {
      return;
    };
    self.hits += 1;
    observer.next(value);
    if self.hits >= self.count {
      if let Some(observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct TakeWhileOp<S, F> {
  source: S,
  predicate: F,
}

impl<S, F> TakeWhileOp<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self { TakeWhileOp { source, predicate } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TakeWhileOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeWhileObserver<O, F>>,
  F: FnMut(&Item) -> bool,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TakeWhileObserver {
      observer: Some(observer),
      predicate: self.predicate,
    })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TakeWhileOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct TakeWhileObserver<O, F> {
  observer: Option<O>,
  predicate: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for TakeWhileObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    if (self.predicate)(&value) {
      self.observer.next(value);
    } else if let Some(observer) = self.observer.take() {
      observer.complete();
    }
  }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct TakeUntilOp<S, N, NItem> {
  source: S,
  notifier: N,
  _hint: TypeHint<NItem>,
}

impl<S, N, NItem> TakeUntilOp<S, N, NItem> {
  pub(crate) fn new(source: S, notifier: N) -> Self {
    TakeUntilOp { source, notifier, _hint: TypeHint::new() }
  }
}

impl<Item, Err, O, S, N, NItem> Observable<Item, Err, O> for TakeUntilOp<S, N, NItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeUntilObserver<O>>,
  S::Unsub: Send + 'static,
  N: Observable<NItem, Err, TakeUntilNotifierObserver<O, Item>>,
  N::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let subscription = MultiSubscription::new();
    // The notifier goes first so that a synchronous source can still be cut
    // short.
    let notifier = self.notifier.actual_subscribe(TakeUntilNotifierObserver {
      observer: observer.clone(),
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    });
    subscription.add(notifier);
    let source = self.source.actual_subscribe(TakeUntilObserver {
      observer,
      subscription: subscription.clone(),
    });
    subscription.add(source);
    subscription
  }
}

impl<Item, Err, S, N, NItem> ObservableExt<Item, Err> for TakeUntilOp<S, N, NItem>
where
  S: ObservableExt<Item, Err>,
  N: ObservableExt<NItem, Err>,
{
}

pub struct TakeUntilObserver<O> {
  observer: Subscriber<O>,
  subscription: MultiSubscription,
}

impl<Item, Err, O> Observer<Item, Err> for TakeUntilObserver<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

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

pub struct TakeUntilNotifierObserver<O, Item> {
  observer: Subscriber<O>,
  subscription: MultiSubscription,
  _hint: TypeHint<Item>,
}

impl<NItem, Err, O, Item> Observer<NItem, Err> for TakeUntilNotifierObserver<O, Item>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, _: NItem) {
    Observer::<Item, Err>::complete(self.observer.clone());
    self.subscription.unsubscribe();
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
