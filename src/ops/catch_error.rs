use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{MultiSubscription, ZipSubscription},
};

/// Replaces an error of the source with the observable returned by `f`.
#[derive(Clone)]
pub struct CatchErrorOp<S, F> {
  source: S,
  f: F,
}

impl<S, F> CatchErrorOp<S, F> {
  pub(crate) fn new(source: S, f: F) -> Self { CatchErrorOp { source, f } }
}

impl<Item, Err, O, S, F, S2> Observable<Item, Err, O> for CatchErrorOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, CatchErrorObserver<O, F>>,
  F: FnOnce(Err) -> S2,
  S2: Observable<Item, Err, O>,
  S2::Unsub: Send + 'static,
{
  type Unsub = ZipSubscription<S::Unsub, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let fallback = MultiSubscription::new();
    let source = self.source.actual_subscribe(CatchErrorObserver {
      observer,
      f: self.f,
      fallback: fallback.clone(),
    });
    ZipSubscription::new(source, fallback)
  }
}

impl<Item, Err, S, F, S2> ObservableExt<Item, Err> for CatchErrorOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(Err) -> S2,
{
}

pub struct CatchErrorObserver<O, F> {
  observer: O,
  f: F,
  fallback: MultiSubscription,
}

impl<Item, Err, O, F, S2> Observer<Item, Err> for CatchErrorObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(Err) -> S2,
  S2: Observable<Item, Err, O>,
  S2::Unsub: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    tracing::debug!("catch_error switching to the fallback observable");
    let fallback = (self.f)(err).actual_subscribe(self.observer);
    self.fallback.add(fallback);
  }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

/// Replaces an error of the source with `value` followed by completion.
#[derive(Clone)]
pub struct OnErrorReturnOp<S, Item> {
  source: S,
  value: Item,
}

impl<S, Item> OnErrorReturnOp<S, Item> {
  pub(crate) fn new(source: S, value: Item) -> Self { OnErrorReturnOp { source, value } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for OnErrorReturnOp<S, Item>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, OnErrorReturnObserver<O, Item>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(OnErrorReturnObserver { observer, value: self.value })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for OnErrorReturnOp<S, Item> where
  S: ObservableExt<Item, Err>
{
}

pub struct OnErrorReturnObserver<O, Item> {
  observer: O,
  value: Item,
}

impl<Item, Err, O> Observer<Item, Err> for OnErrorReturnObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(mut self, _: Err) {
    self.observer.next(self.value);
    self.observer.complete();
  }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
