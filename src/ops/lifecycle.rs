//! Side-effect operators: `tap`, `on_complete`, `on_error` and `finalize`.

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  subscription::SubscriptionLike,
};

#[derive(Clone)]
pub struct TapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TapOp { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TapOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TapObserver<O, F>>,
  F: FnMut(&Item),
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TapObserver { observer, func: self.func })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TapOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item),
{
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct OnCompleteOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> OnCompleteOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { OnCompleteOp { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for OnCompleteOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, OnCompleteObserver<O, F>>,
  F: FnOnce(),
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(OnCompleteObserver { observer, func: self.func })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for OnCompleteOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(),
{
}

pub struct OnCompleteObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for OnCompleteObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    (self.func)();
    self.observer.complete()
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[derive(Clone)]
pub struct OnErrorOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> OnErrorOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { OnErrorOp { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for OnErrorOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, OnErrorObserver<O, F>>,
  F: FnOnce(&Err),
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(OnErrorObserver { observer, func: self.func })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for OnErrorOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(&Err),
{
}

pub struct OnErrorObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for OnErrorObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(&Err),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    (self.func)(&err);
    self.observer.error(err)
  }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> FinalizeOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { FinalizeOp { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FinalizeOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FinalizeObserver<O, F>>,
  F: FnOnce(),
{
  type Unsub = FinalizeSubscription<S::Unsub, F>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let func = MutArc::own(Some(self.func));
    let upstream = self.source.actual_subscribe(FinalizeObserver { observer, func: func.clone() });
    FinalizeSubscription { upstream, func }
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FinalizeOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(),
{
}

fn run_once<F: FnOnce()>(func: &MutArc<Option<F>>) {
  let func = func.rc_deref_mut().take();
  if let Some(func) = func {
    func();
  }
}

pub struct FinalizeObserver<O, F> {
  observer: O,
  func: MutArc<Option<F>>,
}

impl<Item, Err, O, F> Observer<Item, Err> for FinalizeObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    self.observer.error(err);
    run_once(&self.func);
  }

  fn complete(self) {
    self.observer.complete();
    run_once(&self.func);
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

pub struct FinalizeSubscription<U, F> {
  upstream: U,
  func: MutArc<Option<F>>,
}

impl<U, F> SubscriptionLike for FinalizeSubscription<U, F>
where
  U: SubscriptionLike,
  F: FnOnce(),
{
  fn unsubscribe(&mut self) {
    self.upstream.unsubscribe();
    run_once(&self.func);
  }

  fn is_closed(&self) -> bool { self.func.rc_deref().is_none() }
}
