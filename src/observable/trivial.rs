use std::convert::Infallible;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates an observable that produces no values and completes at once.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::empty::<i32>().subscribe(|v| println!("{v}"));
/// ```
pub fn empty<Item>() -> EmptyObservable<Item> { EmptyObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct EmptyObservable<Item>(TypeHint<Item>);

impl<Item, O> Observable<Item, Infallible, O> for EmptyObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete() }
}

impl<Item> ObservableExt<Item, Infallible> for EmptyObservable<Item> {}

/// Creates an observable that never emits anything, not even a terminal
/// event.
pub fn never<Item, Err>() -> NeverObservable<Item, Err> { NeverObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct NeverObservable<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err, O> Observable<Item, Err, O> for NeverObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  #[inline]
  fn actual_subscribe(self, _observer: O) -> Self::Unsub {}
}

impl<Item, Err> ObservableExt<Item, Err> for NeverObservable<Item, Err> {}

/// Creates an observable that produces no values and fails with `e`.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::throw::<i32, _>("boom").subscribe_err(|_| {}, |e| println!("{e}"));
/// ```
pub fn throw<Item, Err>(e: Err) -> ThrowObservable<Item, Err> { ThrowObservable(e, TypeHint::new()) }

#[derive(Clone)]
pub struct ThrowObservable<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err, O> Observable<Item, Err, O> for ThrowObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.0) }
}

impl<Item, Err> ObservableExt<Item, Err> for ThrowObservable<Item, Err> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn throw_errors() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::throw::<i32, _>("boom")
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Error("boom")]);
  }

  #[test]
  fn empty_completes() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::empty::<i32>().subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }

  #[test]
  fn never_is_silent() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    let subscription = observable::never::<i32, ()>()
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert!(events.lock().unwrap().is_empty());
    assert!(!subscription.is_closed());
  }
}
