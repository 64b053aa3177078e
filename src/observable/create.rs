use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::SubscriptionLike,
  type_hint::TypeHint,
};

/// The producer side handed to the closure of [`create`].
///
/// Unlike [`Observer`], terminal methods borrow: after the first terminal
/// event every further call is ignored.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);

  fn error(&mut self, err: Err);

  fn complete(&mut self);

  /// `true` once the downstream stopped accepting values, e.g. after
  /// unsubscribing or after a terminal event.
  fn is_finished(&self) -> bool;
}

struct CreateEmitter<O>(Option<O>);

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = &mut self.0 {
      observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(observer) = self.0.take() {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(observer) = self.0.take() {
      observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.0.as_ref().map_or(true, |o| o.is_finished()) }
}

/// Creates an observable from a producer closure.
///
/// The closure runs once per subscription, receives an [`Emitter`] and
/// returns the subscription that tears its resources down (`()` when there
/// is nothing to release).
///
/// ```rust
/// use rxcore::prelude::*;
///
/// observable::create(|emitter: &mut dyn Emitter<i32, String>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item, Err, U>(f: F) -> ObservableFn<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: SubscriptionLike,
{
  ObservableFn { f, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ObservableFn<F, Item, Err> {
  f: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F, Item, Err, O, U> Observable<Item, Err, O> for ObservableFn<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: SubscriptionLike,
{
  type Unsub = U;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = CreateEmitter(Some(observer));
    (self.f)(&mut emitter)
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for ObservableFn<F, Item, Err> {}
