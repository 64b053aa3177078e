//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::{event::Event, rc::MutArc, subscriber::reentrant_emission};

/// Observer trait: the consumer of data in reactive programming.
///
/// `error` and `complete` consume the observer, so once a terminal event has
/// been delivered the type system rules out any further delivery to it.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable.
  fn next(&mut self, value: Item);

  /// Handle an error from the observable.
  fn error(self, err: Err);

  /// Handle completion of the observable.
  fn complete(self);

  /// Returns `true` once the observer will not accept more values.
  ///
  /// Sources check this before every emission so that a synchronous producer
  /// stops as soon as its downstream is unsubscribed (e.g. by `take`).
  fn is_finished(&self) -> bool;
}

/// Object-safe mirror of [`Observer`], so observers of different concrete
/// types can live in one list (subjects, boxed observables).
pub trait BoxObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_finished(&self) -> bool;
}

impl<T, Item, Err> BoxObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  #[inline]
  fn box_next(&mut self, value: Item) { self.next(value) }
  #[inline]
  fn box_error(self: Box<Self>, err: Err) { (*self).error(err) }
  #[inline]
  fn box_complete(self: Box<Self>) { (*self).complete() }
  #[inline]
  fn box_is_finished(&self) -> bool { self.is_finished() }
}

/// A type-erased, thread-safe observer.
pub type BoxedObserver<Item, Err> = Box<dyn BoxObserver<Item, Err> + Send>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }
  #[inline]
  fn error(self, err: Err) { self.box_error(err) }
  #[inline]
  fn complete(self) { self.box_complete() }
  #[inline]
  fn is_finished(&self) -> bool { (**self).box_is_finished() }
}

/// `None` ignores every event, `Some` delegates.
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_finished(&self) -> bool { self.as_ref().map_or(true, Observer::is_finished) }
}

thread_local! {
  // Shared observers this thread is currently delivering a value through.
  static DELIVERING: RefCell<SmallVec<[usize; 4]>> = RefCell::new(SmallVec::new());
}

/// Marks a shared observer as busy on this thread for as long as it lives.
///
/// The shared observer's lock is not re-entrant, so a feedback loop that
/// reaches the same observer again would block forever; it panics with the
/// re-entrant emission message instead.
struct DeliveryMark(usize);

impl DeliveryMark {
  fn enter(key: usize) -> Self {
    DELIVERING.with(|busy| {
      let mut busy = busy.borrow_mut();
      if busy.contains(&key) {
        drop(busy);
        reentrant_emission();
      }
      busy.push(key);
    });
    DeliveryMark(key)
  }
}

impl Drop for DeliveryMark {
  fn drop(&mut self) {
    DELIVERING.with(|busy| {
      let mut busy = busy.borrow_mut();
      if let Some(pos) = busy.iter().rposition(|k| *k == self.0) {
        busy.remove(pos);
      }
    });
  }
}

/// Shared observer used when several upstream subscriptions feed one
/// downstream. Terminal events take the inner observer out, so whichever
/// upstream terminates first wins and the others become no-ops.
impl<O, Item, Err> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let _mark = DeliveryMark::enter(self.addr());
    self.rc_deref_mut().next(value)
  }

  fn error(self, err: Err) {
    let inner = {
      let _mark = DeliveryMark::enter(self.addr());
      self.rc_deref_mut().take()
    };
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    let inner = {
      let _mark = DeliveryMark::enter(self.addr());
      self.rc_deref_mut().take()
    };
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_finished(&self) -> bool { self.rc_deref().is_finished() }
}

// ============================================================================
// Closure adapters used by the `subscribe*` family
// ============================================================================

/// Observer built from a `next` closure only.
///
/// An error reaching it has nowhere to go; it is logged, never swallowed
/// silently.
#[derive(Clone)]
pub struct ObserverN<N>(pub N);

impl<Item, Err, N> Observer<Item, Err> for ObserverN<N>
where
  N: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  fn error(self, _err: Err) {
    tracing::error!(
      error_type = std::any::type_name::<Err>(),
      "unhandled error reached a subscriber without an error handler"
    );
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { false }
}

/// Observer built from `next` and `error` closures.
#[derive(Clone)]
pub struct ObserverErr<N, E> {
  pub next: N,
  pub error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnOnce(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { false }
}

/// Observer built from `next`, `error` and `complete` closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

/// Observer receiving every notification as one [`Event`].
#[derive(Clone)]
pub struct ObserverEvent<F>(pub F);

impl<Item, Err, F> Observer<Item, Err> for ObserverEvent<F>
where
  F: FnMut(Event<Item, Err>),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(Event::Next(value)) }

  #[inline]
  fn error(mut self, err: Err) { (self.0)(Event::Error(err)) }

  #[inline]
  fn complete(mut self) { (self.0)(Event::Completed) }

  #[inline]
  fn is_finished(&self) -> bool { false }
}
