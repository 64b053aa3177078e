use std::any::Any;

use smallvec::SmallVec;

use crate::rc::MutArc;

mod guard;
mod tuple;

pub use guard::{DisposeBag, SubscriptionGuard, SubscriptionWrapper};
pub use tuple::ZipSubscription;

/// Subscription returned from `Observable::actual_subscribe` and the
/// `subscribe*` family, allowing a consumer to stop receiving events.
///
/// `unsubscribe` releases the underlying resources at most once. Calling it
/// again is a no-op and it never panics.
pub trait SubscriptionLike {
  /// Deregister from the stream before it has finished emitting.
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

/// A type-erased subscription that can move across threads.
pub type BoxSubscription = Box<dyn SubscriptionLike + Send>;

/// Subscription of a source that finished synchronously and holds nothing.
impl SubscriptionLike for () {
  #[inline]
  fn unsubscribe(&mut self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: SubscriptionLike + ?Sized> SubscriptionLike for Box<T> {
  #[inline]
  fn unsubscribe(&mut self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: SubscriptionLike> SubscriptionLike for Option<T> {
  fn unsubscribe(&mut self) {
    if let Some(inner) = self {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, T::is_closed) }
}

impl<T: SubscriptionLike> SubscriptionLike for MutArc<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.rc_deref_mut().unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.rc_deref().is_closed() }
}

/// A composite subscription: a bag of child subscriptions released together.
///
/// Children are kept in insertion order and released in that order. Adding a
/// child to a bag that is already closed releases the child immediately.
#[derive(Clone, Default)]
pub struct MultiSubscription(MutArc<Teardown>);

#[derive(Default)]
struct Teardown {
  closed: bool,
  items: SmallVec<[BoxSubscription; 2]>,
}

impl MultiSubscription {
  #[inline]
  pub fn new() -> Self { Self::default() }

  pub fn add<S: SubscriptionLike + Send + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) {
      return;
    }
    let mut subscription = subscription;
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.items.retain(|s| !s.is_closed());
      inner.items.push(Box::new(subscription));
    }
  }

  /// Number of children still held.
  pub fn len(&self) -> usize { self.0.rc_deref().items.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn is_same(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<Self>()
      .map_or(false, |other| self.0.ptr_eq(&other.0))
  }
}

impl SubscriptionLike for MultiSubscription {
  fn unsubscribe(&mut self) {
    let items = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.items)
    };
    for mut item in items {
      item.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

/// Holds at most one child subscription. Replacing the child releases the
/// previous one; once closed, every new child is released immediately.
///
/// Used where a stream moves from one upstream to the next (`retry`,
/// `switch_on_next`).
#[derive(Clone, Default)]
pub struct SerialSubscription(MutArc<SerialSlot>);

#[derive(Default)]
struct SerialSlot {
  closed: bool,
  current: Option<BoxSubscription>,
}

impl SerialSubscription {
  #[inline]
  pub fn new() -> Self { Self::default() }

  pub fn replace<S: SubscriptionLike + Send + 'static>(&self, subscription: S) {
    let mut released: BoxSubscription = Box::new(subscription);
    {
      let mut slot = self.0.rc_deref_mut();
      if !slot.closed {
        match slot.current.replace(released) {
          Some(previous) => released = previous,
          None => return,
        }
      }
    }
    released.unsubscribe();
  }
}

impl SubscriptionLike for SerialSubscription {
  fn unsubscribe(&mut self) {
    let current = {
      let mut slot = self.0.rc_deref_mut();
      slot.closed = true;
      slot.current.take()
    };
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  #[derive(Clone, Default)]
  struct Counter(Arc<AtomicUsize>, bool);

  impl SubscriptionLike for Counter {
    fn unsubscribe(&mut self) {
      if !self.1 {
        self.1 = true;
        self.0.fetch_add(1, Ordering::SeqCst);
      }
    }

    fn is_closed(&self) -> bool { self.1 }
  }

  #[test]
  fn multi_releases_every_child_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut bag = MultiSubscription::new();
    bag.add(Counter(count.clone(), false));
    bag.add(Counter(count.clone(), false));
    assert_eq!(bag.len(), 2);

    bag.unsubscribe();
    bag.unsubscribe();
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(bag.is_closed());
    assert!(bag.is_empty());
  }

  #[test]
  fn add_after_close_releases_immediately() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut bag = MultiSubscription::new();
    bag.unsubscribe();
    bag.add(Counter(count.clone(), false));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(bag.is_empty());
  }

  #[test]
  fn closed_children_are_pruned() {
    let count = Arc::new(AtomicUsize::new(0));
    let bag = MultiSubscription::new();
    bag.add(Counter(count.clone(), true));
    bag.add(Counter(count, false));
    assert_eq!(bag.len(), 1);
  }

  #[test]
  fn adding_itself_is_ignored() {
    let mut bag = MultiSubscription::new();
    bag.add(bag.clone());
    assert!(bag.is_empty());
    bag.unsubscribe();
  }

  #[test]
  fn unit_and_option() {
    let mut unit = ();
    unit.unsubscribe();
    assert!(unit.is_closed());

    let count = Arc::new(AtomicUsize::new(0));
    let mut some = Some(Counter(count.clone(), false));
    assert!(!some.is_closed());
    some.unsubscribe();
    some.unsubscribe();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(None::<Counter>.is_closed());
  }

  #[test]
  fn serial_releases_the_previous_child() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut serial = SerialSubscription::new();
    serial.replace(Counter(count.clone(), false));
    serial.replace(Counter(count.clone(), false));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    serial.unsubscribe();
    assert_eq!(count.load(Ordering::SeqCst), 2);
    serial.replace(Counter(count.clone(), false));
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert!(serial.is_closed());
  }
}
