use super::{MultiSubscription, SubscriptionLike};

/// The handle returned by the `subscribe*` family.
///
/// Dropping a wrapper does *not* unsubscribe; the subscription keeps running
/// until the source terminates. Use [`unsubscribe_when_dropped`] for scoped
/// teardown or [`disposed_by`] to hand it to a [`DisposeBag`].
///
/// [`unsubscribe_when_dropped`]: SubscriptionWrapper::unsubscribe_when_dropped
/// [`disposed_by`]: SubscriptionWrapper::disposed_by
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  #[inline]
  pub fn new(subscription: T) -> Self { SubscriptionWrapper(subscription) }

  /// Activates "RAII" behavior for this subscription: the returned guard
  /// unsubscribes when it goes out of scope.
  #[must_use]
  #[inline]
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(self.0) }

  /// Moves the subscription into `bag`; it is released together with it.
  pub fn disposed_by(self, bag: &DisposeBag)
  where
    T: Send + 'static,
  {
    bag.add(self.0)
  }

  #[inline]
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII subscription: unsubscribes when dropped.
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  #[inline]
  pub fn new(subscription: T) -> Self { SubscriptionGuard(subscription) }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

/// A scope owning subscriptions; everything added is released when the bag
/// is dropped (or disposed early with `dispose`).
#[derive(Default)]
pub struct DisposeBag(MultiSubscription);

impl DisposeBag {
  #[inline]
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn add<S: SubscriptionLike + Send + 'static>(&self, subscription: S) {
    self.0.add(subscription)
  }

  #[inline]
  pub fn dispose(&mut self) { self.0.unsubscribe() }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.0.is_closed() }

  #[inline]
  pub fn len(&self) -> usize { self.0.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn guard_unsubscribes_on_drop() {
    let child = MultiSubscription::new();
    {
      let _guard = SubscriptionWrapper::new(child.clone()).unsubscribe_when_dropped();
      assert!(!child.is_closed());
    }
    assert!(child.is_closed());
  }

  #[test]
  fn wrapper_drop_keeps_subscription() {
    let child = MultiSubscription::new();
    drop(SubscriptionWrapper::new(child.clone()));
    assert!(!child.is_closed());
  }

  #[test]
  fn bag_disposes_on_drop() {
    let a = MultiSubscription::new();
    let b = MultiSubscription::new();
    {
      let bag = DisposeBag::new();
      SubscriptionWrapper::new(a.clone()).disposed_by(&bag);
      bag.add(b.clone());
      assert_eq!(bag.len(), 2);
    }
    assert!(a.is_closed());
    assert!(b.is_closed());
  }

  #[test]
  fn disposed_bag_releases_new_children() {
    let mut bag = DisposeBag::new();
    bag.dispose();
    assert!(bag.is_disposed());
    let late = MultiSubscription::new();
    bag.add(late.clone());
    assert!(late.is_closed());
  }
}
