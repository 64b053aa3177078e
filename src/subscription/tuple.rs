use super::SubscriptionLike;

/// Two subscriptions released together.
///
/// Used by two-source operators (merge, zip, with_latest_from ...) and by
/// `subscribe` itself, which pairs the subscriber with the upstream handle.
#[derive(Clone, Default)]
pub struct ZipSubscription<A, B> {
  a: A,
  b: B,
}

impl<A, B> ZipSubscription<A, B> {
  #[inline]
  pub fn new(a: A, b: B) -> Self { ZipSubscription { a, b } }
}

impl<A, B> SubscriptionLike for ZipSubscription<A, B>
where
  A: SubscriptionLike,
  B: SubscriptionLike,
{
  fn unsubscribe(&mut self) {
    self.a.unsubscribe();
    self.b.unsubscribe();
  }

  /// Closed only when both halves are closed.
  fn is_closed(&self) -> bool { self.a.is_closed() && self.b.is_closed() }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::subscription::MultiSubscription;

  #[test]
  fn releases_both() {
    let a = MultiSubscription::new();
    let b = MultiSubscription::new();
    let mut zip = ZipSubscription::new(a.clone(), b.clone());
    assert!(!zip.is_closed());

    zip.unsubscribe();
    assert!(a.is_closed());
    assert!(b.is_closed());
    assert!(zip.is_closed());
    zip.unsubscribe();
  }

  #[test]
  fn closed_only_when_both_closed() {
    let a = MultiSubscription::new();
    let zip = ZipSubscription::new(a.clone(), ());
    assert!(!zip.is_closed());
    a.clone().unsubscribe();
    assert!(zip.is_closed());
  }
}
