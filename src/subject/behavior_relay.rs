use std::{convert::Infallible, sync::Arc};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

use super::{
  subject_core::{Buffer, SubjectCore},
  SubjectSubscription,
};

/// A [`BehaviorSubject`](super::BehaviorSubject) that cannot terminate.
///
/// A relay has no `error` or `complete`; values go in through `accept`, and
/// it holds a current value for its whole life. Its error type is
/// `Infallible`, so downstream observers never see an error from it.
///
/// ```
/// use rxcore::prelude::*;
///
/// let relay = BehaviorRelay::new(vec!["a"]);
/// relay.clone().subscribe(|v| println!("{v:?}"));
/// let mut next = relay.value();
/// next.push("b");
/// relay.accept(next);
/// assert_eq!(relay.value(), vec!["a", "b"]);
/// ```
pub struct BehaviorRelay<Item> {
  core: Arc<SubjectCore<Item, Infallible>>,
  seed: Arc<Item>,
}

impl<Item> BehaviorRelay<Item> {
  pub fn new(seed: Item) -> Self
  where
    Item: Clone,
  {
    BehaviorRelay {
      core: SubjectCore::new(Buffer::Latest(Some(seed.clone()))),
      seed: Arc::new(seed),
    }
  }

  /// Number of currently attached observers.
  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.subscriber_count() == 0 }
}

impl<Item: Clone> BehaviorRelay<Item> {
  /// Replaces the current value and delivers it to every observer.
  pub fn accept(&self, value: Item) { self.core.emit_next(value) }

  /// The current value.
  pub fn value(&self) -> Item {
    // The buffer is only cleared by a terminal event or dispose, and a
    // relay has neither.
    self.core.latest().unwrap_or_else(|| (*self.seed).clone())
  }
}

impl<Item> Clone for BehaviorRelay<Item> {
  fn clone(&self) -> Self { BehaviorRelay { core: self.core.clone(), seed: self.seed.clone() } }
}

impl<Item, O> Observable<Item, Infallible, O> for BehaviorRelay<Item>
where
  O: Observer<Item, Infallible> + Send + 'static,
  Item: Clone + Send + 'static,
{
  type Unsub = SubjectSubscription<Item, Infallible>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.core.attach(observer) }
}

impl<Item> ObservableExt<Item, Infallible> for BehaviorRelay<Item> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn current_value_then_accepted_values() {
    let relay = BehaviorRelay::new(0);
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    relay.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    relay.accept(1);
    relay.accept(2);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(relay.value(), 2);
  }

  #[test]
  fn late_subscriber_gets_latest() {
    let relay = BehaviorRelay::new("initial");
    relay.accept("updated");
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    relay.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec!["updated"]);
  }

  #[test]
  fn appending_through_value() {
    let relay = BehaviorRelay::new(Vec::<i32>::new());
    let sizes = Arc::new(Mutex::new(vec![]));
    let c_sizes = sizes.clone();
    relay
      .clone()
      .map(|photos| photos.len())
      .subscribe(move |n| c_sizes.lock().unwrap().push(n));
    for photo in 1..=3 {
      let mut photos = relay.value();
      photos.push(photo);
      relay.accept(photos);
    }
    assert_eq!(*sizes.lock().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(relay.value(), vec![1, 2, 3]);
  }

  #[test]
  fn unsubscribe_detaches() {
    let relay = BehaviorRelay::new(0);
    let mut subscription = relay.clone().subscribe(|_| {});
    assert_eq!(relay.subscriber_count(), 1);
    subscription.unsubscribe();
    assert!(relay.is_empty());
  }
}
