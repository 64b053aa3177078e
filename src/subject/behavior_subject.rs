use std::sync::Arc;

use super::{
  impl_subject,
  subject_core::{Buffer, SubjectCore},
};

/// A subject holding a current value. Every new subscriber receives the
/// current value first, then live events.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut subject = BehaviorSubject::<_, ()>::new("Initial");
/// subject.clone().subscribe(|v| println!("{v}"));
/// subject.next("Updated");
/// assert_eq!(subject.value(), Some("Updated"));
/// ```
pub struct BehaviorSubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(seed: Item) -> Self {
    BehaviorSubject { core: SubjectCore::new(Buffer::Latest(Some(seed))) }
  }
}

impl<Item: Clone, Err: Clone + Send + 'static> BehaviorSubject<Item, Err> {
  /// The current value; `None` once the subject terminated or was
  /// disposed.
  pub fn value(&self) -> Option<Item> { self.core.latest() }
}

impl_subject!(BehaviorSubject);

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn seed_is_delivered_first() {
    let mut subject = BehaviorSubject::<&str, ()>::new("Initial");
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    subject.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    subject.next("Updated");
    assert_eq!(*seen.lock().unwrap(), vec!["Initial", "Updated"]);
  }

  #[test]
  fn late_subscriber_gets_current_value() {
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    subject.next(1);
    subject.next(2);
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    subject.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    subject.next(3);
    assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
    assert_eq!(subject.value(), Some(3));
  }

  #[test]
  fn terminated_subject_replays_terminal_only() {
    let subject = BehaviorSubject::<i32, ()>::new(5);
    subject.clone().complete();
    assert_eq!(subject.value(), None);

    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    subject.clone().subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }
}
