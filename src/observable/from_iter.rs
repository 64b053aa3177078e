use std::{
  convert::Infallible,
  iter::{Repeat, Take},
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// iteration stops early once the downstream no longer accepts values.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<O, Iter> Observable<Iter::Item, Infallible, O> for ObservableIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_finished() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}

impl<Iter> ObservableExt<Iter::Item, Infallible> for ObservableIter<Iter> where Iter: IntoIterator {}

/// Creates an observable producing the same value `n` times.
pub fn repeat<Item: Clone>(v: Item, n: usize) -> ObservableIter<Take<Repeat<Item>>> {
  from_iter(std::iter::repeat(v).take(n))
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn from_range() {
    let hit = Arc::new(Mutex::new(0));
    let completed = Arc::new(Mutex::new(false));
    let (c_hit, c_completed) = (hit.clone(), completed.clone());
    observable::from_iter(0..100).subscribe_all(
      move |_| *c_hit.lock().unwrap() += 1,
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );
    assert_eq!(*hit.lock().unwrap(), 100);
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn cold_subscriptions_are_independent() {
    let seen = Arc::new(Mutex::new(vec![]));
    let source = observable::from_iter(vec![1, 2]);
    for _ in 0..2 {
      let c_seen = seen.clone();
      source.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    }
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 2]);
  }

  #[test]
  fn repeat_three_times() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::repeat("x", 3).subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec!["x"; 3]);
  }

  #[test]
  fn infinite_iterator_stops_under_take() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(0..)
      .take(3)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
  }
}
