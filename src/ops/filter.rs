use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct FilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { FilterOp { source, filter } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FilterOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FilterObserver<O, F>>,
  F: FnMut(&Item) -> bool,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  observer_terminal_proxy_impl!();
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn fork_and_shared() {
    let seen = Arc::new(Mutex::new(vec![]));
    let filtered = observable::from_iter(0..10).filter(|v| v % 3 == 0);
    for _ in 0..2 {
      let c_seen = seen.clone();
      filtered.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    }
    assert_eq!(*seen.lock().unwrap(), vec![0, 3, 6, 9, 0, 3, 6, 9]);
  }

  #[test]
  fn completion_passes_through() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::from_iter(vec![1, 2])
      .filter(|_| false)
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }
}
