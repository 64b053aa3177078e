use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct IgnoreElementsOp<S> {
  source: S,
}

impl<S> IgnoreElementsOp<S> {
  pub(crate) fn new(source: S) -> Self { IgnoreElementsOp { source } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for IgnoreElementsOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, IgnoreElementsObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(IgnoreElementsObserver { observer })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for IgnoreElementsOp<S> where S: ObservableExt<Item, Err> {}

pub struct IgnoreElementsObserver<O> {
  observer: O,
}

impl<Item, Err, O> Observer<Item, Err> for IgnoreElementsObserver<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, _: Item) {}

  observer_terminal_proxy_impl!();
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn only_terminal_passes() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::from_iter(0..10)
      .ignore_elements()
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }
}
