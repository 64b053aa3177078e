use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct DistinctUntilChangedOp<S, F> {
  source: S,
  eq: F,
}

impl<S, F> DistinctUntilChangedOp<S, F> {
  pub(crate) fn new(source: S, eq: F) -> Self { DistinctUntilChangedOp { source, eq } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for DistinctUntilChangedOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, DistinctUntilChangedObserver<O, F, Item>>,
  F: FnMut(&Item, &Item) -> bool,
  Item: Clone,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(DistinctUntilChangedObserver { observer, eq: self.eq, last: None })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for DistinctUntilChangedOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item, &Item) -> bool,
{
}

pub struct DistinctUntilChangedObserver<O, F, Item> {
  observer: O,
  eq: F,
  last: Option<Item>,
}

impl<Item, Err, O, F> Observer<Item, Err> for DistinctUntilChangedObserver<O, F, Item>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item, &Item) -> bool,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    if let Some(last) = &self.last {
      if (self.eq)(last, &value) {
        return;
      }
    }
    self.last = Some(value.clone());
    self.observer.next(value);
  }

  observer_terminal_proxy_impl!();
}
