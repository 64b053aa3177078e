use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  ops::last::LastOrOp,
  type_hint::TypeHint,
};

/// `reduce` is `scan` followed by `last_or(initial)`.
pub type ReduceOp<S, F, B, Item> = LastOrOp<ScanOp<S, F, B, Item>, B>;

#[derive(Clone)]
pub struct ScanOp<S, F, B, Item> {
  source: S,
  func: F,
  initial: B,
  _hint: TypeHint<Item>,
}

impl<S, F, B, Item> ScanOp<S, F, B, Item> {
  pub(crate) fn new(source: S, func: F, initial: B) -> Self {
    ScanOp { source, func, initial, _hint: TypeHint::new() }
  }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for ScanOp<S, F, B, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, ScanObserver<O, F, B>>,
  F: FnMut(B, Item) -> B,
  B: Clone,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(ScanObserver {
      observer,
      func: self.func,
      acc: Some(self.initial),
    })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for ScanOp<S, F, B, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(B, Item) -> B,
{
}

pub struct ScanObserver<O, F, B> {
  observer: O,
  func: F,
  acc: Option<B>,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for ScanObserver<O, F, B>
where
  O: Observer<B, Err>,
  F: FnMut(B, Item) -> B,
  B: Clone,
{
  fn next(&mut self, value: Item) {
    if let Some(acc) = self.acc.take() {
      let acc = (self.func)(acc, value);
      self.acc = Some(acc.clone());
      self.observer.next(acc);
    }
  }

  observer_terminal_proxy_impl!();
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn running_sum() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(vec![1, 1, 1, 1, 1])
      .scan(100, |acc, v| acc + v)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![101, 102, 103, 104, 105]);
  }

  #[test]
  fn accumulator_of_another_type() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(vec!['a', 'b', 'c'])
      .scan(String::new(), |mut acc, v| {
        acc.push(v);
        acc
      })
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec!["a", "ab", "abc"]);
  }
}
