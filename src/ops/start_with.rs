use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct StartWithOp<S, Item> {
  source: S,
  values: Vec<Item>,
}

impl<S, Item> StartWithOp<S, Item> {
  pub(crate) fn new(source: S, values: Vec<Item>) -> Self { StartWithOp { source, values } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for StartWithOp<S, Item>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, O>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.values {
      if observer.is_finished() {
        break;
      }
      observer.next(v);
    }
    self.source.actual_subscribe(observer)
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for StartWithOp<S, Item> where S: ObservableExt<Item, Err> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn prefix_values() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(3..5)
      .start_with(vec![1, 2])
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn prefix_respects_take() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(3..5)
      .start_with(vec![1, 2])
      .take(1)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }
}
