use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct LastOrOp<S, Item> {
  source: S,
  default: Option<Item>,
}

impl<S, Item> LastOrOp<S, Item> {
  pub(crate) fn new(source: S, default: Option<Item>) -> Self { LastOrOp { source, default } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for LastOrOp<S, Item>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, LastOrObserver<O, Item>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(LastOrObserver { observer, last: self.default })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for LastOrOp<S, Item> where S: ObservableExt<Item, Err> {}

pub struct LastOrObserver<O, Item> {
  observer: O,
  last: Option<Item>,
}

impl<Item, Err, O> Observer<Item, Err> for LastOrObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.last = Some(value); }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    if let Some(last) = self.last.take() {
      self.observer.next(last);
    }
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn last_value_on_completion() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::from_iter(0..100)
      .last()
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(99), Event::Completed]);
  }

  #[test]
  fn last_of_empty_emits_nothing() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::empty::<i32>()
      .last()
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }

  #[test]
  fn last_or_default() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::empty::<i32>()
      .last_or(-1)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    let c_seen = seen.clone();
    observable::of(5)
      .last_or(-1)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![-1, 5]);
  }

  #[test]
  fn error_skips_the_last_value() {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::create(|emitter: &mut dyn Emitter<i32, &'static str>| {
      emitter.next(1);
      emitter.error("broken");
    })
    .last()
    .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Error("broken")]);
  }
}
