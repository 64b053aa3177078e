use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates an observable that calls `factory` at subscription time and
/// subscribes to the observable it returns, so every subscriber gets a
/// freshly built source.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::defer(|| observable::of(std::process::id()))
///   .subscribe(|pid| println!("{pid}"));
/// ```
pub fn defer<F, S, Item, Err>(factory: F) -> DeferObservable<F, Item, Err>
where
  F: FnOnce() -> S,
  S: ObservableExt<Item, Err>,
{
  DeferObservable { factory, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct DeferObservable<F, Item, Err> {
  factory: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F, S, Item, Err, O> Observable<Item, Err, O> for DeferObservable<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce() -> S,
  S: Observable<Item, Err, O>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    (self.factory)().actual_subscribe(observer)
  }
}

impl<F, S, Item, Err> ObservableExt<Item, Err> for DeferObservable<F, Item, Err>
where
  F: FnOnce() -> S,
  S: ObservableExt<Item, Err>,
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  #[test]
  fn factory_runs_per_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(vec![]));
    let c_calls = calls.clone();
    let deferred = observable::defer(move || {
      let n = c_calls.fetch_add(1, Ordering::SeqCst);
      observable::of(n)
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    for _ in 0..2 {
      let c_seen = seen.clone();
      deferred.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    }
    assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
  }
}
