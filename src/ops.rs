//! Operator implementations, one family per file.
//!
//! Every operator is a plain struct built by a method of
//! [`ObservableExt`](crate::observable::ObservableExt). Its `actual_subscribe`
//! wraps the downstream observer in an operator observer and subscribes the
//! wrapped observer upstream.

/// Forwards `error`, `complete` and `is_finished` to the `observer` field.
macro_rules! observer_terminal_proxy_impl {
  () => {
    #[inline]
    fn error(self, err: Err) { self.observer.error(err) }

    #[inline]
    fn complete(self) { self.observer.complete() }

    #[inline]
    fn is_finished(&self) -> bool { self.observer.is_finished() }
  };
}

pub mod amb;
pub mod catch_error;
pub mod collect;
pub mod combine_latest;
pub mod concat;
pub mod debounce;
pub mod delay;
pub mod distinct_until_changed;
pub mod element_at;
pub mod enumerate;
pub mod filter;
pub mod ignore_elements;
pub mod last;
pub mod lifecycle;
pub mod map;
pub mod map_err;
pub mod materialize;
pub mod merge;
pub mod merge_all;
pub mod observe_on;
pub mod retry;
pub mod sample;
pub mod scan;
pub mod share;
pub mod single;
pub mod skip;
pub mod start_with;
pub mod subscribe_on;
pub mod switch_on_next;
pub mod take;
pub mod throttle;
pub mod timeout;
pub mod with_latest_from;
pub mod zip;

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn reduce_initial() {
    let emitted = Arc::new(Mutex::new(0));
    let c_emitted = emitted.clone();
    observable::from_iter(vec![1, 1, 1, 1, 1])
      .reduce(100, |acc, v| acc + v)
      .subscribe(move |v| *c_emitted.lock().unwrap() = v);
    assert_eq!(*emitted.lock().unwrap(), 105);
  }

  #[test]
  fn reduce_initial_on_empty_observable() {
    let emitted = Arc::new(Mutex::new(0));
    let c_emitted = emitted.clone();
    observable::empty()
      .reduce(100, |acc, v: i32| acc + v)
      .subscribe(move |v| *c_emitted.lock().unwrap() = v);
    assert_eq!(*emitted.lock().unwrap(), 100);
  }

  #[test]
  fn long_chain_stops_early() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(std::iter::repeat(1))
      .scan(0, |acc, v| acc + v)
      .filter(|v| v % 2 == 0)
      .map(|v| v * 10)
      .take(3)
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![20, 40, 60]);
  }
}
