//! Subjects: values that are an observer and an observable at once.
//!
//! Every subject is a cheap handle; clones share one set of attached
//! observers. The variants differ only in what a new subscriber receives
//! before live events:
//!
//! - [`Subject`] replays nothing,
//! - [`BehaviorSubject`] replays its current value,
//! - [`ReplaySubject`] replays a bounded (or unbounded) window of values.
//!
//! [`BehaviorRelay`] is a behavior subject without terminal events.
//!
//! Once a subject completes or errors, later subscribers receive only that
//! terminal event, and later emissions are ignored. `error` and `complete`
//! consume the handle they are called on, so keep a clone around to observe
//! the subject afterwards.

use std::sync::{Arc, Weak};

use crate::observer::Observer;

mod behavior_relay;
mod behavior_subject;
mod replay_subject;
mod subject_core;

pub use behavior_relay::BehaviorRelay;
pub use behavior_subject::BehaviorSubject;
pub use replay_subject::ReplaySubject;
pub use subject_core::SubjectSubscription;

use subject_core::{Buffer, SubjectCore};

/// Implements the shared handle surface of a subject type wrapping an
/// `Arc<SubjectCore>` in field `core`.
macro_rules! impl_subject {
  ($name:ident) => {
    impl<Item, Err> Clone for $name<Item, Err> {
      fn clone(&self) -> Self { $name { core: self.core.clone() } }
    }

    impl<Item, Err> $name<Item, Err> {
      /// Number of currently attached observers.
      pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

      #[inline]
      pub fn is_empty(&self) -> bool { self.subscriber_count() == 0 }

      /// `true` once the subject completed or errored.
      pub fn is_terminated(&self) -> bool { self.core.is_terminated() }

      pub fn is_disposed(&self) -> bool { self.core.is_disposed() }

      /// Detaches every observer without notifying it. Later subscribers
      /// receive nothing, and later emissions are ignored.
      pub fn dispose(&self) { self.core.dispose() }

      /// A handle that does not keep the subject alive.
      pub fn downgrade(&self) -> $crate::subject::WeakSubject<Item, Err> {
        $crate::subject::WeakSubject { core: ::std::sync::Arc::downgrade(&self.core) }
      }
    }

    impl<Item, Err> $crate::observer::Observer<Item, Err> for $name<Item, Err>
    where
      Item: Clone,
      Err: Clone + Send + 'static,
    {
      #[inline]
      fn next(&mut self, value: Item) { self.core.emit_next(value) }

      #[inline]
      fn error(self, err: Err) { self.core.emit_error(err) }

      #[inline]
      fn complete(self) { self.core.emit_complete() }

      #[inline]
      fn is_finished(&self) -> bool { !self.core.is_active() }
    }

    impl<Item, Err, O> $crate::observable::Observable<Item, Err, O> for $name<Item, Err>
    where
      O: $crate::observer::Observer<Item, Err> + Send + 'static,
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      type Unsub = $crate::subject::SubjectSubscription<Item, Err>;

      fn actual_subscribe(self, observer: O) -> Self::Unsub { self.core.attach(observer) }
    }

    impl<Item, Err> $crate::observable::ObservableExt<Item, Err> for $name<Item, Err> {}
  };
}

pub(crate) use impl_subject;

/// A subject that forwards live events only.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut subject = Subject::<i32, ()>::new();
/// subject.clone().subscribe(|v| println!("{v}"));
/// subject.next(1);
/// subject.next(2);
/// ```
pub struct Subject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Subject { core: SubjectCore::new(Buffer::None) } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl_subject!(Subject);

/// Weak handle of any subject. Emitting through it is a no-op once every
/// strong handle is gone.
pub struct WeakSubject<Item, Err> {
  core: Weak<SubjectCore<Item, Err>>,
}

impl<Item, Err> WeakSubject<Item, Err> {
  /// `true` while a strong handle still exists.
  pub fn is_alive(&self) -> bool { self.core.strong_count() > 0 }
}

impl<Item, Err> Clone for WeakSubject<Item, Err> {
  fn clone(&self) -> Self { WeakSubject { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for WeakSubject<Item, Err>
where
  Item: Clone,
  Err: Clone + Send + 'static,
{
  fn next(&mut self, value: Item) {
    if let Some(core) = self.core.upgrade() {
      core.emit_next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(core) = self.core.upgrade() {
      core.emit_error(err);
    }
  }

  fn complete(self) {
    if let Some(core) = self.core.upgrade() {
      core.emit_complete();
    }
  }

  fn is_finished(&self) -> bool { self.core.upgrade().map_or(true, |core| !core.is_active()) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  fn recorder<Item: Send + 'static>() -> (
    Arc<Mutex<Vec<Event<Item, String>>>>,
    impl FnMut(Event<Item, String>) + Send + 'static,
  ) {
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    (events, move |e| c_events.lock().unwrap().push(e))
  }

  #[test]
  fn emissions_after_complete_are_ignored() {
    let mut subject = Subject::<&str, String>::new();
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);

    subject.next("1");
    subject.next("2");
    subject.clone().complete();
    subject.next("3");

    assert_eq!(
      *events.lock().unwrap(),
      vec![Event::Next("1"), Event::Next("2"), Event::Completed]
    );
    assert!(subject.is_terminated());
    assert!(subject.is_empty());
  }

  #[test]
  fn late_subscriber_only_sees_live_values() {
    let mut subject = Subject::<i32, String>::new();
    subject.next(1);
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);
    subject.next(2);
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(2)]);
  }

  #[test]
  fn subscriber_after_error_gets_error_only() {
    let subject = Subject::<i32, String>::new();
    subject.clone().error("boom".to_string());
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);
    assert_eq!(*events.lock().unwrap(), vec![Event::Error("boom".to_string())]);
  }

  #[test]
  fn second_terminal_is_ignored() {
    let subject = Subject::<i32, String>::new();
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);
    subject.clone().complete();
    subject.clone().error("late".to_string());
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }

  #[test]
  fn unsubscribe_detaches() {
    let mut subject = Subject::<i32, String>::new();
    let (events, record) = recorder();
    let mut subscription = subject.clone().subscribe_event(record);
    assert_eq!(subject.subscriber_count(), 1);
    subject.next(1);
    subscription.unsubscribe();
    subscription.unsubscribe();
    subject.next(2);
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(1)]);
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[test]
  fn values_reach_every_subscriber_in_order() {
    let mut subject = Subject::<i32, String>::new();
    let (first, record_first) = recorder();
    let (second, record_second) = recorder();
    subject.clone().subscribe_event(record_first);
    subject.clone().subscribe_event(record_second);
    subject.next(1);
    subject.next(2);
    let expected = vec![Event::Next(1), Event::Next(2)];
    assert_eq!(*first.lock().unwrap(), expected);
    assert_eq!(*second.lock().unwrap(), expected);
  }

  #[test]
  fn subscribe_from_inside_a_callback() {
    let mut subject = Subject::<i32, String>::new();
    let inner_seen = Arc::new(Mutex::new(vec![]));
    let c_subject = subject.clone();
    let c_inner_seen = inner_seen.clone();
    let mut attached = false;
    subject.clone().subscribe(move |_| {
      if !attached {
        attached = true;
        let c_inner_seen = c_inner_seen.clone();
        c_subject.clone().subscribe(move |v| c_inner_seen.lock().unwrap().push(v));
      }
    });
    subject.next(1);
    subject.next(2);
    // The observer attached during delivery of 1 only sees later values.
    assert_eq!(*inner_seen.lock().unwrap(), vec![2]);
  }

  #[test]
  fn dispose_drops_observers_silently() {
    let mut subject = Subject::<i32, String>::new();
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);
    subject.dispose();
    subject.next(1);
    subject.clone().complete();
    assert!(events.lock().unwrap().is_empty());
    assert!(subject.is_disposed());

    let (late, record_late) = recorder();
    subject.clone().subscribe_event(record_late);
    assert!(late.lock().unwrap().is_empty());
  }

  #[test]
  fn weak_handle() {
    let subject = Subject::<i32, String>::new();
    let (events, record) = recorder();
    subject.clone().subscribe_event(record);
    let mut weak = subject.downgrade();
    weak.next(1);
    assert!(weak.is_alive());
    drop(subject);
    assert!(!weak.is_alive());
    assert!(weak.is_finished());
    weak.next(2);
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(1)]);
  }

  #[test]
  fn emit_from_many_threads() {
    let subject = Subject::<i32, String>::new();
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    subject.clone().subscribe(move |_| *c_count.lock().unwrap() += 1);
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let mut subject = subject.clone();
        std::thread::spawn(move || {
          for v in 0..100 {
            subject.next(v);
          }
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    assert_eq!(*count.lock().unwrap(), 400);
  }

  #[test]
  fn finished_observers_are_released() {
    let mut subject = Subject::<i32, String>::new();
    let handles: Vec<_> = (0..100)
      .map(|_| subject.clone().take(1).subscribe(|_| {}))
      .collect();
    assert_eq!(subject.subscriber_count(), 100);

    subject.next(1);
    assert_eq!(subject.subscriber_count(), 0);
    assert!(handles.iter().all(|h| h.is_closed()));

    let (events, record) = recorder();
    subject.clone().take(1).subscribe_event(record);
    subject.next(2);
    subject.next(3);
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(2), Event::Completed]);
    assert!(subject.is_empty());
  }

  #[test]
  fn replayed_take_is_released_on_attach() {
    let mut subject = ReplaySubject::<i32, String>::new(2);
    subject.next(1);
    subject.next(2);
    let handle = subject.clone().take(1).subscribe(|_| {});
    assert!(handle.is_closed());
    assert!(subject.is_empty());
  }

  #[test]
  fn concurrent_emitters_never_overlap() {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    let subject = Subject::<i32, String>::new();
    let busy = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let count = Arc::new(AtomicUsize::new(0));
    let (c_busy, c_overlaps, c_count) = (busy.clone(), overlaps.clone(), count.clone());
    subject.clone().subscribe(move |_| {
      if c_busy.swap(true, Ordering::SeqCst) {
        c_overlaps.fetch_add(1, Ordering::SeqCst);
      }
      std::thread::yield_now();
      c_count.fetch_add(1, Ordering::SeqCst);
      c_busy.store(false, Ordering::SeqCst);
    });
    let handles: Vec<_> = (0..2)
      .map(|_| {
        let mut subject = subject.clone();
        std::thread::spawn(move || {
          for v in 0..500 {
            subject.next(v);
          }
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(count.load(Ordering::SeqCst), 1000);
  }
}
