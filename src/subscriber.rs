use std::{
  cell::RefCell,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::{Mutex, ReentrantMutex};

use crate::{observer::Observer, subscription::SubscriptionLike};

/// The thread-safe wrapper every final observer is converted into when it is
/// subscribed.
///
/// A `Subscriber` is both the observer handed to the head of an operator
/// chain and the subscription handle kept by the caller. Delivery and
/// `unsubscribe` synchronize on one re-entrant lock, so once `unsubscribe`
/// returns no further event reaches the wrapped observer, even when the
/// producer runs on another thread. Unsubscribing from inside one of the
/// observer's own callbacks is allowed, and a terminal event raised from
/// inside `next` is delivered as soon as that callback returns.
pub struct Subscriber<O>(Arc<SubscriberInner<O>>);

type Deferred<O> = Box<dyn FnOnce(O) + Send>;

struct SubscriberInner<O> {
  closed: AtomicBool,
  observer: ReentrantMutex<RefCell<Option<O>>>,
  // Terminal event raised from inside the observer's own `next`.
  deferred: Mutex<Option<Deferred<O>>>,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Subscriber(Arc::new(SubscriberInner {
      closed: AtomicBool::new(false),
      observer: ReentrantMutex::new(RefCell::new(Some(observer))),
      deferred: Mutex::new(None),
    }))
  }

  /// Hands the observer to `deliver`, or parks `deliver` until the running
  /// `next` callback of the same observer returns.
  fn terminate(&self, deliver: Deferred<O>) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let guard = self.0.observer.lock();
    match guard.try_borrow_mut().map(|mut slot| slot.take()) {
      Ok(Some(observer)) => deliver(observer),
      Ok(None) => {}
      Err(_) => *self.0.deferred.lock() = Some(deliver),
    }
    drop(guard);
  }
}

#[cold]
pub(crate) fn reentrant_emission() -> ! {
  panic!(
    "re-entrant emission: an observer was sent a new event while it was \
     still handling the previous one. Break the feedback loop with a \
     scheduler (`observe_on`/`delay`) or emit from outside the callback."
  )
}

impl<O> Clone for Subscriber<O> {
  #[inline]
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if self.0.closed.load(Ordering::Acquire) {
      return;
    }
    let guard = self.0.observer.lock();
    // An unsubscribe may have won the race for the lock.
    if self.0.closed.load(Ordering::Acquire) {
      return;
    }
    {
      let mut slot = match guard.try_borrow_mut() {
        Ok(slot) => slot,
        Err(_) => reentrant_emission(),
      };
      slot.next(value);
    }
    let deferred = self.0.deferred.lock().take();
    if let Some(deliver) = deferred {
      let observer = guard.borrow_mut().take();
      if let Some(observer) = observer {
        deliver(observer);
      }
    } else if self.0.closed.load(Ordering::Acquire) {
      // The observer unsubscribed itself while handling the value.
      let released = guard.borrow_mut().take();
      drop(guard);
      drop(released);
    }
  }

  fn error(self, err: Err) { self.terminate(Box::new(move |o: O| o.error(err))) }

  fn complete(self) { self.terminate(Box::new(|o: O| o.complete())) }

  fn is_finished(&self) -> bool {
    if self.0.closed.load(Ordering::Acquire) {
      return true;
    }
    // Only peek at the inner observer when that does not block; a busy
    // observer is by definition still accepting values.
    self
      .0
      .observer
      .try_lock()
      .and_then(|guard| guard.try_borrow().ok().map(|slot| slot.is_finished()))
      .unwrap_or(false)
  }
}

impl<O> SubscriptionLike for Subscriber<O> {
  fn unsubscribe(&mut self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    // Waits for an in-flight delivery on another thread to finish.
    let guard = self.0.observer.lock();
    // When called from inside the observer's own callback the slot is
    // borrowed; `next` releases the observer once the callback returns.
    let released = guard.try_borrow_mut().ok().and_then(|mut slot| slot.take());
    drop(guard);
    drop(released);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::observer::ObserverAll;
  use std::sync::Mutex;

  fn recorder() -> (
    Arc<Mutex<Vec<i32>>>,
    Arc<Mutex<u32>>,
    ObserverAll<impl FnMut(i32), impl FnOnce(()), impl FnOnce()>,
  ) {
    let values = Arc::new(Mutex::new(vec![]));
    let completes = Arc::new(Mutex::new(0));
    let c_values = values.clone();
    let c_completes = completes.clone();
    let observer = ObserverAll {
      next: move |v: i32| c_values.lock().unwrap().push(v),
      error: |_: ()| {},
      complete: move || *c_completes.lock().unwrap() += 1,
    };
    (values, completes, observer)
  }

  #[test]
  fn no_events_after_unsubscribe() {
    let (values, completes, observer) = recorder();
    let mut subscriber = Subscriber::new(observer);
    let mut handle = subscriber.clone();
    subscriber.next(1);
    handle.unsubscribe();
    subscriber.next(2);
    subscriber.complete();
    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert_eq!(*completes.lock().unwrap(), 0);
    assert!(handle.is_closed());
  }

  #[test]
  fn double_unsubscribe_is_noop() {
    let (_, _, observer) = recorder();
    let mut subscriber = Subscriber::new(observer);
    subscriber.unsubscribe();
    subscriber.unsubscribe();
    assert!(subscriber.is_closed());
    assert!(Observer::<i32, ()>::is_finished(&subscriber));
  }

  #[test]
  fn terminal_delivered_once() {
    let (_, completes, observer) = recorder();
    let subscriber = Subscriber::new(observer);
    subscriber.clone().complete();
    subscriber.complete();
    assert_eq!(*completes.lock().unwrap(), 1);
  }

  #[test]
  fn unsubscribe_inside_callback() {
    let values = Arc::new(Mutex::new(vec![]));
    let slot: Arc<Mutex<Option<Box<dyn SubscriptionLike + Send>>>> =
      Arc::new(Mutex::new(None));
    let c_values = values.clone();
    let c_slot = slot.clone();
    let observer = ObserverAll {
      next: move |v: i32| {
        c_values.lock().unwrap().push(v);
        if let Some(mut s) = c_slot.lock().unwrap().take() {
          s.unsubscribe();
        }
      },
      error: |_: ()| {},
      complete: || {},
    };
    let mut subscriber = Subscriber::new(observer);
    *slot.lock().unwrap() = Some(Box::new(subscriber.clone()));
    subscriber.next(1);
    subscriber.next(2);
    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert!(subscriber.is_closed());
  }

  #[test]
  fn complete_inside_callback_is_deferred() {
    let events = Arc::new(Mutex::new(vec![]));
    let finish: Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>> =
      Arc::new(Mutex::new(None));
    let c_events = events.clone();
    let e_events = events.clone();
    let c_finish = finish.clone();
    let observer = ObserverAll {
      next: move |v: i32| {
        c_events.lock().unwrap().push(v);
        let finish = c_finish.lock().unwrap().take();
        if let Some(finish) = finish {
          finish();
        }
      },
      error: |_: ()| {},
      complete: move || e_events.lock().unwrap().push(-1),
    };
    let mut subscriber = Subscriber::new(observer);
    let handle = subscriber.clone();
    *finish.lock().unwrap() =
      Some(Box::new(move || Observer::<i32, ()>::complete(handle)));
    subscriber.next(1);
    subscriber.next(2);
    assert_eq!(*events.lock().unwrap(), vec![1, -1]);
  }

  #[test]
  fn cross_thread_unsubscribe() {
    let (values, _, observer) = recorder();
    let subscriber = Subscriber::new(observer);
    let mut producer = subscriber.clone();
    let handle = std::thread::spawn(move || {
      for i in 0..1000 {
        producer.next(i);
      }
    });
    let mut stop = subscriber.clone();
    stop.unsubscribe();
    let seen_at_unsubscribe = values.lock().unwrap().len();
    handle.join().unwrap();
    assert_eq!(values.lock().unwrap().len(), seen_at_unsubscribe);
  }
}
