use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{BoxSubscription, SubscriptionLike},
};

/// A multicast observable that only subscribes to its source when
/// [`connect`](ConnectableObservable::connect) is called.
///
/// Observers attach to the inner subject, so everyone who subscribed before
/// `connect` sees the source from its first value. `Sub` decides what late
/// subscribers get: nothing (`publish`) or a replay window (`replay`).
pub struct ConnectableObservable<S, Sub> {
  source: S,
  subject: Sub,
  connection: Arc<Mutex<Option<BoxSubscription>>>,
}

impl<S: Clone, Sub: Clone> Clone for ConnectableObservable<S, Sub> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, Sub> ConnectableObservable<S, Sub> {
  pub fn new(source: S, subject: Sub) -> Self {
    ConnectableObservable { source, subject, connection: Arc::default() }
  }

  /// The subject observers attach to.
  pub fn fork(&self) -> Sub
  where
    Sub: Clone,
  {
    self.subject.clone()
  }

  /// Subscribes the subject to the source. While a connection is alive,
  /// calling `connect` again returns a handle to that same connection.
  pub fn connect<Item, Err>(&self) -> Connection
  where
    S: Observable<Item, Err, Sub> + Clone,
    S::Unsub: Send + 'static,
    Sub: Clone,
  {
    {
      let connection = self.connection.lock();
      if connection.as_ref().is_some_and(|c| !c.is_closed()) {
        return Connection(self.connection.clone());
      }
    }
    tracing::trace!("connectable observable connecting");
    let subscription: BoxSubscription =
      Box::new(self.source.clone().actual_subscribe(self.subject.clone()));
    let replaced = self.connection.lock().replace(subscription);
    drop(replaced);
    Connection(self.connection.clone())
  }
}

impl<Item, Err, O, S, Sub> Observable<Item, Err, O> for ConnectableObservable<S, Sub>
where
  O: Observer<Item, Err>,
  Sub: Observable<Item, Err, O>,
{
  type Unsub = Sub::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.subject.actual_subscribe(observer) }
}

impl<Item, Err, S, Sub> ObservableExt<Item, Err> for ConnectableObservable<S, Sub> where
  Sub: ObservableExt<Item, Err>
{
}

/// Handle of a live connection; unsubscribing disconnects the source.
/// Observers already attached stay attached and a later `connect`
/// subscribes the source again.
#[derive(Clone)]
pub struct Connection(Arc<Mutex<Option<BoxSubscription>>>);

impl SubscriptionLike for Connection {
  fn unsubscribe(&mut self) {
    let subscription = self.0.lock().take();
    if let Some(mut subscription) = subscription {
      tracing::trace!("connectable observable disconnected");
      subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.lock().as_ref().map_or(true, |c| c.is_closed()) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn publish_waits_for_connect() {
    let seen = Arc::new(Mutex::new(vec![]));
    let connectable = observable::from_iter(1..4).publish();
    for tag in ["a", "b"] {
      let c_seen = seen.clone();
      connectable.clone().subscribe(move |v| c_seen.lock().unwrap().push((tag, v)));
    }
    assert!(seen.lock().unwrap().is_empty());
    connectable.connect();
    assert_eq!(
      *seen.lock().unwrap(),
      vec![("a", 1), ("b", 1), ("a", 2), ("b", 2), ("a", 3), ("b", 3)]
    );
  }

  #[test]
  fn disconnect_stops_the_source() {
    let mut source = Subject::<i32, ()>::new();
    let connectable = source.clone().publish();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));

    let mut connection = connectable.connect();
    source.next(1);
    connection.unsubscribe();
    assert!(connection.is_closed());
    source.next(2);

    connectable.connect();
    source.next(3);
    assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
  }

  #[test]
  fn connect_twice_shares_one_connection() {
    let mut source = Subject::<i32, ()>::new();
    let connectable = source.clone().publish();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    let _first = connectable.connect();
    let _second = connectable.connect();
    source.next(7);
    assert_eq!(*seen.lock().unwrap(), vec![7]);
    assert_eq!(source.subscriber_count(), 1);
  }

  #[test]
  fn replay_serves_late_subscribers() {
    let connectable = observable::from_iter(1..=4).replay(2);
    connectable.connect();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.clone().subscribe_event(move |e| c_seen.lock().unwrap().push(e));
    // The source completed already, so only its completion is replayed.
    assert_eq!(*seen.lock().unwrap(), vec![Event::Completed]);
  }

  #[test]
  fn replay_window_before_completion() {
    let mut source = Subject::<i32, ()>::new();
    let connectable = source.clone().replay(2);
    connectable.connect();
    for v in 1..=3 {
      source.next(v);
    }
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.fork().subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
  }
}
