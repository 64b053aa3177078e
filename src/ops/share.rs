use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subject::{ReplaySubject, SubjectSubscription},
  subscription::{BoxSubscription, SubscriptionLike},
};

/// How long a shared upstream subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareScope {
  /// The upstream is torn down when the last subscriber leaves, and the
  /// replay buffer is reset with it. The next subscriber connects anew.
  #[default]
  WhileConnected,
  /// Once connected, the upstream and the replay buffer stay alive for the
  /// lifetime of the shared observable.
  Forever,
}

/// Shares one upstream subscription among every subscriber, replaying the
/// last `buffer_size` values to late subscribers.
///
/// Clones of the operator share the same state, so they multicast too.
pub struct ShareReplayOp<S, Item, Err> {
  source: S,
  scope: ShareScope,
  state: Arc<Mutex<ShareState<Item, Err>>>,
}

struct ShareState<Item, Err> {
  subject: ReplaySubject<Item, Err>,
  buffer_size: usize,
  ref_count: usize,
  connected: bool,
  connection: Option<BoxSubscription>,
  // Bumped whenever the subject is replaced; handles of an older
  // generation no longer count towards `ref_count`.
  generation: usize,
}

impl<S, Item, Err> ShareReplayOp<S, Item, Err> {
  pub(crate) fn new(source: S, buffer_size: usize, scope: ShareScope) -> Self {
    ShareReplayOp {
      source,
      scope,
      state: Arc::new(Mutex::new(ShareState {
        subject: ReplaySubject::new(buffer_size),
        buffer_size,
        ref_count: 0,
        connected: false,
        connection: None,
        generation: 0,
      })),
    }
  }

  /// Number of subscribers currently sharing the upstream.
  pub fn ref_count(&self) -> usize { self.state.lock().ref_count }
}

impl<S: Clone, Item, Err> Clone for ShareReplayOp<S, Item, Err> {
  fn clone(&self) -> Self {
    ShareReplayOp {
      source: self.source.clone(),
      scope: self.scope,
      state: self.state.clone(),
    }
  }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for ShareReplayOp<S, Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, ReplaySubject<Item, Err>>,
  S::Unsub: Send + 'static,
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Unsub = ShareSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let (subject, generation, connect) = {
      let mut state = self.state.lock();
      if self.scope == ShareScope::WhileConnected && state.subject.is_terminated() {
        state.subject = ReplaySubject::new(state.buffer_size);
        state.ref_count = 0;
        state.connected = false;
        state.connection = None;
        state.generation += 1;
      }
      state.ref_count += 1;
      let connect = !state.connected;
      state.connected = true;
      (state.subject.clone(), state.generation, connect)
    };

    let link = Arc::new(ShareLink {
      state: self.state.clone(),
      generation,
      scope: self.scope,
      released: AtomicBool::new(false),
    });
    // Attach before connecting so a synchronous source reaches this
    // observer too.
    let inner = subject
      .clone()
      .actual_subscribe(ShareObserver { observer, link: link.clone() });
    if connect {
      tracing::trace!(generation, "shared observable connecting");
      let connection: BoxSubscription = Box::new(self.source.actual_subscribe(subject));
      let mut state = self.state.lock();
      if state.generation == generation && state.connected {
        state.connection = Some(connection);
      } else {
        drop(state);
        let mut connection = connection;
        connection.unsubscribe();
      }
    }
    ShareSubscription { inner, link }
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for ShareReplayOp<S, Item, Err> where
  S: ObservableExt<Item, Err>
{
}

/// One subscriber's claim on the shared upstream, given back exactly once:
/// either by its subscription or by its observer finishing on its own.
struct ShareLink<Item, Err> {
  state: Arc<Mutex<ShareState<Item, Err>>>,
  generation: usize,
  scope: ShareScope,
  released: AtomicBool,
}

impl<Item, Err> ShareLink<Item, Err> {
  fn release(&self) {
    if self.released.swap(true, Ordering::AcqRel) {
      return;
    }
    let connection = {
      let mut state = self.state.lock();
      if state.generation != self.generation {
        return;
      }
      state.ref_count = state.ref_count.saturating_sub(1);
      if state.ref_count == 0 && self.scope == ShareScope::WhileConnected {
        state.subject = ReplaySubject::new(state.buffer_size);
        state.connected = false;
        state.generation += 1;
        state.connection.take()
      } else {
        None
      }
    };
    if let Some(mut connection) = connection {
      tracing::trace!(generation = self.generation, "shared observable disconnected");
      connection.unsubscribe();
    }
  }

  fn is_released(&self) -> bool { self.released.load(Ordering::Acquire) }
}

/// Downstream observer of a share. Gives its claim back as soon as the
/// downstream stops accepting values, e.g. after a `take(1)`.
pub struct ShareObserver<O, Item, Err> {
  observer: O,
  link: Arc<ShareLink<Item, Err>>,
}

impl<Item, Err, O> Observer<Item, Err> for ShareObserver<O, Item, Err>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    self.observer.next(value);
    if self.observer.is_finished() {
      self.link.release();
    }
  }

  observer_terminal_proxy_impl!();
}

/// Subscription of one shared subscriber. The last one to leave a
/// [`ShareScope::WhileConnected`] share disconnects the upstream.
pub struct ShareSubscription<Item, Err> {
  inner: SubjectSubscription<Item, Err>,
  link: Arc<ShareLink<Item, Err>>,
}

impl<Item, Err> SubscriptionLike for ShareSubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    self.inner.unsubscribe();
    self.link.release();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.link.is_released() || self.inner.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  #[test]
  fn one_upstream_for_many_subscribers() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let d_seen = seen.clone();
    let mut first = shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(("a", v)));
    let mut second = shared.clone().subscribe(move |v| d_seen.lock().unwrap().push(("b", v)));
    assert_eq!(source.subscriber_count(), 1);
    assert_eq!(shared.ref_count(), 2);

    source.next(1);
    first.unsubscribe();
    source.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![("a", 1), ("b", 1), ("b", 2)]);

    second.unsubscribe();
    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(shared.ref_count(), 0);
  }

  #[test]
  fn finished_downstream_releases_upstream() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let handle = shared.clone().take(1).subscribe(move |v| c_seen.lock().unwrap().push(v));
    source.next(1);
    source.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![1]);
    assert_eq!(shared.ref_count(), 0);
    assert_eq!(source.subscriber_count(), 0);
    assert!(handle.is_closed());
  }

  #[test]
  fn finished_during_replay_releases_its_count() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share_replay(1, ShareScope::WhileConnected);
    let mut keep = shared.clone().subscribe(|_| {});
    source.next(1);
    shared.clone().take(1).subscribe(|_| {});
    assert_eq!(shared.ref_count(), 1);
    keep.unsubscribe();
    assert_eq!(shared.ref_count(), 0);
    assert_eq!(source.subscriber_count(), 0);
  }

  #[test]
  fn replays_to_late_subscribers() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share_replay(2, ShareScope::WhileConnected);
    let _keep = shared.clone().subscribe(|_| {});
    source.next(1);
    source.next(2);
    source.next(3);
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
  }

  #[test]
  fn while_connected_resets_on_last_unsubscribe() {
    let subscriptions = Arc::new(AtomicUsize::new(0));
    let c_subscriptions = subscriptions.clone();
    let mut source = Subject::<i32, ()>::new();
    let c_source = source.clone();
    let shared = observable::defer(move || {
      c_subscriptions.fetch_add(1, Ordering::SeqCst);
      c_source.clone()
    })
    .share_replay(1, ShareScope::WhileConnected);

    let mut first = shared.clone().subscribe(|_| {});
    source.next(1);
    first.unsubscribe();

    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(subscriptions.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn forever_keeps_buffer_and_upstream() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share_replay(1, ShareScope::Forever);

    let mut first = shared.clone().subscribe(|_| {});
    source.next(1);
    first.unsubscribe();
    assert_eq!(source.subscriber_count(), 1);
    source.next(2);

    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2]);
  }

  #[test]
  fn completed_share_reconnects_while_connected() {
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    let shared = observable::defer(move || {
      c_runs.fetch_add(1, Ordering::SeqCst);
      observable::from_iter(1..3)
    })
    .share();
    let seen = Arc::new(Mutex::new(vec![]));
    for _ in 0..2 {
      let c_seen = seen.clone();
      shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
    }
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 2]);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn completed_share_forever_delivers_the_terminal() {
    let shared = observable::from_iter(1..3).share_replay(0, ShareScope::Forever);
    shared.clone().subscribe(|_| {});
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    shared.subscribe_event(move |e| c_events.lock().unwrap().push(e));
    assert_eq!(*events.lock().unwrap(), vec![Event::Completed]);
  }
}
