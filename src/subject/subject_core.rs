//! State machine shared by every subject variant.
//!
//! A subject owns an ordered list of attached observers and a replay buffer
//! whose policy depends on the variant. Its lifecycle is
//!
//! ```text
//! Active ──error/complete──▶ Completed | Errored(err)
//!    └─────────dispose──────▶ Disposed
//! ```
//!
//! Delivery always iterates a snapshot of the observer list taken under the
//! state lock, so attaching or detaching during delivery never mutates the
//! list being iterated. Writers are serialized by a re-entrant emission gate.

use std::{
  collections::VecDeque,
  sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex};
use smallvec::SmallVec;

use crate::{
  observer::{BoxedObserver, Observer},
  subscriber::Subscriber,
  subscription::SubscriptionLike,
};

pub(crate) type SubjectObserver<Item, Err> = Subscriber<BoxedObserver<Item, Err>>;

pub(crate) enum Lifecycle<Err> {
  Active,
  Completed,
  Errored(Err),
  Disposed,
}

/// Replay policy of a subject.
pub(crate) enum Buffer<Item> {
  /// Publish: late subscribers only see live events.
  None,
  /// Behavior: the current value.
  Latest(Option<Item>),
  /// Replay: the last `capacity` values, oldest first.
  Bounded { capacity: usize, values: VecDeque<Item> },
  Unbounded(VecDeque<Item>),
}

impl<Item: Clone> Buffer<Item> {
  fn push(&mut self, value: &Item) {
    match self {
      Buffer::None => {}
      Buffer::Latest(latest) => *latest = Some(value.clone()),
      Buffer::Bounded { capacity, values } => {
        if *capacity == 0 {
          return;
        }
        if values.len() == *capacity {
          values.pop_front();
        }
        values.push_back(value.clone());
      }
      Buffer::Unbounded(values) => values.push_back(value.clone()),
    }
  }

  fn snapshot(&self) -> Vec<Item> {
    match self {
      Buffer::None => vec![],
      Buffer::Latest(latest) => latest.iter().cloned().collect(),
      Buffer::Bounded { values, .. } | Buffer::Unbounded(values) => values.iter().cloned().collect(),
    }
  }
}

impl<Item> Buffer<Item> {
  fn clear(&mut self) {
    match self {
      Buffer::None => {}
      Buffer::Latest(latest) => *latest = None,
      Buffer::Bounded { values, .. } | Buffer::Unbounded(values) => values.clear(),
    }
  }
}

struct SubjectState<Item, Err> {
  observers: Vec<(usize, SubjectObserver<Item, Err>)>,
  next_id: usize,
  lifecycle: Lifecycle<Err>,
  buffer: Buffer<Item>,
}

pub(crate) struct SubjectCore<Item, Err> {
  gate: ReentrantMutex<()>,
  state: Mutex<SubjectState<Item, Err>>,
}

type Snapshot<Item, Err> = SmallVec<[SubjectObserver<Item, Err>; 4]>;

impl<Item, Err> SubjectCore<Item, Err> {
  pub(crate) fn new(buffer: Buffer<Item>) -> Arc<Self> {
    Arc::new(SubjectCore {
      gate: ReentrantMutex::new(()),
      state: Mutex::new(SubjectState {
        observers: vec![],
        next_id: 0,
        lifecycle: Lifecycle::Active,
        buffer,
      }),
    })
  }

  pub(crate) fn subscriber_count(&self) -> usize { self.state.lock().observers.len() }

  pub(crate) fn is_active(&self) -> bool { matches!(self.state.lock().lifecycle, Lifecycle::Active) }

  pub(crate) fn is_terminated(&self) -> bool {
    matches!(
      self.state.lock().lifecycle,
      Lifecycle::Completed | Lifecycle::Errored(_)
    )
  }

  pub(crate) fn is_disposed(&self) -> bool {
    matches!(self.state.lock().lifecycle, Lifecycle::Disposed)
  }

  /// Moves to the disposed state, releasing every observer without an
  /// event.
  pub(crate) fn dispose(&self) {
    let _gate = self.gate.lock();
    let observers = {
      let mut state = self.state.lock();
      if matches!(state.lifecycle, Lifecycle::Disposed) {
        return;
      }
      state.lifecycle = Lifecycle::Disposed;
      state.buffer.clear();
      std::mem::take(&mut state.observers)
    };
    tracing::trace!(released = observers.len(), "subject disposed");
    for (_, mut observer) in observers {
      observer.unsubscribe();
    }
  }

  fn detach(&self, id: usize) {
    let removed = {
      let mut state = self.state.lock();
      state
        .observers
        .iter()
        .position(|(i, _)| *i == id)
        .map(|pos| state.observers.remove(pos))
    };
    if removed.is_some() {
      tracing::trace!(id, "subject observer detached");
    }
  }
}

impl<Item, Err> SubjectCore<Item, Err>
where
  Item: Clone,
  Err: Clone + Send + 'static,
{
  pub(crate) fn latest(&self) -> Option<Item> {
    match &self.state.lock().buffer {
      Buffer::Latest(latest) => latest.clone(),
      _ => None,
    }
  }

  pub(crate) fn emit_next(&self, value: Item) {
    let _gate = self.gate.lock();
    let observers: Snapshot<Item, Err> = {
      let mut state = self.state.lock();
      if !matches!(state.lifecycle, Lifecycle::Active) {
        return;
      }
      state.buffer.push(&value);
      state.observers.iter().map(|(_, o)| o.clone()).collect()
    };
    for mut observer in observers {
      observer.next(value.clone());
    }
    self.prune_finished();
  }

  /// Detaches observers whose downstream stopped accepting values, such as
  /// the observer of a `take(1)` that already got its value.
  fn prune_finished(&self) {
    let mut finished: Snapshot<Item, Err> = SmallVec::new();
    self.state.lock().observers.retain(|(_, o)| {
      let done = Observer::<Item, Err>::is_finished(o);
      if done {
        finished.push(o.clone());
      }
      !done
    });
    if !finished.is_empty() {
      tracing::trace!(released = finished.len(), "subject released finished observers");
    }
    for mut observer in finished {
      observer.unsubscribe();
    }
  }

  pub(crate) fn emit_error(&self, err: Err) {
    let _gate = self.gate.lock();
    let observers = {
      let mut state = self.state.lock();
      if !matches!(state.lifecycle, Lifecycle::Active) {
        return;
      }
      state.lifecycle = Lifecycle::Errored(err.clone());
      state.buffer.clear();
      std::mem::take(&mut state.observers)
    };
    for (_, observer) in observers {
      observer.error(err.clone());
    }
  }

  pub(crate) fn emit_complete(&self) {
    let _gate = self.gate.lock();
    let observers = {
      let mut state = self.state.lock();
      if !matches!(state.lifecycle, Lifecycle::Active) {
        return;
      }
      state.lifecycle = Lifecycle::Completed;
      state.buffer.clear();
      std::mem::take(&mut state.observers)
    };
    for (_, observer) in observers {
      observer.complete();
    }
  }

  /// Replays the buffer to `observer` and attaches it, or delivers the
  /// terminal event when the subject already terminated.
  pub(crate) fn attach<O>(self: &Arc<Self>, observer: O) -> SubjectSubscription<Item, Err>
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let _gate = self.gate.lock();
    let boxed: BoxedObserver<Item, Err> = Box::new(observer);
    let mut subscriber: SubjectObserver<Item, Err> = Subscriber::new(boxed);
    let mut state = self.state.lock();
    match &state.lifecycle {
      Lifecycle::Active => {}
      Lifecycle::Completed => {
        drop(state);
        subscriber.complete();
        return SubjectSubscription::closed();
      }
      Lifecycle::Errored(err) => {
        let err = err.clone();
        drop(state);
        subscriber.error(err);
        return SubjectSubscription::closed();
      }
      Lifecycle::Disposed => return SubjectSubscription::closed(),
    }
    let id = state.next_id;
    state.next_id += 1;
    let replay = state.buffer.snapshot();
    state.observers.push((id, subscriber.clone()));
    drop(state);
    tracing::trace!(id, replay = replay.len(), "subject observer attached");

    for value in replay {
      if subscriber.is_closed() {
        break;
      }
      subscriber.next(value);
    }
    if Observer::<Item, Err>::is_finished(&subscriber) {
      subscriber.unsubscribe();
      self.detach(id);
    }
    SubjectSubscription {
      core: Arc::downgrade(self),
      id,
      subscriber: Some(subscriber),
    }
  }
}

/// Subscription to a subject. Unsubscribing stops delivery to the observer
/// at once and detaches it from the subject.
///
/// It holds the subject weakly: it never keeps a subject alive.
pub struct SubjectSubscription<Item, Err> {
  core: Weak<SubjectCore<Item, Err>>,
  id: usize,
  subscriber: Option<SubjectObserver<Item, Err>>,
}

impl<Item, Err> SubjectSubscription<Item, Err> {
  fn closed() -> Self { SubjectSubscription { core: Weak::new(), id: 0, subscriber: None } }
}

impl<Item, Err> SubscriptionLike for SubjectSubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    let Some(mut subscriber) = self.subscriber.take() else {
      return;
    };
    subscriber.unsubscribe();
    if let Some(core) = self.core.upgrade() {
      core.detach(self.id);
    }
  }

  fn is_closed(&self) -> bool { self.subscriber.as_ref().map_or(true, |s| s.is_closed()) }
}
