use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{BoxSubscription, MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Flattens an observable of observables with a bound on the number of
/// inner subscriptions alive at once.
///
/// Inner observables beyond the bound wait in a FIFO queue and are
/// subscribed as active ones complete. The result completes once the outer
/// source and every inner observable completed; the first error from any of
/// them terminates the result and tears everything else down.
#[derive(Clone)]
pub struct MergeAllOp<S, Inner> {
  source: S,
  max_concurrent: usize,
  _hint: TypeHint<Inner>,
}

impl<S, Inner> MergeAllOp<S, Inner> {
  pub(crate) fn new(source: S, max_concurrent: usize) -> Self {
    MergeAllOp { source, max_concurrent: max_concurrent.max(1), _hint: TypeHint::new() }
  }
}

impl<Item, Err, O, S, Inner> Observable<Item, Err, O> for MergeAllOp<S, Inner>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Inner, Err, MergeAllOuterObserver<O, Item>>,
  S::Unsub: Send + 'static,
  Inner: Observable<Item, Err, MergeAllInnerObserver<O>> + Send + 'static,
  Inner::Unsub: Send + 'static,
  Item: 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = Arc::new(MergeAllCtx {
      state: Mutex::new(MergeAllState {
        active: 0,
        queue: VecDeque::new(),
        outer_done: false,
        draining: false,
      }),
      observer: Subscriber::new(observer),
      subscription: MultiSubscription::new(),
      max_concurrent: self.max_concurrent,
    });
    let subscription = ctx.subscription.clone();
    let outer = self
      .source
      .actual_subscribe(MergeAllOuterObserver { ctx, _hint: TypeHint::new() });
    subscription.add(outer);
    subscription
  }
}

impl<Item, Err, S, Inner> ObservableExt<Item, Err> for MergeAllOp<S, Inner>
where
  S: ObservableExt<Inner, Err>,
  Inner: ObservableExt<Item, Err>,
{
}

/// A queued inner observable, erased down to "subscribe this observer".
type SubscribeTask<O> = Box<dyn FnOnce(MergeAllInnerObserver<O>) -> BoxSubscription + Send>;

struct MergeAllState<O> {
  active: usize,
  queue: VecDeque<SubscribeTask<O>>,
  outer_done: bool,
  // Set while one caller runs `drain`; re-entrant callers only record
  // their change and leave the subscribing to it.
  draining: bool,
}

pub struct MergeAllCtx<O> {
  state: Mutex<MergeAllState<O>>,
  observer: Subscriber<O>,
  subscription: MultiSubscription,
  max_concurrent: usize,
}

impl<O> MergeAllCtx<O> {
  fn drain<Item, Err>(self: &Arc<Self>)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    {
      let mut state = self.state.lock();
      if state.draining {
        return;
      }
      state.draining = true;
    }
    loop {
      let next = {
        let mut state = self.state.lock();
        if state.active < self.max_concurrent {
          let task = state.queue.pop_front();
          if task.is_some() {
            state.active += 1;
          }
          task
        } else {
          None
        }
      };
      match next {
        Some(task) => {
          if self.subscription.is_closed() {
            continue;
          }
          let unsub = task(MergeAllInnerObserver { ctx: self.clone() });
          self.subscription.add(unsub);
        }
        None => {
          let finished = {
            let mut state = self.state.lock();
            // An inner may have completed between the pop and this check.
            if state.active < self.max_concurrent && !state.queue.is_empty() {
              continue;
            }
            state.draining = false;
            state.outer_done && state.active == 0 && state.queue.is_empty()
          };
          if finished {
            Observer::<Item, Err>::complete(self.observer.clone());
            self.subscription.clone().unsubscribe();
          }
          break;
        }
      }
    }
  }

  fn fail<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    Observer::<Item, Err>::error(self.observer.clone(), err);
    self.subscription.clone().unsubscribe();
    self.state.lock().queue.clear();
  }
}

pub struct MergeAllOuterObserver<O, Item> {
  ctx: Arc<MergeAllCtx<O>>,
  _hint: TypeHint<Item>,
}

impl<Item, Err, O, Inner> Observer<Inner, Err> for MergeAllOuterObserver<O, Item>
where
  O: Observer<Item, Err> + 'static,
  Inner: Observable<Item, Err, MergeAllInnerObserver<O>> + Send + 'static,
  Inner::Unsub: Send + 'static,
  Item: 'static,
  Err: Send + 'static,
{
  fn next(&mut self, inner: Inner) {
    let task: SubscribeTask<O> =
      Box::new(move |observer: MergeAllInnerObserver<O>| -> BoxSubscription {
        Box::new(inner.actual_subscribe(observer))
      });
    self.ctx.state.lock().queue.push_back(task);
    self.ctx.drain::<Item, Err>();
  }

  fn error(self, err: Err) { self.ctx.fail::<Item, Err>(err) }

  fn complete(self) {
    self.ctx.state.lock().outer_done = true;
    self.ctx.drain::<Item, Err>();
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}

pub struct MergeAllInnerObserver<O> {
  ctx: Arc<MergeAllCtx<O>>,
}

impl<Item, Err, O> Observer<Item, Err> for MergeAllInnerObserver<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.ctx.observer.clone().next(value) }

  fn error(self, err: Err) { self.ctx.fail::<Item, Err>(err) }

  fn complete(self) {
    {
      let mut state = self.ctx.state.lock();
      state.active = state.active.saturating_sub(1);
    }
    self.ctx.drain::<Item, Err>();
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}
