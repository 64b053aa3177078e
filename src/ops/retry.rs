use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subject::Subject,
  subscriber::Subscriber,
  subscription::{BoxSubscription, MultiSubscription, SerialSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Resubscribes to the source up to `count` times after an error. The
/// error that exhausts the budget reaches the downstream.
#[derive(Clone)]
pub struct RetryOp<S> {
  source: S,
  count: usize,
}

impl<S> RetryOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { RetryOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for RetryOp<S>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Item, Err, RetryObserver<O, RetryBudget>> + Clone + Send + 'static,
  S::Unsub: Send + 'static,
  Item: 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = RetryCtx::new(self.source, observer, RetryBudget(Mutex::new(self.count)));
    let subscription = ctx.subscription.clone();
    ctx.resubscribe();
    subscription
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for RetryOp<S> where S: ObservableExt<Item, Err> {}

/// Resubscribes to the source whenever the notifier returned by `handler`
/// emits.
///
/// `handler` receives a subject carrying every error of the source. The
/// notifier's error terminates the stream with that error and its
/// completion completes the stream.
#[derive(Clone)]
pub struct RetryWhenOp<S, F, NItem> {
  source: S,
  handler: F,
  _hint: TypeHint<NItem>,
}

impl<S, F, NItem> RetryWhenOp<S, F, NItem> {
  pub(crate) fn new(source: S, handler: F) -> Self {
    RetryWhenOp { source, handler, _hint: TypeHint::new() }
  }
}

impl<Item, Err, O, S, F, N, NItem> Observable<Item, Err, O> for RetryWhenOp<S, F, NItem>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Item, Err, RetryObserver<O, Subject<Err, Err>>> + Clone + Send + 'static,
  S::Unsub: Send + 'static,
  F: FnOnce(Subject<Err, Err>) -> N,
  N: Observable<NItem, Err, RetryWhenNotifierObserver<O, Err, Item>>,
  N::Unsub: Send + 'static,
  Item: 'static,
  Err: Clone + Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let errors = Subject::new();
    let notifier = (self.handler)(errors.clone());
    let ctx = RetryCtx::new(self.source, observer, errors);
    let subscription = ctx.subscription.clone();
    let notifier = notifier
      .actual_subscribe(RetryWhenNotifierObserver { ctx: ctx.clone(), _hint: TypeHint::new() });
    subscription.add(notifier);
    ctx.resubscribe();
    subscription
  }
}

impl<Item, Err, S, F, N, NItem> ObservableExt<Item, Err> for RetryWhenOp<S, F, NItem>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(Subject<Err, Err>) -> N,
  N: ObservableExt<NItem, Err>,
{
}

/// Remaining resubscriptions of a [`RetryOp`].
pub struct RetryBudget(Mutex<usize>);

struct Trampoline {
  running: bool,
  pending: bool,
}

/// Subscribes one more attempt of the source.
type Resubscribe<O, P> = Box<dyn FnMut(RetryObserver<O, P>) -> BoxSubscription + Send>;

/// State shared by every attempt of one retrying subscription.
pub struct RetryCtx<O, P> {
  subscribe: Mutex<Resubscribe<O, P>>,
  observer: Subscriber<O>,
  policy: P,
  trampoline: Mutex<Trampoline>,
  attempt: SerialSubscription,
  subscription: MultiSubscription,
}

impl<O: 'static, P: 'static> RetryCtx<O, P> {
  fn new<Item, Err, S>(source: S, observer: O, policy: P) -> Arc<Self>
  where
    S: Observable<Item, Err, RetryObserver<O, P>> + Clone + Send + 'static,
    S::Unsub: Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    let subscribe: Resubscribe<O, P> =
      Box::new(move |observer: RetryObserver<O, P>| -> BoxSubscription {
        Box::new(source.clone().actual_subscribe(observer))
      });
    let attempt = SerialSubscription::new();
    let subscription = MultiSubscription::new();
    subscription.add(attempt.clone());
    Arc::new(RetryCtx {
      subscribe: Mutex::new(subscribe),
      observer: Subscriber::new(observer),
      policy,
      trampoline: Mutex::new(Trampoline { running: false, pending: false }),
      attempt,
      subscription,
    })
  }
}

impl<O, P> RetryCtx<O, P> {
  fn resubscribe(self: &Arc<Self>) { self.drive(|| self.trampoline.lock().pending = true); }

  /// Runs `f` inside the resubscribe loop. A resubscription requested while
  /// `f` runs, or while an attempt is being subscribed, starts once the
  /// current step returned, so synchronous sources never nest attempts.
  fn drive(self: &Arc<Self>, f: impl FnOnce()) {
    let owner = !std::mem::replace(&mut self.trampoline.lock().running, true);
    f();
    if !owner {
      return;
    }
    loop {
      let go = {
        let mut trampoline = self.trampoline.lock();
        let go = trampoline.pending && !self.attempt.is_closed();
        trampoline.pending = false;
        trampoline.running = go;
        go
      };
      if !go {
        break;
      }
      let unsub = (self.subscribe.lock())(RetryObserver { ctx: self.clone() });
      self.attempt.replace(unsub);
    }
  }

  fn error<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    Observer::<Item, Err>::error(self.observer.clone(), err);
    self.subscription.clone().unsubscribe();
  }

  fn complete<Item, Err>(&self)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    Observer::<Item, Err>::complete(self.observer.clone());
    self.subscription.clone().unsubscribe();
  }
}

/// Observer of one attempt; `P` decides what an error does.
pub struct RetryObserver<O, P> {
  ctx: Arc<RetryCtx<O, P>>,
}

impl<Item, Err, O> Observer<Item, Err> for RetryObserver<O, RetryBudget>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.ctx.observer.clone().next(value) }

  fn error(self, err: Err) {
    let remaining = {
      let mut budget = self.ctx.policy.0.lock();
      let remaining = budget.checked_sub(1);
      if let Some(left) = remaining {
        *budget = left;
      }
      remaining
    };
    match remaining {
      Some(left) => {
        tracing::debug!(retries_left = left, "retry resubscribing after error");
        self.ctx.resubscribe();
      }
      None => self.ctx.error::<Item, Err>(err),
    }
  }

  #[inline]
  fn complete(self) { self.ctx.complete::<Item, Err>() }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}

impl<Item, Err, O> Observer<Item, Err> for RetryObserver<O, Subject<Err, Err>>
where
  O: Observer<Item, Err>,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.ctx.observer.clone().next(value) }

  fn error(self, err: Err) {
    tracing::debug!("retry_when handing the error to its notifier");
    let mut errors = self.ctx.policy.clone();
    self.ctx.drive(move || errors.next(err));
  }

  #[inline]
  fn complete(self) { self.ctx.complete::<Item, Err>() }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}

pub struct RetryWhenNotifierObserver<O, Err, Item> {
  ctx: Arc<RetryCtx<O, Subject<Err, Err>>>,
  _hint: TypeHint<Item>,
}

impl<NItem, Item, Err, O> Observer<NItem, Err> for RetryWhenNotifierObserver<O, Err, Item>
where
  O: Observer<Item, Err>,
  Err: Clone + Send + 'static,
{
  fn next(&mut self, _: NItem) {
    tracing::debug!("retry_when resubscribing");
    self.ctx.resubscribe();
  }

  fn error(self, err: Err) { self.ctx.error::<Item, Err>(err) }

  fn complete(self) { self.ctx.complete::<Item, Err>() }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.ctx.observer) }
}
