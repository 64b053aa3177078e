use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  time::Duration,
};

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SerialSubscription, SubscriptionLike, ZipSubscription},
};

#[derive(Clone)]
pub struct TimeoutOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> TimeoutOp<S, SD> {
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    TimeoutOp { source, duration, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for TimeoutOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, TimeoutObserver<O, SD>>,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError> + Send + 'static,
{
  type Unsub = ZipSubscription<MultiSubscription, SerialSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, duration, scheduler } = self;
    let ctx = Arc::new(TimeoutCtx {
      observer: Subscriber::new(observer),
      scheduler,
      duration,
      seq: AtomicUsize::new(0),
      timer: SerialSubscription::new(),
      upstream: MultiSubscription::new(),
    });
    ctx.arm::<Item, Err>(0);
    let unsub = source.actual_subscribe(TimeoutObserver { ctx: ctx.clone() });
    ctx.upstream.add(unsub);
    ZipSubscription::new(ctx.upstream.clone(), ctx.timer.clone())
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for TimeoutOp<S, SD> where S: ObservableExt<Item, Err> {}

// Sequence value once the stream terminated, by timeout or upstream.
const DONE: usize = usize::MAX;

struct TimeoutCtx<O, SD> {
  observer: Subscriber<O>,
  scheduler: SD,
  duration: Duration,
  // Id of the value the running timer waits behind.
  seq: AtomicUsize,
  timer: SerialSubscription,
  upstream: MultiSubscription,
}

impl<O, SD: Scheduler> TimeoutCtx<O, SD> {
  fn arm<Item, Err>(self: &Arc<Self>, id: usize)
  where
    O: Observer<Item, Err> + Send + 'static,
    Err: From<RxError> + Send + 'static,
  {
    let ctx = self.clone();
    let task = move || {
      if ctx.seq.compare_exchange(id, DONE, Ordering::AcqRel, Ordering::Acquire).is_ok() {
        tracing::debug!(duration = ?ctx.duration, "timeout elapsed");
        ctx.upstream.clone().unsubscribe();
        Observer::<Item, Err>::error(ctx.observer.clone(), RxError::Timeout(ctx.duration).into());
      }
    };
    match self.scheduler.schedule(task, Some(self.duration)) {
      Ok(handle) => self.timer.replace(handle),
      Err(e) => {
        if self.finish() {
          self.upstream.clone().unsubscribe();
          Observer::<Item, Err>::error(self.observer.clone(), e.into());
        }
      }
    }
  }

  /// Marks the stream as terminated, `false` if it already was.
  fn finish(&self) -> bool {
    let finished = self.seq.swap(DONE, Ordering::AcqRel) != DONE;
    self.timer.clone().unsubscribe();
    finished
  }
}

pub struct TimeoutObserver<O, SD> {
  ctx: Arc<TimeoutCtx<O, SD>>,
}

impl<Item, Err, O, SD> Observer<Item, Err> for TimeoutObserver<O, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Err: From<RxError> + Send + 'static,
{
  fn next(&mut self, value: Item) {
    let bumped = self
      .ctx
      .seq
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| (s != DONE).then(|| s + 1));
    if let Ok(previous) = bumped {
      self.ctx.observer.clone().next(value);
      self.ctx.arm::<Item, Err>(previous + 1);
    }
  }

  fn error(self, err: Err) {
    if self.ctx.finish() {
      self.ctx.observer.clone().error(err);
    }
  }

  fn complete(self) {
    if self.ctx.finish() {
      Observer::<Item, Err>::complete(self.ctx.observer.clone());
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.ctx.seq.load(Ordering::Acquire) == DONE }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  #[test]
  fn fails_after_silence() {
    let scheduler = TestScheduler::new();
    let mut subject = Subject::<i32, RxError>::new();
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    subject
      .clone()
      .timeout(Duration::from_millis(10), scheduler.clone())
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));

    scheduler.advance_by(Duration::from_millis(9));
    subject.next(1);
    scheduler.advance_by(Duration::from_millis(9));
    subject.next(2);
    scheduler.advance_by(Duration::from_millis(10));
    subject.next(3);

    assert_eq!(
      *events.lock().unwrap(),
      vec![
        Event::Next(1),
        Event::Next(2),
        Event::Error(RxError::Timeout(Duration::from_millis(10)))
      ]
    );
    // The upstream was released on timeout.
    assert!(subject.is_empty());
  }

  #[test]
  fn completion_cancels_timer() {
    let scheduler = TestScheduler::new();
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    observable::of(1)
      .map_err(RxError::from)
      .timeout(Duration::from_millis(10), scheduler.clone())
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    scheduler.flush();
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(1), Event::Completed]);
  }

  #[test]
  fn unsubscribe_cancels_timer() {
    let scheduler = TestScheduler::new();
    let subject = Subject::<i32, RxError>::new();
    let events = Arc::new(Mutex::new(vec![]));
    let c_events = events.clone();
    let mut subscription = subject
      .clone()
      .timeout(Duration::from_millis(10), scheduler.clone())
      .subscribe_event(move |e| c_events.lock().unwrap().push(e));
    subscription.unsubscribe();
    scheduler.flush();
    assert!(events.lock().unwrap().is_empty());
    assert!(subject.is_empty());
  }
}
