use std::time::Duration;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::Scheduler,
  subscription::{SerialSubscription, SubscriptionLike, ZipSubscription},
};

/// Config to define leading and trailing behavior for throttle
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ThrottleEdge {
  trailing: bool,
  leading: bool,
}

impl ThrottleEdge {
  /// Emit the value that opens a window, drop the rest of the window.
  #[inline]
  pub fn leading() -> Self { Self { trailing: false, leading: true } }

  /// Emit the last value of each window when the window closes.
  #[inline]
  pub fn trailing() -> Self { Self { trailing: true, leading: false } }

  #[inline]
  pub fn all() -> Self { Self { trailing: true, leading: true } }
}

#[derive(Clone)]
pub struct ThrottleOp<S, SD> {
  source: S,
  duration: Duration,
  edge: ThrottleEdge,
  scheduler: SD,
}

impl<S, SD> ThrottleOp<S, SD> {
  pub(crate) fn new(source: S, duration: Duration, edge: ThrottleEdge, scheduler: SD) -> Self {
    ThrottleOp { source, duration, edge, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for ThrottleOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, ThrottleObserver<O, SD, Item>>,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  type Unsub = ZipSubscription<S::Unsub, SerialSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, duration, edge, scheduler } = self;
    let window_task = SerialSubscription::new();
    let unsub = source.actual_subscribe(ThrottleObserver {
      observer: MutArc::own(Some(observer)),
      scheduler,
      duration,
      edge,
      window: MutArc::own(Window { open: false, trailing_value: None }),
      window_task: window_task.clone(),
    });
    ZipSubscription::new(unsub, window_task)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for ThrottleOp<S, SD> where S: ObservableExt<Item, Err> {}

struct Window<Item> {
  open: bool,
  trailing_value: Option<Item>,
}

pub struct ThrottleObserver<O, SD, Item> {
  observer: MutArc<Option<O>>,
  scheduler: SD,
  duration: Duration,
  edge: ThrottleEdge,
  window: MutArc<Window<Item>>,
  window_task: SerialSubscription,
}

impl<Item, Err, O, SD> Observer<Item, Err> for ThrottleObserver<O, SD, Item>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  fn next(&mut self, value: Item) {
    let leading = {
      let mut window = self.window.rc_deref_mut();
      if window.open {
        if self.edge.trailing {
          window.trailing_value = Some(value);
        }
        return;
      }
      window.open = true;
      if self.edge.leading {
        Some(value)
      } else {
        window.trailing_value = Some(value);
        None
      }
    };
    if let Some(value) = leading {
      self.observer.next(value);
    }

    let mut observer = self.observer.clone();
    let window = self.window.clone();
    let task = move || {
      let trailing = {
        let mut window = window.rc_deref_mut();
        window.open = false;
        window.trailing_value.take()
      };
      if let Some(value) = trailing {
        observer.next(value);
      }
    };
    match self.scheduler.schedule(task, Some(self.duration)) {
      Ok(handle) => self.window_task.replace(handle),
      Err(e) => {
        self.window_task.clone().unsubscribe();
        Observer::<Item, Err>::error(self.observer.clone(), e.into());
      }
    }
  }

  fn error(mut self, err: Err) {
    self.window_task.unsubscribe();
    Observer::<Item, Err>::error(self.observer, err);
  }

  fn complete(mut self) {
    self.window_task.unsubscribe();
    let trailing = self.window.rc_deref_mut().trailing_value.take();
    if let Some(value) = trailing {
      self.observer.next(value);
    }
    Observer::<Item, Err>::complete(self.observer);
  }

  #[inline]
  fn is_finished(&self) -> bool { Observer::<Item, Err>::is_finished(&self.observer) }
}
