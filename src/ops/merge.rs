use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::ZipSubscription,
};

#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> MergeOp<S1, S2> {
  pub(crate) fn new(source1: S1, source2: S2) -> Self { MergeOp { source1, source2 } }
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for MergeOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, MergeObserver<O>>,
  S2: Observable<Item, Err, MergeObserver<O>>,
  Err: Send + 'static,
{
  type Unsub = ZipSubscription<S1::Unsub, S2::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let completed = Arc::new(AtomicUsize::new(0));
    let a = self
      .source1
      .actual_subscribe(MergeObserver { observer: observer.clone(), completed: completed.clone() });
    let b = self.source2.actual_subscribe(MergeObserver { observer, completed });
    ZipSubscription::new(a, b)
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for MergeOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

pub struct MergeObserver<O> {
  observer: Subscriber<O>,
  completed: Arc<AtomicUsize>,
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<O>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.completed.fetch_add(1, Ordering::AcqRel) == 1 {
      self.observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
