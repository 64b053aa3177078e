use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{MultiSubscription, ZipSubscription},
};

#[derive(Clone)]
pub struct ConcatOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> ConcatOp<S1, S2> {
  pub(crate) fn new(source1: S1, source2: S2) -> Self { ConcatOp { source1, source2 } }
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for ConcatOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, ConcatObserver<O, S2>>,
  S2: Observable<Item, Err, O>,
  S2::Unsub: Send + 'static,
{
  type Unsub = ZipSubscription<S1::Unsub, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let second = MultiSubscription::new();
    let first = self.source1.actual_subscribe(ConcatObserver {
      observer,
      source2: self.source2,
      second: second.clone(),
    });
    ZipSubscription::new(first, second)
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for ConcatOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

/// Observes the first source and hands the downstream over to the second
/// source once the first completes.
pub struct ConcatObserver<O, S2> {
  observer: O,
  source2: S2,
  second: MultiSubscription,
}

impl<Item, Err, O, S2> Observer<Item, Err> for ConcatObserver<O, S2>
where
  O: Observer<Item, Err>,
  S2: Observable<Item, Err, O>,
  S2::Unsub: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let unsub = self.source2.actual_subscribe(self.observer);
    self.second.add(unsub);
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
