use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike, ZipSubscription},
};

const UNDECIDED: usize = 0;

/// Mirrors whichever source delivers its first notification first. The
/// other source is unsubscribed at that moment.
#[derive(Clone)]
pub struct AmbOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> AmbOp<S1, S2> {
  pub(crate) fn new(source1: S1, source2: S2) -> Self { AmbOp { source1, source2 } }
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for AmbOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, AmbObserver<O, 1>>,
  S1::Unsub: Send + 'static,
  S2: Observable<Item, Err, AmbObserver<O, 2>>,
  S2::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = ZipSubscription<MultiSubscription, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = Subscriber::new(observer);
    let winner = Arc::new(AtomicUsize::new(UNDECIDED));
    let slot1 = MultiSubscription::new();
    let slot2 = MultiSubscription::new();

    let first = self.source1.actual_subscribe(AmbObserver {
      observer: observer.clone(),
      winner: winner.clone(),
      rival: slot2.clone(),
    });
    slot1.add(first);
    // The first source may have won synchronously; `slot2` is closed then
    // and the second source is released as soon as it is added.
    let second = self
      .source2
      .actual_subscribe(AmbObserver { observer, winner, rival: slot1.clone() });
    slot2.add(second);
    ZipSubscription::new(slot1, slot2)
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for AmbOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

/// Observer of the source at position `SIDE` (1 or 2).
pub struct AmbObserver<O, const SIDE: usize> {
  observer: Subscriber<O>,
  winner: Arc<AtomicUsize>,
  rival: MultiSubscription,
}

impl<O, const SIDE: usize> AmbObserver<O, SIDE> {
  /// `true` when this side won the race, now or earlier.
  fn claim(&mut self) -> bool {
    match self
      .winner
      .compare_exchange(UNDECIDED, SIDE, Ordering::AcqRel, Ordering::Acquire)
    {
      Ok(_) => {
        self.rival.unsubscribe();
        true
      }
      Err(current) => current == SIDE,
    }
  }
}

impl<Item, Err, O, const SIDE: usize> Observer<Item, Err> for AmbObserver<O, SIDE>
where
  O: Observer<Item, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if self.claim() {
      self.observer.next(value);
    }
  }

  fn error(mut self, err: Err) {
    if self.claim() {
      self.observer.error(err);
    }
  }

  fn complete(mut self) {
    if self.claim() {
      self.observer.complete();
    }
  }

  fn is_finished(&self) -> bool {
    let winner = self.winner.load(Ordering::Acquire);
    (winner != UNDECIDED && winner != SIDE) || self.observer.is_finished()
  }
}
