//! Observable sources and the operator/subscribe surface.
//!
//! [`Observable`] is the subscribe seam: an observable is consumed by value
//! and instantiates one producing activity per `actual_subscribe`.
//! [`ObservableExt`] carries every operator and the `subscribe*` family;
//! operators are plain generic structs, so a pipeline is monomorphized end to
//! end and only boxed at explicit seams (`box_it`, subjects).

use std::time::Duration;

use crate::{
  error::RxError,
  event::Event,
  observer::{Observer, ObserverAll, ObserverErr, ObserverEvent, ObserverN},
  ops::{
    amb::AmbOp,
    catch_error::{CatchErrorOp, OnErrorReturnOp},
    collect::CollectOp,
    combine_latest::{CombineLatest3Op, CombineLatestOp},
    concat::ConcatOp,
    debounce::DebounceOp,
    delay::DelayOp,
    distinct_until_changed::DistinctUntilChangedOp,
    element_at::ElementAtOp,
    enumerate::EnumerateOp,
    filter::FilterOp,
    ignore_elements::IgnoreElementsOp,
    last::LastOrOp,
    lifecycle::{FinalizeOp, OnCompleteOp, OnErrorOp, TapOp},
    map::{MapOp, MapToOp, TryMapOp},
    map_err::MapErrOp,
    materialize::{DematerializeOp, MaterializeOp},
    merge::MergeOp,
    merge_all::MergeAllOp,
    observe_on::ObserveOnOp,
    retry::{RetryOp, RetryWhenOp},
    sample::SampleOp,
    scan::{ReduceOp, ScanOp},
    share::{ShareReplayOp, ShareScope},
    single::AsSingleOp,
    skip::{SkipOp, SkipUntilOp, SkipWhileOp},
    start_with::StartWithOp,
    subscribe_on::SubscribeOnOp,
    switch_on_next::SwitchOnNextOp,
    take::{TakeOp, TakeUntilOp, TakeWhileOp},
    throttle::{ThrottleEdge, ThrottleOp},
    timeout::TimeoutOp,
    with_latest_from::WithLatestFromOp,
    zip::{Zip3Op, ZipOp},
  },
  scheduler::Scheduler,
  subject::{ReplaySubject, Subject},
  subscriber::Subscriber,
  subscription::{BoxSubscription, SubscriptionLike, SubscriptionWrapper, ZipSubscription},
};

mod boxed;
mod connectable;
mod create;
mod defer;
mod from_iter;
mod interval;
mod of;
mod timer;
mod trivial;

pub use boxed::{BoxOp, BoxOpClone, DynObservable, DynObservableClone};
pub use connectable::{Connection, ConnectableObservable};
pub use create::{create, Emitter, ObservableFn};
pub use defer::{defer, DeferObservable};
pub use from_iter::{from_iter, repeat, ObservableIter};
pub use interval::{interval, interval_at, IntervalObservable};
pub use of::{of, of_option, of_result, OfObservable, OptionObservable, ResultObservable};
pub use timer::{timer, timer_at, TimerObservable};
pub use trivial::{empty, never, throw, EmptyObservable, NeverObservable, ThrowObservable};

/// The subscribe seam: connects one observer to a new producing activity.
///
/// `O` is the concrete observer type; operator structs implement this for
/// every observer their wrapped observer can be built around.
pub trait Observable<Item, Err, O> {
  type Unsub: SubscriptionLike;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Operators and the `subscribe*` family, available on every observable.
pub trait ObservableExt<Item, Err>: Sized {
  // ==========================================================================
  // Consumption
  // ==========================================================================

  /// Subscribe with a `next` handler only. An error reaching this
  /// subscription is logged with `tracing::error!`.
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<BoxSubscription>
  where
    N: FnMut(Item) + Send + 'static,
    Err: Send + 'static,
    Self: Observable<Item, Err, Subscriber<ObserverN<N>>>,
    <Self as Observable<Item, Err, Subscriber<ObserverN<N>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(ObserverN(next))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper<BoxSubscription>
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(Err) + Send + 'static,
    Err: Send + 'static,
    Self: Observable<Item, Err, Subscriber<ObserverErr<N, E>>>,
    <Self as Observable<Item, Err, Subscriber<ObserverErr<N, E>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(ObserverErr { next, error })
  }

  fn subscribe_all<N, E, C>(
    self,
    next: N,
    error: E,
    complete: C,
  ) -> SubscriptionWrapper<BoxSubscription>
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
    Err: Send + 'static,
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>,
    <Self as Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(ObserverAll { next, error, complete })
  }

  /// Subscribe with one handler receiving every notification as an
  /// [`Event`].
  fn subscribe_event<F>(self, f: F) -> SubscriptionWrapper<BoxSubscription>
  where
    F: FnMut(Event<Item, Err>) + Send + 'static,
    Err: Send + 'static,
    Self: Observable<Item, Err, Subscriber<ObserverEvent<F>>>,
    <Self as Observable<Item, Err, Subscriber<ObserverEvent<F>>>>::Unsub: Send + 'static,
  {
    self.subscribe_with(ObserverEvent(f))
  }

  /// Subscribe an arbitrary observer. The returned handle stops delivery
  /// before it tears the upstream down.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper<BoxSubscription>
  where
    O: Observer<Item, Err> + Send + 'static,
    Err: Send + 'static,
    Self: Observable<Item, Err, Subscriber<O>>,
    <Self as Observable<Item, Err, Subscriber<O>>>::Unsub: Send + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let upstream = self.actual_subscribe(subscriber.clone());
    SubscriptionWrapper::new(Box::new(ZipSubscription::new(subscriber, upstream)))
  }

  // ==========================================================================
  // Transformation
  // ==========================================================================

  /// Creates a new stream which calls a closure on each element and uses its
  /// return as the value.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Maps every value to a clone of `value`.
  #[inline]
  fn map_to<B: Clone>(self, value: B) -> MapToOp<Self, B, Item> { MapToOp::new(self, value) }

  /// Like `map`, but an `Err` returned by the closure terminates the stream
  /// with that error.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp::new(self, f)
  }

  #[inline]
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp::new(self, filter)
  }

  /// Emits the running accumulation on every value, starting from
  /// `initial`.
  #[inline]
  fn scan<B, F>(self, initial: B, f: F) -> ScanOp<Self, F, B, Item>
  where
    F: FnMut(B, Item) -> B,
    B: Clone,
  {
    ScanOp::new(self, f, initial)
  }

  /// Emits the final accumulation once the source completes; `initial` when
  /// the source was empty.
  #[inline]
  fn reduce<B, F>(self, initial: B, f: F) -> ReduceOp<Self, F, B, Item>
  where
    F: FnMut(B, Item) -> B,
    B: Clone,
  {
    LastOrOp::new(self.scan(initial.clone(), f), Some(initial))
  }

  /// Emits the last value when the source completes, nothing for an empty
  /// source.
  #[inline]
  fn last(self) -> LastOrOp<Self, Item> { LastOrOp::new(self, None) }

  #[inline]
  fn last_or(self, default: Item) -> LastOrOp<Self, Item> { LastOrOp::new(self, Some(default)) }

  /// Emits only the value at `index`, then completes. Fails with
  /// [`RxError::ArgumentOutOfRange`] when the source completes first.
  #[inline]
  fn element_at(self, index: usize) -> ElementAtOp<Self>
  where
    Err: From<RxError>,
  {
    ElementAtOp::new(self, index)
  }

  /// Keeps only the terminal event, turning the stream into a
  /// completable one.
  #[inline]
  fn ignore_elements(self) -> IgnoreElementsOp<Self> { IgnoreElementsOp::new(self) }

  /// Treats the source as a single-value stream: its only value is emitted
  /// on completion. Fails with [`RxError::NoElements`] for an empty source
  /// and with [`RxError::MoreThanOneElement`] on a second value, which also
  /// stops the source.
  #[inline]
  fn as_single(self) -> AsSingleOp<Self>
  where
    Err: From<RxError>,
  {
    AsSingleOp::new(self)
  }

  /// Gathers every value into `C` and emits it on completion.
  #[inline]
  fn collect<C>(self) -> CollectOp<Self, C, Item>
  where
    C: Default + Extend<Item>,
  {
    CollectOp::new(self)
  }

  /// Pairs every value with its index.
  #[inline]
  fn enumerate(self) -> EnumerateOp<Self> { EnumerateOp::new(self) }

  /// Emits `values` before the source's own values.
  #[inline]
  fn start_with(self, values: Vec<Item>) -> StartWithOp<Self, Item> {
    StartWithOp::new(self, values)
  }

  #[inline]
  fn map_err<E2, F>(self, f: F) -> MapErrOp<Self, F, Err>
  where
    F: FnOnce(Err) -> E2,
  {
    MapErrOp::new(self, f)
  }

  // ==========================================================================
  // Side effects
  // ==========================================================================

  /// Calls `f` with a reference to every value before passing it on.
  #[inline]
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Item),
  {
    TapOp::new(self, f)
  }

  #[inline]
  fn on_complete<F>(self, f: F) -> OnCompleteOp<Self, F>
  where
    F: FnOnce(),
  {
    OnCompleteOp::new(self, f)
  }

  #[inline]
  fn on_error<F>(self, f: F) -> OnErrorOp<Self, F>
  where
    F: FnOnce(&Err),
  {
    OnErrorOp::new(self, f)
  }

  /// Calls `f` exactly once when the stream completes, errors or is
  /// unsubscribed.
  #[inline]
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp::new(self, f)
  }

  // ==========================================================================
  // Filtering
  // ==========================================================================

  #[inline]
  fn skip(self, count: usize) -> SkipOp<Self> { SkipOp::new(self, count) }

  #[inline]
  fn skip_while<F>(self, predicate: F) -> SkipWhileOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    SkipWhileOp::new(self, predicate)
  }

  /// Drops values until `trigger` emits its first value. The trigger's
  /// completion alone never opens the gate.
  #[inline]
  fn skip_until<N, NItem>(self, trigger: N) -> SkipUntilOp<Self, N, NItem>
  where
    N: ObservableExt<NItem, Err>,
  {
    SkipUntilOp::new(self, trigger)
  }

  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  #[inline]
  fn take_while<F>(self, predicate: F) -> TakeWhileOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    TakeWhileOp::new(self, predicate)
  }

  /// Completes as soon as `trigger` emits its first value. The trigger's
  /// completion alone does nothing.
  #[inline]
  fn take_until<N, NItem>(self, trigger: N) -> TakeUntilOp<Self, N, NItem>
  where
    N: ObservableExt<NItem, Err>,
  {
    TakeUntilOp::new(self, trigger)
  }

  /// Drops a value equal to the previously emitted one.
  #[inline]
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self, fn(&Item, &Item) -> bool>
  where
    Item: PartialEq + Clone,
  {
    DistinctUntilChangedOp::new(self, <Item as PartialEq>::eq)
  }

  /// Drops a value when `eq(previous, value)` holds, `previous` being the
  /// last emitted value.
  #[inline]
  fn distinct_until_changed_by<F>(self, eq: F) -> DistinctUntilChangedOp<Self, F>
  where
    F: FnMut(&Item, &Item) -> bool,
    Item: Clone,
  {
    DistinctUntilChangedOp::new(self, eq)
  }

  // ==========================================================================
  // Combination
  // ==========================================================================

  /// Interleaves the values of both sources; completes when both complete.
  #[inline]
  fn merge<S2>(self, other: S2) -> MergeOp<Self, S2>
  where
    S2: ObservableExt<Item, Err>,
  {
    MergeOp::new(self, other)
  }

  /// Flattens an observable of observables, keeping at most
  /// `max_concurrent` inner subscriptions alive; further inners queue.
  #[inline]
  fn merge_all(self, max_concurrent: usize) -> MergeAllOp<Self, Item> {
    MergeAllOp::new(self, max_concurrent)
  }

  /// Subscribes to inner observables one after another.
  #[inline]
  fn concat_all(self) -> MergeAllOp<Self, Item> { MergeAllOp::new(self, 1) }

  /// Maps every value to an observable and merges all of them.
  #[inline]
  fn flat_map<Inner, F>(self, f: F) -> MergeAllOp<MapOp<Self, F, Item>, Inner>
  where
    F: FnMut(Item) -> Inner,
  {
    MergeAllOp::new(self.map(f), usize::MAX)
  }

  #[inline]
  fn concat_map<Inner, F>(self, f: F) -> MergeAllOp<MapOp<Self, F, Item>, Inner>
  where
    F: FnMut(Item) -> Inner,
  {
    MergeAllOp::new(self.map(f), 1)
  }

  /// Emits all of this source, then all of `other`.
  #[inline]
  fn concat<S2>(self, other: S2) -> ConcatOp<Self, S2>
  where
    S2: ObservableExt<Item, Err>,
  {
    ConcatOp::new(self, other)
  }

  /// Mirrors only the most recent inner observable; the previous inner is
  /// unsubscribed before the next one is subscribed.
  #[inline]
  fn switch_on_next(self) -> SwitchOnNextOp<Self, Item> { SwitchOnNextOp::new(self) }

  #[inline]
  fn flat_map_latest<Inner, F>(self, f: F) -> SwitchOnNextOp<MapOp<Self, F, Item>, Inner>
  where
    F: FnMut(Item) -> Inner,
  {
    SwitchOnNextOp::new(self.map(f))
  }

  /// Once both sources have emitted, emits `f(latest_a, latest_b)` on every
  /// value of either.
  #[inline]
  fn combine_latest<S2, ItemB, Out, F>(
    self,
    other: S2,
    f: F,
  ) -> CombineLatestOp<Self, S2, F, Item, ItemB>
  where
    S2: ObservableExt<ItemB, Err>,
    F: FnMut(Item, ItemB) -> Out,
  {
    CombineLatestOp::new(self, other, f)
  }

  #[inline]
  fn combine_latest3<S2, S3, ItemB, ItemC, Out, F>(
    self,
    b: S2,
    c: S3,
    f: F,
  ) -> CombineLatest3Op<Self, S2, S3, F, Item, ItemB, ItemC>
  where
    S2: ObservableExt<ItemB, Err>,
    S3: ObservableExt<ItemC, Err>,
    F: FnMut(Item, ItemB, ItemC) -> Out,
  {
    CombineLatest3Op::new(self, b, c, f)
  }

  /// Pairs values strictly by position.
  #[inline]
  fn zip<S2, ItemB>(self, other: S2) -> ZipOp<Self, S2>
  where
    S2: ObservableExt<ItemB, Err>,
  {
    ZipOp::new(self, other)
  }

  #[inline]
  fn zip3<S2, S3, ItemB, ItemC>(self, b: S2, c: S3) -> Zip3Op<Self, S2, S3>
  where
    S2: ObservableExt<ItemB, Err>,
    S3: ObservableExt<ItemC, Err>,
  {
    Zip3Op::new(self, b, c)
  }

  /// Emits `(value, latest_other)` for each value of this source; values
  /// arriving before `other` emitted anything are dropped.
  #[inline]
  fn with_latest_from<S2, ItemB>(self, other: S2) -> WithLatestFromOp<Self, S2>
  where
    S2: ObservableExt<ItemB, Err>,
  {
    WithLatestFromOp::new(self, other)
  }

  /// Emits the most recent value whenever `trigger` emits, if a value
  /// arrived since the previous sample.
  #[inline]
  fn sample<T, TItem>(self, trigger: T) -> SampleOp<Self, T, TItem>
  where
    T: ObservableExt<TItem, Err>,
  {
    SampleOp::new(self, trigger)
  }

  /// Mirrors whichever source emits first; the other is unsubscribed.
  #[inline]
  fn amb<S2>(self, other: S2) -> AmbOp<Self, S2>
  where
    S2: ObservableExt<Item, Err>,
  {
    AmbOp::new(self, other)
  }

  // ==========================================================================
  // Notifications as values
  // ==========================================================================

  #[inline]
  fn materialize(self) -> MaterializeOp<Self> { MaterializeOp::new(self) }

  #[inline]
  fn dematerialize(self) -> DematerializeOp<Self> { DematerializeOp::new(self) }

  // ==========================================================================
  // Error handling
  // ==========================================================================

  /// Resubscribes up to `count` times after an error.
  #[inline]
  fn retry(self, count: usize) -> RetryOp<Self>
  where
    Self: Clone,
  {
    RetryOp::new(self, count)
  }

  /// Resubscribes whenever the notifier returned by `handler` emits.
  ///
  /// `handler` receives the stream of errors; the notifier's error or
  /// completion ends the stream with that error or completion.
  #[inline]
  fn retry_when<F, N, NItem>(self, handler: F) -> RetryWhenOp<Self, F, NItem>
  where
    Self: Clone,
    F: FnOnce(Subject<Err, Err>) -> N,
    N: ObservableExt<NItem, Err>,
  {
    RetryWhenOp::new(self, handler)
  }

  /// Replaces an error with the observable returned by `f`.
  #[inline]
  fn catch_error<F, S2>(self, f: F) -> CatchErrorOp<Self, F>
  where
    F: FnOnce(Err) -> S2,
    S2: ObservableExt<Item, Err>,
  {
    CatchErrorOp::new(self, f)
  }

  /// Replaces an error with `value` followed by completion.
  #[inline]
  fn catch_error_just_return(self, value: Item) -> OnErrorReturnOp<Self, Item> {
    OnErrorReturnOp::new(self, value)
  }

  // ==========================================================================
  // Multicasting
  // ==========================================================================

  /// Shares one upstream subscription among all subscribers, replaying the
  /// last `buffer_size` values to late subscribers.
  #[inline]
  fn share_replay(self, buffer_size: usize, scope: ShareScope) -> ShareReplayOp<Self, Item, Err>
  where
    Self: Clone,
  {
    ShareReplayOp::new(self, buffer_size, scope)
  }

  #[inline]
  fn share(self) -> ShareReplayOp<Self, Item, Err>
  where
    Self: Clone,
  {
    ShareReplayOp::new(self, 0, ShareScope::WhileConnected)
  }

  /// Multicasts through a [`Subject`] once `connect` is called.
  #[inline]
  fn publish(self) -> ConnectableObservable<Self, Subject<Item, Err>> {
    ConnectableObservable::new(self, Subject::new())
  }

  /// Multicasts through a [`ReplaySubject`] of `buffer_size` once `connect`
  /// is called.
  #[inline]
  fn replay(self, buffer_size: usize) -> ConnectableObservable<Self, ReplaySubject<Item, Err>> {
    ConnectableObservable::new(self, ReplaySubject::new(buffer_size))
  }

  #[inline]
  fn replay_all(self) -> ConnectableObservable<Self, ReplaySubject<Item, Err>> {
    ConnectableObservable::new(self, ReplaySubject::unbounded())
  }

  // ==========================================================================
  // Time and scheduling
  // ==========================================================================

  /// Shifts every value and the completion by `delay`; errors pass through
  /// immediately.
  #[inline]
  fn delay<SD: Scheduler>(self, delay: Duration, scheduler: SD) -> DelayOp<Self, SD> {
    DelayOp::new(self, delay, scheduler)
  }

  /// Limits the rate to one value per `duration` window.
  #[inline]
  fn throttle<SD: Scheduler>(
    self,
    duration: Duration,
    edge: ThrottleEdge,
    scheduler: SD,
  ) -> ThrottleOp<Self, SD> {
    ThrottleOp::new(self, duration, edge, scheduler)
  }

  /// Emits a value only after `duration` passed without another one.
  #[inline]
  fn debounce<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> DebounceOp<Self, SD> {
    DebounceOp::new(self, duration, scheduler)
  }

  /// Delivers every notification on `scheduler`, preserving order.
  #[inline]
  fn observe_on<SD: Scheduler>(self, scheduler: SD) -> ObserveOnOp<Self, SD> {
    ObserveOnOp::new(self, scheduler)
  }

  /// Performs the subscription itself on `scheduler`.
  #[inline]
  fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> SubscribeOnOp<Self, SD> {
    SubscribeOnOp::new(self, scheduler)
  }

  /// Fails with [`RxError::Timeout`] when no value arrives within
  /// `duration` of the subscription or of the previous value.
  #[inline]
  fn timeout<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> TimeoutOp<Self, SD>
  where
    Err: From<RxError>,
  {
    TimeoutOp::new(self, duration, scheduler)
  }

  // ==========================================================================
  // Type erasure
  // ==========================================================================

  /// Erases the concrete observable type.
  #[inline]
  fn box_it(self) -> BoxOp<Item, Err>
  where
    Self: DynObservable<Item, Err> + 'static,
  {
    BoxOp::new(self)
  }

  /// Erases the concrete observable type, keeping it clonable.
  #[inline]
  fn box_it_clone(self) -> BoxOpClone<Item, Err>
  where
    Self: DynObservableClone<Item, Err> + 'static,
  {
    BoxOpClone::new(self)
  }
}

/// Builds an observable emitting each listed value, then completing.
///
/// ```rust
/// use rxcore::{of_sequence, prelude::*};
/// of_sequence!(1, 2, 3).subscribe(|v: i32| println!("{v}"));
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* $(,)? ) => {
    $crate::observable::from_iter(::std::vec![ $( $item ),* ])
  };
}
