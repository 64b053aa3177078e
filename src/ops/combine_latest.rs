use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
  type_hint::TypeHint,
};

/// Combines the latest values of two sources with `f`.
///
/// Nothing is emitted until both sources emitted once; from then on every
/// value of either source emits `f(latest_a, latest_b)`. The result
/// completes when both sources completed, or as soon as one source completes
/// without having emitted anything. The first error wins.
#[derive(Clone)]
pub struct CombineLatestOp<A, B, F, ItemA, ItemB> {
  a: A,
  b: B,
  f: F,
  _hint: TypeHint<(ItemA, ItemB)>,
}

impl<A, B, F, ItemA, ItemB> CombineLatestOp<A, B, F, ItemA, ItemB> {
  pub(crate) fn new(a: A, b: B, f: F) -> Self { CombineLatestOp { a, b, f, _hint: TypeHint::new() } }
}

type Ctx2<O, F, ItemA, ItemB> = Arc<CombineCtx<O, Latest2<F, ItemA, ItemB>>>;

impl<Out, Err, O, A, B, F, ItemA, ItemB> Observable<Out, Err, O>
  for CombineLatestOp<A, B, F, ItemA, ItemB>
where
  O: Observer<Out, Err>,
  A: Observable<ItemA, Err, CombineLatestObserver<Ctx2<O, F, ItemA, ItemB>, 0>>,
  A::Unsub: Send + 'static,
  B: Observable<ItemB, Err, CombineLatestObserver<Ctx2<O, F, ItemA, ItemB>, 1>>,
  B::Unsub: Send + 'static,
  F: FnMut(ItemA, ItemB) -> Out,
  ItemA: Clone,
  ItemB: Clone,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = CombineCtx::new(observer, Latest2 { a: None, b: None, f: self.f });
    let subscription = ctx.subscription.clone();
    let a = self.a.actual_subscribe(CombineLatestObserver { ctx: ctx.clone() });
    subscription.add(a);
    let b = self.b.actual_subscribe(CombineLatestObserver { ctx });
    subscription.add(b);
    subscription
  }
}

impl<Out, Err, A, B, F, ItemA, ItemB> ObservableExt<Out, Err>
  for CombineLatestOp<A, B, F, ItemA, ItemB>
where
  A: ObservableExt<ItemA, Err>,
  B: ObservableExt<ItemB, Err>,
  F: FnMut(ItemA, ItemB) -> Out,
{
}

/// The three-source variant of [`CombineLatestOp`].
#[derive(Clone)]
pub struct CombineLatest3Op<A, B, C, F, ItemA, ItemB, ItemC> {
  a: A,
  b: B,
  c: C,
  f: F,
  _hint: TypeHint<(ItemA, ItemB, ItemC)>,
}

impl<A, B, C, F, ItemA, ItemB, ItemC> CombineLatest3Op<A, B, C, F, ItemA, ItemB, ItemC> {
  pub(crate) fn new(a: A, b: B, c: C, f: F) -> Self {
    CombineLatest3Op { a, b, c, f, _hint: TypeHint::new() }
  }
}

type Ctx3<O, F, ItemA, ItemB, ItemC> = Arc<CombineCtx<O, Latest3<F, ItemA, ItemB, ItemC>>>;

impl<Out, Err, O, A, B, C, F, ItemA, ItemB, ItemC> Observable<Out, Err, O>
  for CombineLatest3Op<A, B, C, F, ItemA, ItemB, ItemC>
where
  O: Observer<Out, Err>,
  A: Observable<ItemA, Err, CombineLatestObserver<Ctx3<O, F, ItemA, ItemB, ItemC>, 0>>,
  A::Unsub: Send + 'static,
  B: Observable<ItemB, Err, CombineLatestObserver<Ctx3<O, F, ItemA, ItemB, ItemC>, 1>>,
  B::Unsub: Send + 'static,
  C: Observable<ItemC, Err, CombineLatestObserver<Ctx3<O, F, ItemA, ItemB, ItemC>, 2>>,
  C::Unsub: Send + 'static,
  F: FnMut(ItemA, ItemB, ItemC) -> Out,
  ItemA: Clone,
  ItemB: Clone,
  ItemC: Clone,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = CombineCtx::new(observer, Latest3 { a: None, b: None, c: None, f: self.f });
    let subscription = ctx.subscription.clone();
    let a = self.a.actual_subscribe(CombineLatestObserver { ctx: ctx.clone() });
    subscription.add(a);
    let b = self.b.actual_subscribe(CombineLatestObserver { ctx: ctx.clone() });
    subscription.add(b);
    let c = self.c.actual_subscribe(CombineLatestObserver { ctx });
    subscription.add(c);
    subscription
  }
}

impl<Out, Err, A, B, C, F, ItemA, ItemB, ItemC> ObservableExt<Out, Err>
  for CombineLatest3Op<A, B, C, F, ItemA, ItemB, ItemC>
where
  A: ObservableExt<ItemA, Err>,
  B: ObservableExt<ItemB, Err>,
  C: ObservableExt<ItemC, Err>,
  F: FnMut(ItemA, ItemB, ItemC) -> Out,
{
}

pub struct Latest2<F, ItemA, ItemB> {
  a: Option<ItemA>,
  b: Option<ItemB>,
  f: F,
}

pub struct Latest3<F, ItemA, ItemB, ItemC> {
  a: Option<ItemA>,
  b: Option<ItemB>,
  c: Option<ItemC>,
  f: F,
}

struct CombineState<L> {
  latest: L,
  completed: usize,
}

/// State shared by the per-source observers of one subscription.
pub struct CombineCtx<O, L> {
  observer: Subscriber<O>,
  state: Mutex<CombineState<L>>,
  subscription: MultiSubscription,
}

impl<O, L> CombineCtx<O, L> {
  fn new(observer: O, latest: L) -> Arc<Self> {
    Arc::new(CombineCtx {
      observer: Subscriber::new(observer),
      state: Mutex::new(CombineState { latest, completed: 0 }),
      subscription: MultiSubscription::new(),
    })
  }

  fn emit<Out, Err>(&self, value: Option<Out>)
  where
    O: Observer<Out, Err>,
    Err: Send + 'static,
  {
    if let Some(value) = value {
      Observer::<Out, Err>::next(&mut self.observer.clone(), value);
    }
  }

  fn error<Out, Err>(&self, err: Err)
  where
    O: Observer<Out, Err>,
    Err: Send + 'static,
  {
    Observer::<Out, Err>::error(self.observer.clone(), err);
    self.subscription.clone().unsubscribe();
  }

  /// `had_value` tells whether the completing source ever emitted.
  fn complete<Out, Err>(&self, sources: usize, had_value: bool)
  where
    O: Observer<Out, Err>,
    Err: Send + 'static,
  {
    let done = {
      let mut state = self.state.lock();
      state.completed += 1;
      state.completed == sources || !had_value
    };
    if done {
      Observer::<Out, Err>::complete(self.observer.clone());
      self.subscription.clone().unsubscribe();
    }
  }
}

/// Observer of the source at position `SIDE`.
pub struct CombineLatestObserver<Ctx, const SIDE: usize> {
  ctx: Ctx,
}

macro_rules! combine_latest_side {
  (
    $latest:ident<$($items:ident),+>, $sources:literal, $side:literal,
    $field:ident: $item:ident, |$state:ident| $combine:expr
  ) => {
    impl<Out, Err, O, F, $($items),+> Observer<$item, Err>
      for CombineLatestObserver<Arc<CombineCtx<O, $latest<F, $($items),+>>>, $side>
    where
      O: Observer<Out, Err>,
      F: FnMut($($items),+) -> Out,
      $($items: Clone,)+
      Err: Send + 'static,
    {
      fn next(&mut self, value: $item) {
        let out = {
          let mut guard = self.ctx.state.lock();
          let $state = &mut guard.latest;
          $state.$field = Some(value);
          $combine
        };
        self.ctx.emit::<Out, Err>(out);
      }

      fn error(self, err: Err) { self.ctx.error::<Out, Err>(err) }

      fn complete(self) {
        let had_value = self.ctx.state.lock().latest.$field.is_some();
        self.ctx.complete::<Out, Err>($sources, had_value);
      }

      #[inline]
      fn is_finished(&self) -> bool { Observer::<Out, Err>::is_finished(&self.ctx.observer) }
    }
  };
}

macro_rules! latest2 {
  ($s:ident) => {
    match (&$s.a, &$s.b) {
      (Some(a), Some(b)) => Some(($s.f)(a.clone(), b.clone())),
      _ => None,
    }
  };
}

macro_rules! latest3 {
  ($s:ident) => {
    match (&$s.a, &$s.b, &$s.c) {
      (Some(a), Some(b), Some(c)) => Some(($s.f)(a.clone(), b.clone(), c.clone())),
      _ => None,
    }
  };
}

combine_latest_side!(Latest2<ItemA, ItemB>, 2, 0, a: ItemA, |s| latest2!(s));
combine_latest_side!(Latest2<ItemA, ItemB>, 2, 1, b: ItemB, |s| latest2!(s));
combine_latest_side!(Latest3<ItemA, ItemB, ItemC>, 3, 0, a: ItemA, |s| latest3!(s));
combine_latest_side!(Latest3<ItemA, ItemB, ItemC>, 3, 1, b: ItemB, |s| latest3!(s));
combine_latest_side!(Latest3<ItemA, ItemB, ItemC>, 3, 2, c: ItemC, |s| latest3!(s));
