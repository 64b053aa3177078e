use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{MultiSubscription, SubscriptionLike},
};

/// Pairs the values of two sources strictly by position.
///
/// Each source gets a FIFO buffer; a tuple is emitted as soon as every
/// buffer holds a value. The result completes once a completed source has
/// no buffered value left, since no further tuple can be formed.
#[derive(Clone)]
pub struct ZipOp<S1, S2> {
  a: S1,
  b: S2,
}

impl<S1, S2> ZipOp<S1, S2> {
  pub(crate) fn new(a: S1, b: S2) -> Self { ZipOp { a, b } }
}

type Ctx2<O, ItemA, ItemB> = Arc<ZipCtx<O, Buffers2<ItemA, ItemB>>>;

impl<ItemA, ItemB, Err, O, S1, S2> Observable<(ItemA, ItemB), Err, O> for ZipOp<S1, S2>
where
  O: Observer<(ItemA, ItemB), Err>,
  S1: Observable<ItemA, Err, ZipObserver<Ctx2<O, ItemA, ItemB>, 0>>,
  S1::Unsub: Send + 'static,
  S2: Observable<ItemB, Err, ZipObserver<Ctx2<O, ItemA, ItemB>, 1>>,
  S2::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = ZipCtx::new(observer, Buffers2 { a: Side::default(), b: Side::default() });
    let subscription = ctx.subscription.clone();
    let a = self.a.actual_subscribe(ZipObserver { ctx: ctx.clone() });
    subscription.add(a);
    let b = self.b.actual_subscribe(ZipObserver { ctx });
    subscription.add(b);
    subscription
  }
}

impl<ItemA, ItemB, Err, S1, S2> ObservableExt<(ItemA, ItemB), Err> for ZipOp<S1, S2>
where
  S1: ObservableExt<ItemA, Err>,
  S2: ObservableExt<ItemB, Err>,
{
}

#[derive(Clone)]
pub struct Zip3Op<S1, S2, S3> {
  a: S1,
  b: S2,
  c: S3,
}

impl<S1, S2, S3> Zip3Op<S1, S2, S3> {
  pub(crate) fn new(a: S1, b: S2, c: S3) -> Self { Zip3Op { a, b, c } }
}

type Ctx3<O, ItemA, ItemB, ItemC> = Arc<ZipCtx<O, Buffers3<ItemA, ItemB, ItemC>>>;

impl<ItemA, ItemB, ItemC, Err, O, S1, S2, S3> Observable<(ItemA, ItemB, ItemC), Err, O>
  for Zip3Op<S1, S2, S3>
where
  O: Observer<(ItemA, ItemB, ItemC), Err>,
  S1: Observable<ItemA, Err, ZipObserver<Ctx3<O, ItemA, ItemB, ItemC>, 0>>,
  S1::Unsub: Send + 'static,
  S2: Observable<ItemB, Err, ZipObserver<Ctx3<O, ItemA, ItemB, ItemC>, 1>>,
  S2::Unsub: Send + 'static,
  S3: Observable<ItemC, Err, ZipObserver<Ctx3<O, ItemA, ItemB, ItemC>, 2>>,
  S3::Unsub: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ctx = ZipCtx::new(
      observer,
      Buffers3 { a: Side::default(), b: Side::default(), c: Side::default() },
    );
    let subscription = ctx.subscription.clone();
    let a = self.a.actual_subscribe(ZipObserver { ctx: ctx.clone() });
    subscription.add(a);
    let b = self.b.actual_subscribe(ZipObserver { ctx: ctx.clone() });
    subscription.add(b);
    let c = self.c.actual_subscribe(ZipObserver { ctx });
    subscription.add(c);
    subscription
  }
}

impl<ItemA, ItemB, ItemC, Err, S1, S2, S3> ObservableExt<(ItemA, ItemB, ItemC), Err>
  for Zip3Op<S1, S2, S3>
where
  S1: ObservableExt<ItemA, Err>,
  S2: ObservableExt<ItemB, Err>,
  S3: ObservableExt<ItemC, Err>,
{
}

struct Side<T> {
  buffer: VecDeque<T>,
  done: bool,
}

impl<T> Default for Side<T> {
  fn default() -> Self { Side { buffer: VecDeque::new(), done: false } }
}

impl<T> Side<T> {
  /// No further value can come out of this side.
  fn exhausted(&self) -> bool { self.done && self.buffer.is_empty() }
}

pub struct Buffers2<ItemA, ItemB> {
  a: Side<ItemA>,
  b: Side<ItemB>,
}

impl<ItemA, ItemB> Buffers2<ItemA, ItemB> {
  fn pop(&mut self) -> Option<(ItemA, ItemB)> {
    if self.a.buffer.is_empty() || self.b.buffer.is_empty() {
      return None;
    }
    Some((self.a.buffer.pop_front()?, self.b.buffer.pop_front()?))
  }

  fn exhausted(&self) -> bool { self.a.exhausted() || self.b.exhausted() }
}

pub struct Buffers3<ItemA, ItemB, ItemC> {
  a: Side<ItemA>,
  b: Side<ItemB>,
  c: Side<ItemC>,
}

impl<ItemA, ItemB, ItemC> Buffers3<ItemA, ItemB, ItemC> {
  fn pop(&mut self) -> Option<(ItemA, ItemB, ItemC)> {
    if self.a.buffer.is_empty() || self.b.buffer.is_empty() || self.c.buffer.is_empty() {
      return None;
    }
    Some((self.a.buffer.pop_front()?, self.b.buffer.pop_front()?, self.c.buffer.pop_front()?))
  }

  fn exhausted(&self) -> bool { self.a.exhausted() || self.b.exhausted() || self.c.exhausted() }
}

/// State shared by the per-source observers of one subscription.
pub struct ZipCtx<O, B> {
  observer: Subscriber<O>,
  buffers: Mutex<B>,
  subscription: MultiSubscription,
}

impl<O, B> ZipCtx<O, B> {
  fn new(observer: O, buffers: B) -> Arc<Self> {
    Arc::new(ZipCtx {
      observer: Subscriber::new(observer),
      buffers: Mutex::new(buffers),
      subscription: MultiSubscription::new(),
    })
  }

  fn deliver<Out, Err>(&self, value: Option<Out>, finished: bool)
  where
    O: Observer<Out, Err>,
    Err: Send + 'static,
  {
    if let Some(value) = value {
      Observer::<Out, Err>::next(&mut self.observer.clone(), value);
    }
    if finished {
      Observer::<Out, Err>::complete(self.observer.clone());
      self.subscription.clone().unsubscribe();
    }
  }

  fn fail<Out, Err>(&self, err: Err)
  where
    O: Observer<Out, Err>,
    Err: Send + 'static,
  {
    Observer::<Out, Err>::error(self.observer.clone(), err);
    self.subscription.clone().unsubscribe();
  }
}

/// Observer of the source at position `SIDE`.
pub struct ZipObserver<Ctx, const SIDE: usize> {
  ctx: Ctx,
}

macro_rules! zip_side {
  ($buffers:ident<$($items:ident),+>, $side:literal, $field:ident: $item:ident) => {
    impl<Err, O, $($items),+> Observer<$item, Err>
      for ZipObserver<Arc<ZipCtx<O, $buffers<$($items),+>>>, $side>
    where
      O: Observer<($($items),+), Err>,
      Err: Send + 'static,
    {
      fn next(&mut self, value: $item) {
        let (out, finished) = {
          let mut buffers = self.ctx.buffers.lock();
          buffers.$field.buffer.push_back(value);
          let out = buffers.pop();
          (out, buffers.exhausted())
        };
        self.ctx.deliver::<($($items),+), Err>(out, finished);
      }

      fn error(self, err: Err) { self.ctx.fail::<($($items),+), Err>(err) }

      fn complete(self) {
        let finished = {
          let mut buffers = self.ctx.buffers.lock();
          buffers.$field.done = true;
          buffers.$field.exhausted()
        };
        self.ctx.deliver::<($($items),+), Err>(None, finished);
      }

      #[inline]
      fn is_finished(&self) -> bool {
        Observer::<($($items),+), Err>::is_finished(&self.ctx.observer)
      }
    }
  };
}

zip_side!(Buffers2<ItemA, ItemB>, 0, a: ItemA);
zip_side!(Buffers2<ItemA, ItemB>, 1, b: ItemB);
zip_side!(Buffers3<ItemA, ItemB, ItemC>, 0, a: ItemA);
zip_side!(Buffers3<ItemA, ItemB, ItemC>, 1, b: ItemB);
zip_side!(Buffers3<ItemA, ItemB, ItemC>, 2, c: ItemC);
