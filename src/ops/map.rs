use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func, _hint: TypeHint::new() } }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for MapOp<S, F, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, MapObserver<O, F>>,
  F: FnMut(Item) -> B,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MapObserver { observer, map: self.func })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for MapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> B,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct MapToOp<S, B, Item> {
  source: S,
  value: B,
  _hint: TypeHint<Item>,
}

impl<S, B, Item> MapToOp<S, B, Item> {
  pub(crate) fn new(source: S, value: B) -> Self { MapToOp { source, value, _hint: TypeHint::new() } }
}

impl<Item, B, Err, O, S> Observable<B, Err, O> for MapToOp<S, B, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, MapToObserver<O, B>>,
  B: Clone,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MapToObserver { observer, value: self.value })
  }
}

impl<Item, B, Err, S> ObservableExt<B, Err> for MapToOp<S, B, Item> where S: ObservableExt<Item, Err> {}

pub struct MapToObserver<O, B> {
  observer: O,
  value: B,
}

impl<Item, B, Err, O> Observer<Item, Err> for MapToObserver<O, B>
where
  O: Observer<B, Err>,
  B: Clone,
{
  #[inline]
  fn next(&mut self, _: Item) { self.observer.next(self.value.clone()) }

  observer_terminal_proxy_impl!();
}

#[derive(Clone)]
pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func, _hint: TypeHint::new() } }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for TryMapOp<S, F, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, TryMapObserver<O, F>>,
  F: FnMut(Item) -> Result<B, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TryMapObserver { observer: Some(observer), map: self.func })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for TryMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
}

pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  map: F,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = &mut self.observer else {
      return;
    };
    match (self.map)(value) {
      Ok(v) => observer.next(v),
      Err(err) => {
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
  }

  observer_terminal_proxy_impl!();
}
