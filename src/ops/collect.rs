use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct CollectOp<S, C, Item> {
  source: S,
  _hint: TypeHint<(C, Item)>,
}

impl<S, C, Item> CollectOp<S, C, Item> {
  pub(crate) fn new(source: S) -> Self { CollectOp { source, _hint: TypeHint::new() } }
}

impl<Item, Err, O, S, C> Observable<C, Err, O> for CollectOp<S, C, Item>
where
  O: Observer<C, Err>,
  S: Observable<Item, Err, CollectObserver<O, C>>,
  C: Default + Extend<Item>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(CollectObserver { observer, collection: C::default() })
  }
}

impl<Item, Err, S, C> ObservableExt<C, Err> for CollectOp<S, C, Item>
where
  S: ObservableExt<Item, Err>,
  C: Default + Extend<Item>,
{
}

pub struct CollectObserver<O, C> {
  observer: O,
  collection: C,
}

impl<Item, Err, O, C> Observer<Item, Err> for CollectObserver<O, C>
where
  O: Observer<C, Err>,
  C: Extend<Item>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.collection.extend(Some(value)); }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    self.observer.next(self.collection);
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
