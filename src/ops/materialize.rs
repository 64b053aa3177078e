use crate::{
  event::Event,
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Turns every notification into a `Next(Event)` value. The source's
/// terminal event is followed by a plain completion, so the materialized
/// stream never fails and its error type is free.
#[derive(Clone)]
pub struct MaterializeOp<S> {
  source: S,
}

impl<S> MaterializeOp<S> {
  pub(crate) fn new(source: S) -> Self { MaterializeOp { source } }
}

impl<Item, Err, E2, O, S> Observable<Event<Item, Err>, E2, O> for MaterializeOp<S>
where
  O: Observer<Event<Item, Err>, E2>,
  S: Observable<Item, Err, MaterializeObserver<O, E2>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(MaterializeObserver { observer, _hint: TypeHint::new() })
  }
}

impl<Item, Err, E2, S> ObservableExt<Event<Item, Err>, E2> for MaterializeOp<S> where
  S: ObservableExt<Item, Err>
{
}

pub struct MaterializeObserver<O, E2> {
  observer: O,
  _hint: TypeHint<E2>,
}

impl<Item, Err, E2, O> Observer<Item, Err> for MaterializeObserver<O, E2>
where
  O: Observer<Event<Item, Err>, E2>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(Event::Next(value)) }

  fn error(mut self, err: Err) {
    self.observer.next(Event::Error(err));
    self.observer.complete();
  }

  fn complete(mut self) {
    self.observer.next(Event::Completed);
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

/// Reverses [`MaterializeOp`]: `Next(Event)` values are replayed as the
/// notifications they describe. The first terminal event ends the stream.
#[derive(Clone)]
pub struct DematerializeOp<S> {
  source: S,
}

impl<S> DematerializeOp<S> {
  pub(crate) fn new(source: S) -> Self { DematerializeOp { source } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for DematerializeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Event<Item, Err>, Err, DematerializeObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(DematerializeObserver { observer: Some(observer) })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for DematerializeOp<S> where
  S: ObservableExt<Event<Item, Err>, Err>
{
}

pub struct DematerializeObserver<O> {
  observer: Option<O>,
}

impl<Item, Err, O> Observer<Event<Item, Err>, Err> for DematerializeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, event: Event<Item, Err>) {
    match event {
      Event::Next(value) => self.observer.next(value),
      Event::Error(err) => {
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
      }
      Event::Completed => {
        if let Some(observer) = self.observer.take() {
          observer.complete();
        }
      }
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
