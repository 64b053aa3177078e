use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct ElementAtOp<S> {
  source: S,
  index: usize,
}

impl<S> ElementAtOp<S> {
  pub(crate) fn new(source: S, index: usize) -> Self { ElementAtOp { source, index } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for ElementAtOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, ElementAtObserver<O>>,
  Err: From<RxError>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(ElementAtObserver {
      observer: Some(observer),
      remaining: self.index,
    })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for ElementAtOp<S> where S: ObservableExt<Item, Err> {}

pub struct ElementAtObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<Item, Err, O> Observer<Item, Err> for ElementAtObserver<O>
where
  O: Observer<Item, Err>,
  Err: From<RxError>,
{
  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
    } else if let Some(mut observer) = self.observer.take() {
      observer.next(value);
      observer.complete();
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.error(RxError::ArgumentOutOfRange.into());
    }
  }

  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
