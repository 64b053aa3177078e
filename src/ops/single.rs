use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct AsSingleOp<S> {
  source: S,
}

impl<S> AsSingleOp<S> {
  pub(crate) fn new(source: S) -> Self { AsSingleOp { source } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for AsSingleOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, AsSingleObserver<O, Item>>,
  Err: From<RxError>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(AsSingleObserver { observer: Some(observer), value: None })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for AsSingleOp<S> where S: ObservableExt<Item, Err> {}

pub struct AsSingleObserver<O, Item> {
  observer: Option<O>,
  value: Option<Item>,
}

impl<Item, Err, O> Observer<Item, Err> for AsSingleObserver<O, Item>
where
  O: Observer<Item, Err>,
  Err: From<RxError>,
{
  fn next(&mut self, value: Item) {
    if self.value.is_none() {
      self.value = Some(value);
    } else if let Some(observer) = self.observer.take() {
      self.value = None;
      observer.error(RxError::MoreThanOneElement.into());
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let Some(mut observer) = self.observer else {
      return;
    };
    match self.value {
      Some(value) => {
        observer.next(value);
        observer.complete();
      }
      None => observer.error(RxError::NoElements.into()),
    }
  }

  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
