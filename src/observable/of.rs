use std::convert::Infallible;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates an observable producing a single value, then completing.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item>(v: Item) -> OfObservable<Item> { OfObservable(v) }

#[derive(Clone)]
pub struct OfObservable<Item>(pub(crate) Item);

impl<Item, O> Observable<Item, Infallible, O> for OfObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, Infallible> for OfObservable<Item> {}

/// Creates an observable that emits the value or the error of a [`Result`],
/// completing after a value.
pub fn of_result<Item, Err>(r: Result<Item, Err>) -> ResultObservable<Item, Err> {
  ResultObservable(r)
}

#[derive(Clone)]
pub struct ResultObservable<Item, Err>(pub(crate) Result<Item, Err>);

impl<Item, Err, O> Observable<Item, Err, O> for ResultObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    match self.0 {
      Ok(v) => {
        observer.next(v);
        observer.complete();
      }
      Err(e) => observer.error(e),
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ResultObservable<Item, Err> {}

/// Creates an observable that emits the value of an [`Option`], if any, then
/// completes.
pub fn of_option<Item>(o: Option<Item>) -> OptionObservable<Item> { OptionObservable(o) }

#[derive(Clone)]
pub struct OptionObservable<Item>(pub(crate) Option<Item>);

impl<Item, O> Observable<Item, Infallible, O> for OptionObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    if let Some(v) = self.0 {
      observer.next(v);
    }
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, Infallible> for OptionObservable<Item> {}
