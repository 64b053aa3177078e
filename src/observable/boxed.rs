//! Type-erased observables, produced by `box_it` and `box_it_clone`.
//!
//! Erasure happens at the observer too: a boxed observable subscribes a
//! [`BoxedObserver`], so any concrete observer that is `Send + 'static` can
//! be attached.

use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxedObserver, Observer},
  subscription::BoxSubscription,
};

/// Object-safe subscribe seam of a boxed observable.
pub trait DynObservable<Item, Err>: Send {
  fn dyn_subscribe(self: Box<Self>, observer: BoxedObserver<Item, Err>) -> BoxSubscription;
}

impl<S, Item, Err> DynObservable<Item, Err> for S
where
  S: Observable<Item, Err, BoxedObserver<Item, Err>> + Send,
  S::Unsub: Send + 'static,
{
  fn dyn_subscribe(self: Box<Self>, observer: BoxedObserver<Item, Err>) -> BoxSubscription {
    Box::new((*self).actual_subscribe(observer))
  }
}

/// A boxed observable that can be subscribed once.
pub struct BoxOp<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item, Err> BoxOp<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: DynObservable<Item, Err> + 'static,
  {
    BoxOp(Box::new(source))
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for BoxOp<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.dyn_subscribe(Box::new(observer)) }
}

impl<Item, Err> ObservableExt<Item, Err> for BoxOp<Item, Err> {}

/// Object-safe seam of a clonable boxed observable.
pub trait DynObservableClone<Item, Err>: DynObservable<Item, Err> {
  fn box_clone(&self) -> Box<dyn DynObservableClone<Item, Err>>;

  fn into_dyn(self: Box<Self>) -> Box<dyn DynObservable<Item, Err>>;
}

impl<S, Item, Err> DynObservableClone<Item, Err> for S
where
  S: DynObservable<Item, Err> + Clone + 'static,
{
  fn box_clone(&self) -> Box<dyn DynObservableClone<Item, Err>> { Box::new(self.clone()) }

  fn into_dyn(self: Box<Self>) -> Box<dyn DynObservable<Item, Err>> { self }
}

/// A boxed observable that stays clonable, e.g. to be retried or shared.
pub struct BoxOpClone<Item, Err>(Box<dyn DynObservableClone<Item, Err>>);

impl<Item, Err> BoxOpClone<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: DynObservableClone<Item, Err> + 'static,
  {
    BoxOpClone(Box::new(source))
  }
}

impl<Item, Err> Clone for BoxOpClone<Item, Err> {
  fn clone(&self) -> Self { BoxOpClone(self.0.box_clone()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for BoxOpClone<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.0.into_dyn().dyn_subscribe(Box::new(observer))
  }
}

impl<Item, Err> ObservableExt<Item, Err> for BoxOpClone<Item, Err> {}
