//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits and creation functions
pub use crate::observable::{
  self, BoxOp, BoxOpClone, ConnectableObservable, Connection, Emitter, Observable,
  ObservableExt,
};
// Observer trait and closure adapters
pub use crate::observer::{
  BoxedObserver, Observer, ObserverAll, ObserverErr, ObserverEvent, ObserverN,
};
pub use crate::{error::RxError, event::Event, subscriber::Subscriber};
// Operator configuration
pub use crate::ops::{share::ShareScope, throttle::ThrottleEdge};
// Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{SerialScheduler, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{ImmediateScheduler, Scheduler, TaskHandle, TestScheduler};
// Subjects
pub use crate::subject::{
  BehaviorRelay, BehaviorSubject, ReplaySubject, Subject, SubjectSubscription, WeakSubject,
};
// Subscriptions
pub use crate::subscription::{
  BoxSubscription, DisposeBag, MultiSubscription, SerialSubscription,
  SubscriptionGuard, SubscriptionLike, SubscriptionWrapper, ZipSubscription,
};
