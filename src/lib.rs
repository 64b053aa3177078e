//! # rxcore: Reactive Extensions core for Rust
//!
//! Push-based, composable streams: observables, observers, subjects, a
//! library of operators, schedulers and disposables.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Subscribe seam, consumed by value |
//! | [`ObservableExt`] | Every operator and the `subscribe*` family |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subject`] | Observer and observable at once, multicasting to many |
//! | [`Scheduler`] | Decides where and when time-based work runs |
//! | [`SubscriptionLike`] | Handle to cancel an active subscription |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): thread-pool schedulers backed by
//!   `futures`
//! - **`tokio-scheduler`**: a scheduler spawning onto the current tokio
//!   runtime
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
//! [`SubscriptionLike`]: subscription::SubscriptionLike

pub mod error;
pub mod event;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod type_hint;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod readme {
  #![doc = include_str!("../README.md")]
}
