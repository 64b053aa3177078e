use std::{collections::VecDeque, sync::Arc};

use super::{
  impl_subject,
  subject_core::{Buffer, SubjectCore},
};

/// A subject replaying buffered values to every new subscriber, oldest
/// first, before live events.
pub struct ReplaySubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  /// Keeps the last `capacity` values. A capacity of zero replays nothing.
  pub fn new(capacity: usize) -> Self {
    let values = VecDeque::with_capacity(capacity.min(64));
    ReplaySubject { core: SubjectCore::new(Buffer::Bounded { capacity, values }) }
  }

  /// Keeps every value ever emitted.
  pub fn unbounded() -> Self { ReplaySubject { core: SubjectCore::new(Buffer::Unbounded(VecDeque::new())) } }
}

impl_subject!(ReplaySubject);
