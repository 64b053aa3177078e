use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Shared, lockable state used by operators whose observers are split across
/// several upstream subscriptions (merge, zip, combine_latest ...).
///
/// The lock is never poisoned; a panicking observer leaves the state usable
/// by the remaining parties.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> MutexGuard<'_, T> { self.0.lock() }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { self.0.lock() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  /// Identity of the shared allocation.
  #[inline]
  pub(crate) fn addr(&self) -> usize { Arc::as_ptr(&self.0) as *const () as usize }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
