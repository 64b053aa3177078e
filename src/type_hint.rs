use std::marker::PhantomData;

/// Zero-sized marker that pins an otherwise unconstrained item type to an
/// operator struct, so `ObservableExt<Item, Err>` impls stay unambiguous.
///
/// `fn() -> T` keeps the marker `Send + Sync` whatever `T` is; operators never
/// own a `T` through it.
pub struct TypeHint<T>(PhantomData<fn() -> T>);

impl<T> TypeHint<T> {
  #[inline]
  pub fn new() -> Self { TypeHint(PhantomData) }
}

impl<T> Default for TypeHint<T> {
  #[inline]
  fn default() -> Self { Self::new() }
}

impl<T> Clone for TypeHint<T> {
  #[inline]
  fn clone(&self) -> Self { Self::new() }
}

impl<T> Copy for TypeHint<T> {}
