/// A single notification of a stream: a value, an error, or completion.
///
/// `Error` and `Completed` are terminal. `materialize` turns every event into
/// a plain `Next(Event)` value and `dematerialize` reverses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Event<Item, Err> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Event::Next(_)) }

  /// The carried value, if this is a `Next`.
  pub fn element(self) -> Option<Item> {
    match self {
      Event::Next(v) => Some(v),
      _ => None,
    }
  }

  /// The carried error, if this is an `Error`.
  pub fn error(self) -> Option<Err> {
    match self {
      Event::Error(e) => Some(e),
      _ => None,
    }
  }

  pub fn map<B>(self, f: impl FnOnce(Item) -> B) -> Event<B, Err> {
    match self {
      Event::Next(v) => Event::Next(f(v)),
      Event::Error(e) => Event::Error(e),
      Event::Completed => Event::Completed,
    }
  }
}
