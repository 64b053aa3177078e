use std::time::Duration;

/// Errors raised by the reactive core itself rather than by a producer.
///
/// Streams stay generic over their error type; operators that can fail on
/// their own (scheduler-driven operators, `timeout`, `element_at`) require
/// `Err: From<RxError>` to surface these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
  /// A scheduler could not acquire the thread or timer it needs.
  #[error("scheduler unavailable: {0}")]
  SchedulerUnavailable(String),
  /// No value arrived within the configured window.
  #[error("sequence timed out after {0:?}")]
  Timeout(Duration),
  /// `element_at` was asked for an index past the end of the sequence.
  #[error("argument out of range")]
  ArgumentOutOfRange,
  /// The sequence completed without the element that was required.
  #[error("sequence contains no elements")]
  NoElements,
  /// A single-value stream saw a second value.
  #[error("sequence contains more than one element")]
  MoreThanOneElement,
  /// A producer or operator closure failed.
  #[error("{0}")]
  Custom(String),
}

impl RxError {
  pub fn custom(msg: impl Into<String>) -> Self { RxError::Custom(msg.into()) }
}

impl From<std::convert::Infallible> for RxError {
  fn from(never: std::convert::Infallible) -> Self { match never {} }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(RxError::custom("boom").to_string(), "boom");
    assert_eq!(
      RxError::Timeout(Duration::from_millis(5)).to_string(),
      "sequence timed out after 5ms"
    );
    assert_eq!(RxError::NoElements.to_string(), "sequence contains no elements");
  }
}
