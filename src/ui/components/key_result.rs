/// What a component did with a key.
///
/// Views try their components in order and fall through to their own
/// bindings on `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent should act on this event
  Event(T),
  /// Not consumed; try the next handler
  NotHandled,
}

impl<T> KeyResult<T> {
  /// Whether the component consumed the key
  pub fn is_consumed(&self) -> bool {
    !matches!(self, KeyResult::NotHandled)
  }
}
