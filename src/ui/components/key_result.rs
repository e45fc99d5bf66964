/// What a prompt did with a key, as seen by the list view that owns it.
///
/// Views try their prompt first and only run their own shortcuts on
/// `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Prompt is open and took the key
  Handled,
  /// Enter on an open prompt, carrying its purpose and text
  Submitted(T),
  /// No prompt open
  NotHandled,
}
