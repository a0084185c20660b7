//! Tri-state outcome of a remote existence check.

/// Result of asking the destination whether something exists.
///
/// `CheckFailed` is kept apart from `Absent` so callers decide explicitly how
/// to treat a lookup that never got an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Existence<T = ()> {
    Exists(T),
    Absent,
    CheckFailed(String),
}
