//! Action bus errors

/// Errors raised by the [`Dispatcher`](crate::bus::Dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// `dispatch` (or a registration change) was called while a dispatch was in progress.
    #[error("Cannot dispatch in the middle of a dispatch")]
    Reentrant,

    /// The token does not belong to a registered listener.
    #[error("Dispatch token {0} does not map to a registered listener")]
    UnknownToken(u64),
}
