//! Error types

mod action;
mod dispatch;
mod fetch;

pub use action::*;
pub use dispatch::*;
pub use fetch::*;

/// Top-level error for fallible gridstore operations.
///
/// The store itself never surfaces these to action producers: fetch failures
/// become `fail` events and malformed actions are ignored. The variants exist
/// for hosts that drive the pieces directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An action payload could not be interpreted.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The action bus refused a dispatch or registration change.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
