//! Action decoding errors

/// Error produced when a wire action cannot be turned into a typed [`Action`](crate::action::Action).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// The `actionType` is not one the table store understands.
    #[error("Unknown action type '{0}'")]
    UnknownType(String),

    /// The action requires a `data` object but none was sent.
    #[error("Action {action_type} is missing its data")]
    MissingData { action_type: String },

    /// The `data` object did not have the expected shape.
    #[error("Action {action_type} has invalid data: {message}")]
    InvalidData {
        action_type: String,
        message: String,
    },
}

impl ActionError {
    /// Creates a new missing data error.
    pub fn missing_data(action_type: impl Into<String>) -> Self {
        Self::MissingData {
            action_type: action_type.into(),
        }
    }

    /// Creates a new invalid data error.
    pub fn invalid_data(action_type: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidData {
            action_type: action_type.into(),
            message: message.to_string(),
        }
    }
}
