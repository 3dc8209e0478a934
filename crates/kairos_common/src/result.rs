//! Common result and error types for the Kairos toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a malformed netlist or a
/// bug in Kairos), not a user-facing problem. User-facing conditions such as
/// negative budgets are reported through the diagnostic sink and the
/// operation still returns `Ok`.
pub type KairosResult<T> = Result<T, InternalError>;

/// An internal consistency error, raised when a pass detects state that a
/// well-formed netlist can never produce.
#[derive(Debug, thiserror::Error)]
#[error("internal timing error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
