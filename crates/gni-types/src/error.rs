use thiserror::Error;

/// Errors produced by type and codec operations.
///
/// Both variants are the `MalformedInput` class: the input can never be
/// processed, so callers abort the event that carried it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl TypeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput(reason.into())
    }
}
