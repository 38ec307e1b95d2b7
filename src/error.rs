use thiserror::Error;

/// Errors raised synchronously by list views.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("index {idx} is out of range for a list of length {len}")]
    OutOfRange { idx: usize, len: usize },

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("item is not of the expected type `{expected}`")]
    TypeMismatch { expected: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl ViewError {
    /// Check a position addressing an existing element.
    pub fn check_index(idx: usize, len: usize) -> Result<(), ViewError> {
        if idx < len {
            Ok(())
        } else {
            Err(ViewError::OutOfRange { idx, len })
        }
    }

    /// Check a position where an element may be inserted (`idx == len` appends).
    pub fn check_insert(idx: usize, len: usize) -> Result<(), ViewError> {
        if idx <= len {
            Ok(())
        } else {
            Err(ViewError::OutOfRange { idx, len })
        }
    }
}
