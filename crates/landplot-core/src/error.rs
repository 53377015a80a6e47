//! Error taxonomy shared by the geometry engines and the interchange codec

use thiserror::Error;

/// Errors produced by shape construction, transforms, measurement and decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("Insufficient shapes: need at least {required}, got {actual}")]
    InsufficientShapes { required: usize, actual: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Result type for shape operations
pub type ShapeResult<T> = Result<T, ShapeError>;

impl ShapeError {
    pub(crate) fn non_finite(what: &str) -> Self {
        ShapeError::InvalidInput(format!("{} must be finite", what))
    }
}
