//! Error types for grain coercion

use thiserror::Error;

/// Reasons a grain cannot become an attribute or a tag.
///
/// Both variants are recoverable: the resource builder logs them and
/// omits the affected field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrainError {
    #[error("unsupported grain type: {kind}")]
    UnsupportedType { kind: &'static str },

    #[error("grain not available")]
    Missing,
}

impl GrainError {
    pub fn unsupported(kind: &'static str) -> Self {
        GrainError::UnsupportedType { kind }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GrainError>;
