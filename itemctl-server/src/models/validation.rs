//! Validation error types

use std::fmt;

/// Validation error for request payloads
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Body could not be parsed into the expected shape
    Body { reason: String },

    /// Required field explicitly set to null
    Null { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body { reason } => write!(f, "{}", reason),
            Self::Null { field } => write!(f, "{} cannot be null", field),
        }
    }
}

impl std::error::Error for ValidationError {}
