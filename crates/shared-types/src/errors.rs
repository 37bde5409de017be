//! # Error Types
//!
//! Parsing errors for the shared value types.

use thiserror::Error;

/// Errors raised when parsing shared types from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    /// Identity was not 20 hex-encoded bytes.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Unknown role name.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
