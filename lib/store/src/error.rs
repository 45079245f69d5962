//! Error types for the store crate.
//!
//! Errors are designed for layered context using rootcause. A missing or
//! expired entry is not an error: reads return `None` for both.

use std::fmt;

/// Errors from transient store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the command.
    Unavailable { details: String },
    /// The operation did not complete within the configured bound.
    Timeout { operation: &'static str },
    /// A stored value could not be encoded or decoded.
    Serialization { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "store unavailable: {details}"),
            Self::Timeout { operation } => write!(f, "store {operation} timed out"),
            Self::Serialization { details } => {
                write!(f, "failed to (de)serialize stored value: {details}")
            }
        }
    }
}

impl std::error::Error for StoreError {}
