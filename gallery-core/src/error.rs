// SPDX-License-Identifier: MIT
//
// Gallery Gate: Question-Gated Access for Image Collections
//
// https://github.com/yourusername/gallery-gate

//! Error types for the gallery gate
//!
//! Provides a unified error taxonomy using `thiserror` for ergonomic error handling.
//! Wrong answers and lockouts are not errors; they are normal gate outcomes and
//! surface as [`crate::events::GateEvent`] variants instead.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gallery gate operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registry document or entry validation failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Access was requested for an id the registry does not know
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// An answer was submitted with no challenge session active
    #[error("No active challenge session")]
    NoActiveSession,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error belongs to the load-time configuration class
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Serialization(_) | Error::Io(_))
    }

    /// Check if error indicates a caller bug rather than bad input data
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Error::UnknownCollection(_) | Error::NoActiveSession)
    }
}

// Conversions for common error types
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
