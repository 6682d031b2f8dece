//! Error types for the Turnstile controllers

use thiserror::Error;

/// User-facing failure of a controller operation
///
/// `Validation` and `LockedOut` are raised before any request is built.
/// `Rejected` carries the backend's message (or a per-operation fallback),
/// `Transport` a connectivity message worded differently from rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckinError {
    #[error("{0}")]
    Validation(String),

    #[error("Locked out. Try again in {remaining_secs} seconds.")]
    LockedOut { remaining_secs: u64 },

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),
}

/// Failure raised by an API transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// A response arrived but its body could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Malformed(err.to_string())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

/// Persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_out_message() {
        let err = CheckinError::LockedOut { remaining_secs: 42 };
        assert_eq!(err.to_string(), "Locked out. Try again in 42 seconds.");
    }
}
