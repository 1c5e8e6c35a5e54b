//! Error types for the fraud engine

use thiserror::Error;

/// Fraud engine error
#[derive(Debug, Error)]
pub enum Error {
    /// History store query failed
    #[error("History store error: {0}")]
    Store(String),

    /// Verification oracle call failed
    #[error("Verifier error: {0}")]
    Verifier(String),

    /// Verification oracle did not answer in time
    #[error("Verifier call timed out")]
    VerifierTimeout,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
