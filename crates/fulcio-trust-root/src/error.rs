//! Error types for trust-root operations

use thiserror::Error;

/// Errors raised while parsing or materializing a trusted root.
///
/// These are configuration problems, detected before any certificate is
/// examined; they are deliberately a different type from verification
/// failures so a broken trust root is never reported as an invalid
/// certificate.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Certificate parsing or chain-shape error
    #[error("failed to parse certificate: {0}")]
    Certificate(String),

    /// Certificate chain does not end in usable trust-anchor material
    #[error("invalid trust anchor: {0}")]
    TrustAnchor(String),

    /// Invalid key material
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Validity period string could not be parsed
    #[error("failed to parse time: {0}")]
    TimeParse(String),
}

impl From<fulcio_crypto::Error> for Error {
    fn from(e: fulcio_crypto::Error) -> Self {
        Error::Certificate(e.to_string())
    }
}

/// Result type for trust-root operations
pub type Result<T> = std::result::Result<T, Error>;
