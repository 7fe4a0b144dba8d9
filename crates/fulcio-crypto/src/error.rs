//! Error types for fulcio-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Debug, Error)]
pub enum Error {
    /// Key generation error
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Signing error
    #[error("Signing error: {0}")]
    Signing(String),

    /// Digest handed to `sign_digest` has the wrong length for the
    /// configured hash algorithm
    #[error("Artifact digest must be {0} bytes")]
    DigestLength(usize),

    /// Signature verification error
    #[error("Verification error: {0}")]
    Verification(String),

    /// Invalid key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Unsupported algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Certificate parsing or encoding error
    #[error("Certificate error: {0}")]
    InvalidCertificate(String),

    /// DER encoding/decoding error
    #[error("DER error: {0}")]
    Der(#[from] der::Error),

    /// Base64 decoding error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::Verification("unspecified crypto error".to_string())
    }
}

impl From<aws_lc_rs::error::KeyRejected> for Error {
    fn from(e: aws_lc_rs::error::KeyRejected) -> Self {
        Error::InvalidKey(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
