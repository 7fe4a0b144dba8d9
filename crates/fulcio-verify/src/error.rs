//! Verification failures
//!
//! Every way a signing certificate can fail verification is a variant here;
//! the rendered messages are stable strings that callers and conformance
//! suites match on. Trust-root problems are a different type
//! ([`fulcio_trust_root::Error`]) raised at verifier construction, never
//! from a verify call.

use thiserror::Error;

/// One certificate authority's reason for rejecting a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaFailure {
    /// URI of the authority that was tried
    pub uri: String,
    /// The validation error it produced
    pub reason: String,
}

fn format_ca_failures(failures: &[CaFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.uri, f.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a signing certificate failed verification
#[derive(Debug, Error)]
pub enum VerificationError {
    /// No configured CA's validity window contains the leaf's notBefore
    #[error("No valid Certificate Authorities found when validating certificate")]
    NoValidCertificateAuthorities,

    /// Every candidate CA rejected the chain; reasons listed in trial order
    #[error("Certificate was not verifiable against CAs\n{}", format_ca_failures(.0))]
    CertPathNotVerifiable(Vec<CaFailure>),

    /// The verifier was built with zero CT logs
    #[error("No ct logs were provided to verifier")]
    NoCtLogsConfigured,

    /// The leaf carries no embedded-SCT extension
    #[error("No valid SCTs were found during verification")]
    NoEmbeddedScts,

    /// SCTs were present but none passed both the signature check and the
    /// log-validity-window check
    #[error("No valid SCTs were found, all({0}) SCTs were invalid")]
    AllSctsInvalid(usize),

    /// The input chain does not end in any configured CA's certificate path
    #[error("Certificate does not chain to trusted roots")]
    UntrustedParent,

    /// The embedded SCT list or its enclosing extension could not be decoded
    #[error("malformed SCT list: {0}")]
    SctListMalformed(String),

    /// Certificate bytes could not be encoded or decoded
    #[error("certificate encoding error: {0}")]
    CertificateEncoding(String),
}

impl From<fulcio_crypto::Error> for VerificationError {
    fn from(e: fulcio_crypto::Error) -> Self {
        VerificationError::CertificateEncoding(e.to_string())
    }
}

impl From<der::Error> for VerificationError {
    fn from(e: der::Error) -> Self {
        VerificationError::CertificateEncoding(e.to_string())
    }
}

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, VerificationError>;
