//! Verification of Fulcio-issued signing certificates
//!
//! Proves two things about an end-entity certificate: that it chains to a
//! configured certificate authority under PKIX rules pinned to the leaf's
//! issuance time, and that a Certificate Transparency log from the
//! configured set countersigned it (via an embedded SCT) during that log's
//! own validity period.
//!
//! ```no_run
//! use fulcio_crypto::CertPath;
//! use fulcio_trust_root::TrustedRoot;
//! use fulcio_verify::FulcioVerifier;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let trust_root = TrustedRoot::from_file("trusted_root.json")?;
//! let verifier = FulcioVerifier::new(&trust_root)?;
//!
//! let chain = CertPath::from_pem_chain(&std::fs::read("cert.pem")?)?;
//! verifier.verify_signing_certificate(&chain)?;
//! # Ok(())
//! # }
//! ```

pub mod ct;
pub mod error;
pub mod verifier;

pub use ct::{CtVerificationResult, Sct};
pub use error::{CaFailure, VerificationError};
pub use verifier::FulcioVerifier;
