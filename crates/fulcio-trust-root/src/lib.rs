//! Trusted-root parsing and the materialized trust model
//!
//! A trusted root names the certificate authorities allowed to issue signing
//! certificates and the Certificate Transparency logs allowed to countersign
//! them, each with a validity window. Verifiers consume the materialized
//! [`model`] types; the JSON document lives in [`trusted_root`].

pub mod error;
pub mod model;
pub mod trusted_root;

pub use error::{Error, Result};
pub use model::{CertificateAuthority, TransparencyLog, ValidityWindow};
pub use trusted_root::TrustedRoot;
