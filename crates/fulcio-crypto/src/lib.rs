//! Cryptographic primitives for Fulcio certificate verification
//!
//! Digests and signature verification are backed by aws-lc-rs; the ECDSA
//! signer uses the RustCrypto `p256`/`p384` stack, which supports signing
//! pre-computed digests directly.

pub mod encoding;
pub mod error;
pub mod hash;
pub mod signing;
pub mod verification;
pub mod x509;

pub use encoding::{DerCertificate, DerPublicKey, SignatureBytes};
pub use error::{Error, Result};
pub use hash::{sha256, sha384, sha512};
pub use signing::{EcdsaKeyPair, EcdsaSigner, HashAlgorithm};
pub use verification::{verify_signature, SigningScheme, VerificationKey};
pub use x509::{embedded_sct_list, not_before_unix, CertPath};
