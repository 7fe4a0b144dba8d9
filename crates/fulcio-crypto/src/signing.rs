//! ECDSA signing over artifacts and pre-computed digests
//!
//! Signatures are ASN.1 DER `ECDSA-Sig-Value { r, s }`, the wire format every
//! standard verifier accepts. Signing a digest directly (rather than the
//! artifact) is required by callers that hash large artifacts out-of-band.

use crate::encoding::{DerPublicKey, SignatureBytes};
use crate::error::{Error, Result};
use crate::hash;
use ecdsa::signature::hazmat::PrehashSigner;
use rand_core::OsRng;
use spki::EncodePublicKey;

/// Digest algorithm paired with an ECDSA key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Digest `data` with this algorithm
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => hash::sha256(data).to_vec(),
            HashAlgorithm::Sha384 => hash::sha384(data).to_vec(),
            HashAlgorithm::Sha512 => hash::sha512(data).to_vec(),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
            HashAlgorithm::Sha384 => write!(f, "SHA-384"),
            HashAlgorithm::Sha512 => write!(f, "SHA-512"),
        }
    }
}

/// An ECDSA key pair on one of the NIST curves Fulcio issues for
pub enum EcdsaKeyPair {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl EcdsaKeyPair {
    /// Generate a fresh P-256 key pair from the OS RNG
    pub fn generate_p256() -> Self {
        EcdsaKeyPair::P256(p256::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Generate a fresh P-384 key pair from the OS RNG
    pub fn generate_p384() -> Self {
        EcdsaKeyPair::P384(p384::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Import a key pair from DER-encoded PKCS#8, detecting the curve
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        use p256::pkcs8::DecodePrivateKey;
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(EcdsaKeyPair::P256(key));
        }
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(EcdsaKeyPair::P384(key));
        }
        Err(Error::InvalidKey(
            "PKCS#8 key is not an ECDSA P-256 or P-384 key".to_string(),
        ))
    }

    /// ECDSA-sign a digest directly, without further hashing
    fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>> {
        match self {
            EcdsaKeyPair::P256(key) => {
                let sig: p256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            EcdsaKeyPair::P384(key) => {
                let sig: p384::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
        }
    }

    /// The public key as DER-encoded SubjectPublicKeyInfo
    pub fn public_key_der(&self) -> Result<DerPublicKey> {
        let doc = match self {
            EcdsaKeyPair::P256(key) => key.verifying_key().to_public_key_der(),
            EcdsaKeyPair::P384(key) => key.verifying_key().to_public_key_der(),
        }
        .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(DerPublicKey::new(doc.as_bytes().to_vec()))
    }
}

/// ECDSA signer over artifacts and pre-computed digests
///
/// Immutable after construction; the key types are `Send + Sync`, so one
/// signer can be shared across threads.
pub struct EcdsaSigner {
    key_pair: EcdsaKeyPair,
    hash_algorithm: HashAlgorithm,
}

impl EcdsaSigner {
    pub fn new(key_pair: EcdsaKeyPair, hash_algorithm: HashAlgorithm) -> Self {
        Self {
            key_pair,
            hash_algorithm,
        }
    }

    /// The digest algorithm this signer hashes artifacts with
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// The key pair backing this signer
    pub fn key_pair(&self) -> &EcdsaKeyPair {
        &self.key_pair
    }

    /// The signing public key as DER-encoded SubjectPublicKeyInfo
    pub fn public_key_der(&self) -> Result<DerPublicKey> {
        self.key_pair.public_key_der()
    }

    /// Hash `artifact` with the configured algorithm and ECDSA-sign the digest
    pub fn sign(&self, artifact: &[u8]) -> Result<SignatureBytes> {
        let digest = self.hash_algorithm.digest(artifact);
        self.key_pair.sign_prehash(&digest).map(SignatureBytes::new)
    }

    /// ECDSA-sign a digest that was computed out-of-band.
    ///
    /// The digest length must match the configured hash algorithm.
    pub fn sign_digest(&self, artifact_digest: &[u8]) -> Result<SignatureBytes> {
        if artifact_digest.len() != self.hash_algorithm.digest_len() {
            return Err(Error::DigestLength(self.hash_algorithm.digest_len()));
        }
        self.key_pair
            .sign_prehash(artifact_digest)
            .map(SignatureBytes::new)
    }
}
