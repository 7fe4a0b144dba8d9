//! Signature verification using aws-lc-rs

use crate::encoding::{DerPublicKey, SignatureBytes};
use crate::error::{Error, Result};
use aws_lc_rs::signature::{
    UnparsedPublicKey, ECDSA_P256_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
};
use spki::SubjectPublicKeyInfoRef;

/// Signature schemes a Fulcio chain or CT log signature can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
}

/// A public key prepared for signature verification
pub struct VerificationKey {
    /// Raw key bits extracted from the SPKI BIT STRING
    bytes: Vec<u8>,
    scheme: SigningScheme,
}

impl VerificationKey {
    /// Build a verification key from a DER-encoded SubjectPublicKeyInfo.
    ///
    /// aws-lc-rs expects the raw key bits, not the SPKI wrapper, so the
    /// BIT STRING contents are extracted here.
    pub fn from_spki(key: &DerPublicKey, scheme: SigningScheme) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(key.as_bytes())
            .map_err(|e| Error::InvalidKey(format!("invalid SPKI: {e}")))?;
        let bytes = spki.subject_public_key.raw_bytes().to_vec();
        Ok(Self { bytes, scheme })
    }

    /// The scheme this key verifies with
    pub fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// Verify `signature` over `data`
    pub fn verify(&self, data: &[u8], signature: &SignatureBytes) -> Result<()> {
        let algorithm: &'static dyn aws_lc_rs::signature::VerificationAlgorithm = match self.scheme {
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
            SigningScheme::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
            SigningScheme::RsaPkcs1Sha384 => &RSA_PKCS1_2048_8192_SHA384,
            SigningScheme::RsaPkcs1Sha512 => &RSA_PKCS1_2048_8192_SHA512,
        };
        UnparsedPublicKey::new(algorithm, &self.bytes)
            .verify(data, signature.as_bytes())
            .map_err(|_| {
                Error::Verification(format!("{:?} signature invalid", self.scheme))
            })
    }
}

/// Verify a signature with the given scheme.
///
/// Convenience wrapper around [`VerificationKey`]; prefer the type directly
/// when verifying repeatedly with the same key.
pub fn verify_signature(
    public_key: &DerPublicKey,
    data: &[u8],
    signature: &SignatureBytes,
    scheme: SigningScheme,
) -> Result<()> {
    VerificationKey::from_spki(public_key, scheme)?.verify(data, signature)
}
