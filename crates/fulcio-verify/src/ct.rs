//! Embedded-SCT verification per RFC 6962
//!
//! A Signed Certificate Timestamp embedded in a Fulcio leaf is a CT log's
//! signature over the *pre-certificate*: the leaf's TBS body with the SCT
//! extension itself removed. Verification reconstructs that exact byte
//! sequence, wraps it in the RFC 6962 `digitally-signed` structure, and
//! checks the signature against the configured log's key.

use crate::error::{Result, VerificationError};
use chrono::{DateTime, Utc};
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use der::Encode;
use fulcio_crypto::{embedded_sct_list, sha256, verify_signature, CertPath, SignatureBytes, SigningScheme};
use fulcio_trust_root::TransparencyLog;
use tls_codec::{SerializeBytes, TlsByteVecU16, TlsByteVecU24, TlsSerializeBytes, TlsSize};
use x509_cert::Certificate;

// TLS SignatureAndHashAlgorithm constants (RFC 5246)
const ECDSA_SHA256: u16 = 0x0403;
const ECDSA_SHA384: u16 = 0x0503;
const RSA_PKCS1_SHA256: u16 = 0x0401;
const RSA_PKCS1_SHA384: u16 = 0x0501;
const RSA_PKCS1_SHA512: u16 = 0x0601;

/// A Signed Certificate Timestamp parsed from a leaf's embedded list.
///
/// Entries that do not follow the v1 layout are still represented (with
/// whatever could be read); they can never verify and end up in the invalid
/// partition of a [`CtVerificationResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sct {
    /// SCT version; 0 is v1, anything else is unsupported
    pub version: u8,
    /// SHA-256 of the issuing log's SubjectPublicKeyInfo
    pub log_id: [u8; 32],
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Opaque CT extensions
    pub extensions: Vec<u8>,
    /// TLS SignatureAndHashAlgorithm octets, hash byte first
    pub signature_algorithm: u16,
    /// Signature bytes of the TLS `DigitallySigned` structure
    pub signature: Vec<u8>,
}

impl Sct {
    /// The SCT's timestamp as an instant, if representable
    pub fn entry_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(i64::try_from(self.timestamp).ok()?)
    }

    fn undecodable(version: u8) -> Self {
        Sct {
            version,
            log_id: [0; 32],
            timestamp: 0,
            extensions: Vec::new(),
            signature_algorithm: 0,
            signature: Vec::new(),
        }
    }
}

/// SCTs partitioned by whether their signature verified against some
/// configured log
#[derive(Debug, Default)]
pub struct CtVerificationResult {
    /// SCTs whose signature verified against a configured log's key
    pub valid_scts: Vec<Sct>,
    /// Everything else: unknown log, unsupported version or algorithm, bad
    /// signature, undecodable entry
    pub invalid_scts: Vec<Sct>,
}

impl CtVerificationResult {
    /// Total number of SCTs examined
    pub fn total(&self) -> usize {
        self.valid_scts.len() + self.invalid_scts.len()
    }
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum Version {
    V1 = 0,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum SignatureType {
    CertificateTimestamp = 0,
    #[allow(unused)]
    TreeHash = 1,
}

#[derive(PartialEq, Debug)]
#[repr(u16)]
enum LogEntryType {
    X509Entry = 0,
    PrecertEntry = 1,
}

/// PreCert structure for precertificate entries
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct PreCert {
    // opaque issuer_key_hash[32];
    issuer_key_hash: [u8; 32],
    // opaque TBSCertificate<1..2^24-1>;
    tbs_certificate: TlsByteVecU24,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u16)]
enum SignedEntry {
    #[allow(unused)]
    #[tls_codec(discriminant = "LogEntryType::X509Entry")]
    X509Entry(TlsByteVecU24),
    #[tls_codec(discriminant = "LogEntryType::PrecertEntry")]
    PrecertEntry(PreCert),
}

/// The RFC 6962 §3.2 structure covered by the log's signature
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct DigitallySigned {
    version: Version,
    signature_type: SignatureType,
    timestamp: u64,
    signed_entry: SignedEntry,
    // opaque CtExtensions<0..2^16-1>;
    extensions: TlsByteVecU16,
}

/// Parse a TLS `SignedCertificateTimestampList`: a u16-length-prefixed list
/// of u16-length-prefixed SCTs.
///
/// The outer framing must be exact; individual entries degrade to
/// never-valid placeholders rather than failing the list.
pub fn parse_sct_list(bytes: &[u8]) -> Result<Vec<Sct>> {
    if bytes.len() < 2 {
        return Err(VerificationError::SctListMalformed(
            "truncated list length prefix".to_string(),
        ));
    }
    let total = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    if bytes.len() != total + 2 {
        return Err(VerificationError::SctListMalformed(format!(
            "list length prefix {} does not match {} bytes of content",
            total,
            bytes.len() - 2
        )));
    }

    let mut scts = Vec::new();
    let mut rest = &bytes[2..];
    while !rest.is_empty() {
        if rest.len() < 2 {
            return Err(VerificationError::SctListMalformed(
                "truncated SCT length prefix".to_string(),
            ));
        }
        let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
        if rest.len() < 2 + len {
            return Err(VerificationError::SctListMalformed(
                "SCT length prefix exceeds list".to_string(),
            ));
        }
        scts.push(parse_sct(&rest[2..2 + len]));
        rest = &rest[2 + len..];
    }
    Ok(scts)
}

fn parse_sct(entry: &[u8]) -> Sct {
    parse_sct_v1(entry)
        .unwrap_or_else(|| Sct::undecodable(entry.first().copied().unwrap_or(u8::MAX)))
}

// SCT v1 layout (RFC 6962 §3.3):
//   version(1) || log_id(32) || timestamp(8) || ext_len(2) || extensions ||
//   hash_alg(1) || sig_alg(1) || sig_len(2) || signature
fn parse_sct_v1(entry: &[u8]) -> Option<Sct> {
    if entry.len() < 43 {
        return None;
    }
    let version = entry[0];
    let mut log_id = [0u8; 32];
    log_id.copy_from_slice(&entry[1..33]);
    let timestamp = u64::from_be_bytes(entry[33..41].try_into().ok()?);
    let ext_len = u16::from_be_bytes([entry[41], entry[42]]) as usize;

    let sig_offset = 43 + ext_len;
    if entry.len() < sig_offset + 4 {
        return None;
    }
    let extensions = entry[43..sig_offset].to_vec();
    let signature_algorithm = u16::from_be_bytes([entry[sig_offset], entry[sig_offset + 1]]);
    let sig_len = u16::from_be_bytes([entry[sig_offset + 2], entry[sig_offset + 3]]) as usize;

    let sig_start = sig_offset + 4;
    if entry.len() != sig_start + sig_len {
        return None;
    }
    let signature = entry[sig_start..].to_vec();

    Some(Sct {
        version,
        log_id,
        timestamp,
        extensions,
        signature_algorithm,
        signature,
    })
}

/// The leaf's TBS body with the embedded-SCT extension removed; the exact
/// bytes the log signed.
fn precert_tbs_der(leaf: &Certificate) -> Result<Vec<u8>> {
    let mut tbs = leaf.tbs_certificate.clone();
    tbs.extensions = tbs.extensions.map(|exts| {
        exts.iter()
            .filter(|ext| ext.extn_id != CT_PRECERT_SCTS)
            .cloned()
            .collect()
    });
    let mut tbs_der = Vec::new();
    tbs.encode_to_vec(&mut tbs_der)?;
    Ok(tbs_der)
}

fn signed_payload(sct: &Sct, tbs_precert_der: &[u8], issuer_key_hash: [u8; 32]) -> Result<Vec<u8>> {
    let payload = DigitallySigned {
        version: Version::V1,
        signature_type: SignatureType::CertificateTimestamp,
        timestamp: sct.timestamp,
        signed_entry: SignedEntry::PrecertEntry(PreCert {
            issuer_key_hash,
            tbs_certificate: tbs_precert_der.into(),
        }),
        extensions: TlsByteVecU16::from(sct.extensions.as_slice()),
    };
    payload.tls_serialize().map_err(|e| {
        VerificationError::SctListMalformed(format!("failed to serialize SCT payload: {e}"))
    })
}

fn scheme_for(signature_algorithm: u16) -> Option<SigningScheme> {
    match signature_algorithm {
        ECDSA_SHA256 => Some(SigningScheme::EcdsaP256Sha256),
        ECDSA_SHA384 => Some(SigningScheme::EcdsaP384Sha384),
        RSA_PKCS1_SHA256 => Some(SigningScheme::RsaPkcs1Sha256),
        RSA_PKCS1_SHA384 => Some(SigningScheme::RsaPkcs1Sha384),
        RSA_PKCS1_SHA512 => Some(SigningScheme::RsaPkcs1Sha512),
        _ => None,
    }
}

fn sct_signature_valid(
    sct: &Sct,
    tbs_precert_der: &[u8],
    issuer_key_hash: [u8; 32],
    logs: &[TransparencyLog],
) -> bool {
    if sct.version != 0 {
        return false;
    }
    let Some(log) = TransparencyLog::find_by_id(logs, &sct.log_id) else {
        return false;
    };
    let Some(scheme) = scheme_for(sct.signature_algorithm) else {
        return false;
    };
    let Ok(payload) = signed_payload(sct, tbs_precert_der, issuer_key_hash) else {
        return false;
    };
    let signature = SignatureBytes::new(sct.signature.clone());
    verify_signature(log.public_key(), &payload, &signature, scheme).is_ok()
}

/// Cryptographically check every SCT embedded in the leaf of `chain` against
/// the configured logs.
///
/// The chain must be a full path: the certificate at index 1 is taken as the
/// leaf's issuer, whose key hash is part of the signed pre-certificate entry.
/// Log validity windows are deliberately not consulted here; callers gate on
/// them separately using each SCT's own timestamp.
pub fn verify_signed_certificate_timestamps(
    chain: &CertPath,
    logs: &[TransparencyLog],
) -> Result<CtVerificationResult> {
    let leaf = chain.leaf();
    let issuer = chain.certificates().get(1).ok_or_else(|| {
        VerificationError::SctListMalformed(
            "certificate path has no issuer for SCT verification".to_string(),
        )
    })?;

    let sct_bytes = embedded_sct_list(leaf)
        .map_err(|e| VerificationError::SctListMalformed(e.to_string()))?
        .ok_or(VerificationError::NoEmbeddedScts)?;
    let scts = parse_sct_list(&sct_bytes)?;

    let tbs_precert_der = precert_tbs_der(leaf)?;
    let issuer_spki_der = issuer.tbs_certificate.subject_public_key_info.to_der()?;
    let issuer_key_hash = sha256(&issuer_spki_der);

    let mut result = CtVerificationResult::default();
    for sct in scts {
        if sct_signature_valid(&sct, &tbs_precert_der, issuer_key_hash, logs) {
            result.valid_scts.push(sct);
        } else {
            result.invalid_scts.push(sct);
        }
    }
    tracing::debug!(
        valid = result.valid_scts.len(),
        invalid = result.invalid_scts.len(),
        "checked embedded SCT signatures"
    );
    Ok(result)
}
