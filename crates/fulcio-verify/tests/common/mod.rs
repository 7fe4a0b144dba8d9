//! Test PKI: a root, an intermediate, leaves with embedded SCTs, and a CT
//! log that countersigns them.
//!
//! Certificates are assembled directly from `x509-cert` structures and
//! signed with fixed P-256 keys so every test run sees the same identities.
//! The SCT signed payload is built by hand, byte by byte, which doubles as
//! an independent check of the production tls_codec encoder.

use chrono::{DateTime, TimeZone, Utc};
use const_oid::db::rfc5912::{ECDSA_WITH_SHA_256, ID_KP_CODE_SIGNING};
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use const_oid::AssociatedOid;
use der::asn1::{BitString, OctetString, UtcTime};
use der::{Decode, Encode};
use fulcio_crypto::{sha256, CertPath, DerPublicKey};
use fulcio_trust_root::{CertificateAuthority, TransparencyLog, ValidityWindow};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use spki::{EncodePublicKey, SubjectPublicKeyInfoOwned};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use x509_cert::ext::pkix::{BasicConstraints, ExtendedKeyUsage};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

/// 2022-01-01T00:00:00Z, start of the test PKI's own validity
pub const PKI_NOT_BEFORE: u64 = 1_640_995_200;
/// 2032-01-01T00:00:00Z
pub const PKI_NOT_AFTER: u64 = 1_956_528_000;
/// 2023-06-01T12:00:00Z, default leaf issuance instant
pub const LEAF_NOT_BEFORE: u64 = 1_685_620_800;
/// Fulcio leaves live for ten minutes
pub const LEAF_LIFETIME: u64 = 600;

static SERIAL: AtomicUsize = AtomicUsize::new(2);

/// A deterministic P-256 key; `seed` must be nonzero
pub fn test_key(seed: u8) -> SigningKey {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    bytes[31] = seed;
    SigningKey::from_slice(&bytes).expect("fixed bytes are a valid P-256 scalar")
}

pub fn utc(secs: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs as i64, 0).unwrap()
}

pub fn window(start: u64, end: Option<u64>) -> ValidityWindow {
    ValidityWindow::new(utc(start), end.map(utc))
}

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn ecdsa_sha256() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    }
}

fn next_serial() -> SerialNumber {
    let n = SERIAL.fetch_add(1, Ordering::Relaxed);
    SerialNumber::new(&[(n & 0x7f) as u8]).unwrap()
}

fn validity(not_before: u64, not_after: u64) -> Validity {
    Validity {
        not_before: Time::UtcTime(
            UtcTime::from_unix_duration(Duration::from_secs(not_before)).unwrap(),
        ),
        not_after: Time::UtcTime(
            UtcTime::from_unix_duration(Duration::from_secs(not_after)).unwrap(),
        ),
    }
}

fn spki_of(key: &SigningKey) -> SubjectPublicKeyInfoOwned {
    let der = key.verifying_key().to_public_key_der().unwrap();
    SubjectPublicKeyInfoOwned::from_der(der.as_bytes()).unwrap()
}

fn ca_constraints() -> Extension {
    let value = BasicConstraints {
        ca: true,
        path_len_constraint: None,
    }
    .to_der()
    .unwrap();
    Extension {
        extn_id: BasicConstraints::OID,
        critical: true,
        extn_value: OctetString::new(value).unwrap(),
    }
}

fn code_signing_eku() -> Extension {
    let value = ExtendedKeyUsage(vec![ID_KP_CODE_SIGNING]).to_der().unwrap();
    Extension {
        extn_id: ExtendedKeyUsage::OID,
        critical: false,
        extn_value: OctetString::new(value).unwrap(),
    }
}

/// The SCT list rides inside a DER OCTET STRING inside the extension value
fn sct_extension(sct_list: &[u8]) -> Extension {
    let inner = OctetString::new(sct_list.to_vec()).unwrap().to_der().unwrap();
    Extension {
        extn_id: CT_PRECERT_SCTS,
        critical: false,
        extn_value: OctetString::new(inner).unwrap(),
    }
}

fn sign_cert(tbs: TbsCertificate, issuer_key: &SigningKey) -> Certificate {
    let tbs_der = tbs.to_der().unwrap();
    let sig: Signature = issuer_key.sign(&tbs_der);
    Certificate {
        tbs_certificate: tbs,
        signature_algorithm: ecdsa_sha256(),
        signature: BitString::from_bytes(sig.to_der().as_bytes()).unwrap(),
    }
}

/// A Certificate Transparency log for tests
pub struct TestLog {
    key: SigningKey,
}

impl TestLog {
    pub fn new(seed: u8) -> Self {
        Self { key: test_key(seed) }
    }

    pub fn spki_der(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    /// Materialize this log for a trust root
    pub fn entry(&self, base_url: &str, valid_for: ValidityWindow) -> TransparencyLog {
        TransparencyLog::new(base_url, DerPublicKey::new(self.spki_der()), valid_for).unwrap()
    }

    /// Countersign a pre-certificate and return the TLS
    /// `SignedCertificateTimestampList` for embedding.
    ///
    /// The signed payload is RFC 6962 §3.2 laid out by hand:
    /// version, signature type, timestamp, precert entry type, issuer key
    /// hash, u24-prefixed TBS, u16-prefixed (empty) extensions.
    pub fn countersign(
        &self,
        timestamp_ms: u64,
        tbs_precert_der: &[u8],
        issuer_spki_der: &[u8],
    ) -> Vec<u8> {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(&timestamp_ms.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x01]);
        data.extend_from_slice(&sha256(issuer_spki_der));
        let len = tbs_precert_der.len();
        data.extend_from_slice(&[(len >> 16) as u8, (len >> 8) as u8, len as u8]);
        data.extend_from_slice(tbs_precert_der);
        data.extend_from_slice(&[0x00, 0x00]);

        let sig: Signature = self.key.sign(&data);
        let sig_der = sig.to_der();
        let sig_bytes = sig_der.as_bytes();

        let mut sct = vec![0x00];
        sct.extend_from_slice(&sha256(&self.spki_der()));
        sct.extend_from_slice(&timestamp_ms.to_be_bytes());
        sct.extend_from_slice(&[0x00, 0x00]);
        sct.extend_from_slice(&[0x04, 0x03]);
        sct.extend_from_slice(&(sig_bytes.len() as u16).to_be_bytes());
        sct.extend_from_slice(sig_bytes);

        let mut list = ((sct.len() + 2) as u16).to_be_bytes().to_vec();
        list.extend_from_slice(&(sct.len() as u16).to_be_bytes());
        list.extend_from_slice(&sct);
        list
    }
}

/// A root and intermediate pair that can issue Fulcio-shaped leaves
pub struct TestPki {
    root: Certificate,
    intermediate: Certificate,
    intermediate_key: SigningKey,
}

impl TestPki {
    /// Build a PKI whose certificates are derived from `seed`
    pub fn new(seed: u8) -> Self {
        let root_key = test_key(seed);
        let intermediate_key = test_key(seed + 1);

        let root_name = name(&format!("CN=fulcio-test root {seed},O=fulcio-test"));
        let intermediate_name =
            name(&format!("CN=fulcio-test intermediate {seed},O=fulcio-test"));

        let root_tbs = TbsCertificate {
            version: Version::V3,
            serial_number: next_serial(),
            signature: ecdsa_sha256(),
            issuer: root_name.clone(),
            validity: validity(PKI_NOT_BEFORE, PKI_NOT_AFTER),
            subject: root_name.clone(),
            subject_public_key_info: spki_of(&root_key),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(vec![ca_constraints()]),
        };
        let root = sign_cert(root_tbs, &root_key);

        let intermediate_tbs = TbsCertificate {
            version: Version::V3,
            serial_number: next_serial(),
            signature: ecdsa_sha256(),
            issuer: root_name,
            validity: validity(PKI_NOT_BEFORE, PKI_NOT_AFTER),
            subject: intermediate_name,
            subject_public_key_info: spki_of(&intermediate_key),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(vec![ca_constraints(), code_signing_eku()]),
        };
        let intermediate = sign_cert(intermediate_tbs, &root_key);

        Self {
            root,
            intermediate,
            intermediate_key,
        }
    }

    /// The CA's chain as configured in a trust root: intermediate first,
    /// self-signed root last.
    pub fn ca_path(&self) -> CertPath {
        CertPath::new(vec![self.intermediate.clone(), self.root.clone()]).unwrap()
    }

    /// Materialize this PKI as a certificate authority
    pub fn authority(&self, uri: &str, valid_for: ValidityWindow) -> CertificateAuthority {
        CertificateAuthority::new(self.ca_path(), uri, valid_for)
    }

    pub fn intermediate_spki_der(&self) -> Vec<u8> {
        self.intermediate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .unwrap()
    }

    /// Issue a leaf valid from `not_before` for `LEAF_LIFETIME` seconds,
    /// optionally countersigned by `log` at `timestamp_ms`.
    pub fn issue_leaf(
        &self,
        leaf_key: &SigningKey,
        not_before: u64,
        sct: Option<(&TestLog, u64)>,
    ) -> Certificate {
        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: next_serial(),
            signature: ecdsa_sha256(),
            issuer: self.intermediate.tbs_certificate.subject.clone(),
            validity: validity(not_before, not_before + LEAF_LIFETIME),
            subject: name("CN=fulcio-test leaf"),
            subject_public_key_info: spki_of(leaf_key),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(vec![code_signing_eku()]),
        };

        let tbs = match sct {
            None => tbs,
            Some((log, timestamp_ms)) => {
                // The log signs the TBS without the SCT extension; the final
                // certificate appends it, so stripping it reproduces the
                // signed bytes exactly.
                let tbs_precert_der = tbs.to_der().unwrap();
                let list =
                    log.countersign(timestamp_ms, &tbs_precert_der, &self.intermediate_spki_der());
                let mut tbs = tbs;
                let mut extensions = tbs.extensions.take().unwrap_or_default();
                extensions.push(sct_extension(&list));
                tbs.extensions = Some(extensions);
                tbs
            }
        };

        sign_cert(tbs, &self.intermediate_key)
    }

    /// A single-certificate path holding just the leaf
    pub fn leaf_path(&self, leaf: Certificate) -> CertPath {
        CertPath::new(vec![leaf]).unwrap()
    }

    /// The full chain as a signing service would return it: leaf,
    /// intermediate, self-signed root.
    pub fn full_path(&self, leaf: Certificate) -> CertPath {
        CertPath::new(vec![leaf, self.intermediate.clone(), self.root.clone()]).unwrap()
    }
}
