//! Materialized trust model: time-windowed certificate authorities and
//! Certificate Transparency logs
//!
//! These types are built once from a parsed trusted-root document and then
//! consulted with explicit instants; nothing here reads a clock.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use fulcio_crypto::{sha256, CertPath, DerPublicKey};
use rustls_pki_types::{CertificateDer, TrustAnchor};
use spki::SubjectPublicKeyInfoRef;

/// A half-open validity interval `[start, end)`.
///
/// An absent end means the entry is currently valid with no announced
/// expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A window covering all representable time
    pub fn always() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: None,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Whether `at` falls inside `[start, end)`
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at < end)
    }
}

/// A certificate authority trusted to issue signing certificates
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    cert_path: CertPath,
    uri: String,
    valid_for: ValidityWindow,
}

impl CertificateAuthority {
    /// Build an authority from its chain (leafward intermediates first,
    /// self-signed root last), its identifying URI, and its validity window.
    pub fn new(cert_path: CertPath, uri: impl Into<String>, valid_for: ValidityWindow) -> Self {
        Self {
            cert_path,
            uri: uri.into(),
            valid_for,
        }
    }

    /// The authority's own certificate chain
    pub fn cert_path(&self) -> &CertPath {
        &self.cert_path
    }

    /// Identifying URI, used in error reporting
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn valid_for(&self) -> ValidityWindow {
        self.valid_for
    }

    /// Convert the self-signed root of the chain into a PKIX trust anchor.
    ///
    /// Verifiers call this at construction so that malformed trust material
    /// fails at startup instead of surfacing as a certificate-verification
    /// failure later.
    pub fn trust_anchor(&self) -> Result<TrustAnchor<'static>> {
        if !self.cert_path.is_self_signed()? {
            return Err(Error::TrustAnchor(format!(
                "certificate chain for {} does not end in a self-signed root",
                self.uri
            )));
        }
        let mut ders = self.cert_path.der_encoded()?;
        let root_der = ders
            .pop()
            .ok_or_else(|| Error::Certificate("certificate chain is empty".to_string()))?;
        let root = CertificateDer::from(root_der);
        let anchor = webpki::anchor_from_trusted_cert(&root)
            .map_err(|e| Error::TrustAnchor(format!("{} ({})", e, self.uri)))?;
        Ok(anchor.to_owned())
    }

    /// All authorities whose validity window contains `at`, in input order
    pub fn find(cas: &[CertificateAuthority], at: DateTime<Utc>) -> Vec<&CertificateAuthority> {
        cas.iter().filter(|ca| ca.valid_for.contains(at)).collect()
    }
}

/// A Certificate Transparency log trusted to countersign issued certificates
#[derive(Debug, Clone)]
pub struct TransparencyLog {
    base_url: String,
    public_key: DerPublicKey,
    log_id: [u8; 32],
    valid_for: ValidityWindow,
}

impl TransparencyLog {
    /// Build a log entry from its SPKI-encoded public key.
    ///
    /// The 32-byte LogID is always computed as SHA-256 of the SPKI rather
    /// than trusted from configuration.
    pub fn new(
        base_url: impl Into<String>,
        public_key: DerPublicKey,
        valid_for: ValidityWindow,
    ) -> Result<Self> {
        SubjectPublicKeyInfoRef::try_from(public_key.as_bytes())
            .map_err(|e| Error::InvalidKey(format!("CT log key is not valid SPKI: {e}")))?;
        let log_id = sha256(public_key.as_bytes());
        Ok(Self {
            base_url: base_url.into(),
            public_key,
            log_id,
            valid_for,
        })
    }

    /// Identity URL of the log
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The log's signing key as DER-encoded SubjectPublicKeyInfo
    pub fn public_key(&self) -> &DerPublicKey {
        &self.public_key
    }

    /// SHA-256 of the log key's SubjectPublicKeyInfo
    pub fn log_id(&self) -> &[u8; 32] {
        &self.log_id
    }

    pub fn valid_for(&self) -> ValidityWindow {
        self.valid_for
    }

    /// The first log with a byte-equal LogID whose window contains `at`
    pub fn find<'a>(
        logs: &'a [TransparencyLog],
        log_id: &[u8; 32],
        at: DateTime<Utc>,
    ) -> Option<&'a TransparencyLog> {
        logs.iter()
            .find(|log| &log.log_id == log_id && log.valid_for.contains(at))
    }

    /// The first log with a byte-equal LogID, ignoring validity windows.
    ///
    /// Used by the cryptographic SCT pass; the window gate is applied
    /// separately against the SCT's own timestamp.
    pub fn find_by_id<'a>(
        logs: &'a [TransparencyLog],
        log_id: &[u8; 32],
    ) -> Option<&'a TransparencyLog> {
        logs.iter().find(|log| &log.log_id == log_id)
    }
}
