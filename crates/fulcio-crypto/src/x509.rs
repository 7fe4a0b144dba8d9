//! X.509 certificate-path utilities
//!
//! A [`CertPath`] is an ordered, non-empty sequence of certificates with the
//! leaf at index 0, ascending toward the root. Paths handed to a verifier
//! usually stop short of the trusted root; paths describing a certificate
//! authority run all the way up to its self-signed anchor.

use crate::error::{Error, Result};
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use der::asn1::OctetStringRef;
use der::{Decode, Encode};
use x509_cert::Certificate;

/// An ordered certificate path, leaf first, never empty.
///
/// Each certificate's issuer is expected to be the subject of the next
/// certificate in the sequence; that invariant is established by PKIX
/// validation rather than enforced at construction.
#[derive(Debug, Clone)]
pub struct CertPath {
    certs: Vec<Certificate>,
}

impl CertPath {
    /// Wrap a list of parsed certificates. Fails on empty input.
    pub fn new(certs: Vec<Certificate>) -> Result<Self> {
        if certs.is_empty() {
            return Err(Error::InvalidCertificate(
                "certificate path is empty".to_string(),
            ));
        }
        Ok(Self { certs })
    }

    /// Parse a path from DER-encoded certificates, leaf first.
    pub fn from_der_chain<B: AsRef<[u8]>>(ders: &[B]) -> Result<Self> {
        let certs = ders
            .iter()
            .map(|der| Certificate::from_der(der.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(certs)
    }

    /// Parse a path from concatenated PEM blocks, leaf first.
    pub fn from_pem_chain(pem: &[u8]) -> Result<Self> {
        Self::new(Certificate::load_pem_chain(pem)?)
    }

    /// The certificates in the path, leaf first.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certs
    }

    /// Number of certificates in the path.
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Paths are never empty; this exists for completeness.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The end-entity certificate at index 0.
    pub fn leaf(&self) -> &Certificate {
        &self.certs[0]
    }

    /// The last certificate in the path.
    pub fn root(&self) -> &Certificate {
        &self.certs[self.certs.len() - 1]
    }

    /// DER-encode every certificate in the path, preserving order.
    pub fn der_encoded(&self) -> Result<Vec<Vec<u8>>> {
        self.certs
            .iter()
            .map(|cert| cert.to_der().map_err(Error::from))
            .collect()
    }

    /// Whether the path terminates in a self-signed certificate: the tail's
    /// subject equals its issuer and its signature verifies against its own
    /// public key.
    pub fn is_self_signed(&self) -> Result<bool> {
        let tail = self.root();
        if tail.tbs_certificate.subject != tail.tbs_certificate.issuer {
            return Ok(false);
        }
        let key = x509_verify::VerifyingKey::try_from(tail)
            .map_err(|e| Error::InvalidKey(format!("unsupported certificate key: {:?}", e)))?;
        Ok(key.verify_strict(tail).is_ok())
    }

    /// Whether `parent` is a contiguous suffix of this path, compared by
    /// DER bytes. DER is canonical, so re-encoding parsed certificates is a
    /// faithful byte comparison.
    pub fn contains_parent(&self, parent: &CertPath) -> Result<bool> {
        if parent.len() > self.len() {
            return Ok(false);
        }
        let tail = &self.certs[self.len() - parent.len()..];
        for (ours, theirs) in tail.iter().zip(parent.certs.iter()) {
            if ours.to_der()? != theirs.to_der()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Remove the `parent` suffix from this path. Fails if `parent` is not a
    /// suffix or if removing it would leave nothing.
    pub fn trim_parent(&self, parent: &CertPath) -> Result<CertPath> {
        if !self.contains_parent(parent)? {
            return Err(Error::InvalidCertificate(
                "parent path is not a suffix of the certificate path".to_string(),
            ));
        }
        CertPath::new(self.certs[..self.len() - parent.len()].to_vec())
    }

    /// Concatenate `child` (leafward) with `parent` (rootward).
    pub fn append(parent: &CertPath, child: &CertPath) -> CertPath {
        let mut certs = child.certs.clone();
        certs.extend(parent.certs.iter().cloned());
        CertPath { certs }
    }
}

/// Seconds since the Unix epoch at which `cert` becomes valid.
pub fn not_before_unix(cert: &Certificate) -> i64 {
    cert.tbs_certificate
        .validity
        .not_before
        .to_unix_duration()
        .as_secs() as i64
}

/// Extract the embedded SCT list from a certificate, if present.
///
/// Returns the TLS `SignedCertificateTimestampList` bytes with the outer DER
/// OCTET STRING of extension `1.3.6.1.4.1.11129.2.4.2` removed.
pub fn embedded_sct_list(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(None);
    };
    for ext in extensions.iter() {
        if ext.extn_id == CT_PRECERT_SCTS {
            let inner = OctetStringRef::from_der(ext.extn_value.as_bytes())?;
            return Ok(Some(inner.as_bytes().to_vec()));
        }
    }
    Ok(None)
}
