//! Trusted-root document parsing
//!
//! The trusted root is a JSON document (normally delivered out-of-band by a
//! TUF client) listing the certificate authorities and Certificate
//! Transparency logs a verifier should accept. This module holds the serde
//! model of that document plus the conversion into the materialized trust
//! model in [`crate::model`].

use crate::error::{Error, Result};
use crate::model;
use chrono::{DateTime, Utc};
use fulcio_crypto::{CertPath, DerCertificate, DerPublicKey};
use serde::{Deserialize, Serialize};

/// A trusted-root document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedRoot {
    /// Media type of the trusted root
    pub media_type: String,

    /// Certificate authorities (Fulcio)
    #[serde(default)]
    pub certificate_authorities: Vec<CertificateAuthority>,

    /// Certificate Transparency logs
    #[serde(default)]
    pub ctlogs: Vec<CertificateTransparencyLog>,
}

/// A certificate authority entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    /// Subject information
    #[serde(default)]
    pub subject: CertificateSubject,

    /// URI of the CA
    pub uri: String,

    /// Certificate chain, leafward intermediates first, root last
    pub cert_chain: CertChain,

    /// Validity period
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// A Certificate Transparency log entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateTransparencyLog {
    /// Base URL of the CT log
    pub base_url: String,

    /// Hash algorithm used by the log
    pub hash_algorithm: String,

    /// Public key for SCT verification
    pub public_key: PublicKey,

    /// Log ID as published; the verifier recomputes its own from the key
    #[serde(default)]
    pub log_id: Option<LogId>,
}

/// Public key information
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    /// DER-encoded SubjectPublicKeyInfo
    pub raw_bytes: DerPublicKey,

    /// Key details/type
    pub key_details: String,

    /// Validity period for this key
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// Subject information for a certificate authority
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSubject {
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub common_name: Option<String>,
}

/// Certificate chain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertChain {
    /// Certificates in the chain
    pub certificates: Vec<CertificateEntry>,
}

/// A certificate entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    /// DER-encoded certificate
    pub raw_bytes: DerCertificate,
}

/// A log identifier as published in the document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    pub key_id: String,
}

/// Validity period for a key or certificate, RFC 3339 strings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    #[serde(default)]
    pub start: Option<String>,

    #[serde(default)]
    pub end: Option<String>,
}

impl TrustedRoot {
    /// Parse a trusted root from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a trusted root from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| Error::Json(serde_json::Error::io(e)))?;
        Self::from_json(&json)
    }

    /// Materialize the certificate authorities, preserving document order
    pub fn fulcio_authorities(&self) -> Result<Vec<model::CertificateAuthority>> {
        self.certificate_authorities
            .iter()
            .map(|ca| {
                let ders: Vec<&[u8]> = ca
                    .cert_chain
                    .certificates
                    .iter()
                    .map(|entry| entry.raw_bytes.as_bytes())
                    .collect();
                let cert_path = CertPath::from_der_chain(&ders)
                    .map_err(|e| Error::Certificate(format!("{} ({})", e, ca.uri)))?;
                let valid_for = parse_validity(ca.valid_for.as_ref())?;
                Ok(model::CertificateAuthority::new(
                    cert_path,
                    ca.uri.clone(),
                    valid_for,
                ))
            })
            .collect()
    }

    /// Materialize the Certificate Transparency logs, preserving document
    /// order and recomputing every LogID from the key material
    pub fn ct_logs(&self) -> Result<Vec<model::TransparencyLog>> {
        self.ctlogs
            .iter()
            .map(|log| {
                let valid_for = parse_validity(log.public_key.valid_for.as_ref())?;
                model::TransparencyLog::new(
                    log.base_url.clone(),
                    log.public_key.raw_bytes.clone(),
                    valid_for,
                )
            })
            .collect()
    }
}

/// Convert an optional document validity period into a window. A missing
/// period means the entry is treated as always valid.
fn parse_validity(period: Option<&ValidityPeriod>) -> Result<model::ValidityWindow> {
    let Some(period) = period else {
        return Ok(model::ValidityWindow::always());
    };
    let start = match &period.start {
        Some(s) => parse_rfc3339(s)?,
        None => DateTime::<Utc>::MIN_UTC,
    };
    let end = period.end.as_deref().map(parse_rfc3339).transpose()?;
    Ok(model::ValidityWindow::new(start, end))
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::TimeParse(format!("{s}: {e}")))
}
