//! Verification of Fulcio-issued signing certificates
//!
//! A [`FulcioVerifier`] is built once from trust material and reused: it
//! holds the configured certificate authorities (with their PKIX trust
//! anchors already converted) and Certificate Transparency logs. All
//! operations take `&self` and no operation reads a clock; every instant
//! consulted comes from the certificate or SCT under examination.

use crate::ct;
use crate::error::{CaFailure, Result, VerificationError};
use chrono::{DateTime, Utc};
use const_oid::db::rfc5912::ID_KP_CODE_SIGNING;
use fulcio_crypto::{embedded_sct_list, not_before_unix, CertPath};
use fulcio_trust_root::{CertificateAuthority, TransparencyLog, TrustedRoot};
use rustls_pki_types::{CertificateDer, TrustAnchor, UnixTime};
use std::time::Duration;
use webpki::{EndEntityCert, KeyUsage, ALL_VERIFICATION_ALGS};

/// A certificate authority paired with its eagerly converted trust anchor.
///
/// Anchor conversion happens once, at verifier construction; by the time a
/// chain is validated the anchor is known-good.
struct TrustedCa {
    authority: CertificateAuthority,
    anchor: TrustAnchor<'static>,
}

/// Verifier for Fulcio-issued signing certificates
pub struct FulcioVerifier {
    cas: Vec<TrustedCa>,
    ct_logs: Vec<TransparencyLog>,
    sct_quorum: usize,
}

impl FulcioVerifier {
    /// Build a verifier from a parsed trusted-root document.
    ///
    /// Fails with a trust-root error (not a verification error) when any
    /// CA chain cannot be materialized into a trust anchor or any CT log key
    /// is unusable.
    pub fn new(trust_root: &TrustedRoot) -> fulcio_trust_root::Result<Self> {
        Self::from_parts(trust_root.fulcio_authorities()?, trust_root.ct_logs()?)
    }

    /// Build a verifier from already-materialized trust material, preserving
    /// the given order for error reporting.
    pub fn from_parts(
        cas: Vec<CertificateAuthority>,
        ct_logs: Vec<TransparencyLog>,
    ) -> fulcio_trust_root::Result<Self> {
        let cas = cas
            .into_iter()
            .map(|authority| {
                let anchor = authority.trust_anchor()?;
                Ok(TrustedCa { authority, anchor })
            })
            .collect::<fulcio_trust_root::Result<Vec<_>>>()?;
        Ok(Self {
            cas,
            ct_logs,
            sct_quorum: 1,
        })
    }

    /// Require `quorum` SCTs to pass both the signature and log-window
    /// checks. The default is 1.
    pub fn with_sct_quorum(mut self, quorum: usize) -> Self {
        self.sct_quorum = quorum.max(1);
        self
    }

    /// Verify that a signing-certificate chain is valid against the
    /// configured trust anchors and that its leaf carries at least one
    /// acceptable embedded SCT.
    ///
    /// The input chain should not normally include trusted roots or
    /// intermediates; a full chain ending in a known self-signed root is
    /// also accepted.
    pub fn verify_signing_certificate(&self, signing_certificate: &CertPath) -> Result<()> {
        let full_cert_path = self.validate_cert_path(signing_certificate)?;
        self.verify_sct(&full_cert_path)
    }

    /// Drop the configured CA suffix from a chain handed back by a signing
    /// service, leaving only the leafward portion.
    pub fn trim_trusted_parent(&self, signing_certificate: &CertPath) -> Result<CertPath> {
        for ca in &self.cas {
            if signing_certificate.contains_parent(ca.authority.cert_path())? {
                return signing_certificate
                    .trim_parent(ca.authority.cert_path())
                    .map_err(VerificationError::from);
            }
        }
        Err(VerificationError::UntrustedParent)
    }

    /// Find a CA that accepts the chain and return the full certificate
    /// path (input plus the CA's own certificates) that PKIX validated.
    ///
    /// Self-signed input is used as-is when it terminates in a configured
    /// CA's certificates; anything else has the CA's chain appended before
    /// validation.
    pub fn validate_cert_path(&self, signing_certificate: &CertPath) -> Result<CertPath> {
        let leaf = signing_certificate.leaf();
        let not_before = DateTime::from_timestamp(not_before_unix(leaf), 0).ok_or_else(|| {
            VerificationError::CertificateEncoding(
                "leaf notBefore is not a representable instant".to_string(),
            )
        })?;

        let candidates: Vec<&TrustedCa> = self
            .cas
            .iter()
            .filter(|ca| ca.authority.valid_for().contains(not_before))
            .collect();
        if candidates.is_empty() {
            return Err(VerificationError::NoValidCertificateAuthorities);
        }

        let input_is_self_signed = signing_certificate.is_self_signed()?;
        let mut failures: Vec<CaFailure> = Vec::new();

        for ca in candidates {
            let full_cert_path = if input_is_self_signed {
                // A full chain is only usable when it terminates in this
                // CA's own certificates.
                if signing_certificate.contains_parent(ca.authority.cert_path())? {
                    signing_certificate.clone()
                } else {
                    failures.push(CaFailure {
                        uri: ca.authority.uri().to_string(),
                        reason: "Trusted root in chain does not match".to_string(),
                    });
                    continue;
                }
            } else {
                CertPath::append(ca.authority.cert_path(), signing_certificate)
            };

            match validate_pkix(&full_cert_path, &ca.anchor, not_before) {
                Ok(()) => {
                    tracing::debug!(uri = ca.authority.uri(), "certificate chain validated");
                    return Ok(full_cert_path);
                }
                Err(reason) => {
                    failures.push(CaFailure {
                        uri: ca.authority.uri().to_string(),
                        reason,
                    });
                }
            }
        }
        Err(VerificationError::CertPathNotVerifiable(failures))
    }

    /// Check the leaf's embedded SCTs: at least `sct_quorum` of them must be
    /// cryptographically valid for a configured log *and* carry a timestamp
    /// inside that log's validity window.
    ///
    /// Expects the full path produced by [`Self::validate_cert_path`].
    pub fn verify_sct(&self, full_cert_path: &CertPath) -> Result<()> {
        if self.ct_logs.is_empty() {
            return Err(VerificationError::NoCtLogsConfigured);
        }
        if embedded_sct_list(full_cert_path.leaf())?.is_none() {
            return Err(VerificationError::NoEmbeddedScts);
        }

        let result = ct::verify_signed_certificate_timestamps(full_cert_path, &self.ct_logs)?;

        // Signature validity alone is not enough: the trust root scopes each
        // log to a validity period, and the SCT must have been produced
        // inside it.
        let mut satisfied = 0;
        for sct in &result.valid_scts {
            let Some(entry_time) = sct.entry_time() else {
                continue;
            };
            if TransparencyLog::find(&self.ct_logs, &sct.log_id, entry_time).is_some() {
                satisfied += 1;
                if satisfied >= self.sct_quorum {
                    return Ok(());
                }
            }
        }
        Err(VerificationError::AllSctsInvalid(result.total()))
    }
}

/// Run PKIX validation of `full_cert_path` against a single trust anchor,
/// pinned to `at`, the leaf's notBefore. Fulcio leaves live for minutes;
/// validating at "now" would reject legitimately issued certificates.
/// Revocation is not checked: Fulcio publishes neither CRLs nor OCSP.
fn validate_pkix(
    full_cert_path: &CertPath,
    anchor: &TrustAnchor<'static>,
    at: DateTime<Utc>,
) -> std::result::Result<(), String> {
    let ders = full_cert_path.der_encoded().map_err(|e| e.to_string())?;

    let end_entity_der = CertificateDer::from(ders[0].as_slice());
    let end_entity = EndEntityCert::try_from(&end_entity_der).map_err(|e| e.to_string())?;

    let intermediates: Vec<CertificateDer<'_>> = ders[1..]
        .iter()
        .map(|der| CertificateDer::from(der.as_slice()))
        .collect();

    let secs = u64::try_from(at.timestamp())
        .map_err(|_| "validation instant predates the Unix epoch".to_string())?;
    let time = UnixTime::since_unix_epoch(Duration::from_secs(secs));

    end_entity
        .verify_for_usage(
            ALL_VERIFICATION_ALGS,
            std::slice::from_ref(anchor),
            &intermediates,
            time,
            KeyUsage::required(ID_KP_CODE_SIGNING.as_bytes()),
            None,
            None,
        )
        .map(|_| ())
        .map_err(|e| e.to_string())
}
