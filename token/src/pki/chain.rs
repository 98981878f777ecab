//! Three-certificate path validation: leaf <- intermediate <- root.
//!
//! Checks name chaining, issuer signatures, validity windows, CA basic
//! constraints and key usage. Critical extensions this module does not
//! understand reject the chain. Revocation is not checked.

use std::time::SystemTime;

use const_oid::db::rfc5280::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_KEY_IDENTIFIER,
};
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use tracing::debug;
use x509_cert::ext::pkix::{BasicConstraints, KeyUsage};
use x509_cert::Certificate;

use super::ecdsa::EcdsaKey;
use super::{
    find_extension, subject, INTERMEDIATE_CERTIFICATE_OID, LEAF_CERTIFICATE_OID,
    MERCHANT_ID_FIELD_OID,
};
use crate::error::{Result, TokenError};

/// Extensions the chain checks know how to process; any other extension
/// marked critical rejects the certificate
const UNDERSTOOD_EXTENSIONS: [ObjectIdentifier; 7] = [
    ID_CE_BASIC_CONSTRAINTS,
    ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_KEY_IDENTIFIER,
    ID_CE_AUTHORITY_KEY_IDENTIFIER,
    LEAF_CERTIFICATE_OID,
    INTERMEDIATE_CERTIFICATE_OID,
    MERCHANT_ID_FIELD_OID,
];

#[derive(Clone, Copy)]
pub struct CertificateChain<'a> {
    pub leaf: &'a Certificate,
    pub intermediate: &'a Certificate,
    pub root: &'a Certificate,
}

impl<'a> CertificateChain<'a> {
    pub fn new(
        leaf: &'a Certificate,
        intermediate: &'a Certificate,
        root: &'a Certificate,
    ) -> Self {
        Self { leaf, intermediate, root }
    }

    /// Verify the chain as of `at`
    pub fn verify(&self, at: SystemTime) -> Result<()> {
        check_validity("leaf", self.leaf, at)?;
        check_validity("intermediate", self.intermediate, at)?;
        check_validity("root", self.root, at)?;

        check_critical_extensions("leaf", self.leaf)?;
        check_critical_extensions("intermediate", self.intermediate)?;
        check_critical_extensions("root", self.root)?;

        require_ca("intermediate", self.intermediate)?;
        require_ca("root", self.root)?;

        verify_issued_by(self.leaf, self.intermediate)?;
        verify_issued_by(self.intermediate, self.root)?;

        debug!(
            leaf = %subject(self.leaf),
            intermediate = %subject(self.intermediate),
            root = %subject(self.root),
            "certificate chain verified"
        );
        Ok(())
    }
}

fn untrusted(reason: impl Into<String>) -> TokenError {
    TokenError::UntrustedChain(reason.into())
}

fn check_validity(role: &str, cert: &Certificate, at: SystemTime) -> Result<()> {
    let validity = &cert.tbs_certificate.validity;
    if at < validity.not_before.to_system_time() {
        return Err(untrusted(format!("{role} certificate is not yet valid")));
    }
    if at > validity.not_after.to_system_time() {
        return Err(untrusted(format!("{role} certificate has expired")));
    }
    Ok(())
}

fn require_ca(role: &str, cert: &Certificate) -> Result<()> {
    let ext = find_extension(cert, &ID_CE_BASIC_CONSTRAINTS)
        .ok_or_else(|| untrusted(format!("{role} certificate has no basic constraints")))?;
    let constraints = BasicConstraints::from_der(ext.extn_value.as_bytes())
        .map_err(|e| untrusted(format!("{role} basic constraints: {e}")))?;
    if !constraints.ca {
        return Err(untrusted(format!("{role} certificate is not a CA")));
    }

    // keyUsage is optional, but when present it must allow certificate signing
    if let Some(ext) = find_extension(cert, &ID_CE_KEY_USAGE) {
        let usage = KeyUsage::from_der(ext.extn_value.as_bytes())
            .map_err(|e| untrusted(format!("{role} key usage: {e}")))?;
        if !usage.key_cert_sign() {
            return Err(untrusted(format!(
                "{role} key usage does not include certificate signing"
            )));
        }
    }
    Ok(())
}

fn check_critical_extensions(role: &str, cert: &Certificate) -> Result<()> {
    let extensions = cert.tbs_certificate.extensions.as_deref().unwrap_or_default();
    match extensions
        .iter()
        .find(|ext| ext.critical && !UNDERSTOOD_EXTENSIONS.contains(&ext.extn_id))
    {
        Some(ext) => Err(untrusted(format!(
            "{role} certificate has unhandled critical extension {}",
            ext.extn_id
        ))),
        None => Ok(()),
    }
}

/// Check that `cert` names `issuer` as its issuer and carries a valid
/// signature from the issuer's key
pub fn verify_issued_by(cert: &Certificate, issuer: &Certificate) -> Result<()> {
    let tbs = &cert.tbs_certificate;
    if tbs.issuer != issuer.tbs_certificate.subject {
        return Err(untrusted(format!(
            "{} is not issued by {}",
            subject(cert),
            subject(issuer)
        )));
    }
    if tbs.signature != cert.signature_algorithm {
        return Err(untrusted("certificate signature algorithm mismatch"));
    }

    let key =
        EcdsaKey::from_spki(&issuer.tbs_certificate.subject_public_key_info).map_err(untrusted)?;
    let signature = cert
        .signature
        .as_bytes()
        .ok_or_else(|| untrusted("certificate signature has unused bits"))?;
    let tbs_der = tbs
        .to_der()
        .map_err(|e| untrusted(format!("cannot encode certificate body: {e}")))?;

    key.verify(&cert.signature_algorithm.oid, &tbs_der, signature)
        .map_err(|e| untrusted(format!("{}: {e}", subject(cert))))
}
