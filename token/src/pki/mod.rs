//! X.509 helpers: Apple marker OIDs, certificate loading, chain checks

pub mod chain;
pub mod ecdsa;
pub mod root;

pub use chain::CertificateChain;
pub use root::{apple_root_ca_g3, RootCertificate};

use const_oid::ObjectIdentifier;
use der::{Decode, DecodePem};
use x509_cert::ext::Extension;
use x509_cert::Certificate;

/// Marks the payment processing signing (leaf) certificate
pub const LEAF_CERTIFICATE_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113635.100.6.29");

/// Marks the Apple Application Integration CA (intermediate) certificate
pub const INTERMEDIATE_CERTIFICATE_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113635.100.6.2.14");

/// Carries the merchant identifier in merchant certificates
pub const MERCHANT_ID_FIELD_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113635.100.6.32");

/// Parse a certificate given either PEM text or raw DER
pub fn parse_certificate(bytes: &[u8]) -> Result<Certificate, der::Error> {
    match pem_text(bytes) {
        Some(pem) => Certificate::from_pem(pem),
        None => Certificate::from_der(bytes),
    }
}

/// Returns the PEM document with leading whitespace stripped, if `bytes` is one
pub(crate) fn pem_text(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?.trim_start();
    text.starts_with("-----BEGIN").then_some(text)
}

pub fn find_extension<'a>(cert: &'a Certificate, oid: &ObjectIdentifier) -> Option<&'a Extension> {
    cert.tbs_certificate
        .extensions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|ext| &ext.extn_id == oid)
}

pub fn has_extension(cert: &Certificate, oid: &ObjectIdentifier) -> bool {
    find_extension(cert, oid).is_some()
}

pub fn subject(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}
