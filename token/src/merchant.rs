//! Merchant credentials and merchant identifier extraction

use std::fmt;

use der::Encode;
use sha2::{Digest, Sha256};
use x509_cert::Certificate;

use crate::error::{Result, TokenError};
use crate::pki::{self, MERCHANT_ID_FIELD_OID};

/// Length of the ASN.1 UTF8String header preceding the hex identifier
const MERCHANT_ID_PREFIX_LEN: usize = 2;

/// The merchant's Apple Pay payment processing certificate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerchantCertificate {
    cert: Certificate,
}

impl MerchantCertificate {
    /// Load from PEM text or raw DER
    pub fn from_pem_or_der(bytes: &[u8]) -> Result<Self> {
        pki::parse_certificate(bytes)
            .map(|cert| Self { cert })
            .map_err(|e| TokenError::InvalidCredentials(format!("merchant certificate: {e}")))
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    pub fn subject(&self) -> String {
        pki::subject(&self.cert)
    }

    /// SHA-256 of the certificate's SubjectPublicKeyInfo, the value tokens
    /// carry in `header.publicKeyHash`
    pub fn public_key_hash(&self) -> Result<[u8; 32]> {
        let spki = self
            .cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| TokenError::InvalidCredentials(format!("merchant certificate key: {e}")))?;
        Ok(Sha256::digest(spki).into())
    }
}

impl From<Certificate> for MerchantCertificate {
    fn from(cert: Certificate) -> Self {
        Self { cert }
    }
}

/// Hex merchant identifier as carried in the merchant certificate
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MerchantId(String);

impl MerchantId {
    pub fn new(hex_id: impl Into<String>) -> Self {
        Self(hex_id.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Raw identifier bytes, used as PartyVInfo in key derivation
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.0).map_err(|e| TokenError::malformed("merchant id", e))
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerchantId({})", self.0)
    }
}

/// Read the merchant identifier extension from the merchant certificate
///
/// The extension value is a DER UTF8String; its two header bytes are
/// dropped and the remainder is taken as the hex identifier.
pub fn extract_merchant_id(certificate: &MerchantCertificate) -> Result<MerchantId> {
    let ext = pki::find_extension(&certificate.cert, &MERCHANT_ID_FIELD_OID)
        .ok_or(TokenError::MissingMerchantId)?;

    let raw = ext.extn_value.as_bytes();
    let value = raw
        .get(MERCHANT_ID_PREFIX_LEN..)
        .filter(|rest| !rest.is_empty())
        .ok_or(TokenError::MissingMerchantId)?;
    let hex_id = std::str::from_utf8(value).map_err(|_| TokenError::MissingMerchantId)?;

    Ok(MerchantId::new(hex_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERTIFICATE_PEM: &str = include_str!("../fixtures/certificate.pem");
    const CERTIFICATE_DER: &[u8] = include_bytes!("../fixtures/certificate.der");
    const ROOT_PEM: &str = include_str!("../fixtures/root_ca.pem");

    #[test]
    fn test_extracts_fixture_merchant_id() {
        let cert = MerchantCertificate::from_pem_or_der(CERTIFICATE_PEM.as_bytes()).unwrap();
        let id = extract_merchant_id(&cert).unwrap();
        assert_eq!(
            id.as_hex(),
            "358DA5890B9555C0A9EFB84B5CD6FF04BFDCD5AABF5DC14B9872D8DF51EAF439"
        );
        assert_eq!(id.to_bytes().unwrap().len(), 32);
    }

    #[test]
    fn test_pem_and_der_agree() {
        let pem = MerchantCertificate::from_pem_or_der(CERTIFICATE_PEM.as_bytes()).unwrap();
        let der = MerchantCertificate::from_pem_or_der(CERTIFICATE_DER).unwrap();
        assert_eq!(pem, der);
        assert_eq!(extract_merchant_id(&pem).unwrap(), extract_merchant_id(&der).unwrap());
    }

    #[test]
    fn test_public_key_hash_matches_token_header() {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let cert = MerchantCertificate::from_pem_or_der(CERTIFICATE_PEM.as_bytes()).unwrap();
        assert_eq!(
            STANDARD.encode(cert.public_key_hash().unwrap()),
            "KG9cFwCgOYY4P811tpzs+4W2mOOBa4usw86fsl3uJJE="
        );
    }

    #[test]
    fn test_certificate_without_extension() {
        let cert = MerchantCertificate::from_pem_or_der(ROOT_PEM.as_bytes()).unwrap();
        assert_eq!(extract_merchant_id(&cert), Err(TokenError::MissingMerchantId));
    }

    #[test]
    fn test_unparseable_certificate() {
        assert!(matches!(
            MerchantCertificate::from_pem_or_der(
                b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n"
            ),
            Err(TokenError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_non_hex_id_is_malformed() {
        let id = MerchantId::new("zz");
        assert!(matches!(
            id.to_bytes(),
            Err(TokenError::MalformedInput { field: "merchant id", .. })
        ));
    }
}
