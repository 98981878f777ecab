//! Trust anchor for token signatures
//!
//! The Apple Root CA - G3 certificate is compiled in and parsed once per
//! process. Validators receive a `RootCertificate` explicitly, so tests and
//! sandbox setups can substitute their own root.

use std::sync::Arc;

use once_cell::sync::Lazy;
use x509_cert::Certificate;

use crate::error::{Result, TokenError};

/// Apple Root CA - G3
/// SHA-256 fingerprint 63:34:3A:BF:B8:9A:6A:03:EB:B5:7E:9B:3F:5F:A7:BE:
/// 7C:4F:5C:75:6F:30:17:B3:A8:C4:88:C3:65:3E:91:79
pub const APPLE_ROOT_CA_G3_PEM: &str = include_str!("../../resources/AppleRootCA-G3.pem");

static APPLE_ROOT_CA_G3: Lazy<Result<RootCertificate>> =
    Lazy::new(|| RootCertificate::from_pem_or_der(APPLE_ROOT_CA_G3_PEM.as_bytes()));

/// The embedded Apple root
pub fn apple_root_ca_g3() -> Result<RootCertificate> {
    APPLE_ROOT_CA_G3.clone()
}

/// An immutable, cheaply clonable trusted root certificate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootCertificate {
    cert: Arc<Certificate>,
}

impl RootCertificate {
    pub fn from_pem_or_der(bytes: &[u8]) -> Result<Self> {
        let cert = super::parse_certificate(bytes)
            .map_err(|e| TokenError::malformed("root certificate", e))?;
        Ok(Self::from(cert))
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    pub fn subject(&self) -> String {
        super::subject(&self.cert)
    }
}

impl From<Certificate> for RootCertificate {
    fn from(cert: Certificate) -> Self {
        Self { cert: Arc::new(cert) }
    }
}
