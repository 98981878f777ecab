//! Payment token envelope
//!
//! `PaymentToken` is the JSON wire form handed to the merchant by the
//! wallet. `Envelope` holds the same fields decoded into raw bytes; it is
//! what the verification and decryption stages operate on.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};

/// Protocol variant named by the token's `version` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenVersion {
    /// ECDHE on P-256, single-step KDF, AES-256-GCM
    EcV1,
}

impl TokenVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcV1 => "EC_v1",
        }
    }
}

impl FromStr for TokenVersion {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EC_v1" => Ok(Self::EcV1),
            other => Err(TokenError::UnsupportedVersion(other.to_string())),
        }
    }
}

impl fmt::Display for TokenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token header fields (`header` object of the wire format)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHeader {
    /// Base64 DER SubjectPublicKeyInfo of the sender's ephemeral key
    pub ephemeral_public_key: String,
    /// Base64 SHA-256 of the merchant public key (informational)
    pub public_key_hash: String,
    /// Hex transaction identifier
    pub transaction_id: String,
    /// Hex application data, when the merchant supplied some
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_data: Option<String>,
}

/// A payment token as received on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub version: String,
    /// Base64 ciphertext followed by the 16-byte GCM tag
    pub data: String,
    /// Base64 detached CMS signature
    pub signature: String,
    pub header: TokenHeader,
}

impl PaymentToken {
    /// Parse a token from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TokenError::malformed("token JSON", e))
    }

    /// Decode every field into raw bytes
    pub fn decode(&self) -> Result<Envelope> {
        Envelope::try_from(self)
    }

    /// Verify and decrypt against the embedded Apple root certificate
    ///
    /// `certificate` and `private_key` may be PEM or DER. Returns the
    /// decrypted payment data as JSON text; parsing it is up to the caller.
    pub fn decrypt(&self, certificate: &[u8], private_key: &[u8]) -> Result<String> {
        let certificate = crate::merchant::MerchantCertificate::from_pem_or_der(certificate)?;
        let private_key = crate::crypto::MerchantPrivateKey::from_pem_or_der(private_key)?;
        crate::decryptor::TokenDecryptor::new()?.decrypt(self, &certificate, &private_key)
    }
}

/// Decoded token fields. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    version: TokenVersion,
    ciphertext: Vec<u8>,
    signature: Vec<u8>,
    transaction_id: Vec<u8>,
    ephemeral_public_key: Vec<u8>,
    public_key_hash: Vec<u8>,
    application_data: Option<Vec<u8>>,
}

impl Envelope {
    pub fn version(&self) -> TokenVersion {
        self.version
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn transaction_id(&self) -> &[u8] {
        &self.transaction_id
    }

    pub fn ephemeral_public_key(&self) -> &[u8] {
        &self.ephemeral_public_key
    }

    /// Advisory only; the pipeline never checks it
    pub fn public_key_hash(&self) -> &[u8] {
        &self.public_key_hash
    }

    pub fn application_data(&self) -> Option<&[u8]> {
        self.application_data.as_deref()
    }

    /// Bytes covered by the token signature:
    /// ephemeral key || ciphertext || transaction id || application data
    pub fn signed_bytes(&self) -> Vec<u8> {
        let app_len = self.application_data.as_ref().map_or(0, Vec::len);
        let mut out = Vec::with_capacity(
            self.ephemeral_public_key.len()
                + self.ciphertext.len()
                + self.transaction_id.len()
                + app_len,
        );
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.transaction_id);
        if let Some(app) = &self.application_data {
            out.extend_from_slice(app);
        }
        out
    }
}

impl TryFrom<&PaymentToken> for Envelope {
    type Error = TokenError;

    fn try_from(token: &PaymentToken) -> Result<Self> {
        let header = &token.header;
        Ok(Self {
            version: token.version.parse()?,
            ciphertext: b64::decode("data", &token.data)?,
            signature: b64::decode("signature", &token.signature)?,
            transaction_id: hex::decode(&header.transaction_id)
                .map_err(|e| TokenError::malformed("header.transactionId", e))?,
            ephemeral_public_key: b64::decode(
                "header.ephemeralPublicKey",
                &header.ephemeral_public_key,
            )?,
            public_key_hash: b64::decode("header.publicKeyHash", &header.public_key_hash)?,
            application_data: header
                .application_data
                .as_deref()
                .map(|app| {
                    hex::decode(app)
                        .map_err(|e| TokenError::malformed("header.applicationData", e))
                })
                .transpose()?,
        })
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("version", &self.version)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("signature_len", &self.signature.len())
            .field("transaction_id", &hex::encode(&self.transaction_id))
            .field("has_application_data", &self.application_data.is_some())
            .finish_non_exhaustive()
    }
}

mod b64 {
    use super::*;

    pub fn decode(field: &'static str, s: &str) -> Result<Vec<u8>> {
        STANDARD.decode(s.trim()).map_err(|e| TokenError::malformed(field, e))
    }
}
