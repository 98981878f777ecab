//! End-to-end EC_v1 token decryption
//!
//! Stages run strictly in order and stop at the first failure:
//! signature validation, merchant id extraction, key agreement, key
//! derivation, payload decryption.

use std::time::SystemTime;

use tracing::debug;

use crate::crypto::{
    generate_shared_secret, generate_symmetric_key, AesGcmDecryptor, MerchantPrivateKey,
    PayloadDecryptor,
};
use crate::error::{Result, TokenError};
use crate::merchant::{extract_merchant_id, MerchantCertificate};
use crate::payment_data::PaymentData;
use crate::pki::{apple_root_ca_g3, RootCertificate};
use crate::signature::SignatureValidator;
use crate::token::{Envelope, PaymentToken};

/// Stateless token decryptor. Credentials are supplied per call.
#[derive(Debug, Clone)]
pub struct TokenDecryptor<D = AesGcmDecryptor> {
    validator: SignatureValidator,
    payload: D,
}

impl TokenDecryptor {
    /// Decryptor trusting the embedded Apple Root CA - G3
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(apple_root_ca_g3()?))
    }

    /// Decryptor trusting `root` instead of the Apple root
    pub fn with_root(root: RootCertificate) -> Self {
        Self {
            validator: SignatureValidator::new(root),
            payload: AesGcmDecryptor,
        }
    }
}

impl<D: PayloadDecryptor> TokenDecryptor<D> {
    /// Check certificate validity at `time` instead of now
    pub fn at_time(mut self, time: SystemTime) -> Self {
        self.validator = self.validator.at_time(time);
        self
    }

    pub fn with_payload_decryptor<E: PayloadDecryptor>(self, payload: E) -> TokenDecryptor<E> {
        TokenDecryptor {
            validator: self.validator,
            payload,
        }
    }

    pub fn validator(&self) -> &SignatureValidator {
        &self.validator
    }

    /// Verify and decrypt a token, returning the payment data JSON text
    pub fn decrypt(
        &self,
        token: &PaymentToken,
        certificate: &MerchantCertificate,
        private_key: &MerchantPrivateKey,
    ) -> Result<String> {
        let envelope = token.decode()?;
        self.decrypt_envelope(&envelope, certificate, private_key)
    }

    pub fn decrypt_envelope(
        &self,
        envelope: &Envelope,
        certificate: &MerchantCertificate,
        private_key: &MerchantPrivateKey,
    ) -> Result<String> {
        debug!(
            version = %envelope.version(),
            ciphertext_len = envelope.ciphertext().len(),
            has_application_data = envelope.application_data().is_some(),
            "decrypting payment token"
        );

        self.validator.validate(envelope)?;

        let merchant_id = extract_merchant_id(certificate)?;
        let shared_secret = generate_shared_secret(private_key, envelope.ephemeral_public_key())?;
        let symmetric_key = generate_symmetric_key(&merchant_id, &shared_secret)?;
        debug!(merchant_id = %merchant_id, "derived payment data key");

        let plaintext = self.payload.decrypt(envelope.ciphertext(), &symmetric_key)?;
        String::from_utf8(plaintext)
            .map_err(|e| TokenError::InvalidPayload(format!("not UTF-8: {e}")))
    }

    /// Decrypt and parse into the typed payment data view
    pub fn decrypt_payment_data(
        &self,
        token: &PaymentToken,
        certificate: &MerchantCertificate,
        private_key: &MerchantPrivateKey,
    ) -> Result<PaymentData> {
        PaymentData::from_json(&self.decrypt(token, certificate, private_key)?)
    }
}
