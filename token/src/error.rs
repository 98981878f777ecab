use thiserror::Error;

/// Errors produced while verifying or decrypting a payment token.
///
/// Every variant is terminal for the call. Messages carry enough detail to
/// log but never include key material or plaintext.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signature does not contain the correct custom OIDs")]
    MissingCustomExtensions,

    #[error("Unable to verify a valid chain of trust from signature to root certificate: {0}")]
    UntrustedChain(String),

    #[error("The given signature is not a valid ECDSA signature: {0}")]
    InvalidSignature(String),

    #[error("Merchant certificate does not carry a merchant identifier")]
    MissingMerchantId,

    #[error("Key agreement failed: {0}")]
    KeyAgreementFailure(String),

    /// Tag mismatch, wrong key, or a ciphertext shorter than the tag
    #[error("Payment data decryption failed")]
    DecryptionFailed,

    #[error("Malformed {field}: {reason}")]
    MalformedInput { field: &'static str, reason: String },

    #[error("Invalid merchant credentials: {0}")]
    InvalidCredentials(String),

    #[error("Unsupported token version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid payment data: {0}")]
    InvalidPayload(String),
}

impl TokenError {
    pub(crate) fn malformed(field: &'static str, reason: impl ToString) -> Self {
        Self::MalformedInput {
            field,
            reason: reason.to_string(),
        }
    }

    /// True for the failures raised by signature and chain validation
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingCustomExtensions | Self::UntrustedChain(_) | Self::InvalidSignature(_)
        )
    }

    /// Short stable name, used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCustomExtensions => "missing_custom_extensions",
            Self::UntrustedChain(_) => "untrusted_chain",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::MissingMerchantId => "missing_merchant_id",
            Self::KeyAgreementFailure(_) => "key_agreement_failure",
            Self::DecryptionFailed => "decryption_failed",
            Self::MalformedInput { .. } => "malformed_input",
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::InvalidPayload(_) => "invalid_payload",
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenError>;
