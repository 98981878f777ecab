//! Apple Pay EC_v1 payment token verification and decryption
//!
//! Pipeline for one token:
//!
//! 1. validate the detached CMS signature and its chain to Apple Root CA - G3
//! 2. read the merchant identifier from the merchant certificate
//! 3. ECDH (P-256) between the merchant key and the ephemeral key
//! 4. derive the AES-256 key with the single-step SHA-256 KDF
//! 5. AES-256-GCM decrypt the payment data
//!
//! ```no_run
//! use applepay_token::PaymentToken;
//!
//! # fn run(json: &str, cert: &[u8], key: &[u8]) -> applepay_token::Result<()> {
//! let token = PaymentToken::from_json(json)?;
//! let payment_data_json = token.decrypt(cert, key)?;
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod decryptor;
pub mod error;
pub mod merchant;
pub mod payment_data;
pub mod pki;
pub mod signature;
pub mod token;

pub use crypto::{AesGcmDecryptor, MerchantPrivateKey, PayloadDecryptor, SharedSecret, SymmetricKey};
pub use decryptor::TokenDecryptor;
pub use error::{Result, TokenError};
pub use merchant::{extract_merchant_id, MerchantCertificate, MerchantId};
pub use payment_data::{CryptogramData, PaymentData};
pub use pki::{apple_root_ca_g3, RootCertificate};
pub use signature::{SignatureValidator, ValidatedSignature};
pub use token::{Envelope, PaymentToken, TokenHeader, TokenVersion};

#[cfg(test)]
mod tests;

#[cfg(test)]
mod test_vectors;
