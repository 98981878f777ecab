//! Key agreement, key derivation and payload decryption for EC_v1 tokens
//!
//! Security features:
//! - Shared secrets and symmetric keys zeroize on drop
//! - Debug output of key material is redacted
//! - Decryption is all-or-nothing: a tag mismatch yields no plaintext

pub mod aead;
pub mod ecdh;
pub mod kdf;

pub use aead::{AesGcmDecryptor, PayloadDecryptor};
pub use ecdh::{generate_shared_secret, MerchantPrivateKey, SharedSecret};
pub use kdf::{generate_symmetric_key, SymmetricKey};
