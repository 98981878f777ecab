//! AES-256-GCM payload decryption

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};

use super::kdf::SymmetricKey;
use crate::error::{Result, TokenError};

/// GCM authentication tag length, appended to the ciphertext
pub const TAG_LEN: usize = 16;

/// EC_v1 uses a 16-byte nonce of zeros; the key is unique per token
const NONCE: [u8; 16] = [0u8; 16];

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Decrypts the token's `data` field once a symmetric key is derived
pub trait PayloadDecryptor {
    /// Returns the plaintext, or `DecryptionFailed` without partial output
    fn decrypt(&self, ciphertext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>>;
}

impl<T: PayloadDecryptor + ?Sized> PayloadDecryptor for &T {
    fn decrypt(&self, ciphertext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
        (**self).decrypt(ciphertext, key)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmDecryptor;

impl PayloadDecryptor for AesGcmDecryptor {
    fn decrypt(&self, ciphertext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
        if ciphertext.len() < TAG_LEN {
            return Err(TokenError::DecryptionFailed);
        }
        let (body, tag) = ciphertext.split_at(ciphertext.len() - TAG_LEN);

        let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
            .map_err(|_| TokenError::DecryptionFailed)?;
        let mut buffer = body.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&NONCE),
                b"",
                &mut buffer,
                Tag::from_slice(tag),
            )
            .map_err(|_| TokenError::DecryptionFailed)?;

        Ok(buffer)
    }
}
