//! Single-step concatenation KDF (NIST SP 800-56A, section 5.8.1)
//!
//! One SHA-256 block covers the 32-byte AES-256 key, so a single iteration
//! with counter 1 is computed and nothing is truncated.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::ecdh::SharedSecret;
use crate::error::Result;
use crate::merchant::MerchantId;

/// Big-endian 32-bit counter for the only iteration
const KDF_COUNTER: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// AlgorithmID: length byte followed by "id-aes256-GCM"
const KDF_ALGORITHM: &[u8] = b"\x0did-aes256-GCM";

/// PartyUInfo
const KDF_PARTY_U_INFO: &[u8] = b"Apple";

/// AES-256 key derived for one token
pub struct SymmetricKey {
    bytes: [u8; 32],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes (use carefully)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// key = SHA256(counter || Z || AlgorithmID || PartyUInfo || PartyVInfo)
///
/// PartyVInfo is the merchant identifier decoded from hex.
pub fn generate_symmetric_key(
    merchant_id: &MerchantId,
    shared_secret: &SharedSecret,
) -> Result<SymmetricKey> {
    let party_v_info = merchant_id.to_bytes()?;

    let mut hasher = Sha256::new();
    hasher.update(KDF_COUNTER);
    hasher.update(shared_secret.as_bytes());
    hasher.update(KDF_ALGORITHM);
    hasher.update(KDF_PARTY_U_INFO);
    hasher.update(&party_v_info);

    Ok(SymmetricKey::from_bytes(hasher.finalize().into()))
}
