//! ECDSA verification keyed by the signer's SubjectPublicKeyInfo.
//!
//! Apple's CA keys are P-384 while the leaf signing key is P-256, and the
//! intermediate signs leaves with ecdsa-with-SHA256. The digest is therefore
//! chosen from the signature algorithm and verified as a prehash under
//! whichever curve the key is on.

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1,
};
use const_oid::ObjectIdentifier;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use sha2::{Digest, Sha256, Sha384};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

pub enum EcdsaKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcdsaKey {
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self, String> {
        if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(format!("unsupported public key algorithm {}", spki.algorithm.oid));
        }

        let curve: ObjectIdentifier = spki
            .algorithm
            .parameters
            .as_ref()
            .ok_or("EC public key without named curve")?
            .decode_as()
            .map_err(|e| format!("bad curve parameters: {e}"))?;

        let point = spki
            .subject_public_key
            .as_bytes()
            .ok_or("public key bit string has unused bits")?;

        if curve == SECP_256_R_1 {
            p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(Self::P256)
                .map_err(|e| format!("bad P-256 public key: {e}"))
        } else if curve == SECP_384_R_1 {
            p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(Self::P384)
                .map_err(|e| format!("bad P-384 public key: {e}"))
        } else {
            Err(format!("unsupported curve {curve}"))
        }
    }

    pub fn curve_name(&self) -> &'static str {
        match self {
            Self::P256(_) => "P-256",
            Self::P384(_) => "P-384",
        }
    }

    /// Verify a DER-encoded ECDSA signature over `message`
    pub fn verify(
        &self,
        algorithm: &ObjectIdentifier,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), String> {
        let digest = if *algorithm == ECDSA_WITH_SHA_256 {
            Sha256::digest(message).to_vec()
        } else if *algorithm == ECDSA_WITH_SHA_384 {
            Sha384::digest(message).to_vec()
        } else {
            return Err(format!("unsupported signature algorithm {algorithm}"));
        };
        self.verify_prehash(&digest, signature)
    }

    pub fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<(), String> {
        let verified = match self {
            Self::P256(key) => {
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| format!("bad ECDSA signature encoding: {e}"))?;
                key.verify_prehash(digest, &sig)
            }
            Self::P384(key) => {
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|e| format!("bad ECDSA signature encoding: {e}"))?;
                key.verify_prehash(digest, &sig)
            }
        };
        verified.map_err(|_| format!("{} signature does not verify", self.curve_name()))
    }
}
