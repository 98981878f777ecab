//! Token signature and chain-of-trust validation
//!
//! A token's `signature` field is a detached CMS SignedData made by Apple's
//! payment processing certificate. Validation:
//!
//! 1. decode the ContentInfo/SignedData container
//! 2. pick out the leaf and intermediate certificates by their marker OIDs
//! 3. verify leaf <- intermediate <- trusted root
//! 4. verify the leaf's SignerInfo over the token's signed bytes
//!
//! Any failure is terminal and nothing is decrypted.

use std::time::SystemTime;

use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier, SignerInfo};
use const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER;
use const_oid::db::rfc5911::{ID_CONTENT_TYPE, ID_DATA, ID_MESSAGE_DIGEST, ID_SIGNED_DATA};
use const_oid::db::rfc5912::{ECDSA_WITH_SHA_256, ID_EC_PUBLIC_KEY, ID_SHA_256};
use const_oid::ObjectIdentifier;
use der::asn1::OctetString;
use der::{Decode, Encode};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use x509_cert::attr::Attributes;
use x509_cert::ext::pkix::SubjectKeyIdentifier;
use x509_cert::Certificate;

use crate::error::{Result, TokenError};
use crate::pki::ecdsa::EcdsaKey;
use crate::pki::{
    self, CertificateChain, RootCertificate, INTERMEDIATE_CERTIFICATE_OID, LEAF_CERTIFICATE_OID,
};
use crate::token::Envelope;

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSignature {
    leaf_subject: String,
    intermediate_subject: String,
}

impl ValidatedSignature {
    /// Subject of the payment processing certificate that signed the token
    pub fn leaf_subject(&self) -> &str {
        &self.leaf_subject
    }

    pub fn intermediate_subject(&self) -> &str {
        &self.intermediate_subject
    }
}

#[derive(Debug, Clone)]
pub struct SignatureValidator {
    root: RootCertificate,
    verification_time: Option<SystemTime>,
}

impl SignatureValidator {
    pub fn new(root: RootCertificate) -> Self {
        Self {
            root,
            verification_time: None,
        }
    }

    /// Check certificate validity windows at `time` instead of now
    pub fn at_time(mut self, time: SystemTime) -> Self {
        self.verification_time = Some(time);
        self
    }

    pub fn root(&self) -> &RootCertificate {
        &self.root
    }

    pub fn validate(&self, envelope: &Envelope) -> Result<ValidatedSignature> {
        let result = self.validate_inner(envelope);
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "token signature rejected");
        }
        result
    }

    fn validate_inner(&self, envelope: &Envelope) -> Result<ValidatedSignature> {
        let signed_data = decode_signed_data(envelope.signature())?;

        let certificates = ClassifiedCertificates::from_signed_data(&signed_data)?;
        let at = self.verification_time.unwrap_or_else(SystemTime::now);
        CertificateChain::new(
            certificates.leaf,
            certificates.intermediate,
            self.root.certificate(),
        )
        .verify(at)?;

        let signer_info = find_signer(&signed_data, certificates.leaf)?;
        verify_signer_info(signer_info, certificates.leaf, &envelope.signed_bytes())?;

        let validated = ValidatedSignature {
            leaf_subject: pki::subject(certificates.leaf),
            intermediate_subject: pki::subject(certificates.intermediate),
        };
        debug!(leaf = %validated.leaf_subject, "token signature verified");
        Ok(validated)
    }
}

fn invalid(reason: impl Into<String>) -> TokenError {
    TokenError::InvalidSignature(reason.into())
}

fn decode_signed_data(signature: &[u8]) -> Result<SignedData> {
    let content_info = ContentInfo::from_der(signature)
        .map_err(|e| invalid(format!("malformed ContentInfo: {e}")))?;
    if content_info.content_type != ID_SIGNED_DATA {
        return Err(invalid(format!(
            "content type {} is not signedData",
            content_info.content_type
        )));
    }
    let signed_data: SignedData = content_info
        .content
        .decode_as()
        .map_err(|e| invalid(format!("malformed SignedData: {e}")))?;

    if signed_data.encap_content_info.econtent.is_some() {
        return Err(invalid("signature is not detached"));
    }
    Ok(signed_data)
}

// ============================================================================
// Certificate Classification
// ============================================================================

/// Leaf and intermediate certificates identified in a single pass
struct ClassifiedCertificates<'a> {
    leaf: &'a Certificate,
    intermediate: &'a Certificate,
}

impl<'a> ClassifiedCertificates<'a> {
    fn from_signed_data(signed_data: &'a SignedData) -> Result<Self> {
        let mut leaf = None;
        let mut intermediate = None;

        let certificates = signed_data.certificates.iter().flat_map(|set| set.0.iter());
        for choice in certificates {
            let CertificateChoices::Certificate(cert) = choice else {
                continue;
            };
            if leaf.is_none() && pki::has_extension(cert, &LEAF_CERTIFICATE_OID) {
                leaf = Some(cert);
            } else if intermediate.is_none()
                && pki::has_extension(cert, &INTERMEDIATE_CERTIFICATE_OID)
            {
                intermediate = Some(cert);
            }
        }

        match (leaf, intermediate) {
            (Some(leaf), Some(intermediate)) => Ok(Self { leaf, intermediate }),
            _ => Err(TokenError::MissingCustomExtensions),
        }
    }
}

// ============================================================================
// SignerInfo Verification
// ============================================================================

/// The container must hold exactly one SignerInfo, and it must name the leaf
fn find_signer<'a>(signed_data: &'a SignedData, leaf: &Certificate) -> Result<&'a SignerInfo> {
    let mut signer_infos = signed_data.signer_infos.0.iter();
    let signer_info = match (signer_infos.next(), signer_infos.next()) {
        (Some(info), None) => info,
        (None, _) => return Err(invalid("no signer info")),
        (Some(_), Some(_)) => return Err(invalid("more than one signer info")),
    };

    if !identifies(&signer_info.sid, leaf) {
        return Err(invalid("signer is not the payment processing certificate"));
    }
    Ok(signer_info)
}

fn identifies(sid: &SignerIdentifier, cert: &Certificate) -> bool {
    let tbs = &cert.tbs_certificate;
    match sid {
        SignerIdentifier::IssuerAndSerialNumber(id) => {
            id.issuer == tbs.issuer && id.serial_number == tbs.serial_number
        }
        SignerIdentifier::SubjectKeyIdentifier(ski) => {
            pki::find_extension(cert, &ID_CE_SUBJECT_KEY_IDENTIFIER)
                .and_then(|ext| SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok())
                .map_or(false, |cert_ski| &cert_ski == ski)
        }
    }
}

fn verify_signer_info(signer_info: &SignerInfo, leaf: &Certificate, content: &[u8]) -> Result<()> {
    if signer_info.digest_alg.oid != ID_SHA_256 {
        return Err(invalid(format!("unsupported digest algorithm {}", signer_info.digest_alg.oid)));
    }
    let algorithm = signer_info.signature_algorithm.oid;
    if algorithm != ECDSA_WITH_SHA_256 && algorithm != ID_EC_PUBLIC_KEY {
        return Err(invalid(format!("unsupported signature algorithm {algorithm}")));
    }

    let key = EcdsaKey::from_spki(&leaf.tbs_certificate.subject_public_key_info).map_err(invalid)?;
    if !matches!(key, EcdsaKey::P256(_)) {
        return Err(invalid(format!("leaf key is {}, expected P-256", key.curve_name())));
    }

    let content_digest = Sha256::digest(content);
    let signed_digest = match &signer_info.signed_attrs {
        Some(attrs) => {
            check_signed_attributes(attrs, &content_digest)?;
            let encoded = attrs
                .to_der()
                .map_err(|e| invalid(format!("cannot encode signed attributes: {e}")))?;
            Sha256::digest(encoded)
        }
        None => content_digest,
    };

    key.verify_prehash(&signed_digest, signer_info.signature.as_bytes())
        .map_err(invalid)
}

fn check_signed_attributes(attrs: &Attributes, content_digest: &[u8]) -> Result<()> {
    if let Some(content_type) = single_attribute_value(attrs, &ID_CONTENT_TYPE)? {
        let content_type: ObjectIdentifier = content_type
            .decode_as()
            .map_err(|e| invalid(format!("malformed contentType attribute: {e}")))?;
        if content_type != ID_DATA {
            return Err(invalid(format!("signed content type {content_type} is not data")));
        }
    }

    let message_digest: OctetString = single_attribute_value(attrs, &ID_MESSAGE_DIGEST)?
        .ok_or_else(|| invalid("messageDigest attribute missing"))?
        .decode_as()
        .map_err(|e| invalid(format!("malformed messageDigest attribute: {e}")))?;

    if !bool::from(message_digest.as_bytes().ct_eq(content_digest)) {
        return Err(invalid("messageDigest does not match the token contents"));
    }
    Ok(())
}

fn single_attribute_value<'a>(
    attrs: &'a Attributes,
    oid: &ObjectIdentifier,
) -> Result<Option<&'a der::Any>> {
    let Some(attr) = attrs.iter().find(|attr| &attr.oid == oid) else {
        return Ok(None);
    };
    let mut values = attr.values.iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(Some(value)),
        _ => Err(invalid(format!("attribute {oid} must have exactly one value"))),
    }
}
