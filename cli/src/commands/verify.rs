//! Verify a token's signature and chain of trust

use std::path::PathBuf;

use anyhow::{Context, Result};
use applepay_token::{MerchantCertificate, SignatureValidator};
use colored::Colorize;

use super::{load_root, read_token, verification_time};
use crate::config::{read_file, Config};

pub struct VerifyOptions {
    pub token: PathBuf,
    pub root: Option<PathBuf>,
    pub certificate: Option<PathBuf>,
    pub at: Option<u64>,
}

pub fn run(config: &Config, opts: VerifyOptions) -> Result<()> {
    let envelope = read_token(&opts.token)?.decode().context("Malformed payment token")?;

    let root_path = config.root_certificate(opts.root.as_deref());
    let mut validator = SignatureValidator::new(load_root(root_path.as_deref())?);
    if let Some(time) = verification_time(opts.at) {
        validator = validator.at_time(time);
    }

    println!();
    println!("{}", "Payment Token".yellow().bold());
    println!("  Version:          {}", envelope.version());
    println!("  Transaction ID:   {}", hex::encode(envelope.transaction_id()));
    println!("  Payload:          {} bytes", envelope.ciphertext().len());
    println!(
        "  Application data: {}",
        envelope.application_data().map_or_else(|| "none".to_string(), hex::encode)
    );
    println!("  Trusted root:     {}", validator.root().subject());
    println!();

    let validated = match validator.validate(&envelope) {
        Ok(validated) => validated,
        Err(e) => {
            println!("{} {}", "Signature: INVALID".red().bold(), e);
            return Err(e).context("Token signature verification failed");
        }
    };

    println!("{}", "Signature: VALID".green().bold());
    println!("  Signed by:        {}", validated.leaf_subject());
    println!("  Issued by:        {}", validated.intermediate_subject());

    // publicKeyHash is advisory; a mismatch usually means the wrong merchant certificate
    if let Some(path) = opts.certificate.as_deref().or(config.certificate_path.as_deref()) {
        let bytes = read_file(path, "merchant certificate")?;
        let certificate = MerchantCertificate::from_pem_or_der(&bytes)
            .with_context(|| format!("Invalid merchant certificate {}", path.display()))?;
        if certificate.public_key_hash()?.as_slice() == envelope.public_key_hash() {
            println!("  Merchant key:     {}", "matches publicKeyHash".green());
        } else {
            println!("  Merchant key:     {}", "does not match publicKeyHash".red());
        }
    }
    println!();

    Ok(())
}
