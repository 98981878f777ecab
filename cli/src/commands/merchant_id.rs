//! Show the merchant identifier of a merchant certificate

use std::path::Path;

use anyhow::{Context, Result};
use applepay_token::{extract_merchant_id, MerchantCertificate};
use base64::{engine::general_purpose::STANDARD, Engine};
use colored::Colorize;

use crate::config::{read_file, Config};

pub fn run(config: &Config, certificate: Option<&Path>) -> Result<()> {
    let path = config.certificate(certificate)?;
    let bytes = read_file(&path, "merchant certificate")?;
    let certificate = MerchantCertificate::from_pem_or_der(&bytes)
        .with_context(|| format!("Invalid merchant certificate {}", path.display()))?;

    let merchant_id = extract_merchant_id(&certificate).with_context(|| {
        format!("{} is not an Apple Pay payment processing certificate", path.display())
    })?;

    println!();
    println!("{}", "Merchant Certificate".yellow().bold());
    println!("  Subject:         {}", certificate.subject());
    println!("  Merchant ID:     {}", merchant_id.as_hex().green());
    println!("  Public key hash: {}", STANDARD.encode(certificate.public_key_hash()?));
    println!();

    Ok(())
}
