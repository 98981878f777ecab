//! Verify and decrypt a payment token

use std::path::PathBuf;

use anyhow::{Context, Result};
use applepay_token::{MerchantCertificate, MerchantPrivateKey, TokenDecryptor};
use tracing::info;

use super::{load_root, read_token, verification_time};
use crate::config::{read_file, Config};

pub struct DecryptOptions {
    pub token: PathBuf,
    pub certificate: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub at: Option<u64>,
    pub pretty: bool,
}

pub fn run(config: &Config, opts: DecryptOptions) -> Result<()> {
    let payment_data = decrypt(config, &opts)?;

    if opts.pretty {
        let value: serde_json::Value =
            serde_json::from_str(&payment_data).context("Decrypted payment data is not JSON")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{payment_data}");
    }

    Ok(())
}

/// Decrypt the token named by `opts`, returning the payment data JSON text
pub fn decrypt(config: &Config, opts: &DecryptOptions) -> Result<String> {
    let token = read_token(&opts.token)?;

    let certificate_path = config.certificate(opts.certificate.as_deref())?;
    let private_key_path = config.private_key(opts.private_key.as_deref())?;

    let certificate_bytes = read_file(&certificate_path, "merchant certificate")?;
    let certificate = MerchantCertificate::from_pem_or_der(&certificate_bytes)
        .with_context(|| format!("Invalid merchant certificate {}", certificate_path.display()))?;
    let private_key_bytes = read_file(&private_key_path, "merchant private key")?;
    let private_key = MerchantPrivateKey::from_pem_or_der(&private_key_bytes)
        .with_context(|| format!("Invalid merchant private key {}", private_key_path.display()))?;

    let root_path = config.root_certificate(opts.root.as_deref());
    let mut decryptor = TokenDecryptor::with_root(load_root(root_path.as_deref())?);
    if let Some(time) = verification_time(opts.at) {
        decryptor = decryptor.at_time(time);
    }

    info!(
        token = %opts.token.display(),
        certificate = %certificate_path.display(),
        custom_root = root_path.is_some(),
        "decrypting token"
    );

    decryptor
        .decrypt(&token, &certificate, &private_key)
        .context("Token decryption failed")
}
