//! Show the trusted root and configured credentials

use std::path::Path;

use anyhow::Result;
use applepay_token::pki::root::APPLE_ROOT_CA_G3_PEM;
use applepay_token::{apple_root_ca_g3, extract_merchant_id, MerchantCertificate};
use colored::Colorize;

use super::config_cmd::print_path;
use super::load_root;
use crate::config::{read_file, Config};

pub fn run(config_path: &Path, config: &Config) -> Result<()> {
    println!();
    println!("{}", "applepay".yellow().bold());
    println!();

    println!("{}:", "Embedded Root".cyan());
    let apple_root = apple_root_ca_g3()?;
    let validity = &apple_root.certificate().tbs_certificate.validity;
    println!("  Subject:    {}", apple_root.subject());
    println!("  Valid:      {} - {}", validity.not_before, validity.not_after);
    println!("  PEM size:   {} bytes", APPLE_ROOT_CA_G3_PEM.len());
    println!();

    if let Some(path) = config.root_certificate_path.as_deref() {
        println!("{}:", "Root Override".cyan());
        match load_root(Some(path)) {
            Ok(root) => println!("  {}", root.subject()),
            Err(e) => println!("  {} {e:#}", "UNUSABLE".red()),
        }
        println!();
    }

    println!("{}:", "Credentials".cyan());
    println!("  Config file: {}", config_path.display());
    print_path("Certificate", config.certificate_path.as_deref(), "not set");
    print_path("Private key", config.private_key_path.as_deref(), "not set");

    if let Some(path) = config.certificate_path.as_deref() {
        let merchant_id = read_file(path, "merchant certificate")
            .and_then(|bytes| Ok(MerchantCertificate::from_pem_or_der(&bytes)?))
            .and_then(|cert| Ok(extract_merchant_id(&cert)?));
        match merchant_id {
            Ok(id) => println!("  Merchant ID: {}", id.as_hex().green()),
            Err(e) => println!("  Merchant ID: {}", format!("{e:#}").red()),
        }
    } else {
        println!("  Run 'applepay config set --certificate <path> --private-key <path>'");
    }
    println!();

    Ok(())
}
