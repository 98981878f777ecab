//! Subcommand implementations and the helpers they share

pub mod config_cmd;
pub mod decrypt;
pub mod info;
pub mod merchant_id;
pub mod verify;

use std::io::Read;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use applepay_token::{apple_root_ca_g3, PaymentToken, RootCertificate};

use crate::config::read_file;

/// Read a token from a file, or stdin when the path is `-`
pub fn read_token(path: &Path) -> Result<PaymentToken> {
    let json = if path.as_os_str() == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read token from stdin")?;
        json
    } else {
        String::from_utf8(read_file(path, "payment token")?).context("Token file is not UTF-8")?
    };

    PaymentToken::from_json(&json).context("Failed to parse payment token")
}

/// The root to trust: the given file, else the embedded Apple root
pub fn load_root(path: Option<&Path>) -> Result<RootCertificate> {
    match path {
        Some(path) => RootCertificate::from_pem_or_der(&read_file(path, "root certificate")?)
            .with_context(|| format!("Invalid root certificate {}", path.display())),
        None => apple_root_ca_g3().context("Embedded Apple root certificate is unusable"),
    }
}

/// Unix seconds to a verification time
pub fn verification_time(at: Option<u64>) -> Option<SystemTime> {
    at.map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
}
