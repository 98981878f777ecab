//! Configuration for the applepay CLI
//!
//! Default credential locations live in `~/.applepay/config.json`. Paths
//! given on the command line always win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default directory for CLI state
const CONFIG_DIR: &str = ".applepay";
const CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Merchant payment processing certificate (PEM or DER)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<PathBuf>,
    /// Merchant private key (PEM or DER)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    /// Trusted root replacing Apple Root CA - G3, for sandbox or test PKIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_certificate_path: Option<PathBuf>,
}

/// Get the CLI state directory
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR))
        .context("Could not find home directory")
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

impl Config {
    /// Load from `path`; a missing file is an empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save to `path`, creating its directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn certificate(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match flag.or(self.certificate_path.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => bail!(
                "No merchant certificate given. \
                 Pass --certificate or run 'applepay config set --certificate <path>'"
            ),
        }
    }

    pub fn private_key(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match flag.or(self.private_key_path.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => bail!(
                "No merchant private key given. \
                 Pass --private-key or run 'applepay config set --private-key <path>'"
            ),
        }
    }

    /// Root override, if any; `None` means the embedded Apple root
    pub fn root_certificate(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.or(self.root_certificate_path.as_deref()).map(Path::to_path_buf)
    }
}

/// Read a credential or token file
pub fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {what} from {}", path.display()))
}
