//! Show or change the CLI configuration

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::ConfigAction;

pub fn run(config_path: &Path, mut config: Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show(config_path, &config),
        ConfigAction::Set { certificate, private_key, root, clear_root } => {
            apply(&mut config, certificate, private_key, root, clear_root)?;
            config.save(config_path)?;
            println!("{} {}", "Saved".green(), config_path.display());
            show(config_path, &config);
        }
    }
    Ok(())
}

/// Apply `config set` flags. Paths are stored absolute and must exist.
pub fn apply(
    config: &mut Config,
    certificate: Option<PathBuf>,
    private_key: Option<PathBuf>,
    root: Option<PathBuf>,
    clear_root: bool,
) -> Result<()> {
    if let Some(path) = certificate {
        config.certificate_path = Some(absolute(&path)?);
    }
    if let Some(path) = private_key {
        config.private_key_path = Some(absolute(&path)?);
    }
    if let Some(path) = root {
        config.root_certificate_path = Some(absolute(&path)?);
    }
    if clear_root {
        config.root_certificate_path = None;
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Cannot use {}", path.display()))
}

fn show(config_path: &Path, config: &Config) {
    println!();
    println!("{}", "applepay Configuration".yellow().bold());
    println!("  File:          {}", config_path.display());
    print_path("Certificate", config.certificate_path.as_deref(), "not set");
    print_path("Private key", config.private_key_path.as_deref(), "not set");
    print_path("Root", config.root_certificate_path.as_deref(), "Apple Root CA - G3 (embedded)");
    println!();
}

pub fn print_path(label: &str, path: Option<&Path>, unset: &str) {
    let value = match path {
        Some(path) if path.exists() => path.display().to_string().normal(),
        Some(path) => format!("{} (missing)", path.display()).red(),
        None => unset.dimmed(),
    };
    println!("  {:<14} {}", format!("{label}:"), value);
}
