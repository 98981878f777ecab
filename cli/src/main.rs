//! applepay CLI - verify and decrypt Apple Pay payment tokens

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod logging;


use commands::*;

#[derive(Parser)]
#[command(name = "applepay")]
#[command(version = "0.1.0")]
#[command(about = "Verify and decrypt Apple Pay EC_v1 payment tokens")]
#[command(long_about = r#"
Verifies the signature of an Apple Pay payment token against Apple Root
CA - G3 and decrypts its payment data with your merchant payment
processing certificate and private key.

Quick Start:
  1. applepay config set --certificate apple_pay.pem --private-key key.pem
  2. applepay verify token.json       Check signature and chain of trust
  3. applepay decrypt token.json      Print the decrypted payment data
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.applepay/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify and decrypt a payment token
    Decrypt {
        /// Token JSON file, or - for stdin
        token: PathBuf,

        /// Merchant payment processing certificate (PEM or DER)
        #[arg(short, long)]
        certificate: Option<PathBuf>,

        /// Merchant private key (PEM or DER)
        #[arg(short = 'k', long)]
        private_key: Option<PathBuf>,

        /// Trust this root instead of Apple Root CA - G3
        #[arg(long)]
        root: Option<PathBuf>,

        /// Check certificate validity at this Unix time instead of now
        #[arg(long)]
        at: Option<u64>,

        /// Pretty-print the payment data
        #[arg(short, long)]
        pretty: bool,
    },

    /// Verify a token's signature and chain of trust without decrypting
    Verify {
        /// Token JSON file, or - for stdin
        token: PathBuf,

        /// Trust this root instead of Apple Root CA - G3
        #[arg(long)]
        root: Option<PathBuf>,

        /// Merchant certificate to compare against the token's publicKeyHash
        #[arg(short, long)]
        certificate: Option<PathBuf>,

        /// Check certificate validity at this Unix time instead of now
        #[arg(long)]
        at: Option<u64>,
    },

    /// Show the merchant identifier embedded in a merchant certificate
    MerchantId {
        /// Merchant payment processing certificate (PEM or DER)
        #[arg(short, long)]
        certificate: Option<PathBuf>,
    },

    /// Show or change default credential paths
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Show the trusted root and configured credentials
    Info,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,

    /// Set default credential paths
    Set {
        #[arg(short, long)]
        certificate: Option<PathBuf>,

        #[arg(short = 'k', long)]
        private_key: Option<PathBuf>,

        #[arg(long)]
        root: Option<PathBuf>,

        /// Go back to trusting Apple Root CA - G3
        #[arg(long, conflicts_with = "root")]
        clear_root: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let cfg = config::Config::load(&config_path)?;

    match cli.command {
        Commands::Decrypt { token, certificate, private_key, root, at, pretty } => {
            decrypt::run(&cfg, decrypt::DecryptOptions {
                token,
                certificate,
                private_key,
                root,
                at,
                pretty,
            })?;
        }
        Commands::Verify { token, root, certificate, at } => {
            verify::run(&cfg, verify::VerifyOptions {
                token,
                root,
                certificate,
                at,
            })?;
        }
        Commands::MerchantId { certificate } => {
            merchant_id::run(&cfg, certificate.as_deref())?;
        }
        Commands::Config { action } => {
            config_cmd::run(&config_path, cfg, action.unwrap_or(ConfigAction::Show))?;
        }
        Commands::Info => {
            info::run(&config_path, &cfg)?;
        }
    }

    Ok(())
}
