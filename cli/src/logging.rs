//! Log output for the CLI
//!
//! Events go to stderr so decrypted payment data on stdout can be piped.
//! `RUST_LOG` takes precedence; otherwise `--verbose` selects `debug`.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
