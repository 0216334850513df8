//! Key pair provisioning: load from disk, or generate and persist.
//!
//! # Lifecycle
//!
//! 1. At startup, [`provision`] looks for both PEM files named in the config.
//! 2. If both exist they are read verbatim. Otherwise a fresh 2048-bit pair is
//!    generated and both files are (re)written verbatim for reuse across restarts.
//! 3. The pair is parsed into a [`KeyContext`], which also checks that the
//!    two halves belong together.
//!
//! # Security invariants
//!
//! - Private key material is **never** logged or included in traces.
//! - On Unix the private key file is created with mode `0600`.

pub mod context;

pub use context::{KeyContext, KeyPair};

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::cipher::generate_key_pair;

/// Load or generate the key pair named by `cfg` and parse it.
///
/// # Errors
///
/// Returns an error if the files cannot be read or written, if generation
/// fails, or if the stored PEMs do not form a valid pair.
pub fn provision(cfg: &Config) -> Result<KeyContext> {
    let pair = load_or_generate(
        Path::new(&cfg.public_key_path),
        Path::new(&cfg.private_key_path),
    )?;
    KeyContext::from_pair(&pair).context("stored key pair is invalid")
}

/// Read both PEM files if present; otherwise generate a pair and write both.
///
/// # Errors
///
/// Returns an error on any I/O or generation failure.
pub fn load_or_generate(public_path: &Path, private_path: &Path) -> Result<KeyPair> {
    let public_exists = public_path.exists();
    let private_exists = private_path.exists();

    if public_exists && private_exists {
        let public_pem = fs::read_to_string(public_path)
            .with_context(|| format!("failed to read public key {}", public_path.display()))?;
        let private_pem = Zeroizing::new(
            fs::read_to_string(private_path)
                .with_context(|| format!("failed to read private key {}", private_path.display()))?,
        );
        info!(
            public_key = %public_path.display(),
            private_key = %private_path.display(),
            "loaded key pair from disk"
        );
        return Ok(KeyPair::new(public_pem, private_pem));
    }

    if public_exists || private_exists {
        warn!(
            public_exists,
            private_exists, "only one half of the key pair found; generating a new pair"
        );
    }

    let pair = generate_key_pair().context("failed to generate RSA key pair")?;
    write_file(public_path, pair.public_pem(), false)
        .with_context(|| format!("failed to write public key {}", public_path.display()))?;
    write_file(private_path, pair.private_pem(), true)
        .with_context(|| format!("failed to write private key {}", private_path.display()))?;

    info!(
        public_key = %public_path.display(),
        private_key = %private_path.display(),
        "generated and persisted new key pair"
    );
    Ok(pair)
}

fn write_file(path: &Path, contents: &str, private: bool) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = opts.open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file before writing.
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
