//! CLI Commands
//!
//! All ferrule CLI commands organized as separate modules, plus the
//! argument parsing and I/O they share.

mod check;
mod info;
mod open;
mod seal;

pub use check::check_mode;
pub use info::show_info;
pub use open::open_file;
pub use seal::seal_file;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use ferrule_gcm::{AesGcm, BackendKind};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// SHARED ARGUMENTS
// =============================================================================

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Backend {
    /// Fastest backend this CPU supports
    Auto,
    /// Pure Rust, no SIMD
    Portable,
    /// AES-NI + PCLMULQDQ
    Aesni,
}

impl From<Backend> for BackendKind {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Auto => Self::Auto,
            Backend::Portable => Self::Portable,
            Backend::Aesni => Self::AesNi,
        }
    }
}

#[derive(Args, Debug)]
pub struct CryptArgs {
    /// 128-bit key as 32 hex digits
    #[arg(short, long)]
    key: String,

    /// 96-bit nonce as 24 hex digits. Never reuse one under the same key.
    #[arg(short, long)]
    nonce: String,

    /// Associated data as hex (authenticated, not encrypted)
    #[arg(short, long, default_value = "")]
    aad: String,

    /// Input file (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Decoded key, nonce and associated data.
struct Params {
    gcm: AesGcm,
    nonce: Vec<u8>,
    aad: Vec<u8>,
}

impl CryptArgs {
    fn params(&self, backend: Backend) -> Result<Params> {
        let key = decode_hex("key", &self.key)?;
        let nonce = decode_hex("nonce", &self.nonce)?;
        let aad = decode_hex("aad", &self.aad)?;

        if nonce.len() != ferrule_gcm::NONCE_SIZE {
            bail!(
                "nonce must be {} bytes, got {}",
                ferrule_gcm::NONCE_SIZE,
                nonce.len()
            );
        }
        let gcm = AesGcm::with_backend(&key, backend.into()).context("Failed to set up cipher")?;
        log::debug!("using {} backend", gcm.backend_name());

        Ok(Params { gcm, nonce, aad })
    }
}

// =============================================================================
// I/O HELPERS
// =============================================================================

pub(crate) fn decode_hex(label: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim()).with_context(|| format!("Invalid hex in {label}"))
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    match path {
        Some(p) => {
            data = std::fs::read(p).with_context(|| format!("Failed to read: {}", p.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_end(&mut data)
                .context("Failed to read stdin")?;
        }
    }
    Ok(data)
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, data).with_context(|| format!("Failed to write: {}", p.display()))
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(data)?;
            out.flush().context("Failed to write stdout")
        }
    }
}
