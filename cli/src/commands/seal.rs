//! Seal Command
//!
//! Encrypt a file and append its authentication tag.

use super::{read_input, write_output, Backend, CryptArgs};
use anyhow::{Context, Result};

// =============================================================================
// SEAL
// =============================================================================

/// Encrypt `args.input` and write `ciphertext || tag`.
pub fn seal_file(args: &CryptArgs, backend: Backend) -> Result<()> {
    let params = args.params(backend)?;
    let mut buffer = read_input(args.input.as_deref())?;

    let tag = params
        .gcm
        .encrypt_in_place(&params.nonce, &params.aad, &mut buffer)
        .context("Encryption failed")?;
    log::debug!("sealed {} bytes", buffer.len());

    buffer.extend_from_slice(&tag);
    write_output(args.output.as_deref(), &buffer)
}
