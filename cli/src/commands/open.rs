//! Open Command
//!
//! Verify and decrypt the output of `seal`.

use super::{read_input, write_output, Backend, CryptArgs};
use anyhow::{bail, Result};
use ferrule_gcm::{GcmError, TAG_SIZE};

// =============================================================================
// OPEN
// =============================================================================

/// Split `ciphertext || tag`, verify, and write the plaintext.
///
/// Nothing is written unless the tag verifies.
pub fn open_file(args: &CryptArgs, backend: Backend) -> Result<()> {
    let params = args.params(backend)?;
    let mut buffer = read_input(args.input.as_deref())?;

    if buffer.len() < TAG_SIZE {
        bail!("input is {} bytes, shorter than the {TAG_SIZE}-byte tag", buffer.len());
    }
    let split = buffer.len() - TAG_SIZE;
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&buffer[split..]);
    buffer.truncate(split);

    match params
        .gcm
        .decrypt_in_place(&params.nonce, &params.aad, &mut buffer, &tag)
    {
        Ok(()) => write_output(args.output.as_deref(), &buffer),
        Err(GcmError::AuthenticationFailed) => {
            bail!("authentication failed: wrong key, nonce or associated data, or the input was modified")
        }
        Err(e) => Err(e.into()),
    }
}
