//! AES-128-GCM Context
//!
//! Key setup, encryption and decryption. A context holds only immutable key
//! material; counters and GHASH accumulators live on the caller's stack, so
//! one context can serve any number of threads at once.

use crate::engine::dispatcher;
use crate::kernels;
use crate::kernels::constants::{KEY_SIZE, MAX_MESSAGE_LEN, NONCE_SIZE, TAG_SIZE};
use crate::kernels::key_schedule::{self, Block, RoundKeys};
use crate::types::{Backend, BackendKind, Direction, GcmError, HPowers};
use core::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

// =============================================================================
// KEY MATERIAL
// =============================================================================

/// Expanded key and GHASH subkey powers. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(C, align(16))]
struct KeyMaterial {
    round_keys: RoundKeys,
    h_powers: HPowers,
}

static_assertions::const_assert_eq!(core::mem::align_of::<KeyMaterial>(), 16);

// =============================================================================
// CONTEXT
// =============================================================================

/// AES-128-GCM cipher bound to one key and one backend.
///
/// # Example
/// ```rust
/// use ferrule_gcm::AesGcm;
///
/// let gcm = AesGcm::new(&[0x42; 16])?;
/// let nonce = [7u8; 12];
///
/// let mut ciphertext = [0u8; 5];
/// let mut tag = [0u8; 16];
/// gcm.encrypt(b"hello", &nonce, &mut tag, &mut ciphertext)?;
///
/// let mut plaintext = [0u8; 5];
/// gcm.decrypt(&ciphertext, &nonce, &tag, &mut plaintext)?;
/// assert_eq!(&plaintext, b"hello");
/// # Ok::<(), ferrule_gcm::GcmError>(())
/// ```
#[derive(Clone)]
pub struct AesGcm {
    keys: Box<KeyMaterial>,
    backend: &'static Backend,
}

static_assertions::assert_impl_all!(AesGcm: Send, Sync);

impl fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcm")
            .field("backend", &self.backend.name)
            .finish_non_exhaustive()
    }
}

impl AesGcm {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Create a context on the fastest backend for this CPU.
    ///
    /// # Errors
    /// `GcmError::InvalidKeyLength` unless `key` is exactly 16 bytes.
    pub fn new(key: &[u8]) -> Result<Self, GcmError> {
        Self::with_backend(key, BackendKind::Auto)
    }

    /// Create a context on a specific backend.
    ///
    /// # Errors
    /// `GcmError::InvalidKeyLength` unless `key` is exactly 16 bytes, and
    /// `GcmError::Unsupported` when the backend cannot run on this CPU.
    pub fn with_backend(key: &[u8], kind: BackendKind) -> Result<Self, GcmError> {
        let key: &[u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| GcmError::InvalidKeyLength { len: key.len() })?;
        let backend = dispatcher::backend_for(kind)?;
        Ok(Self::from_key(key, backend))
    }

    fn from_key(key: &[u8; KEY_SIZE], backend: &'static Backend) -> Self {
        let round_keys = key_schedule::expand(key);

        // H = E_K(0^128)
        let mut h = [0u8; TAG_SIZE];
        (backend.encrypt_block)(&round_keys, &mut h);
        let h_powers = kernels::h_powers(&h);
        h.zeroize();

        log::debug!("ferrule-gcm: context created on {} backend", backend.name);
        Self {
            keys: Box::new(KeyMaterial {
                round_keys,
                h_powers,
            }),
            backend,
        }
    }

    /// Name of the backend this context runs on.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        self.backend.name
    }

    // =========================================================================
    // DETACHED API
    // =========================================================================

    /// Encrypt `plaintext` into `ciphertext` and write the tag.
    ///
    /// Only the first 12 bytes of `nonce` are used. Never reuse a nonce
    /// under the same key.
    ///
    /// # Errors
    /// - `InvalidNonceLength` if `nonce` is shorter than 12 bytes
    /// - `BufferLength` if `ciphertext.len() != plaintext.len()`
    /// - `MessageTooLong` past `2^32 - 2` blocks
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
        tag: &mut [u8; TAG_SIZE],
        ciphertext: &mut [u8],
    ) -> Result<(), GcmError> {
        let j0 = Self::prepare(nonce, plaintext.len(), ciphertext.len())?;
        ciphertext.copy_from_slice(plaintext);
        *tag = self.seal(&j0, &[], ciphertext);
        Ok(())
    }

    /// Decrypt `ciphertext` into `plaintext` and verify the tag.
    ///
    /// **`plaintext` is written even when authentication fails.** On
    /// `Err(AuthenticationFailed)` its contents are unauthenticated and must
    /// be discarded. Use [`AesGcm::decrypt_in_place`] to keep the buffer
    /// untouched on failure.
    ///
    /// # Errors
    /// - `AuthenticationFailed` if the tag does not match
    /// - `InvalidNonceLength`, `BufferLength`, `MessageTooLong` as for
    ///   [`AesGcm::encrypt`]
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8; TAG_SIZE],
        plaintext: &mut [u8],
    ) -> Result<(), GcmError> {
        let j0 = Self::prepare(nonce, ciphertext.len(), plaintext.len())?;
        plaintext.copy_from_slice(ciphertext);

        let mut acc = [0u8; TAG_SIZE];
        (self.backend.gctr)(
            &self.keys.round_keys,
            &self.keys.h_powers,
            &j0,
            plaintext,
            &mut acc,
            Direction::Decrypt,
        );
        let expected = self.finish_tag(&j0, 0, ciphertext.len(), acc);
        Self::verify(&expected, tag)
    }

    // =========================================================================
    // IN-PLACE API WITH ASSOCIATED DATA
    // =========================================================================

    /// Encrypt `buffer` in place, authenticating `aad` alongside it.
    ///
    /// With empty `aad` this produces the same ciphertext and tag as
    /// [`AesGcm::encrypt`].
    ///
    /// # Errors
    /// `InvalidNonceLength` or `MessageTooLong`.
    pub fn encrypt_in_place(
        &self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> Result<[u8; TAG_SIZE], GcmError> {
        let j0 = Self::prepare(nonce, buffer.len(), buffer.len())?;
        Ok(self.seal(&j0, aad, buffer))
    }

    /// Verify `tag` over `aad` and `buffer`, then decrypt `buffer` in place.
    ///
    /// The tag is checked before any byte is decrypted, so `buffer` is left
    /// exactly as passed in when authentication fails.
    ///
    /// # Errors
    /// `AuthenticationFailed`, `InvalidNonceLength` or `MessageTooLong`.
    pub fn decrypt_in_place(
        &self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_SIZE],
    ) -> Result<(), GcmError> {
        let j0 = Self::prepare(nonce, buffer.len(), buffer.len())?;

        let mut acc = [0u8; TAG_SIZE];
        (self.backend.ghash)(&self.keys.h_powers, aad, &mut acc);
        (self.backend.ghash)(&self.keys.h_powers, buffer, &mut acc);
        let expected = self.finish_tag(&j0, aad.len(), buffer.len(), acc);
        Self::verify(&expected, tag)?;

        let mut scratch = [0u8; TAG_SIZE];
        (self.backend.gctr)(
            &self.keys.round_keys,
            &self.keys.h_powers,
            &j0,
            buffer,
            &mut scratch,
            Direction::Decrypt,
        );
        scratch.zeroize();
        Ok(())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Validate lengths and build `J0 = nonce[..12] || 0x00000001`.
    fn prepare(nonce: &[u8], input: usize, output: usize) -> Result<Block, GcmError> {
        let Some(nonce) = nonce.first_chunk::<NONCE_SIZE>() else {
            return Err(GcmError::InvalidNonceLength { len: nonce.len() });
        };
        if input != output {
            return Err(GcmError::BufferLength { input, output });
        }
        if input as u64 > MAX_MESSAGE_LEN {
            return Err(GcmError::MessageTooLong { len: input });
        }
        Ok(key_schedule::initial_counter(nonce))
    }

    /// GHASH the AAD, encrypt `data` in place, return the tag.
    fn seal(&self, j0: &Block, aad: &[u8], data: &mut [u8]) -> [u8; TAG_SIZE] {
        let mut acc = [0u8; TAG_SIZE];
        (self.backend.ghash)(&self.keys.h_powers, aad, &mut acc);
        (self.backend.gctr)(
            &self.keys.round_keys,
            &self.keys.h_powers,
            j0,
            data,
            &mut acc,
            Direction::Encrypt,
        );
        self.finish_tag(j0, aad.len(), data.len(), acc)
    }

    /// Absorb the length block and mask with `E_K(J0)`.
    fn finish_tag(&self, j0: &Block, aad_len: usize, text_len: usize, mut acc: Block) -> Block {
        let len = key_schedule::length_block(aad_len, text_len);
        (self.backend.ghash)(&self.keys.h_powers, &len, &mut acc);

        let mut tag = *j0;
        (self.backend.encrypt_block)(&self.keys.round_keys, &mut tag);
        for (t, a) in tag.iter_mut().zip(acc.iter()) {
            *t ^= a;
        }
        acc.zeroize();
        tag
    }

    fn verify(expected: &Block, tag: &[u8; TAG_SIZE]) -> Result<(), GcmError> {
        if bool::from(expected.as_slice().ct_eq(tag.as_slice())) {
            Ok(())
        } else {
            log::debug!("ferrule-gcm: tag mismatch");
            Err(GcmError::AuthenticationFailed)
        }
    }
}

// =============================================================================
// RUSTCRYPTO TRAITS
// =============================================================================

#[cfg(feature = "aead-trait")]
mod aead_impl {
    use super::AesGcm;
    use crate::kernels::constants::{KEY_SIZE, TAG_SIZE};
    use aead::consts::{U0, U12, U16};
    use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag};

    impl KeySizeUser for AesGcm {
        type KeySize = U16;
    }

    impl KeyInit for AesGcm {
        fn new(key: &Key<Self>) -> Self {
            let mut k = [0u8; KEY_SIZE];
            k.copy_from_slice(key.as_slice());
            let gcm = Self::from_key(&k, crate::engine::best_backend());
            zeroize::Zeroize::zeroize(&mut k);
            gcm
        }
    }

    impl AeadCore for AesGcm {
        type NonceSize = U12;
        type TagSize = U16;
        type CiphertextOverhead = U0;
    }

    impl AeadInPlace for AesGcm {
        fn encrypt_in_place_detached(
            &self,
            nonce: &Nonce<Self>,
            associated_data: &[u8],
            buffer: &mut [u8],
        ) -> aead::Result<Tag<Self>> {
            let tag = Self::encrypt_in_place(self, nonce.as_slice(), associated_data, buffer)
                .map_err(|_| aead::Error)?;
            Ok(Tag::<Self>::clone_from_slice(&tag))
        }

        fn decrypt_in_place_detached(
            &self,
            nonce: &Nonce<Self>,
            associated_data: &[u8],
            buffer: &mut [u8],
            tag: &Tag<Self>,
        ) -> aead::Result<()> {
            let mut t = [0u8; TAG_SIZE];
            t.copy_from_slice(tag.as_slice());
            Self::decrypt_in_place(self, nonce.as_slice(), associated_data, buffer, &t)
                .map_err(|_| aead::Error)
        }
    }
}
