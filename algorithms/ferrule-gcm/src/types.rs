//! Shared types used across the ferrule-gcm library.

use core::ffi::CStr;
use core::fmt;
#[cfg(feature = "std")]
use std::error;

use crate::kernels::constants::{H_POWERS, KEY_SIZE, NONCE_SIZE};
pub use crate::kernels::key_schedule::{Block, RoundKeys};

// =============================================================================
// KERNEL INTERFACE
// =============================================================================

/// GHASH subkey powers `[H, H², H³, H⁴]` in natural byte order.
pub type HPowers = [Block; H_POWERS];

/// Encrypt one block in place: `(round_keys, block)`.
pub type BlockFn = fn(&RoundKeys, &mut Block);

/// Absorb zero-padded blocks into a GHASH accumulator: `(h_powers, data, acc)`.
pub type GhashFn = fn(&HPowers, &[u8], &mut Block);

/// Counter-mode transform with streaming GHASH:
/// `(round_keys, h_powers, initial_counter, data, acc, direction)`.
///
/// Keystream starts at `inc32(initial_counter)`. `data` is transformed in
/// place and the ciphertext side of every block is folded into `acc`.
pub type GctrFn = fn(&RoundKeys, &HPowers, &Block, &mut [u8], &mut Block, Direction);

/// Function table implemented by every backend.
///
/// All backends (AES-NI, portable) implement the same signatures so the
/// dispatcher can swap them at runtime. The GHASH accumulator crosses this
/// boundary in natural byte order, never in a backend's register layout.
#[derive(Debug)]
pub struct Backend {
    /// Human-readable backend name.
    pub name: &'static str,
    /// Same name, NUL-terminated for the C API.
    pub c_name: &'static CStr,
    /// Single-block AES-128 encryption.
    pub encrypt_block: BlockFn,
    /// GHASH absorption for associated data and the length block.
    pub ghash: GhashFn,
    /// Combined CTR encryption and GHASH accumulation.
    pub gctr: GctrFn,
}

/// Which buffer of a GCTR pass is the ciphertext, and so gets hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input is plaintext: hash the output blocks.
    Encrypt,
    /// Input is ciphertext: hash the input blocks.
    Decrypt,
}

/// Backend selection policy for a new context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Fastest backend supported by this CPU.
    #[default]
    Auto,
    /// Pure Rust, no SIMD.
    Portable,
    /// AES-NI + PCLMULQDQ (x86/x86_64 only).
    AesNi,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error for unsupported CPU features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatureError {
    missing: &'static str,
}

impl CpuFeatureError {
    /// Create a new `CpuFeatureError` describing the missing CPU feature.
    pub const fn new(missing: &'static str) -> Self {
        Self { missing }
    }

    /// The feature (or feature set) that was not detected.
    pub const fn missing(&self) -> &'static str {
        self.missing
    }
}

impl fmt::Display for CpuFeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU feature '{}' required. The AES-NI backend needs AES, SSE2, SSSE3 \
             and PCLMULQDQ (Intel Westmere+, AMD Bulldozer+)",
            self.missing
        )
    }
}

#[cfg(feature = "std")]
impl error::Error for CpuFeatureError {}

/// Errors returned by [`crate::AesGcm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcmError {
    /// Key is not exactly 16 bytes. AES-192 and AES-256 are not supported.
    InvalidKeyLength {
        /// Length that was supplied.
        len: usize,
    },
    /// Nonce is shorter than 12 bytes.
    InvalidNonceLength {
        /// Length that was supplied.
        len: usize,
    },
    /// Output buffer length differs from the input length.
    BufferLength {
        /// Input length.
        input: usize,
        /// Output length.
        output: usize,
    },
    /// Message exceeds `2^32 - 2` blocks under a single nonce.
    MessageTooLong {
        /// Length that was supplied.
        len: usize,
    },
    /// Tag mismatch: ciphertext, associated data or tag were altered.
    AuthenticationFailed,
    /// Requested backend is not available on this CPU.
    Unsupported(CpuFeatureError),
}

impl fmt::Display for GcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength { len } => write!(
                f,
                "invalid key length {len}, expected {KEY_SIZE} bytes (AES-128 only)"
            ),
            Self::InvalidNonceLength { len } => write!(
                f,
                "invalid nonce length {len}, expected at least {NONCE_SIZE} bytes"
            ),
            Self::BufferLength { input, output } => write!(
                f,
                "output buffer is {output} bytes but input is {input} bytes"
            ),
            Self::MessageTooLong { len } => {
                write!(f, "message of {len} bytes exceeds the GCM limit per nonce")
            }
            Self::AuthenticationFailed => f.write_str("authentication failed"),
            Self::Unsupported(e) => write!(f, "backend unavailable: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for GcmError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Unsupported(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CpuFeatureError> for GcmError {
    fn from(e: CpuFeatureError) -> Self {
        Self::Unsupported(e)
    }
}
