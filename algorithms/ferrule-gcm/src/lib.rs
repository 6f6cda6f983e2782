#![cfg_attr(not(feature = "std"), no_std)]

//! # ferrule-gcm
//!
//! AES-128-GCM authenticated encryption.
//! Accelerated by AES-NI + PCLMULQDQ, with a portable fallback that
//! produces byte-identical output.

//! # Usage
//! ```rust
//! use ferrule_gcm::{AesGcm, GcmError};
//!
//! let gcm = AesGcm::new(&[0u8; 16])?;
//! let nonce = [0u8; 12];
//!
//! // 1. Detached encrypt/decrypt
//! let mut ciphertext = [0u8; 16];
//! let mut tag = [0u8; 16];
//! gcm.encrypt(&[0u8; 16], &nonce, &mut tag, &mut ciphertext)?;
//! assert_eq!(tag[0], 0xab);
//!
//! // 2. In place, with associated data
//! let mut buffer = *b"Performance Matters";
//! let tag = gcm.encrypt_in_place(&nonce, b"header", &mut buffer)?;
//! gcm.decrypt_in_place(&nonce, b"header", &mut buffer, &tag)?;
//! assert_eq!(&buffer, b"Performance Matters");
//!
//! // 3. Tampering is detected
//! let bad = [0u8; 16];
//! assert_eq!(
//!     gcm.decrypt_in_place(&nonce, b"header", &mut buffer, &bad),
//!     Err(GcmError::AuthenticationFailed)
//! );
//! # Ok::<(), GcmError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

#[cfg(not(feature = "std"))]
extern crate alloc;

mod context;
mod engine;
#[cfg(feature = "std")]
pub mod ffi;
// Re-export internal kernels for benchmarking/testing, but hide from docs
#[doc(hidden)]
pub mod kernels; // Public for test/bench use only
pub(crate) mod types;

// =============================================================================
// EXPORTS
// =============================================================================

#[cfg(feature = "aead-trait")]
pub use aead;
pub use context::AesGcm;
pub use kernels::constants::{KEY_SIZE, MAX_MESSAGE_LEN, NONCE_SIZE, TAG_SIZE};
pub use types::{BackendKind, CpuFeatureError, GcmError};

#[doc(hidden)]
pub use types::{Backend, Direction, HPowers};

/// Returns the name of the hardware backend currently in use.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::get_active_backend_name()
}

/// Resolve a backend selection to its kernel table.
///
/// Exposed for cross-backend testing and benchmarks.
///
/// # Errors
/// `CpuFeatureError` if the backend cannot run on this CPU.
#[doc(hidden)]
pub fn backend_table(kind: BackendKind) -> Result<&'static Backend, CpuFeatureError> {
    engine::backend_for(kind)
}
