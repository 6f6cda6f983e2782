//! Hardware Dispatcher
//!
//! Selects the fastest available backend (AES-NI or portable) for the
//! current CPU and hands out its function table.

use crate::kernels;
use crate::kernels::key_schedule::{Block, RoundKeys};
use crate::types::{Backend, BackendKind, CpuFeatureError, Direction, HPowers};

// =============================================================================
// BACKEND TABLES
// =============================================================================

/// Pure Rust backend, available everywhere.
pub static PORTABLE: Backend = Backend {
    name: "Portable",
    c_name: c"Portable",
    encrypt_block: kernels::portable::encrypt_block,
    ghash: kernels::portable::ghash,
    gctr: kernels::portable::gctr,
};

/// AES-NI + PCLMULQDQ backend. Only handed out after feature detection.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub static AESNI: Backend = Backend {
    name: "AES-NI",
    c_name: c"AES-NI",
    encrypt_block: safe_aesni_encrypt_block,
    ghash: safe_aesni_ghash,
    gctr: safe_aesni_gctr,
};

// =============================================================================
// DISPATCHER
// =============================================================================

/// Returns the fastest backend for this CPU.
///
/// With `std` the CPUID probe runs once and the result is cached for the
/// life of the process.
#[must_use]
pub fn best_backend() -> &'static Backend {
    cfg_if::cfg_if! {
        if #[cfg(feature = "std")] {
            static BEST: std::sync::OnceLock<&'static Backend> = std::sync::OnceLock::new();
            *BEST.get_or_init(|| {
                let backend = detect();
                log::debug!("ferrule-gcm: selected {} backend", backend.name);
                backend
            })
        } else {
            detect()
        }
    }
}

fn detect() -> &'static Backend {
    if aesni_supported() {
        aesni_table()
    } else {
        &PORTABLE
    }
}

/// Resolve a selection policy to a backend.
///
/// # Errors
/// `CpuFeatureError` when `AesNi` is requested on a CPU (or target) without
/// AES, SSE2, SSSE3 and PCLMULQDQ.
pub fn backend_for(kind: BackendKind) -> Result<&'static Backend, CpuFeatureError> {
    match kind {
        BackendKind::Auto => Ok(best_backend()),
        BackendKind::Portable => Ok(&PORTABLE),
        BackendKind::AesNi => {
            if aesni_supported() {
                Ok(aesni_table())
            } else {
                log::debug!("ferrule-gcm: AES-NI backend requested but unavailable");
                Err(CpuFeatureError::new("aes+ssse3+pclmulqdq"))
            }
        }
    }
}

/// Returns the name of the active hardware backend.
#[must_use]
pub fn get_active_backend_name() -> &'static str {
    best_backend().name
}

/// Whether the AES-NI backend may run on this CPU.
#[must_use]
pub fn aesni_supported() -> bool {
    cfg_if::cfg_if! {
        if #[cfg(all(feature = "std", any(target_arch = "x86", target_arch = "x86_64")))] {
            is_x86_feature_detected!("aes")
                && is_x86_feature_detected!("sse2")
                && is_x86_feature_detected!("ssse3")
                && is_x86_feature_detected!("pclmulqdq")
        } else if #[cfg(all(
            any(target_arch = "x86", target_arch = "x86_64"),
            target_feature = "aes",
            target_feature = "sse2",
            target_feature = "ssse3",
            target_feature = "pclmulqdq"
        ))] {
            true
        } else {
            false
        }
    }
}

// Only called after `aesni_supported()` returned true.
#[inline]
fn aesni_table() -> &'static Backend {
    cfg_if::cfg_if! {
        if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
            &AESNI
        } else {
            &PORTABLE
        }
    }
}

// =============================================================================
// WRAPPERS
// =============================================================================

/// AES-NI single block.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
#[allow(unsafe_code)]
fn safe_aesni_encrypt_block(round_keys: &RoundKeys, block: &mut Block) {
    // SAFETY: `AESNI` is only reachable through `aesni_table()`, which callers
    // reach after CPUID validation (AES/SSE2/SSSE3/PCLMULQDQ).
    unsafe { kernels::aesni::encrypt_block(round_keys, block) }
}

/// AES-NI GHASH.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
#[allow(unsafe_code)]
fn safe_aesni_ghash(h_powers: &HPowers, data: &[u8], acc: &mut Block) {
    // SAFETY: Only reachable after CPUID validation (AES/SSE2/SSSE3/PCLMULQDQ).
    unsafe { kernels::aesni::ghash(h_powers, data, acc) }
}

/// AES-NI counter mode with streaming GHASH.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
#[allow(unsafe_code)]
fn safe_aesni_gctr(
    round_keys: &RoundKeys,
    h_powers: &HPowers,
    icb: &Block,
    data: &mut [u8],
    acc: &mut Block,
    direction: Direction,
) {
    // SAFETY: Only reachable after CPUID validation (AES/SSE2/SSSE3/PCLMULQDQ).
    // Slice bounds are handled inside the kernel.
    unsafe { kernels::aesni::gctr(round_keys, h_powers, icb, data, acc, direction) }
}
