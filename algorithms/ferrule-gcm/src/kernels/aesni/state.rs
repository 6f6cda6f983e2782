//! AES-NI Schedule Management
//!
//! Loads the backend-neutral key material into 128-bit registers.
//! GHASH operands live byte-reflected (`BSWAP_MASK`) so that PCLMULQDQ
//! sees the polynomial with its lowest-degree term in the high bit.

#![allow(clippy::similar_names)]

use crate::kernels::constants::{H_POWERS, ROUND_KEYS};
use crate::kernels::key_schedule::RoundKeys;
use crate::types::HPowers;

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_set_epi32, _mm_set_epi8, _mm_setzero_si128,
    _mm_shuffle_epi8,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_set_epi32, _mm_set_epi8, _mm_setzero_si128,
    _mm_shuffle_epi8,
};

// =============================================================================
// SCHEDULE
// =============================================================================

/// Round keys and byte-reflected H powers, loaded once per call.
///
/// Lives on the caller's stack; the context itself never stores register
/// state, so concurrent calls never share anything mutable.
#[derive(Clone, Copy, Debug)]
#[repr(align(16))]
pub struct Schedule {
    pub(crate) rk: [__m128i; ROUND_KEYS],
    pub(crate) h: [__m128i; H_POWERS],
    pub(crate) bswap: __m128i,
}

impl Schedule {
    /// Load round keys and H powers from natural byte order.
    // SAFETY: Requires SSE2/SSSE3 (enforced by dispatcher). Reads exactly
    // 16 bytes from each fixed-size array.
    #[target_feature(enable = "sse2")]
    #[target_feature(enable = "ssse3")]
    #[allow(unsafe_code)]
    pub unsafe fn load(round_keys: &RoundKeys, h_powers: &HPowers) -> Self {
        let bswap = bswap_mask();
        let mut rk = [_mm_setzero_si128(); ROUND_KEYS];
        for (r, k) in rk.iter_mut().zip(round_keys.iter()) {
            *r = _mm_loadu_si128(k.as_ptr().cast());
        }
        let mut h = [_mm_setzero_si128(); H_POWERS];
        for (r, p) in h.iter_mut().zip(h_powers.iter()) {
            *r = _mm_shuffle_epi8(_mm_loadu_si128(p.as_ptr().cast()), bswap);
        }
        Self { rk, h, bswap }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Full 16-byte reversal.
#[inline]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn bswap_mask() -> __m128i {
    _mm_set_epi8(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15)
}

/// GCM `inc32` on a natural-order counter block: reverse, add 1 to the low
/// 32-bit lane (wraps within the lane), reverse back.
#[inline]
#[target_feature(enable = "sse2")]
#[target_feature(enable = "ssse3")]
#[allow(unsafe_code)]
pub unsafe fn cbincr(cb: __m128i, bswap: __m128i) -> __m128i {
    let a = _mm_shuffle_epi8(cb, bswap);
    let a = _mm_add_epi32(a, _mm_set_epi32(0, 0, 0, 1));
    _mm_shuffle_epi8(a, bswap)
}
