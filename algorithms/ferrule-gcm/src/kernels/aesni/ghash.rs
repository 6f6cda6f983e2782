//! PCLMULQDQ GHASH
//!
//! Carry-less multiply on byte-reflected operands. The 256-bit product is
//! shifted left one bit to realign the reflected polynomial, then reduced
//! modulo `x^128 + x^7 + x^2 + x + 1` in two phases.

#![allow(clippy::similar_names)]

use super::state::bswap_mask;
use crate::kernels::constants::{BATCH_BLOCKS, BLOCK_SIZE, H_POWERS};
use crate::kernels::key_schedule::Block;
use crate::types::HPowers;

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_clmulepi64_si128, _mm_loadu_si128, _mm_or_si128, _mm_setzero_si128,
    _mm_shuffle_epi32, _mm_shuffle_epi8, _mm_slli_epi32, _mm_slli_si128, _mm_srli_epi32,
    _mm_srli_si128, _mm_storeu_si128, _mm_xor_si128,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_clmulepi64_si128, _mm_loadu_si128, _mm_or_si128, _mm_setzero_si128,
    _mm_shuffle_epi32, _mm_shuffle_epi8, _mm_slli_epi32, _mm_slli_si128, _mm_srli_epi32,
    _mm_srli_si128, _mm_storeu_si128, _mm_xor_si128,
};

// =============================================================================
// FIELD MULTIPLY
// =============================================================================

/// `a · b` in GF(2^128), both operands and the result byte-reflected.
// SAFETY: Requires SSE2/PCLMULQDQ (enforced by dispatcher). Register-only.
#[inline]
#[target_feature(enable = "sse2")]
#[target_feature(enable = "pclmulqdq")]
#[allow(unsafe_code)]
pub unsafe fn gfmul(a: __m128i, b: __m128i) -> __m128i {
    let lo = _mm_clmulepi64_si128(a, b, 0x00);
    let hi = _mm_clmulepi64_si128(a, b, 0x11);
    let mid = _mm_xor_si128(
        _mm_clmulepi64_si128(a, b, 0x10),
        _mm_clmulepi64_si128(a, b, 0x01),
    );

    let lo = _mm_xor_si128(lo, _mm_slli_si128(mid, 8));
    let hi = _mm_xor_si128(hi, _mm_srli_si128(mid, 8));
    reduce(lo, hi)
}

/// `h[0]·x[0] ^ h[1]·x[1] ^ h[2]·x[2] ^ h[3]·x[3]` with a single reduction.
///
/// Middle terms use Karatsuba: `(h.hi ^ h.lo)·(x.hi ^ x.lo) ^ lo ^ hi`,
/// summed across all four pairs before splitting.
// SAFETY: Requires SSE2/PCLMULQDQ (enforced by dispatcher). Register-only.
#[inline]
#[target_feature(enable = "sse2")]
#[target_feature(enable = "pclmulqdq")]
#[allow(unsafe_code)]
pub unsafe fn gfmul4(h: &[__m128i; BATCH_BLOCKS], x: &[__m128i; BATCH_BLOCKS]) -> __m128i {
    let mut lo = _mm_setzero_si128();
    let mut hi = _mm_setzero_si128();
    let mut mid = _mm_setzero_si128();

    for (&hk, &xk) in h.iter().zip(x.iter()) {
        lo = _mm_xor_si128(lo, _mm_clmulepi64_si128(hk, xk, 0x00));
        hi = _mm_xor_si128(hi, _mm_clmulepi64_si128(hk, xk, 0x11));

        // 78 = 0b01_00_11_10: swap the 64-bit halves
        let hs = _mm_xor_si128(_mm_shuffle_epi32(hk, 78), hk);
        let xs = _mm_xor_si128(_mm_shuffle_epi32(xk, 78), xk);
        mid = _mm_xor_si128(mid, _mm_clmulepi64_si128(hs, xs, 0x00));
    }

    mid = _mm_xor_si128(mid, _mm_xor_si128(lo, hi));
    let lo = _mm_xor_si128(lo, _mm_slli_si128(mid, 8));
    let hi = _mm_xor_si128(hi, _mm_srli_si128(mid, 8));
    reduce(lo, hi)
}

/// Shift the 256-bit product `hi:lo` left by one and reduce it.
// SAFETY: Requires SSE2 (enforced by dispatcher). Register-only.
#[inline]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
unsafe fn reduce(lo: __m128i, hi: __m128i) -> __m128i {
    // 1. Shift left by one across the full 256 bits
    let lo_carry = _mm_srli_epi32(lo, 31);
    let hi_carry = _mm_srli_epi32(hi, 31);
    let cross = _mm_srli_si128(lo_carry, 12);
    let lo = _mm_or_si128(_mm_slli_epi32(lo, 1), _mm_slli_si128(lo_carry, 4));
    let hi = _mm_or_si128(
        _mm_or_si128(_mm_slli_epi32(hi, 1), _mm_slli_si128(hi_carry, 4)),
        cross,
    );

    // 2. First phase: fold x^127, x^126, x^121 multiples
    let t = _mm_xor_si128(
        _mm_xor_si128(_mm_slli_epi32(lo, 31), _mm_slli_epi32(lo, 30)),
        _mm_slli_epi32(lo, 25),
    );
    let spill = _mm_srli_si128(t, 4);
    let lo = _mm_xor_si128(lo, _mm_slli_si128(t, 12));

    // 3. Second phase
    let mut r = _mm_xor_si128(_mm_srli_epi32(lo, 1), _mm_srli_epi32(lo, 2));
    r = _mm_xor_si128(r, _mm_srli_epi32(lo, 7));
    r = _mm_xor_si128(r, spill);

    _mm_xor_si128(hi, _mm_xor_si128(lo, r))
}

// =============================================================================
// GHASH
// =============================================================================

/// Absorb `data` into `acc`, zero-padding the final partial block.
///
/// Full 64-byte runs are aggregated with H⁴..H and one reduction.
// SAFETY: Requires SSE2/SSSE3/PCLMULQDQ (enforced by dispatcher).
// Every load reads 16 bytes from a slice of at least 16 bytes.
#[target_feature(enable = "sse2")]
#[target_feature(enable = "ssse3")]
#[target_feature(enable = "pclmulqdq")]
#[allow(unsafe_code)]
pub unsafe fn ghash(h_powers: &HPowers, data: &[u8], acc: &mut Block) {
    let bswap = bswap_mask();
    let mut h = [_mm_setzero_si128(); H_POWERS];
    for (r, p) in h.iter_mut().zip(h_powers.iter()) {
        *r = _mm_shuffle_epi8(_mm_loadu_si128(p.as_ptr().cast()), bswap);
    }
    let h_desc = [h[3], h[2], h[1], h[0]];
    let mut y = _mm_shuffle_epi8(_mm_loadu_si128(acc.as_ptr().cast()), bswap);

    let mut batches = data.chunks_exact(BATCH_BLOCKS * BLOCK_SIZE);
    for batch in &mut batches {
        let mut x = [_mm_setzero_si128(); BATCH_BLOCKS];
        for (xi, blk) in x.iter_mut().zip(batch.chunks_exact(BLOCK_SIZE)) {
            *xi = _mm_shuffle_epi8(_mm_loadu_si128(blk.as_ptr().cast()), bswap);
        }
        x[0] = _mm_xor_si128(x[0], y);
        y = gfmul4(&h_desc, &x);
    }

    let mut blocks = batches.remainder().chunks_exact(BLOCK_SIZE);
    for blk in &mut blocks {
        let x = _mm_shuffle_epi8(_mm_loadu_si128(blk.as_ptr().cast()), bswap);
        y = gfmul(_mm_xor_si128(y, x), h[0]);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = [0u8; BLOCK_SIZE];
        padded[..tail.len()].copy_from_slice(tail);
        let x = _mm_shuffle_epi8(_mm_loadu_si128(padded.as_ptr().cast()), bswap);
        y = gfmul(_mm_xor_si128(y, x), h[0]);
    }

    _mm_storeu_si128(acc.as_mut_ptr().cast(), _mm_shuffle_epi8(y, bswap));
}
