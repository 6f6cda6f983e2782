//! AES-NI Counter Mode
//!
//! AES-128 block encryption and the combined CTR/GHASH pass. Four counter
//! blocks are encrypted back to back so the `aesenc` pipeline stays full,
//! then their ciphertexts are folded into GHASH with one reduction.

#![allow(clippy::similar_names)]

use super::ghash::{gfmul, gfmul4};
use super::state::{cbincr, Schedule};
use crate::kernels::constants::{BATCH_BLOCKS, BLOCK_SIZE, ROUNDS};
use crate::kernels::key_schedule::{Block, RoundKeys};
use crate::types::{Direction, HPowers};
use zeroize::Zeroize;

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_aesenc_si128, _mm_aesenclast_si128, _mm_loadu_si128, _mm_setzero_si128,
    _mm_shuffle_epi8, _mm_storeu_si128, _mm_xor_si128,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_aesenclast_si128, _mm_loadu_si128, _mm_setzero_si128,
    _mm_shuffle_epi8, _mm_storeu_si128, _mm_xor_si128,
};

// =============================================================================
// BLOCK CIPHER
// =============================================================================

// SAFETY: Requires AES/SSE2 (enforced by dispatcher). Register-only.
#[inline]
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
unsafe fn aes128(rk: &[__m128i], block: __m128i) -> __m128i {
    let mut m = _mm_xor_si128(block, rk[0]);
    for k in &rk[1..ROUNDS] {
        m = _mm_aesenc_si128(m, *k);
    }
    _mm_aesenclast_si128(m, rk[ROUNDS])
}

/// AES-128 encrypt one block in place.
// SAFETY: Requires AES/SSE2 (enforced by dispatcher). Fixed 16-byte loads.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn encrypt_block(round_keys: &RoundKeys, block: &mut Block) {
    let mut rk = [_mm_setzero_si128(); ROUNDS + 1];
    for (r, k) in rk.iter_mut().zip(round_keys.iter()) {
        *r = _mm_loadu_si128(k.as_ptr().cast());
    }
    let out = aes128(&rk, _mm_loadu_si128(block.as_ptr().cast()));
    _mm_storeu_si128(block.as_mut_ptr().cast(), out);
}

// =============================================================================
// GCTR
// =============================================================================

/// Counter-mode transform of `data` in place with streaming GHASH.
///
/// Keystream starts at `inc32(icb)`. The ciphertext side of each block
/// (output on encrypt, input on decrypt) is absorbed into `acc`.
// SAFETY: Requires AES/SSE2/SSSE3/PCLMULQDQ (enforced by dispatcher).
// Loads and stores stay inside 16-byte chunks of `data` or local buffers.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[target_feature(enable = "ssse3")]
#[target_feature(enable = "pclmulqdq")]
#[allow(unsafe_code)]
#[allow(clippy::too_many_lines)]
pub unsafe fn gctr(
    round_keys: &RoundKeys,
    h_powers: &HPowers,
    icb: &Block,
    data: &mut [u8],
    acc: &mut Block,
    direction: Direction,
) {
    let s = Schedule::load(round_keys, h_powers);
    let h_desc = [s.h[3], s.h[2], s.h[1], s.h[0]];
    let hash_input = direction == Direction::Decrypt;

    let mut y = _mm_shuffle_epi8(_mm_loadu_si128(acc.as_ptr().cast()), s.bswap);
    let mut cb = cbincr(_mm_loadu_si128(icb.as_ptr().cast()), s.bswap);

    // 1. Four blocks at a time
    let mut batches = data.chunks_exact_mut(BATCH_BLOCKS * BLOCK_SIZE);
    for batch in &mut batches {
        let mut ks = [_mm_setzero_si128(); BATCH_BLOCKS];
        for k in &mut ks {
            *k = aes128(&s.rk, cb);
            cb = cbincr(cb, s.bswap);
        }

        let mut x = [_mm_setzero_si128(); BATCH_BLOCKS];
        for (i, blk) in batch.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            let input = _mm_loadu_si128(blk.as_ptr().cast());
            let output = _mm_xor_si128(input, ks[i]);
            _mm_storeu_si128(blk.as_mut_ptr().cast(), output);
            x[i] = _mm_shuffle_epi8(if hash_input { input } else { output }, s.bswap);
        }

        x[0] = _mm_xor_si128(x[0], y);
        y = gfmul4(&h_desc, &x);
    }

    // 2. One block at a time
    let mut blocks = batches.into_remainder().chunks_exact_mut(BLOCK_SIZE);
    for blk in &mut blocks {
        let ks = aes128(&s.rk, cb);
        cb = cbincr(cb, s.bswap);

        let input = _mm_loadu_si128(blk.as_ptr().cast());
        let output = _mm_xor_si128(input, ks);
        _mm_storeu_si128(blk.as_mut_ptr().cast(), output);

        let x = _mm_shuffle_epi8(if hash_input { input } else { output }, s.bswap);
        y = gfmul(_mm_xor_si128(y, x), s.h[0]);
    }

    // 3. Partial last block
    let tail = blocks.into_remainder();
    if !tail.is_empty() {
        let mut ks = [0u8; BLOCK_SIZE];
        _mm_storeu_si128(ks.as_mut_ptr().cast(), aes128(&s.rk, cb));

        let mut padded = [0u8; BLOCK_SIZE];
        if hash_input {
            padded[..tail.len()].copy_from_slice(tail);
        }
        for (b, k) in tail.iter_mut().zip(ks.iter()) {
            *b ^= k;
        }
        if !hash_input {
            padded[..tail.len()].copy_from_slice(tail);
        }
        ks.zeroize();

        let x = _mm_shuffle_epi8(_mm_loadu_si128(padded.as_ptr().cast()), s.bswap);
        y = gfmul(_mm_xor_si128(y, x), s.h[0]);
    }

    _mm_storeu_si128(acc.as_mut_ptr().cast(), _mm_shuffle_epi8(y, s.bswap));
}
