//! Portable implementation of AES-128-GCM.
//!
//! Fully self-contained: byte-oriented AES rounds and a bitwise GF(2^128)
//! multiply, producing byte-identical results to the AES-NI backend.
//!
//! The S-box lookups index memory with secret data, so this backend is not
//! hardened against cache-timing observers. It exists for CPUs without
//! AES-NI and as the reference the SIMD path is tested against.

use self::utils::{aesenc, aesenclast, gf_mul, xor_block};
use crate::kernels::constants::{BATCH_BLOCKS, BLOCK_SIZE, ROUNDS};
use crate::kernels::key_schedule::{increment_counter, Block, RoundKeys};
use crate::types::{Direction, HPowers};
use zeroize::Zeroize;

pub mod utils;

// =============================================================================
// BLOCK CIPHER
// =============================================================================

/// AES-128 encrypt one block in place.
pub fn encrypt_block(round_keys: &RoundKeys, block: &mut Block) {
    let mut s = *block;
    xor_block(&mut s, &round_keys[0]);
    for rk in &round_keys[1..ROUNDS] {
        s = aesenc(&s, rk);
    }
    *block = aesenclast(&s, &round_keys[ROUNDS]);
    s.zeroize();
}

// =============================================================================
// GHASH
// =============================================================================

/// Absorb `data` into `acc`, zero-padding the final partial block.
pub fn ghash(h_powers: &HPowers, data: &[u8], acc: &mut Block) {
    let h = u128::from_be_bytes(h_powers[0]);
    let mut y = u128::from_be_bytes(*acc);

    let mut blocks = data.chunks_exact(BLOCK_SIZE);
    for blk in &mut blocks {
        y = gf_mul(y ^ load(blk), h);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = [0u8; BLOCK_SIZE];
        padded[..tail.len()].copy_from_slice(tail);
        y = gf_mul(y ^ u128::from_be_bytes(padded), h);
    }

    *acc = y.to_be_bytes();
}

// =============================================================================
// GCTR
// =============================================================================

/// Counter-mode transform of `data` in place with streaming GHASH.
///
/// Three tiers, all bit-identical to one-block-at-a-time processing:
/// 1. 4-block batches, folded as `(y ^ x0)·H⁴ ^ x1·H³ ^ x2·H² ^ x3·H`
/// 2. Single blocks
/// 3. Trailing partial block (keystream truncated, GHASH input zero-padded)
pub fn gctr(
    round_keys: &RoundKeys,
    h_powers: &HPowers,
    icb: &Block,
    data: &mut [u8],
    acc: &mut Block,
    direction: Direction,
) {
    let h = [
        u128::from_be_bytes(h_powers[0]),
        u128::from_be_bytes(h_powers[1]),
        u128::from_be_bytes(h_powers[2]),
        u128::from_be_bytes(h_powers[3]),
    ];
    let mut y = u128::from_be_bytes(*acc);
    let mut cb = *icb;
    increment_counter(&mut cb);

    // 1. Batches
    let mut batches = data.chunks_exact_mut(BATCH_BLOCKS * BLOCK_SIZE);
    for batch in &mut batches {
        let mut x = [0u128; BATCH_BLOCKS];
        for (xi, blk) in x.iter_mut().zip(batch.chunks_exact_mut(BLOCK_SIZE)) {
            *xi = crypt_block(round_keys, &mut cb, blk, direction);
        }
        y = gf_mul(y ^ x[0], h[3]) ^ gf_mul(x[1], h[2]) ^ gf_mul(x[2], h[1]) ^ gf_mul(x[3], h[0]);
    }

    // 2. Singles
    let mut blocks = batches.into_remainder().chunks_exact_mut(BLOCK_SIZE);
    for blk in &mut blocks {
        let x = crypt_block(round_keys, &mut cb, blk, direction);
        y = gf_mul(y ^ x, h[0]);
    }

    // 3. Tail
    let tail = blocks.into_remainder();
    if !tail.is_empty() {
        let mut padded = [0u8; BLOCK_SIZE];
        let mut ks = cb;
        encrypt_block(round_keys, &mut ks);

        if direction == Direction::Decrypt {
            padded[..tail.len()].copy_from_slice(tail);
        }
        for (b, k) in tail.iter_mut().zip(ks.iter()) {
            *b ^= k;
        }
        if direction == Direction::Encrypt {
            padded[..tail.len()].copy_from_slice(tail);
        }

        y = gf_mul(y ^ u128::from_be_bytes(padded), h[0]);
        ks.zeroize();
    }

    *acc = y.to_be_bytes();
}

/// Encrypt the counter, XOR it into `blk`, advance the counter, and return
/// the ciphertext side of the block as a big-endian field element.
#[inline]
fn crypt_block(round_keys: &RoundKeys, cb: &mut Block, blk: &mut [u8], direction: Direction) -> u128 {
    let mut ks = *cb;
    encrypt_block(round_keys, &mut ks);
    increment_counter(cb);

    let before = load(blk);
    for (b, k) in blk.iter_mut().zip(ks.iter()) {
        *b ^= k;
    }
    ks.zeroize();

    match direction {
        Direction::Encrypt => load(blk),
        Direction::Decrypt => before,
    }
}

#[inline]
fn load(blk: &[u8]) -> u128 {
    let mut b = [0u8; BLOCK_SIZE];
    b.copy_from_slice(blk);
    u128::from_be_bytes(b)
}
