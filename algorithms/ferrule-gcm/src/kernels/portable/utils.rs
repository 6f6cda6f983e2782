//! Portable software implementation of the AES round and GF(2^128) multiply.

use crate::kernels::constants::{GF_POLY, GHASH_R, SBOX};
use crate::kernels::key_schedule::Block;

/// GF(2^8) multiplication by 2 (used in `MixColumns`).
/// Branchless: `b >> 7` extracts the MSB as 0 or 1; multiplying by `GF_POLY`
/// produces the conditional reduction polynomial without a data-dependent branch.
const fn gf_double(b: u8) -> u8 {
    (b << 1) ^ ((b >> 7) * GF_POLY)
}

/// AES `MixColumns` on a single 4-byte column.
fn mix_column(c: &mut [u8]) {
    let t = [c[0], c[1], c[2], c[3]];
    c[0] = gf_double(t[0] ^ t[1]) ^ t[1] ^ t[2] ^ t[3];
    c[1] = gf_double(t[1] ^ t[2]) ^ t[2] ^ t[3] ^ t[0];
    c[2] = gf_double(t[2] ^ t[3]) ^ t[3] ^ t[0] ^ t[1];
    c[3] = gf_double(t[3] ^ t[0]) ^ t[0] ^ t[1] ^ t[2];
}

/// `SubBytes` followed by `ShiftRows` (column-major state, as AES-NI).
fn sub_shift(state: &Block) -> Block {
    let mut s = *state;

    // SubBytes
    for b in &mut s {
        *b = SBOX[*b as usize];
    }

    // ShiftRows
    // Row 0: No shift
    // Row 1: Shift left 1
    let tmp = s[1];
    s[1] = s[5];
    s[5] = s[9];
    s[9] = s[13];
    s[13] = tmp;
    // Row 2: Shift left 2
    let tmp1 = s[2];
    let tmp2 = s[6];
    s[2] = s[10];
    s[6] = s[14];
    s[10] = tmp1;
    s[14] = tmp2;
    // Row 3: Shift left 3
    let tmp = s[15];
    s[15] = s[11];
    s[11] = s[7];
    s[7] = s[3];
    s[3] = tmp;

    s
}

/// XOR `key` into `state`.
#[inline]
pub fn xor_block(state: &mut Block, key: &Block) {
    for (s, k) in state.iter_mut().zip(key) {
        *s ^= k;
    }
}

/// One full AES round, bit-identical to `_mm_aesenc_si128`.
pub fn aesenc(state: &Block, key: &Block) -> Block {
    let mut s = sub_shift(state);

    // MixColumns
    for col in s.chunks_exact_mut(4) {
        mix_column(col);
    }

    xor_block(&mut s, key);
    s
}

/// Final AES round (no `MixColumns`), bit-identical to `_mm_aesenclast_si128`.
pub fn aesenclast(state: &Block, key: &Block) -> Block {
    let mut s = sub_shift(state);
    xor_block(&mut s, key);
    s
}

/// Multiply two GF(2^128) elements in GCM's bit order (SP 800-38D Alg. 1).
///
/// Operands are blocks read as big-endian `u128`, so bit 0 of the field
/// element is the integer's MSB. Implemented branchless: each bit of `x`
/// becomes an all-ones/all-zeros mask via `wrapping_neg`, and both the XOR
/// and the reduction are always performed.
pub const fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    let mut i = 0;
    while i < 128 {
        let mask = ((x >> (127 - i)) & 1).wrapping_neg();
        z ^= v & mask;
        let carry = (v & 1).wrapping_neg();
        v = (v >> 1) ^ (GHASH_R & carry);
        i += 1;
    }
    z
}
