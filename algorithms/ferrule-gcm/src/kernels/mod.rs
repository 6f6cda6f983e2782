//! Kernel Dispatcher
//!
//! Hardware-specific implementations of the AES-128-GCM primitives. Every
//! backend exposes `encrypt_block`, `ghash` and `gctr` with the signatures
//! in [`crate::types`], operating on natural-byte-order blocks.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod aesni;
pub mod constants;
pub mod key_schedule;
pub mod portable;

use self::constants::H_POWERS;
use self::key_schedule::Block;
use self::portable::utils::gf_mul;
use crate::types::HPowers;

/// Compute `[H, H², H³, H⁴]` from the hash subkey `H = E_K(0^128)`.
///
/// Done once per key with the portable multiply, so every backend starts
/// from the same table.
#[must_use]
pub fn h_powers(h: &Block) -> HPowers {
    let base = u128::from_be_bytes(*h);
    let mut out = [[0u8; 16]; H_POWERS];
    let mut acc = base;
    for p in &mut out {
        *p = acc.to_be_bytes();
        acc = gf_mul(acc, base);
    }
    out
}
