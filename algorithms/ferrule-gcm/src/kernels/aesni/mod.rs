//! AES-NI Kernel Module
//!
//! AES-128-GCM using AES-NI for the block cipher and PCLMULQDQ for GHASH.
//! Counter blocks are encrypted 4 at a time and folded into GHASH with the
//! Karatsuba 4-block multiply, then single blocks, then the partial tail.

// =============================================================================
// MODULES
// =============================================================================

mod gctr;
mod ghash;
mod state;

// =============================================================================
// EXPORTS
// =============================================================================

pub use gctr::{encrypt_block, gctr};
pub use ghash::ghash;
