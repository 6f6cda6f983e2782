//! Info Command
//!
//! Report which backend runs and what this CPU supports.

use super::Backend;
use ferrule_gcm::{active_backend, backend_table, BackendKind};

// =============================================================================
// INFO
// =============================================================================

/// Print the backend `requested` resolves to and every backend's status.
pub fn show_info(requested: Backend) {
    println!("ferrule {}", env!("CARGO_PKG_VERSION"));
    println!("Auto-selected backend: {}", active_backend());

    match backend_table(requested.into()) {
        Ok(b) => println!("Requested backend:     {}", b.name),
        Err(e) => println!("Requested backend:     unavailable ({e})"),
    }

    println!();
    for (label, kind) in [("Portable", BackendKind::Portable), ("AES-NI", BackendKind::AesNi)] {
        let status = if backend_table(kind).is_ok() {
            "available"
        } else {
            "not supported on this CPU"
        };
        println!("  {label:<9} {status}");
    }

    println!();
    println!(
        "Key {} bytes, nonce {} bytes, tag {} bytes",
        ferrule_gcm::KEY_SIZE,
        ferrule_gcm::NONCE_SIZE,
        ferrule_gcm::TAG_SIZE
    );
}
