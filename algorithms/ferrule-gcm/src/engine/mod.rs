//! Execution Engine
//!
//! CPU dispatch between the AES-NI and portable backends.

pub mod dispatcher;

pub use dispatcher::{backend_for, best_backend, get_active_backend_name};
