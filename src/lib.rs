//! # Photo Quarantine
//!
//! Finds perceptual duplicate photos in a folder and sets them aside for review.
//!
//! ## Core Philosophy
//! - **Never auto-delete on a scan** - duplicates are moved, not removed
//! - **Reversible** - quarantined names keep the original file name
//! - **Keep going** - one unreadable file never stops a batch
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Hashing, grouping and quarantine
//! - `events` - Progress and log reporting (UI-agnostic)
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PhotoQuarantineError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Verbosity follows `RUST_LOG`.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
