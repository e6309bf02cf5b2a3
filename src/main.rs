//! # photo-quarantine CLI
//!
//! Command-line interface for the duplicate quarantine pipeline.
//!
//! ## Usage
//! ```bash
//! photo-quarantine scan ~/Photos --threshold 0.95
//! photo-quarantine scan ~/Photos --dry-run --output json
//! photo-quarantine prune ~/Photos/dupe
//! photo-quarantine rename ~/Photos/dupe
//! ```

mod cli;

use photo_quarantine::Result;

fn main() -> Result<()> {
    photo_quarantine::init_tracing();
    cli::run()
}
