//! Filesystem primitives for mcpset
//!
//! Provides home-aware path normalization, checksums and the atomic
//! write discipline every target and central-store write goes through.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::compute_file_checksum;
pub use error::{Error, Result};
pub use path::NormalizedPath;
