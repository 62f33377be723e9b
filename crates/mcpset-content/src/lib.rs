//! Format adapters and diffing for mcpset
//!
//! A client configuration file is a document with a mapping of named
//! entries under a root key. Adapters extract that mapping as
//! [`Entries`] and write an updated mapping back while leaving everything
//! outside the root key alone.

pub mod diff;
pub mod error;
pub mod format;
pub mod handlers;
pub mod root;

pub use diff::{SemanticChange, SemanticDiff, unified_diff};
pub use error::{Error, Result};
pub use format::{Entries, Format, FormatAdapter, Loaded};
pub use handlers::{JsonAdapter, TomlAdapter};
pub use root::RootKey;
