//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Target paths come from a JSON registry written by hand, so they may use
/// either separator and may start with `~`. Everything is normalized to
/// forward slashes and converted back to the native form only at I/O
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Create a path from registry text, expanding a leading `~` against `home`.
    ///
    /// `~user` forms are not expanded. Without a home directory the raw text
    /// is kept as-is.
    pub fn expand(raw: &str, home: Option<&Path>) -> Self {
        let normalized = raw.replace('\\', "/");
        let Some(home) = home else {
            return Self { inner: normalized };
        };

        if normalized == "~" {
            Self::new(home)
        } else if let Some(rest) = normalized.strip_prefix("~/") {
            Self::new(home).join(rest)
        } else {
            Self { inner: normalized }
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let segment_normalized = segment_normalized.trim_start_matches('/');
        let joined = if self.inner.ends_with('/') || self.inner.is_empty() {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
