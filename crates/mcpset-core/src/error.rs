//! Error types for mcpset-core

use std::path::PathBuf;

/// Result type for mcpset-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mcpset-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A target or central file could not be parsed
    #[error("Failed to read target '{target}': {source}")]
    Parse {
        target: String,
        #[source]
        source: mcpset_content::Error,
    },

    /// Entries could not be written back into a target's document
    #[error("Failed to render target '{target}': {source}")]
    Render {
        target: String,
        #[source]
        source: mcpset_content::Error,
    },

    /// Target referenced by name but absent from the registry
    #[error("Target not found: {name}")]
    TargetNotFound { name: String },

    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Invalid override '{input}': {reason}")]
    InvalidOverride { input: String, reason: String },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// I/O failure during an atomic write
    #[error("Cannot write {path}: {source}")]
    WritePermission {
        path: PathBuf,
        #[source]
        source: mcpset_fs::Error,
    },

    #[error("Invalid target registry {path}: {message}")]
    InvalidRegistry { path: PathBuf, message: String },

    #[error("Invalid template catalog {path}: {message}")]
    InvalidCatalog { path: PathBuf, message: String },

    #[error("Invalid definition: {message}")]
    InvalidDefinition { message: String },

    #[error("Home directory could not be determined")]
    NoHomeDir,

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mcpset-fs
    #[error(transparent)]
    Fs(#[from] mcpset_fs::Error),

    /// Content error from mcpset-content
    #[error(transparent)]
    Content(#[from] mcpset_content::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_override(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }
}
