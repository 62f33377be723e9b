//! Error types for mcpset-content

/// Result type for mcpset-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mcpset-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    /// The root key is absent. Recoverable: callers treat it as no entries.
    #[error("Root key '{root}' not found")]
    RootMissing { root: String },

    #[error("Root key '{root}' does not hold a table of entries")]
    InvalidRoot { root: String },

    #[error("Invalid root key '{0}'")]
    InvalidRootKey(String),

    #[error("Value at '{path}' cannot be represented in {format}")]
    Unrepresentable { format: String, path: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    /// True for the recoverable "root key absent" condition.
    pub fn is_root_missing(&self) -> bool {
        matches!(self, Self::RootMissing { .. })
    }
}
