//! Dotted root keys

use crate::error::{Error, Result};

/// Location of the entries mapping inside a document.
///
/// Written as a dotted path: `mcpServers`, `mcp_servers`, or
/// `tools.mcp.servers` for a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootKey {
    segments: Vec<String>,
}

impl RootKey {
    /// Parse a dotted root key. Empty keys and empty segments are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidRootKey(raw.to_string()));
        }
        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidRootKey(raw.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for RootKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl std::str::FromStr for RootKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
