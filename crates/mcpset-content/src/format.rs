//! Format selection and the adapter trait

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::handlers::{JsonAdapter, TomlAdapter};
use crate::root::RootKey;

/// Named server definitions in document order
pub type Entries = serde_json::Map<String, serde_json::Value>;

/// Supported client configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// The adapter that reads and writes this format
    pub fn adapter(&self) -> &'static dyn FormatAdapter {
        static JSON: JsonAdapter = JsonAdapter;
        static TOML: TomlAdapter = TomlAdapter;
        match self {
            Self::Json => &JSON,
            Self::Toml => &TOML,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Entries read from a document, with whether the root key existed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Loaded {
    pub entries: Entries,
    pub root_present: bool,
}

/// Reads and writes the entries mapping of one document format.
///
/// Adapters are pure: they take source text and return values or new
/// source text. File access lives with the callers.
pub trait FormatAdapter: Send + Sync {
    /// Get the format this adapter handles
    fn format(&self) -> Format;

    /// Extract the entries under `root`.
    ///
    /// Empty source is an empty document, so it yields `RootMissing`.
    /// A root holding something other than a mapping is `InvalidRoot`.
    fn entries(&self, source: &str, root: &RootKey) -> Result<Entries>;

    /// Write `entries` under `root` and return the new document text.
    ///
    /// Content outside the root key is preserved. A missing root (and any
    /// missing intermediate tables) is created. When `entries` equals what
    /// the source already holds, the source is returned unchanged.
    fn save(&self, source: &str, root: &RootKey, entries: &Entries) -> Result<String>;

    /// Convert the whole document to a JSON value for inspection.
    fn normalize(&self, source: &str) -> Result<serde_json::Value>;

    /// Fail with `ParseError` when the source is not well-formed.
    fn parse_check(&self, source: &str) -> Result<()> {
        self.normalize(source).map(|_| ())
    }

    /// Like [`FormatAdapter::entries`], with a missing root reported as empty.
    fn load(&self, source: &str, root: &RootKey) -> Result<Loaded> {
        match self.entries(source, root) {
            Ok(entries) => Ok(Loaded {
                entries,
                root_present: true,
            }),
            Err(e) if e.is_root_missing() => Ok(Loaded::default()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("Toml".parse::<Format>().unwrap(), Format::Toml);
        assert!(matches!(
            "yaml".parse::<Format>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_adapter_matches_format() {
        assert_eq!(Format::Json.adapter().format(), Format::Json);
        assert_eq!(Format::Toml.adapter().format(), Format::Toml);
    }

    #[test]
    fn test_parse_check() {
        assert!(Format::Json.adapter().parse_check("{\"a\": 1}").is_ok());
        assert!(Format::Json.adapter().parse_check("{").is_err());
        assert!(Format::Toml.adapter().parse_check("a = 1").is_ok());
        assert!(Format::Toml.adapter().parse_check("a = ").is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let f: Format = serde_json::from_str("\"toml\"").unwrap();
        assert_eq!(f, Format::Toml);
        assert_eq!(serde_json::to_string(&Format::Json).unwrap(), "\"json\"");
    }
}
