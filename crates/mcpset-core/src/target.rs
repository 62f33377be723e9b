//! Target descriptors and the registry file

use std::collections::HashSet;

use mcpset_content::{Entries, Format, FormatAdapter, RootKey};
use mcpset_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::Settings;

/// Registry name of the central store
pub const CENTRAL_NAME: &str = "root";
/// Accepted alias for [`CENTRAL_NAME`] in selectors
pub const CENTRAL_SYNONYM: &str = "central";
/// Root key of the central store when the registry does not declare one
pub const DEFAULT_CENTRAL_ROOT: &str = "mcpServers";

/// One target as written in `mcpset.targets.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub format: Format,
    pub root: String,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    targets: Vec<TargetSpec>,
}

/// A client configuration file under management
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub path: NormalizedPath,
    pub format: Format,
    pub root: RootKey,
}

/// A target's current text and the entries under its root key
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// File text, empty when the file does not exist
    pub source: String,
    pub entries: Entries,
    pub exists: bool,
    pub root_present: bool,
}

impl Target {
    pub fn new(name: impl Into<String>, path: NormalizedPath, format: Format, root: RootKey) -> Self {
        Self {
            name: name.into(),
            path,
            format,
            root,
        }
    }

    pub fn is_central(&self) -> bool {
        self.name == CENTRAL_NAME
    }

    pub fn adapter(&self) -> &'static dyn FormatAdapter {
        self.format.adapter()
    }

    /// Read and parse the file. A missing file is an empty document.
    pub fn document(&self) -> Result<Document> {
        let Some(source) = io::read_optional(&self.path)? else {
            tracing::debug!(target_name = %self.name, path = %self.path, "Target file missing");
            return Ok(Document::default());
        };

        let loaded = self
            .adapter()
            .load(&source, &self.root)
            .map_err(|source| Error::Parse {
                target: self.name.clone(),
                source,
            })?;

        Ok(Document {
            source,
            entries: loaded.entries,
            exists: true,
            root_present: loaded.root_present,
        })
    }

    /// Document text with `entries` written under the root key
    pub fn render(&self, document: &Document, entries: &Entries) -> Result<String> {
        self.adapter()
            .save(&document.source, &self.root, entries)
            .map_err(|source| Error::Render {
                target: self.name.clone(),
                source,
            })
    }

    /// Atomically replace the file's content
    pub fn write(&self, content: &str) -> Result<()> {
        io::write_text(&self.path, content).map_err(|source| Error::WritePermission {
            path: self.path.to_native(),
            source,
        })?;
        tracing::info!(target_name = %self.name, path = %self.path, "Wrote target");
        Ok(())
    }
}

/// Validated targets plus the resolved central store
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    central: Target,
}

impl TargetRegistry {
    /// Load `mcpset.targets.json`. A missing file is an empty registry.
    pub fn load(settings: &Settings) -> Result<Self> {
        let path = &settings.targets_file;
        let specs = match io::read_optional(path)? {
            Some(text) => {
                let file: RegistryFile =
                    serde_json::from_str(&text).map_err(|e| Error::InvalidRegistry {
                        path: path.to_native(),
                        message: e.to_string(),
                    })?;
                file.targets
            }
            None => Vec::new(),
        };
        Self::from_specs(specs, settings)
    }

    /// Validate specs: unique non-empty names, parseable root keys, and a
    /// JSON central store.
    pub fn from_specs(specs: Vec<TargetSpec>, settings: &Settings) -> Result<Self> {
        let invalid = |message: String| Error::InvalidRegistry {
            path: settings.targets_file.to_native(),
            message,
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(specs.len());
        let mut central = None;

        for spec in specs {
            let name = spec.name.trim().to_string();
            if name.is_empty() {
                return Err(invalid("target with empty name".to_string()));
            }
            if name == CENTRAL_SYNONYM {
                return Err(invalid(format!(
                    "'{CENTRAL_SYNONYM}' is reserved, name the central store '{CENTRAL_NAME}'"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(invalid(format!("duplicate target name '{name}'")));
            }
            let root = RootKey::parse(&spec.root)
                .map_err(|e| invalid(format!("target '{name}': {e}")))?;
            let target = Target::new(name, settings.expand(&spec.path), spec.format, root);

            if target.is_central() {
                if target.format != Format::Json {
                    return Err(invalid(format!(
                        "central store '{CENTRAL_NAME}' must be a json target"
                    )));
                }
                central = Some(target);
            } else {
                targets.push(target);
            }
        }

        let central = match central {
            Some(target) => target,
            None => Target::new(
                CENTRAL_NAME,
                settings.default_central.clone(),
                Format::Json,
                RootKey::parse(DEFAULT_CENTRAL_ROOT)?,
            ),
        };

        tracing::debug!(count = targets.len(), central = %central.path, "Loaded target registry");
        Ok(Self { targets, central })
    }

    pub fn central(&self) -> &Target {
        &self.central
    }

    /// Non-central targets in registry order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Central store first, then every target
    pub fn all(&self) -> impl Iterator<Item = &Target> {
        std::iter::once(&self.central).chain(self.targets.iter())
    }

    /// Look up a target by name. `root` and `central` name the central store.
    pub fn get(&self, name: &str) -> Option<&Target> {
        if name == CENTRAL_NAME || name == CENTRAL_SYNONYM {
            return Some(&self.central);
        }
        self.targets.iter().find(|t| t.name == name)
    }

    /// Resolve selectors in the order given, dropping repeats. An empty
    /// selection means every non-central target.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Target>> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }

        let mut selected: Vec<&Target> = Vec::with_capacity(names.len());
        for name in names {
            let target = self.get(name).ok_or_else(|| Error::TargetNotFound {
                name: name.clone(),
            })?;
            if !selected.iter().any(|t| t.name == target.name) {
                selected.push(target);
            }
        }
        Ok(selected)
    }
}
