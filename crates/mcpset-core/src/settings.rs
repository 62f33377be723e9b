//! Process-wide locations, passed explicitly into every entry point

use std::path::{Path, PathBuf};

use mcpset_fs::NormalizedPath;

use crate::error::{Error, Result};

/// Directory under the home directory holding mcpset's files
pub const CONFIG_DIR_NAME: &str = ".mcp";
pub const TARGETS_FILE_NAME: &str = "mcpset.targets.json";
pub const TEMPLATES_FILE_NAME: &str = "mcpset.templates.json";
pub const CENTRAL_FILE_NAME: &str = "config.json";

/// Where mcpset finds its registry, catalog and default central store
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config_dir: NormalizedPath,
    pub targets_file: NormalizedPath,
    pub templates_file: NormalizedPath,
    /// Central store location used when the registry declares none
    pub default_central: NormalizedPath,
    /// Base for `~` in registry paths
    pub home: Option<PathBuf>,
}

impl Settings {
    /// Settings rooted at an explicit config directory.
    ///
    /// `~` in registry paths still expands to the user's home directory;
    /// use [`Settings::with_home`] to point it elsewhere.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let config_dir = NormalizedPath::new(dir);
        Self {
            targets_file: config_dir.join(TARGETS_FILE_NAME),
            templates_file: config_dir.join(TEMPLATES_FILE_NAME),
            default_central: config_dir.join(CENTRAL_FILE_NAME),
            config_dir,
            home: dirs::home_dir(),
        }
    }

    /// Settings for `~/.mcp`
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::in_dir(home.join(CONFIG_DIR_NAME)).with_home(home))
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve a registry path, expanding a leading `~`
    pub fn expand(&self, raw: &str) -> NormalizedPath {
        NormalizedPath::expand(raw, self.home.as_deref())
    }
}
