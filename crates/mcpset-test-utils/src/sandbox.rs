//! [`Sandbox`] fixture for mcpset test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// One registry entry, with `path` relative to the sandbox home
#[derive(Debug, Clone, Copy)]
pub struct TargetDecl<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub format: &'a str,
    pub root: &'a str,
}

impl<'a> TargetDecl<'a> {
    pub fn json(name: &'a str, path: &'a str) -> Self {
        Self {
            name,
            path,
            format: "json",
            root: "mcpServers",
        }
    }

    pub fn toml(name: &'a str, path: &'a str) -> Self {
        Self {
            name,
            path,
            format: "toml",
            root: "mcp_servers",
        }
    }

    pub fn with_root(mut self, root: &'a str) -> Self {
        self.root = root;
        self
    }
}

/// A temporary home directory holding a `.mcp` config directory.
///
/// # Example
///
/// ```rust,no_run
/// use mcpset_test_utils::{Sandbox, TargetDecl};
///
/// let sandbox = Sandbox::new();
/// sandbox.write_targets(&[TargetDecl::json("claude", ".claude.json")]);
/// sandbox.write_file(".claude.json", "{}");
/// sandbox.assert_file_exists(".mcp/mcpset.targets.json");
/// ```
pub struct Sandbox {
    temp_dir: TempDir,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create an empty home with `.mcp/` inside.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Sandbox::new: failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join(".mcp"))
            .expect("Sandbox::new: failed to create .mcp");
        Self { temp_dir }
    }

    /// The sandbox home directory.
    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The `.mcp` config directory.
    pub fn config_dir(&self) -> PathBuf {
        self.home().join(".mcp")
    }

    /// Absolute path of a home-relative file.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.home().join(rel)
    }

    /// Write a home-relative file, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_file(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("Sandbox::read_file: {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Write `.mcp/mcpset.targets.json`. Paths are written as `~/...` so
    /// home expansion is exercised.
    pub fn write_targets(&self, targets: &[TargetDecl<'_>]) {
        let list: Vec<Value> = targets
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "path": format!("~/{}", t.path),
                    "type": t.format,
                    "root": t.root,
                })
            })
            .collect();
        self.write_json(".mcp/mcpset.targets.json", &json!({ "targets": list }));
    }

    /// Write `.mcp/mcpset.templates.json` with the given `templates` map.
    pub fn write_templates(&self, templates: Value) {
        self.write_json(
            ".mcp/mcpset.templates.json",
            &json!({ "templates": templates }),
        );
    }

    /// Write the default central store `.mcp/config.json`.
    pub fn write_central(&self, servers: Value) {
        self.write_json(".mcp/config.json", &json!({ "mcpServers": servers }));
    }

    /// Read a JSON file as a value.
    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read_file(rel))
            .unwrap_or_else(|e| panic!("Sandbox::read_json: {rel}: {e}"))
    }

    fn write_json(&self, rel: &str, value: &Value) {
        let text = serde_json::to_string_pretty(value).unwrap();
        self.write_file(rel, &format!("{text}\n"));
    }

    /// Assert that a home-relative file exists.
    pub fn assert_file_exists(&self, rel: &str) {
        assert!(self.exists(rel), "Expected file to exist: {rel}");
    }
}
