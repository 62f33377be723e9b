//! Template catalog and `{{NAME}}` substitution
//!
//! A template is a definition skeleton whose strings may hold `{{NAME}}`
//! placeholders. Substitution walks the value tree and only touches string
//! values; object keys are left as written.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use mcpset_fs::io;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::settings::Settings;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("Invalid placeholder regex")
});

static WHOLE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}$").expect("Invalid placeholder regex")
});

static PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid name regex"));

/// A declared template parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Param>,
    pub data: Value,
}

impl Template {
    /// Placeholder names used in the skeleton, sorted
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_placeholders(&self.data, &mut names);
        names.sort();
        names.dedup();
        names
    }
}

fn collect_placeholders(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            names.extend(PLACEHOLDER.captures_iter(s).map(|c| c[1].to_string()));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, names)),
        _ => {}
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: BTreeMap<String, Template>,
}

/// Caller-supplied values for template placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    values: BTreeMap<String, Value>,
    use_env: bool,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `KEY=VAL` (string value) and `KEY:=JSON` (structured value)
    pub fn parse<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Self::new();
        for item in items {
            let (key, value) = parse_override(item.as_ref())?;
            overrides.values.insert(key, value);
        }
        Ok(overrides)
    }

    /// Fall back to environment variables for placeholders with no value
    pub fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

fn parse_override(input: &str) -> Result<(String, Value)> {
    let structured = input.find(":=");
    let plain = input.find('=');

    let (key, value) = match (structured, plain) {
        (Some(at), Some(eq)) if at < eq => {
            let raw = &input[at + 2..];
            let value = serde_json::from_str(raw)
                .map_err(|e| Error::invalid_override(input, format!("invalid JSON value: {e}")))?;
            (&input[..at], value)
        }
        (_, Some(eq)) => (&input[..eq], Value::String(input[eq + 1..].to_string())),
        (_, None) => {
            return Err(Error::invalid_override(
                input,
                "expected KEY=VALUE or KEY:=JSON",
            ));
        }
    };

    let key = key.trim();
    if !PARAM_NAME.is_match(key) {
        return Err(Error::invalid_override(input, "invalid parameter name"));
    }
    Ok((key.to_string(), value))
}

/// Named templates loaded from `mcpset.templates.json`
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    /// Load the catalog. A missing file is an empty catalog.
    pub fn load(settings: &Settings) -> Result<Self> {
        let path = &settings.templates_file;
        match io::read_optional(path)? {
            Some(text) => Self::from_json(&text).map_err(|e| Error::InvalidCatalog {
                path: path.to_native(),
                message: e.to_string(),
            }),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Self {
            templates: file.templates,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Template names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Expand a template into a concrete definition.
    ///
    /// Values are looked up in the overrides, then parameter defaults, then
    /// the environment when enabled. Anything left unresolved stays verbatim,
    /// unless it is a declared parameter with no default.
    pub fn instantiate(&self, name: &str, overrides: &Overrides) -> Result<Value> {
        let template = self.get(name).ok_or_else(|| Error::TemplateNotFound {
            name: name.to_string(),
        })?;

        if !template.params.is_empty()
            && let Some(unknown) = overrides.keys().find(|k| !template.params.contains_key(*k))
        {
            return Err(Error::invalid_override(
                unknown,
                format!("template '{name}' has no parameter '{unknown}'"),
            ));
        }

        let resolver = Resolver {
            template,
            overrides,
        };
        let mut unresolved = Vec::new();
        let value = resolver.substitute(&template.data, &mut unresolved)?;

        unresolved.sort();
        unresolved.dedup();
        for placeholder in unresolved {
            if template.params.contains_key(&placeholder) {
                return Err(Error::invalid_override(
                    &placeholder,
                    format!("template '{name}' requires a value for '{placeholder}'"),
                ));
            }
            tracing::warn!(template = %name, placeholder = %placeholder, "Unresolved placeholder left as-is");
        }

        tracing::debug!(template = %name, "Instantiated template");
        Ok(value)
    }
}

struct Resolver<'a> {
    template: &'a Template,
    overrides: &'a Overrides,
}

impl Resolver<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.overrides.get(name) {
            return Some(value.clone());
        }
        if let Some(default) = self.template.params.get(name).and_then(|p| p.default.clone()) {
            return Some(default);
        }
        if self.overrides.use_env {
            return std::env::var(name).ok().map(Value::String);
        }
        None
    }

    fn substitute(&self, value: &Value, unresolved: &mut Vec<String>) -> Result<Value> {
        match value {
            Value::String(s) => self.substitute_str(s, unresolved),
            Value::Array(items) => items
                .iter()
                .map(|v| self.substitute(v, unresolved))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, v) in map {
                    out.insert(key.clone(), self.substitute(v, unresolved)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn substitute_str(&self, s: &str, unresolved: &mut Vec<String>) -> Result<Value> {
        // A string that is exactly one placeholder takes the value as-is,
        // so structured overrides can fill it.
        if let Some(caps) = WHOLE_PLACEHOLDER.captures(s) {
            let name = &caps[1];
            return Ok(match self.lookup(name) {
                Some(value) => value,
                None => {
                    unresolved.push(name.to_string());
                    Value::String(s.to_string())
                }
            });
        }

        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(s) {
            let Some(whole) = caps.get(0) else { continue };
            let name = &caps[1];
            out.push_str(&s[last..whole.start()]);
            match self.lookup(name) {
                Some(Value::String(text)) => out.push_str(&text),
                Some(Value::Object(_)) | Some(Value::Array(_)) => {
                    return Err(Error::invalid_override(
                        name,
                        "structured value cannot be embedded in a string",
                    ));
                }
                Some(scalar) => out.push_str(&scalar.to_string()),
                None => {
                    unresolved.push(name.to_string());
                    out.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }
        out.push_str(&s[last..]);
        Ok(Value::String(out))
    }
}
