//! TOML adapter using toml_edit for format preservation

use serde_json::Value;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table, TableLike};

use crate::error::{Error, Result};
use crate::format::{Entries, Format, FormatAdapter};
use crate::root::RootKey;

/// Adapter for TOML client configuration files
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlAdapter;

impl TomlAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for TomlAdapter {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn entries(&self, source: &str, root: &RootKey) -> Result<Entries> {
        let doc = parse_document(source)?;
        Ok(table_entries(lookup(&doc, root)?))
    }

    fn save(&self, source: &str, root: &RootKey, entries: &Entries) -> Result<String> {
        let mut doc = parse_document(source)?;

        let existing = match lookup(&doc, root) {
            Ok(table) => {
                let current = table_entries(table);
                if &current == entries {
                    return Ok(source.to_string());
                }
                current
            }
            Err(e) if e.is_root_missing() => Entries::new(),
            Err(e) => return Err(e),
        };

        // Convert before touching the document so a failure leaves it intact
        let mut updates = Vec::new();
        for (key, value) in entries {
            if existing.get(key) != Some(value) {
                updates.push((key.as_str(), entry_item(value, &format!("{root}.{key}"))?));
            }
        }

        let table = root_table_mut(&mut doc, root)?;
        let stale: Vec<String> = table
            .iter()
            .map(|(key, _)| key.to_string())
            .filter(|key| !entries.contains_key(key))
            .collect();
        for key in stale {
            tracing::debug!(key = %key, "Removing TOML entry");
            table.remove(&key);
        }

        for (key, mut item) in updates {
            if let Some(slot) = table.get_mut(key) {
                // An inline entry is replaced by an inline value
                if slot.is_value() {
                    item = item.into_value().map(Item::Value).unwrap_or_else(|item| item);
                } else if let (Item::Table(old), Item::Table(new)) = (&*slot, &mut item) {
                    *new.decor_mut() = old.decor().clone();
                }
                *slot = item;
            } else {
                table.insert(key, item);
            }
        }

        Ok(doc.to_string())
    }

    fn normalize(&self, source: &str) -> Result<Value> {
        let doc = parse_document(source)?;
        Ok(Value::Object(table_entries(doc.as_table())))
    }
}

fn parse_document(source: &str) -> Result<DocumentMut> {
    source
        .parse()
        .map_err(|e: toml_edit::TomlError| Error::parse("TOML", e.to_string()))
}

fn lookup<'a>(doc: &'a DocumentMut, root: &RootKey) -> Result<&'a dyn TableLike> {
    let mut current: &dyn TableLike = doc.as_table();
    for segment in root.segments() {
        let item = current.get(segment).ok_or_else(|| Error::RootMissing {
            root: root.to_string(),
        })?;
        current = item.as_table_like().ok_or_else(|| Error::InvalidRoot {
            root: root.to_string(),
        })?;
    }
    Ok(current)
}

/// Walk to the root table, creating missing levels as implicit tables
fn root_table_mut<'a>(doc: &'a mut DocumentMut, root: &RootKey) -> Result<&'a mut dyn TableLike> {
    let mut current: &mut dyn TableLike = doc.as_table_mut();
    for segment in root.segments() {
        if !current.contains_key(segment) {
            let mut table = Table::new();
            table.set_implicit(true);
            current.insert(segment, Item::Table(table));
        }
        current = current
            .get_mut(segment)
            .and_then(Item::as_table_like_mut)
            .ok_or_else(|| Error::InvalidRoot {
                root: root.to_string(),
            })?;
    }
    Ok(current)
}

fn table_entries(table: &dyn TableLike) -> Entries {
    table
        .iter()
        .map(|(key, item)| (key.to_string(), item_to_json(item)))
        .collect()
}

fn item_to_json(item: &Item) -> Value {
    match item {
        Item::Value(v) => value_to_json(v),
        Item::Table(t) => Value::Object(table_entries(t)),
        Item::ArrayOfTables(arr) => Value::Array(
            arr.iter()
                .map(|t| Value::Object(table_entries(t)))
                .collect(),
        ),
        Item::None => Value::Null,
    }
}

fn value_to_json(v: &toml_edit::Value) -> Value {
    match v {
        toml_edit::Value::String(s) => Value::String(s.value().to_string()),
        toml_edit::Value::Integer(i) => Value::Number((*i.value()).into()),
        toml_edit::Value::Float(f) => serde_json::Number::from_f64(*f.value())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml_edit::Value::Boolean(b) => Value::Bool(*b.value()),
        toml_edit::Value::Datetime(d) => Value::String(d.value().to_string()),
        toml_edit::Value::Array(arr) => Value::Array(arr.iter().map(value_to_json).collect()),
        toml_edit::Value::InlineTable(t) => Value::Object(
            t.iter()
                .map(|(key, value)| (key.to_string(), value_to_json(value)))
                .collect(),
        ),
    }
}

/// A server definition becomes a `[root.name]` table when it is a mapping
fn entry_item(value: &Value, path: &str) -> Result<Item> {
    match value {
        Value::Object(fields) => {
            let mut table = Table::new();
            for (key, field) in fields {
                table.insert(key, Item::Value(to_toml_value(field, &format!("{path}.{key}"))?));
            }
            Ok(Item::Table(table))
        }
        other => Ok(Item::Value(to_toml_value(other, path)?)),
    }
}

fn to_toml_value(value: &Value, path: &str) -> Result<toml_edit::Value> {
    let unrepresentable = || Error::Unrepresentable {
        format: "TOML".to_string(),
        path: path.to_string(),
    };

    match value {
        Value::Null => Err(unrepresentable()),
        Value::Bool(b) => Ok(toml_edit::Value::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml_edit::Value::from(i))
            } else if n.is_u64() {
                Err(unrepresentable())
            } else {
                n.as_f64().map(toml_edit::Value::from).ok_or_else(unrepresentable)
            }
        }
        Value::String(s) => Ok(toml_edit::Value::from(s.as_str())),
        Value::Array(items) => {
            let mut array = Array::new();
            for (i, item) in items.iter().enumerate() {
                array.push(to_toml_value(item, &format!("{path}[{i}]"))?);
            }
            Ok(toml_edit::Value::Array(array))
        }
        Value::Object(fields) => {
            let mut table = InlineTable::new();
            for (key, field) in fields {
                table.insert(key.as_str(), to_toml_value(field, &format!("{path}.{key}"))?);
            }
            Ok(toml_edit::Value::InlineTable(table))
        }
    }
}
