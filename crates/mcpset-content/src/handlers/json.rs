//! JSON adapter
//!
//! Saving splices only the byte span of the root value. Text outside the
//! root key stays byte-for-byte identical, and entries whose value did not
//! change keep their original text.

use serde::Serialize;
use serde_json::{Map, Value};

use super::scan::{self, ObjectSpan};
use crate::error::{Error, Result};
use crate::format::{Entries, Format, FormatAdapter};
use crate::root::RootKey;

const DEFAULT_INDENT: &str = "  ";

/// Adapter for JSON client configuration files
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAdapter;

impl JsonAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for JsonAdapter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn entries(&self, source: &str, root: &RootKey) -> Result<Entries> {
        match parse_document(source)? {
            Some(doc) => lookup(&doc, root).cloned(),
            None => Err(Error::RootMissing {
                root: root.to_string(),
            }),
        }
    }

    fn save(&self, source: &str, root: &RootKey, entries: &Entries) -> Result<String> {
        let (text, doc) = match parse_document(source)? {
            Some(doc) => (source.to_string(), doc),
            None => ("{}\n".to_string(), Map::new()),
        };

        let current = match lookup(&doc, root) {
            Ok(existing) if existing == entries => return Ok(source.to_string()),
            Ok(existing) => Some(existing),
            Err(e) if e.is_root_missing() => None,
            Err(e) => return Err(e),
        };

        let segments = root.segments();
        let mut object = scan::object_at(&text, scan::skip_ws(text.as_bytes(), 0))?;
        let writer = Writer {
            text: &text,
            indent: detect_indent(&text),
            compact: is_single_line(&text, &object),
        };

        for (depth, segment) in segments.iter().enumerate() {
            let Some(member) = object.member(segment).cloned() else {
                let member = writer.member(&segments[depth..], entries, depth + 1)?;
                return Ok(writer.insert_member(&object, &member, depth));
            };

            if depth + 1 == segments.len() {
                let existing = match current {
                    Some(previous) => Some((scan::object_at(&text, member.value.start)?, previous)),
                    None => None,
                };
                let rendered = writer.entries(entries, existing.as_ref(), depth + 1)?;
                return Ok(splice(&text, member.value, &rendered));
            }

            object = scan::object_at(&text, member.value.start)?;
        }

        Err(Error::InvalidRootKey(root.to_string()))
    }

    fn normalize(&self, source: &str) -> Result<Value> {
        Ok(Value::Object(parse_document(source)?.unwrap_or_default()))
    }
}

/// Parse a document whose top level must be an object. Blank text is `None`.
fn parse_document(source: &str) -> Result<Option<Map<String, Value>>> {
    if source.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(Error::parse("JSON", "top-level value must be an object")),
    }
}

fn lookup<'a>(doc: &'a Map<String, Value>, root: &RootKey) -> Result<&'a Entries> {
    let mut current = doc;
    for segment in root.segments() {
        match current.get(segment) {
            Some(Value::Object(map)) => current = map,
            Some(_) => {
                return Err(Error::InvalidRoot {
                    root: root.to_string(),
                });
            }
            None => {
                return Err(Error::RootMissing {
                    root: root.to_string(),
                });
            }
        }
    }
    Ok(current)
}

/// Indent unit of the first indented line, or two spaces
fn detect_indent(text: &str) -> String {
    for line in text.lines() {
        let body = line.trim_start_matches([' ', '\t']);
        if body.is_empty() || body.len() == line.len() {
            continue;
        }
        let lead = &line[..line.len() - body.len()];
        return if lead.starts_with('\t') {
            "\t".to_string()
        } else {
            lead.to_string()
        };
    }
    DEFAULT_INDENT.to_string()
}

/// A document written on one line keeps that layout when edited
fn is_single_line(text: &str, object: &ObjectSpan) -> bool {
    !object.members.is_empty() && !text[object.open..=object.close].contains('\n')
}

fn splice(text: &str, range: std::ops::Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    out
}

struct Writer<'a> {
    text: &'a str,
    indent: String,
    compact: bool,
}

impl Writer<'_> {
    fn pad(&self, level: usize) -> String {
        self.indent.repeat(level)
    }

    fn key(&self, key: &str) -> Result<String> {
        let quoted = serde_json::to_string(key)?;
        Ok(if self.compact {
            format!("{quoted}:")
        } else {
            format!("{quoted}: ")
        })
    }

    /// Render an entries object whose closing brace sits at `level`
    fn entries(
        &self,
        entries: &Entries,
        existing: Option<&(ObjectSpan, &Entries)>,
        level: usize,
    ) -> Result<String> {
        if entries.is_empty() {
            return Ok("{}".to_string());
        }

        let mut members = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let reused = existing.and_then(|(span, current)| {
                (current.get(key) == Some(value))
                    .then(|| span.member(key))
                    .flatten()
                    .map(|m| &self.text[m.value.clone()])
            });
            let value_text = match reused {
                Some(raw) => raw.to_string(),
                None => self.value(value, level + 1)?,
            };
            members.push(format!("{}{}", self.key(key)?, value_text));
        }

        if self.compact {
            return Ok(format!("{{{}}}", members.join(",")));
        }
        let inner = self.pad(level + 1);
        let body: Vec<String> = members.iter().map(|m| format!("{inner}{m}")).collect();
        Ok(format!("{{\n{}\n{}}}", body.join(",\n"), self.pad(level)))
    }

    /// Pretty-print a value that starts on a line indented to `level`
    fn value(&self, value: &Value, level: usize) -> Result<String> {
        if self.compact {
            return Ok(serde_json::to_string(value)?);
        }
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        let pretty = String::from_utf8(buf).map_err(|e| Error::parse("JSON", e.to_string()))?;

        let pad = self.pad(level);
        let mut lines = pretty.lines();
        let mut out = lines.next().unwrap_or_default().to_string();
        for line in lines {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(line);
        }
        Ok(out)
    }

    /// Render `"first": {...}` for a member line at `level`, nesting the
    /// remaining segments down to the entries object.
    fn member(&self, segments: &[String], entries: &Entries, level: usize) -> Result<String> {
        let (first, rest) = segments
            .split_first()
            .ok_or_else(|| Error::InvalidRootKey(String::new()))?;
        Ok(format!("{}{}", self.key(first)?, self.nested(rest, entries, level)?))
    }

    fn nested(&self, segments: &[String], entries: &Entries, level: usize) -> Result<String> {
        match segments.split_first() {
            None => self.entries(entries, None, level),
            Some((first, rest)) if self.compact => Ok(format!(
                "{{{}{}}}",
                self.key(first)?,
                self.nested(rest, entries, level + 1)?
            )),
            Some((first, rest)) => Ok(format!(
                "{{\n{}{}{}\n{}}}",
                self.pad(level + 1),
                self.key(first)?,
                self.nested(rest, entries, level + 1)?,
                self.pad(level)
            )),
        }
    }

    /// Add a member to the object at `level`, after its last member
    fn insert_member(&self, object: &ObjectSpan, member: &str, level: usize) -> String {
        if self.compact {
            return match object.members.last() {
                Some(last) => {
                    let at = last.value.end;
                    splice(self.text, at..at, &format!(",{member}"))
                }
                None => splice(self.text, object.open..object.close + 1, &format!("{{{member}}}")),
            };
        }
        match object.members.last() {
            Some(last) => {
                let at = last.value.end;
                splice(
                    self.text,
                    at..at,
                    &format!(",\n{}{}", self.pad(level + 1), member),
                )
            }
            None => splice(
                self.text,
                object.open..object.close + 1,
                &format!("{{\n{}{}\n{}}}", self.pad(level + 1), member, self.pad(level)),
            ),
        }
    }
}
