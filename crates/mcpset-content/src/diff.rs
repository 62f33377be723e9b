//! Semantic and textual diffs of definitions and documents

use serde_json::Value;
use similar::TextDiff;

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Result of comparing two values semantically
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemanticDiff {
    pub changes: Vec<SemanticChange>,
}

impl SemanticDiff {
    /// Compute a semantic diff between two JSON values
    ///
    /// Changes carry dotted paths such as `env.API_KEY` or `args[1]`.
    pub fn compute(old: &Value, new: &Value) -> Self {
        let mut changes = Vec::new();
        diff_values(old, new, String::new(), &mut changes, 0);
        Self { changes }
    }

    pub fn is_equivalent(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed paths in discovery order
    pub fn paths(&self) -> Vec<&str> {
        self.changes.iter().map(SemanticChange::path).collect()
    }
}

/// A semantic change between values
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticChange {
    Added { path: String, value: Value },
    Removed { path: String, value: Value },
    Modified { path: String, old: Value, new: Value },
}

impl SemanticChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn diff_values(
    old: &Value,
    new: &Value,
    path: String,
    changes: &mut Vec<SemanticChange>,
    depth: usize,
) {
    // Past the depth limit a difference is reported as one modification
    if depth > MAX_DIFF_DEPTH {
        if old != new {
            changes.push(SemanticChange::Modified {
                path,
                old: old.clone(),
                new: new.clone(),
            });
        }
        return;
    }

    match (old, new) {
        (Value::Object(old_obj), Value::Object(new_obj)) => {
            for (key, old_value) in old_obj {
                let child_path = child(&path, key);
                match new_obj.get(key) {
                    Some(new_value) => {
                        diff_values(old_value, new_value, child_path, changes, depth + 1)
                    }
                    None => changes.push(SemanticChange::Removed {
                        path: child_path,
                        value: old_value.clone(),
                    }),
                }
            }
            for (key, new_value) in new_obj {
                if !old_obj.contains_key(key) {
                    changes.push(SemanticChange::Added {
                        path: child(&path, key),
                        value: new_value.clone(),
                    });
                }
            }
        }

        (Value::Array(old_arr), Value::Array(new_arr)) => {
            for i in 0..old_arr.len().max(new_arr.len()) {
                let child_path = format!("{path}[{i}]");
                match (old_arr.get(i), new_arr.get(i)) {
                    (Some(o), Some(n)) => diff_values(o, n, child_path, changes, depth + 1),
                    (Some(o), None) => changes.push(SemanticChange::Removed {
                        path: child_path,
                        value: o.clone(),
                    }),
                    (None, Some(n)) => changes.push(SemanticChange::Added {
                        path: child_path,
                        value: n.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }

        _ => {
            if old != new {
                changes.push(SemanticChange::Modified {
                    path,
                    old: old.clone(),
                    new: new.clone(),
                });
            }
        }
    }
}

/// Unified line diff between two document texts. Empty when they match.
pub fn unified_diff(label: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}
