//! Merge engine: reconcile a source mapping into a destination mapping
//!
//! Merging is pure. It returns the resulting entries together with a
//! [`MergePlan`] describing what happened to every key, so callers can
//! report a dry-run or decide whether a write is needed at all.

use mcpset_content::{Entries, SemanticDiff};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// How keys present on both sides are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Destination values are kept verbatim
    #[default]
    AppendOnly,
    /// Source values replace destination values
    Override,
    /// Missing nested keys and list items are added; existing scalars kept
    DeepAppend,
}

/// What a merge did with one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Added,
    SkippedExisting,
    Overridden,
    Extended,
    Removed,
    Unchanged,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::SkippedExisting => "skipped-existing",
            Self::Overridden => "overridden",
            Self::Extended => "extended",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub key: String,
    pub decision: Decision,
    /// Whether source and destination values differ
    pub divergent: bool,
    /// Paths inside the definition where the two sides differ
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differences: Vec<String>,
}

impl PlanEntry {
    pub fn new(key: impl Into<String>, decision: Decision, divergent: bool) -> Self {
        Self {
            key: key.into(),
            decision,
            divergent,
            differences: Vec::new(),
        }
    }

    pub fn with_differences(mut self, differences: Vec<String>) -> Self {
        self.differences = differences;
        self
    }

    /// True when this decision alters the destination mapping
    pub fn changes_destination(&self) -> bool {
        match self.decision {
            Decision::Added | Decision::Removed | Decision::Extended => true,
            Decision::Overridden => self.divergent,
            Decision::SkippedExisting | Decision::Unchanged => false,
        }
    }

    /// True when a human-facing diff should show this entry
    pub fn is_notable(&self) -> bool {
        self.changes_destination() || (self.decision == Decision::SkippedExisting && self.divergent)
    }
}

/// Per-key decisions, always sorted by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergePlan {
    entries: Vec<PlanEntry>,
}

impl MergePlan {
    pub fn new(mut entries: Vec<PlanEntry>) -> Self {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.entries.iter().filter(|e| e.decision == decision).count()
    }

    /// True when applying the plan would alter the destination
    pub fn changes_destination(&self) -> bool {
        self.entries.iter().any(PlanEntry::changes_destination)
    }

    pub fn notable(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.is_notable())
    }
}

/// Resulting entries and the plan that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub entries: Entries,
    pub plan: MergePlan,
}

/// Merge `source` into `destination` under `policy`.
///
/// The result keeps destination order, followed by new keys in source
/// order. Destination-only keys are never removed.
pub fn merge(source: &Entries, destination: &Entries, policy: Policy) -> MergeOutcome {
    let mut entries = destination.clone();
    let mut plan = Vec::with_capacity(source.len() + destination.len());

    for key in destination.keys() {
        if !source.contains_key(key) {
            plan.push(PlanEntry::new(key.clone(), Decision::Unchanged, false));
        }
    }

    for (key, value) in source {
        let Some(existing) = destination.get(key) else {
            entries.insert(key.clone(), value.clone());
            plan.push(PlanEntry::new(key.clone(), Decision::Added, true));
            continue;
        };

        let divergent = existing != value;
        let decision = match policy {
            Policy::AppendOnly => Decision::SkippedExisting,
            Policy::Override => {
                if divergent {
                    entries.insert(key.clone(), value.clone());
                }
                Decision::Overridden
            }
            Policy::DeepAppend => {
                let mut extended = existing.clone();
                if deep_append(&mut extended, value) {
                    entries.insert(key.clone(), extended);
                    Decision::Extended
                } else {
                    Decision::SkippedExisting
                }
            }
        };
        tracing::trace!(key = %key, decision = %decision, divergent, "Merged key");
        let differences = if divergent {
            changed_paths(existing, value)
        } else {
            Vec::new()
        };
        plan.push(PlanEntry::new(key.clone(), decision, divergent).with_differences(differences));
    }

    MergeOutcome {
        entries,
        plan: MergePlan::new(plan),
    }
}

/// Nested paths where `source` departs from `destination`. A definition
/// replaced wholesale has no nested paths.
fn changed_paths(destination: &Value, source: &Value) -> Vec<String> {
    SemanticDiff::compute(destination, source)
        .paths()
        .into_iter()
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add what `source` has and `destination` lacks. Returns whether anything
/// was added.
fn deep_append(destination: &mut Value, source: &Value) -> bool {
    match (destination, source) {
        (Value::Object(dest), Value::Object(src)) => {
            let mut changed = false;
            for (key, value) in src {
                match dest.get_mut(key) {
                    Some(existing) => changed |= deep_append(existing, value),
                    None => {
                        dest.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
            }
            changed
        }
        (Value::Array(dest), Value::Array(src)) => {
            let mut changed = false;
            for item in src {
                if !dest.contains(item) {
                    dest.push(item.clone());
                    changed = true;
                }
            }
            changed
        }
        _ => false,
    }
}

/// Remove `key`, keeping the order of the remaining entries
pub fn remove(entries: &Entries, key: &str) -> Result<(Entries, PlanEntry)> {
    if !entries.contains_key(key) {
        return Err(Error::KeyNotFound {
            key: key.to_string(),
        });
    }
    let remaining = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok((remaining, PlanEntry::new(key, Decision::Removed, true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn entries(value: Value) -> Entries {
        value.as_object().cloned().unwrap_or_default()
    }

    fn keys(entries: &Entries) -> Vec<&str> {
        entries.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_append_only_keeps_destination() {
        let outcome = merge(
            &entries(json!({"k": "new", "n": 1})),
            &entries(json!({"k": "old", "local": true})),
            Policy::AppendOnly,
        );
        assert_eq!(outcome.entries, entries(json!({"k": "old", "local": true, "n": 1})));
        assert_eq!(keys(&outcome.entries), ["k", "local", "n"]);
        assert_eq!(
            outcome.plan.entries(),
            [
                PlanEntry::new("k", Decision::SkippedExisting, true),
                PlanEntry::new("local", Decision::Unchanged, false),
                PlanEntry::new("n", Decision::Added, true),
            ]
        );
    }

    #[test]
    fn test_override_replaces_in_place() {
        let outcome = merge(
            &entries(json!({"k": "new"})),
            &entries(json!({"a": 0, "k": "old", "z": 0})),
            Policy::Override,
        );
        assert_eq!(outcome.entries["k"], json!("new"));
        assert_eq!(keys(&outcome.entries), ["a", "k", "z"]);
        assert!(outcome.plan.changes_destination());
    }

    #[test]
    fn test_override_of_equal_value_is_not_a_change() {
        let outcome = merge(
            &entries(json!({"k": {"a": 1}})),
            &entries(json!({"k": {"a": 1}})),
            Policy::Override,
        );
        assert_eq!(outcome.plan.entries(), [PlanEntry::new("k", Decision::Overridden, false)]);
        assert!(!outcome.plan.changes_destination());
        assert_eq!(outcome.plan.notable().count(), 0);
    }

    #[rstest]
    #[case(json!({}), json!({"a": 1, "b": 2}), Decision::Unchanged)]
    #[case(json!({"a": 1, "b": 2}), json!({}), Decision::Added)]
    fn test_empty_sides(#[case] source: Value, #[case] dest: Value, #[case] expected: Decision) {
        let outcome = merge(&entries(source), &entries(dest), Policy::AppendOnly);
        assert_eq!(outcome.plan.len(), 2);
        assert!(outcome.plan.iter().all(|e| e.decision == expected));
    }

    #[test]
    fn test_plan_sorted_by_key() {
        let outcome = merge(
            &entries(json!({"zeta": 1, "alpha": 2})),
            &entries(json!({"mid": 3})),
            Policy::AppendOnly,
        );
        let plan_keys: Vec<_> = outcome.plan.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(plan_keys, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_divergent_skip_is_notable_but_not_a_change() {
        let outcome = merge(
            &entries(json!({"k": 2, "same": 1})),
            &entries(json!({"k": 1, "same": 1})),
            Policy::AppendOnly,
        );
        assert!(!outcome.plan.changes_destination());
        let notable: Vec<_> = outcome.plan.notable().map(|e| e.key.as_str()).collect();
        assert_eq!(notable, ["k"]);
    }

    #[test]
    fn test_divergent_keys_record_nested_differences() {
        let outcome = merge(
            &entries(json!({"s": {"command": "uvx", "env": {"TOKEN": "b"}}, "n": 2})),
            &entries(json!({"s": {"command": "npx", "env": {"TOKEN": "a"}, "args": []}, "n": 1})),
            Policy::AppendOnly,
        );
        assert_eq!(
            outcome.plan.get("s").unwrap().differences,
            ["command", "env.TOKEN", "args"]
        );
        // scalar definitions differ as a whole
        assert!(outcome.plan.get("n").unwrap().differences.is_empty());
    }

    #[test]
    fn test_deep_append() {
        let outcome = merge(
            &entries(json!({"s": {"command": "new", "args": ["-y", "b"], "env": {"B": "2"}}})),
            &entries(json!({"s": {"command": "old", "args": ["-y", "a"], "env": {"A": "1"}}})),
            Policy::DeepAppend,
        );
        assert_eq!(
            outcome.entries["s"],
            json!({"command": "old", "args": ["-y", "a", "b"], "env": {"A": "1", "B": "2"}})
        );
        assert_eq!(outcome.plan.get("s").unwrap().decision, Decision::Extended);
    }

    #[test]
    fn test_deep_append_without_additions_is_skip() {
        let outcome = merge(
            &entries(json!({"s": {"command": "new", "args": ["a"]}})),
            &entries(json!({"s": {"command": "old", "args": ["a", "b"]}})),
            Policy::DeepAppend,
        );
        assert_eq!(outcome.plan.get("s").unwrap().decision, Decision::SkippedExisting);
        assert!(!outcome.plan.changes_destination());
    }

    #[test]
    fn test_remove() {
        let (remaining, entry) = remove(&entries(json!({"a": 1, "b": 2, "c": 3})), "b").unwrap();
        assert_eq!(keys(&remaining), ["a", "c"]);
        assert_eq!(entry.decision, Decision::Removed);
        assert!(matches!(
            remove(&remaining, "b"),
            Err(Error::KeyNotFound { key }) if key == "b"
        ));
    }

    fn arb_entries() -> impl Strategy<Value = Entries> {
        prop::collection::btree_map("[a-e]{1,2}", 0i64..4, 0..6).prop_map(|map| {
            map.into_iter().map(|(k, v)| (k, json!(v))).collect()
        })
    }

    proptest! {
        #[test]
        fn prop_append_only_never_touches_destination(source in arb_entries(), dest in arb_entries()) {
            let outcome = merge(&source, &dest, Policy::AppendOnly);
            for (key, value) in &dest {
                prop_assert_eq!(outcome.entries.get(key), Some(value));
            }
            for key in source.keys() {
                prop_assert!(outcome.entries.contains_key(key));
            }
        }

        #[test]
        fn prop_merge_is_idempotent(source in arb_entries(), dest in arb_entries(), force in any::<bool>()) {
            let policy = if force { Policy::Override } else { Policy::AppendOnly };
            let first = merge(&source, &dest, policy);
            let second = merge(&source, &first.entries, policy);
            prop_assert_eq!(&second.entries, &first.entries);
            prop_assert!(!second.plan.changes_destination());
            prop_assert_eq!(second.plan.count(Decision::Added), 0);
        }

        #[test]
        fn prop_plan_covers_every_key_once(source in arb_entries(), dest in arb_entries()) {
            let outcome = merge(&source, &dest, Policy::AppendOnly);
            prop_assert_eq!(outcome.plan.len(), outcome.entries.len());
            let keys: Vec<_> = outcome.plan.iter().map(|e| e.key.clone()).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(keys, sorted);
        }
    }
}
