//! Adding and removing single entries across the store and targets

use mcpset_content::Entries;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::merge::{self, MergePlan, Policy, merge};
use crate::report::{RunReport, TargetOutcome, TargetStatus};
use crate::store::CentralStore;
use crate::target::{Target, TargetRegistry};

/// Options for [`add_entry`]
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Targets to add to besides the central store. Empty means all.
    pub targets: Vec<String>,
    /// Replace an existing definition instead of skipping it
    pub force: bool,
    pub dry_run: bool,
}

/// Options for [`remove_entry`]
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Where to remove from. Empty means the central store and all targets.
    pub targets: Vec<String>,
    pub dry_run: bool,
}

fn validate(key: &str, definition: &Value) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::invalid_definition("entry name must not be empty"));
    }
    if !definition.is_object() {
        return Err(Error::invalid_definition(format!(
            "definition of '{key}' must be a JSON object"
        )));
    }
    Ok(())
}

/// Add one definition to the central store and the selected targets.
///
/// Existing definitions are kept unless `force` is set. Targets whose file
/// does not exist are skipped; the central store is created when missing.
pub fn add_entry(
    registry: &TargetRegistry,
    store: &mut CentralStore,
    key: &str,
    definition: Value,
    options: &AddOptions,
) -> Result<RunReport> {
    validate(key, &definition)?;
    let selected = registry.select(&options.targets)?;

    let mut source = Entries::new();
    source.insert(key.to_string(), definition);
    let policy = if options.force {
        Policy::Override
    } else {
        Policy::AppendOnly
    };

    let mut report = RunReport::new(options.dry_run);

    let outcome = merge(&source, store.entries(), policy);
    let existed = store.target().path.exists();
    let status = settle(&outcome.plan, options.dry_run);
    store.replace(outcome.entries);
    let central = CentralOutcome {
        existed,
        status,
        plan: keyed(outcome.plan, key),
    };
    central.finish(store, options.dry_run, &mut report);

    for target in selected.into_iter().filter(|t| !t.is_central()) {
        let result = add_to_target(target, &source, key, policy, options.dry_run);
        report.record(target, result);
    }

    Ok(report)
}

fn add_to_target(
    target: &Target,
    source: &Entries,
    key: &str,
    policy: Policy,
    dry_run: bool,
) -> Result<TargetOutcome> {
    let document = target.document()?;
    if !document.exists {
        tracing::warn!(target_name = %target.name, path = %target.path, "Target file missing, skipped");
        return Ok(TargetOutcome::new(
            target,
            TargetStatus::Missing,
            false,
            MergePlan::default(),
        ));
    }

    let outcome = merge(source, &document.entries, policy);
    let plan = keyed(outcome.plan, key);
    let status = settle(&plan, dry_run);
    if status == TargetStatus::Written {
        let rendered = target.render(&document, &outcome.entries)?;
        target.write(&rendered)?;
    }
    Ok(TargetOutcome::new(target, status, true, plan))
}

/// Remove one key from the central store and/or the selected targets.
///
/// A scope without the key is reported as skipped. The run fails with
/// `KeyNotFound` only when no scope had the key.
pub fn remove_entry(
    registry: &TargetRegistry,
    store: &mut CentralStore,
    key: &str,
    options: &RemoveOptions,
) -> Result<RunReport> {
    let scopes: Vec<&Target> = if options.targets.is_empty() {
        registry.all().collect()
    } else {
        registry.select(&options.targets)?
    };

    let mut report = RunReport::new(options.dry_run);
    let mut found = false;

    for target in scopes {
        if target.is_central() {
            let existed = store.target().path.exists();
            match merge::remove(store.entries(), key) {
                Ok((entries, entry)) => {
                    found = true;
                    store.replace(entries);
                    let plan = MergePlan::new(vec![entry]);
                    let central = CentralOutcome {
                        existed,
                        status: settle(&plan, options.dry_run),
                        plan,
                    };
                    central.finish(store, options.dry_run, &mut report);
                }
                Err(Error::KeyNotFound { .. }) => report.push(TargetOutcome::new(
                    target,
                    TargetStatus::Skipped,
                    existed,
                    MergePlan::default(),
                )),
                Err(e) => report.fail(target, &e),
            }
            continue;
        }

        let result = remove_from_target(target, key, options.dry_run);
        if let Ok(outcome) = &result
            && outcome.status != TargetStatus::Skipped
            && outcome.status != TargetStatus::Missing
        {
            found = true;
        }
        report.record(target, result);
    }

    if !found && report.success() {
        return Err(Error::KeyNotFound {
            key: key.to_string(),
        });
    }
    Ok(report)
}

fn remove_from_target(target: &Target, key: &str, dry_run: bool) -> Result<TargetOutcome> {
    let document = target.document()?;
    if !document.exists {
        return Ok(TargetOutcome::new(
            target,
            TargetStatus::Missing,
            false,
            MergePlan::default(),
        ));
    }

    match merge::remove(&document.entries, key) {
        Ok((entries, entry)) => {
            let plan = MergePlan::new(vec![entry]);
            let status = settle(&plan, dry_run);
            if status == TargetStatus::Written {
                let rendered = target.render(&document, &entries)?;
                target.write(&rendered)?;
            }
            Ok(TargetOutcome::new(target, status, true, plan))
        }
        Err(Error::KeyNotFound { .. }) => {
            tracing::debug!(target_name = %target.name, key = %key, "Key absent, nothing to remove");
            Ok(TargetOutcome::new(
                target,
                TargetStatus::Skipped,
                true,
                MergePlan::default(),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Keep only the plan entry for `key`
fn keyed(plan: MergePlan, key: &str) -> MergePlan {
    MergePlan::new(plan.iter().filter(|e| e.key == key).cloned().collect())
}

fn settle(plan: &MergePlan, dry_run: bool) -> TargetStatus {
    match (plan.changes_destination(), dry_run) {
        (false, _) => TargetStatus::UpToDate,
        (true, true) => TargetStatus::Pending,
        (true, false) => TargetStatus::Written,
    }
}

/// Outcome of the central store's part of an add or remove
struct CentralOutcome {
    existed: bool,
    status: TargetStatus,
    plan: MergePlan,
}

impl CentralOutcome {
    /// Flush the store unless dry-run and record the outcome
    fn finish(self, store: &mut CentralStore, dry_run: bool, report: &mut RunReport) {
        let target = store.target().clone();
        let mut status = self.status;
        if !dry_run {
            match store.flush() {
                Ok(true) => status = TargetStatus::Written,
                Ok(false) => {}
                Err(e) => {
                    report.fail(&target, &e);
                    return;
                }
            }
        }
        report.push(TargetOutcome::new(&target, status, self.existed, self.plan));
    }
}
