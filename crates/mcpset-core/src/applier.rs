//! Applier: merge the central store into target files (`sync`)

use mcpset_content::{Entries, unified_diff};

use crate::error::Result;
use crate::merge::{Policy, merge};
use crate::report::{RunReport, TargetOutcome, TargetStatus};
use crate::store::CentralStore;
use crate::target::{Target, TargetRegistry};

/// Options for [`apply`]
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Target names to write, in order. Empty writes every non-central target.
    pub targets: Vec<String>,
    pub dry_run: bool,
    /// Attach a unified diff of each file to its outcome
    pub diff: bool,
    pub policy: Policy,
}

/// Merge a snapshot of the store into each selected target.
///
/// A target is written only when its plan changes it. The store itself is
/// never modified.
pub fn apply(
    registry: &TargetRegistry,
    store: &CentralStore,
    options: &ApplyOptions,
) -> Result<RunReport> {
    let selected = registry.select(&options.targets)?;
    let snapshot = store.snapshot();
    let mut report = RunReport::new(options.dry_run);

    for target in selected {
        if target.is_central() {
            tracing::debug!("Skipping central store as a sync destination");
            continue;
        }
        let result = apply_one(target, &snapshot, options);
        report.record(target, result);
    }

    Ok(report)
}

fn apply_one(target: &Target, snapshot: &Entries, options: &ApplyOptions) -> Result<TargetOutcome> {
    let document = target.document()?;
    let outcome = merge(snapshot, &document.entries, options.policy);
    let changes = outcome.plan.changes_destination();

    tracing::debug!(
        target_name = %target.name,
        entries = outcome.entries.len(),
        changes,
        "Planned target"
    );

    if !changes {
        return Ok(TargetOutcome::new(
            target,
            TargetStatus::UpToDate,
            document.exists,
            outcome.plan,
        ));
    }

    let rendered = target.render(&document, &outcome.entries)?;
    let diff = options
        .diff
        .then(|| unified_diff(target.path.as_str(), &document.source, &rendered));

    let status = if options.dry_run {
        TargetStatus::Pending
    } else {
        target.write(&rendered)?;
        TargetStatus::Written
    };

    Ok(TargetOutcome::new(target, status, document.exists, outcome.plan).with_diff(diff))
}
