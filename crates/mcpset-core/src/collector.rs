//! Collector: fold target entries into the central store (`init`)

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::merge::{Decision, Policy, merge};
use crate::report::{RunReport, TargetOutcome, TargetStatus};
use crate::store::CentralStore;
use crate::target::{CENTRAL_NAME, Target, TargetRegistry};

/// Options for [`collect`]
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Target names to read, in order. Empty reads every non-central target.
    pub targets: Vec<String>,
    /// Persist the store. Without it the run is a preview.
    pub apply: bool,
    /// `AppendOnly` or `DeepAppend`
    pub policy: Policy,
}

/// Where a key in the store came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub key: String,
    pub introduced_by: String,
    /// Later targets that also define the key
    pub also_defined_in: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    #[serde(flatten)]
    pub run: RunReport,
    /// One record per key in the resulting store, sorted by key
    pub provenance: Vec<Provenance>,
    /// Whether the central store was written
    pub store_written: bool,
}

/// Fold the selected targets into `store`, first target to introduce a key
/// winning. Target failures are reported and do not stop the run.
pub fn collect(
    registry: &TargetRegistry,
    store: &mut CentralStore,
    options: &CollectOptions,
) -> Result<CollectReport> {
    let selected = registry.select(&options.targets)?;
    let mut run = RunReport::new(!options.apply);

    let mut provenance: BTreeMap<String, Provenance> = store
        .entries()
        .keys()
        .map(|key| {
            let record = Provenance {
                key: key.clone(),
                introduced_by: CENTRAL_NAME.to_string(),
                also_defined_in: Vec::new(),
            };
            (key.clone(), record)
        })
        .collect();

    for target in selected {
        if target.is_central() {
            tracing::debug!("Skipping central store as a collect source");
            continue;
        }
        let result = fold(target, store, options.policy, &mut provenance);
        run.record(target, result);
    }

    let mut store_written = false;
    if options.apply {
        match store.flush() {
            Ok(written) => store_written = written,
            Err(e) => run.fail(store.target(), &e),
        }
    }

    Ok(CollectReport {
        run,
        provenance: provenance.into_values().collect(),
        store_written,
    })
}

fn fold(
    target: &Target,
    store: &mut CentralStore,
    policy: Policy,
    provenance: &mut BTreeMap<String, Provenance>,
) -> Result<TargetOutcome> {
    let document = target.document()?;
    if !document.exists {
        tracing::warn!(target_name = %target.name, path = %target.path, "Target file missing, nothing collected");
        return Ok(TargetOutcome::new(
            target,
            TargetStatus::Missing,
            false,
            Default::default(),
        ));
    }

    let outcome = merge(&document.entries, store.entries(), policy);
    for entry in outcome.plan.iter() {
        match entry.decision {
            Decision::Added => {
                provenance.insert(
                    entry.key.clone(),
                    Provenance {
                        key: entry.key.clone(),
                        introduced_by: target.name.clone(),
                        also_defined_in: Vec::new(),
                    },
                );
            }
            Decision::SkippedExisting | Decision::Extended | Decision::Overridden => {
                if let Some(record) = provenance.get_mut(&entry.key) {
                    record.also_defined_in.push(target.name.clone());
                }
                if entry.divergent {
                    tracing::info!(
                        key = %entry.key,
                        target_name = %target.name,
                        decision = %entry.decision,
                        "Key already collected from an earlier source"
                    );
                }
            }
            Decision::Removed | Decision::Unchanged => {}
        }
    }

    let status = if outcome.plan.changes_destination() {
        TargetStatus::Pending
    } else {
        TargetStatus::UpToDate
    };
    store.replace(outcome.entries);
    Ok(TargetOutcome::new(target, status, true, outcome.plan))
}
