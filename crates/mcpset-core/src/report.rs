//! Per-target outcomes and failures of a multi-target run

use serde::Serialize;

use crate::error::Error;
use crate::merge::MergePlan;
use crate::target::Target;

/// What happened to one target's file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStatus {
    /// Nothing to write
    UpToDate,
    /// File was written (created when it did not exist)
    Written,
    /// Dry-run or preview: the file would be written
    Pending,
    /// File absent and not created
    Missing,
    /// Key absent from this target, nothing removed
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    pub path: String,
    pub status: TargetStatus,
    /// Whether the file existed before the run
    pub existed: bool,
    pub plan: MergePlan,
    /// Unified diff of the file, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl TargetOutcome {
    pub fn new(target: &Target, status: TargetStatus, existed: bool, plan: MergePlan) -> Self {
        Self {
            target: target.name.clone(),
            path: target.path.to_string(),
            status,
            existed,
            plan,
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: Option<String>) -> Self {
        self.diff = diff;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    pub message: String,
}

/// Report of a run across several targets
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub outcomes: Vec<TargetOutcome>,
    pub failures: Vec<TargetFailure>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// True when no target failed
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn push(&mut self, outcome: TargetOutcome) {
        self.outcomes.push(outcome);
    }

    /// Record a failure; the run carries on with the next target
    pub fn fail(&mut self, target: &Target, error: &Error) {
        tracing::warn!(target_name = %target.name, error = %error, "Target failed");
        self.failures.push(TargetFailure {
            target: target.name.clone(),
            message: error.to_string(),
        });
    }

    /// Record the result of processing one target
    pub fn record(&mut self, target: &Target, result: crate::Result<TargetOutcome>) {
        match result {
            Ok(outcome) => self.push(outcome),
            Err(e) => self.fail(target, &e),
        }
    }

    pub fn outcome(&self, target: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// Number of files written
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == TargetStatus::Written)
            .count()
    }
}
