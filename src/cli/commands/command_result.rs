use serde::Serialize;

use crate::{
    core::summary::RunSummary,
    issues::{Issue, Severity},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Extract,
    Rewrite,
    Repair,
    Run,
    Merge,
    Check,
}

/// Result of running a relingo command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub command: CommandKind,
    pub summary: RunSummary,
    /// All issues recorded during the run, sorted by location.
    pub issues: Vec<Issue>,
    /// Scopes given on the command line that have no source directory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_scopes: Vec<String>,
    #[serde(skip)]
    pub error_count: usize,
    #[serde(skip)]
    pub warning_count: usize,
}

impl CommandResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

pub fn count_severity(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity() == severity).count()
}
