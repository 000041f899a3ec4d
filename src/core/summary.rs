//! Run summary: per-file and aggregate counts, serializable for `--json`.

use std::{collections::BTreeMap, path::PathBuf};

use serde::Serialize;

use crate::core::{
    matcher::Candidate,
    repair::RepairFix,
    store::{MergeOutcome, PlaceholderMismatch},
};

/// What happened to one source file.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub scope: String,
    /// Distinct display texts accepted by the classifier.
    pub literals_found: usize,
    /// Keys this file added to the reference language.
    pub keys_added: Vec<String>,
    pub edits: usize,
    pub import_inserted: bool,
    pub repairs: Vec<RepairFix>,
    pub unresolved: usize,
    /// New content differs from the original (written only with `--apply`).
    pub rewritten: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
}

/// What happened to one translation file.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSummary {
    pub path: PathBuf,
    pub added: usize,
    pub updated: usize,
    pub kept: usize,
    pub stand_ins: usize,
    /// Provided translations for keys the reference language lacks.
    pub unknown: usize,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl LanguageSummary {
    pub fn record_merge(&mut self, outcome: &MergeOutcome) {
        self.added += outcome.added.len();
        self.updated += outcome.updated.len();
        self.kept += outcome.kept.len();
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub applied: bool,
    pub files_scanned: usize,
    pub literals_found: usize,
    pub keys_added: usize,
    pub files_rewritten: usize,
    pub edits: usize,
    pub repairs: usize,
    pub stand_ins_added: usize,
    pub placeholder_mismatches: Vec<PlaceholderMismatch>,
    pub unresolved_violations: usize,
    pub file_errors: usize,
    /// Keyed by file path, in path order.
    pub files: BTreeMap<String, FileSummary>,
    /// Keyed by language code.
    pub languages: BTreeMap<String, LanguageSummary>,
}

impl RunSummary {
    pub fn file_mut(&mut self, path: &str, scope: &str) -> &mut FileSummary {
        self.files
            .entry(path.to_string())
            .or_insert_with(|| FileSummary {
                scope: scope.to_string(),
                ..Default::default()
            })
    }

    pub fn language_mut(&mut self, language: &str, path: PathBuf) -> &mut LanguageSummary {
        self.languages
            .entry(language.to_string())
            .or_insert_with(|| LanguageSummary {
                path,
                ..Default::default()
            })
    }

    /// Recompute the aggregate counters from the per-file entries.
    pub fn tally(&mut self) {
        self.files_scanned = self.files.len();
        self.literals_found = self.files.values().map(|f| f.literals_found).sum();
        self.keys_added = self.files.values().map(|f| f.keys_added.len()).sum();
        self.files_rewritten = self.files.values().filter(|f| f.rewritten).count();
        self.edits = self.files.values().map(|f| f.edits).sum();
        self.repairs = self.files.values().map(|f| f.repairs.len()).sum();
        self.unresolved_violations = self.files.values().map(|f| f.unresolved).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repair::RepairStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tally_aggregates_files() {
        let mut summary = RunSummary::default();
        {
            let file = summary.file_mut("a.dart", "app");
            file.literals_found = 3;
            file.keys_added = vec!["k1".to_string(), "k2".to_string()];
            file.edits = 3;
            file.rewritten = true;
        }
        {
            let file = summary.file_mut("b.dart", "app");
            file.literals_found = 1;
            file.repairs.push(RepairFix {
                line: 4,
                strategy: RepairStrategy::Enclosing,
            });
            file.unresolved = 1;
        }
        summary.tally();

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.literals_found, 4);
        assert_eq!(summary.keys_added, 2);
        assert_eq!(summary.files_rewritten, 1);
        assert_eq!(summary.edits, 3);
        assert_eq!(summary.repairs, 1);
        assert_eq!(summary.unresolved_violations, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut summary = RunSummary::default();
        summary.file_mut("a.dart", "app").keys_added.push("k".to_string());
        summary.tally();

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["keysAdded"], 1);
        assert_eq!(value["files"]["a.dart"]["keysAdded"][0], "k");
        assert_eq!(value["files"]["a.dart"]["importInserted"], false);
        assert!(value["files"]["a.dart"].get("candidates").is_none());
    }
}
