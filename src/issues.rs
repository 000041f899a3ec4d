//! Findings collected during a run.
//!
//! None of these abort a run. Each issue carries what the reporter needs to
//! render it: location, message and an optional note.

use enum_dispatch::enum_dispatch;
use serde::Serialize;

use crate::core::store::PlaceholderSet;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    PlaceholderMismatch,
    UnresolvedViolation,
    AmbiguousMatch,
    MissingTranslation,
    MissingImport,
    FileError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::PlaceholderMismatch => write!(f, "placeholder-mismatch"),
            Rule::UnresolvedViolation => write!(f, "unresolved-violation"),
            Rule::AmbiguousMatch => write!(f, "ambiguous-match"),
            Rule::MissingTranslation => write!(f, "missing-translation"),
            Rule::MissingImport => write!(f, "missing-import"),
            Rule::FileError => write!(f, "file-error"),
        }
    }
}

// ============================================================
// Locations
// ============================================================

/// A position in a source file, with the line text for context display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
    pub source_line: String,
}

/// A position in a translation file; the line is known when the key exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLocation {
    pub file_path: String,
    pub line: Option<usize>,
}

impl FileLocation {
    pub fn new(file_path: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            file_path: file_path.into(),
            line,
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// Translation whose placeholders differ from the reference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMismatchIssue {
    pub location: FileLocation,
    pub language: String,
    pub key: String,
    pub expected: PlaceholderSet,
    pub found: PlaceholderSet,
    /// False when the translation was provided for merge and rejected.
    pub stored: bool,
}

impl PlaceholderMismatchIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::PlaceholderMismatch
    }
}

/// Lookup call left inside a constant expression the repair pass could not fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedViolationIssue {
    pub location: SourceLocation,
    pub modifier: String,
}

impl UnresolvedViolationIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnresolvedViolation
    }
}

/// Literal matching several differently-cased stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousMatchIssue {
    pub location: SourceLocation,
    pub text: String,
    pub keys: Vec<String>,
}

impl AmbiguousMatchIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::AmbiguousMatch
    }
}

/// Reference key absent from one or more target languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingTranslationIssue {
    pub location: FileLocation,
    pub key: String,
    pub missing_in: Vec<String>,
}

impl MissingTranslationIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MissingTranslation
    }
}

/// Part file rewritten to use lookups whose library lacks the lookup import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingImportIssue {
    pub location: FileLocation,
    pub library: String,
    pub import: String,
}

impl MissingImportIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MissingImport
    }
}

/// File that could not be read, parsed or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl FileErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::FileError
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum Issue {
    PlaceholderMismatch(PlaceholderMismatchIssue),
    UnresolvedViolation(UnresolvedViolationIssue),
    AmbiguousMatch(AmbiguousMatchIssue),
    MissingTranslation(MissingTranslationIssue),
    MissingImport(MissingImportIssue),
    FileError(FileErrorIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    Source(&'a SourceLocation),
    File(&'a FileLocation),
    /// File-level only, no line.
    Path(&'a str),
}

impl ReportLocation<'_> {
    pub fn file_path(&self) -> &str {
        match self {
            ReportLocation::Source(loc) => &loc.file_path,
            ReportLocation::File(loc) => &loc.file_path,
            ReportLocation::Path(path) => path,
        }
    }

    /// 1-based line, 0 when unknown.
    pub fn line(&self) -> usize {
        match self {
            ReportLocation::Source(loc) => loc.line,
            ReportLocation::File(loc) => loc.line.unwrap_or(0),
            ReportLocation::Path(_) => 0,
        }
    }
}

/// Uniform view of an issue for the reporters.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message (key, text, error).
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }
}

impl Report for PlaceholderMismatchIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File(&self.location)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "({}) expected placeholders {}, found {}",
            self.language, self.expected, self.found
        ))
    }

    fn hint(&self) -> Option<String> {
        (!self.stored).then(|| "translation was not applied".to_string())
    }
}

impl Report for UnresolvedViolationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.location)
    }

    fn message(&self) -> String {
        self.location.source_line.trim().to_string()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "lookup call inside a `{}` expression that could not be repaired",
            self.modifier
        ))
    }

    fn hint(&self) -> Option<String> {
        Some(format!("remove `{}` from the enclosing expression", self.modifier))
    }
}

impl Report for AmbiguousMatchIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.location)
    }

    fn message(&self) -> String {
        self.text.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("matches differently-cased keys: {}", self.keys.join(", ")))
    }
}

impl Report for MissingTranslationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File(&self.location)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("missing in: {}", self.missing_in.join(", ")))
    }
}

impl Report for MissingImportIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File(&self.location)
    }

    fn message(&self) -> String {
        format!("part of {}", self.library)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("part files cannot hold imports".to_string())
    }

    fn hint(&self) -> Option<String> {
        Some(format!("add `{}` to the library", self.import))
    }
}

impl Report for FileErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Path(&self.file_path)
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}
