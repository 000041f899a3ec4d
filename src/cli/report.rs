//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format; the run summary follows as a
//! few plain lines. Separate from the pipeline so relingo can be used as a
//! library.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{CommandKind, CommandResult};
use crate::core::summary::RunSummary;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print the command result for humans.
pub fn print(result: &CommandResult, verbose: bool) {
    print_missing_scopes(&result.missing_scopes, &mut io::stderr().lock());

    let mut out = io::stdout().lock();
    if verbose {
        print_files(&result.summary, &mut out);
    }
    print_summary(result, &mut out);
    report_to(&result.issues, &mut out);

    if !result.has_issues() {
        print_success_to(result, &mut out);
    }
}

/// Print the command result as one pretty JSON document.
pub fn print_json(result: &CommandResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize summary")?;
    println!("{}", json);
    Ok(())
}

/// Print issues in cargo-style format to a writer, followed by a problem count.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let max_line_width = calculate_max_line_width(issues);
    for issue in issues {
        print_issue(issue, writer, max_line_width);
    }
    print_problem_count(issues, writer);
}

fn print_missing_scopes<W: Write>(scopes: &[String], writer: &mut W) {
    for scope in scopes {
        let _ = writeln!(
            writer,
            "{} scope '{}' has no source directory",
            "warning:".bold().yellow(),
            scope
        );
    }
}

fn print_success_to<W: Write>(result: &CommandResult, writer: &mut W) {
    let files = result.summary.files_scanned;
    let msg = match result.command {
        CommandKind::Check | CommandKind::Merge => "No issues found".to_string(),
        _ => format!(
            "Processed {} source {} - no issues found",
            files,
            plural(files, "file", "files")
        ),
    };
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), msg.green());
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

// ============================================================
// Summary
// ============================================================

fn print_summary<W: Write>(result: &CommandResult, writer: &mut W) {
    let summary = &result.summary;
    let applied = summary.applied;
    let verb = |done: &'static str, pending: &'static str| {
        if applied {
            done.green().bold()
        } else {
            pending.yellow().bold()
        }
    };

    let mut wrote_any = false;
    if summary.keys_added > 0 {
        let _ = writeln!(
            writer,
            "{} {} key(s) from {} literal(s)",
            verb("Added", "Would add"),
            summary.keys_added,
            summary.literals_found
        );
        wrote_any = true;
    }
    if summary.files_rewritten > 0 {
        let _ = writeln!(
            writer,
            "{} {} file(s): {} literal(s) replaced, {} expression(s) repaired",
            verb("Rewrote", "Would rewrite"),
            summary.files_rewritten,
            summary.edits,
            summary.repairs
        );
        wrote_any = true;
    }
    if summary.stand_ins_added > 0 {
        let _ = writeln!(
            writer,
            "{} {} stand-in(s) to target languages",
            verb("Added", "Would add"),
            summary.stand_ins_added
        );
        wrote_any = true;
    }
    for (lang, language) in &summary.languages {
        if language.added + language.updated == 0 || result.command != CommandKind::Merge {
            continue;
        }
        let _ = writeln!(
            writer,
            "  - {}: {} added, {} updated, {} kept",
            lang, language.added, language.updated, language.kept
        );
        wrote_any = true;
    }
    for language in summary.languages.values().filter(|l| l.written) {
        let _ = writeln!(
            writer,
            "  - wrote {}{}",
            language.path.display(),
            language
                .backup
                .as_ref()
                .map(|b| format!(" (backup: {})", b.display()))
                .unwrap_or_default()
        );
    }

    if wrote_any && !applied {
        let _ = writeln!(writer, "Run with {} to write these changes.", "--apply".cyan());
    }
    if wrote_any {
        let _ = writeln!(writer);
    }
}

fn print_files<W: Write>(summary: &RunSummary, writer: &mut W) {
    for (path, file) in &summary.files {
        let _ = writeln!(
            writer,
            "{} {}: {} literal(s), {} new key(s), {} edit(s), {} repair(s)",
            "-->".blue(),
            path,
            file.literals_found,
            file.keys_added.len(),
            file.edits,
            file.repairs.len()
        );
        for candidate in &file.candidates {
            let _ = writeln!(
                writer,
                "    {:>4} {} \"{}\" {}",
                candidate.line.to_string().blue(),
                "|".blue(),
                candidate.text,
                candidate.role.to_string().dimmed()
            );
        }
    }
    if !summary.files.is_empty() {
        let _ = writeln!(writer);
    }
}

// ============================================================
// Issues
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);

    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    let position = match (line, col) {
        (0, _) => file_path.to_string(),
        (line, 0) => format!("{}:{}", file_path, line),
        (line, col) => format!("{}:{}:{}", file_path, line, col),
    };
    let _ = writeln!(writer, "  {} {}", "-->".blue(), position);

    if let Some(source_line) = source_line {
        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_problem_count<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        plural(total_errors, "error", "errors").red(),
        total_warnings,
        plural(total_warnings, "warning", "warnings").yellow()
    );
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Source(ctx) => (
            ctx.file_path.as_str(),
            ctx.line,
            ctx.col,
            Some(ctx.source_line.as_str()),
        ),
        ReportLocation::File(ctx) => (ctx.file_path.as_str(), ctx.line.unwrap_or(0), 0, None),
        ReportLocation::Path(path) => (*path, 0, 0, None),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line),
            _ => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}
