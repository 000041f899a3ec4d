//! Pipeline stages over a [`RunContext`].
//!
//! A full run is `extract`, then `rewrite` (which includes the repair pass),
//! then `finish`. Each stage records issues and summary counts on the context
//! and never aborts on a per-file problem.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{
    core::{
        classify::Classifier,
        context::RunContext,
        file_scanner::DiscoveredFile,
        keys::{KeyScope, role_token},
        matcher::find_candidates,
        repair::{RepairOutcome, RepairPass},
        rewrite::{PartOf, Rewriter, ValueIndex, has_import},
        source::SourceUnit,
        store::{PlaceholderMismatch, language_path},
        summary::LanguageSummary,
    },
    issues::{
        AmbiguousMatchIssue, FileErrorIssue, FileLocation, Issue, MissingImportIssue,
        MissingTranslationIssue, PlaceholderMismatchIssue, SourceLocation,
        UnresolvedViolationIssue,
    },
};

/// Translations provided for merging, per language, in document order.
pub type LanguageEntries = Vec<(String, Vec<(String, String)>)>;

fn read_unit(ctx: &mut RunContext, file: &DiscoveredFile) -> Option<SourceUnit> {
    match SourceUnit::read(&file.path, &file.scope) {
        Ok(unit) => Some(unit),
        Err(e) => {
            ctx.record_file_error(Path::new(&file.path), &e);
            None
        }
    }
}

fn key_scope(ctx: &RunContext, unit: &SourceUnit) -> KeyScope {
    KeyScope::new(
        &unit.scope,
        &unit.screen,
        &ctx.config.scope_prefix,
        &ctx.config.screen_suffixes,
    )
}

/// Find display literals and give each a key in the reference language.
///
/// Texts already stored under the synthesized key are reused; only new keys
/// are added. Nothing is written here.
pub fn extract(ctx: &mut RunContext, files: &[DiscoveredFile]) {
    let classifier = Classifier::new(&ctx.config);

    for file in files {
        let Some(unit) = read_unit(ctx, file) else {
            continue;
        };
        let candidates = classifier.select(find_candidates(ctx.matcher.as_ref(), &unit.content));
        let scope = key_scope(ctx, &unit);

        let mut keys_added = Vec::new();
        for (i, candidate) in candidates.iter().enumerate() {
            let role = role_token(&candidate.text, candidate.role);
            let store = &ctx.store;
            let assignment = ctx.keys.assign(&scope, &role, &candidate.text, i + 1, |k| {
                store.reference().get(k)
            });
            if assignment.is_new {
                ctx.store.add_reference_entry(&assignment.key, &candidate.text);
                keys_added.push(assignment.key);
            }
        }

        let reference = ctx.store.reference_language().to_string();
        language_summary(ctx, &reference).added += keys_added.len();

        let display = ctx.display_path(Path::new(&unit.path));
        let verbose = ctx.verbose;
        let summary = ctx.summary.file_mut(&display, &unit.scope);
        summary.literals_found = candidates.len();
        summary.keys_added = keys_added;
        if verbose {
            summary.candidates = candidates;
        }
    }
}

/// Replace stored literals with lookups, optionally followed by the repair pass.
///
/// Files are written only when the context applies changes.
pub fn rewrite(ctx: &mut RunContext, files: &[DiscoveredFile], with_repair: bool) -> Result<()> {
    let index = ValueIndex::from_language(ctx.store.reference());
    let repair_pass = RepairPass::new(&ctx.config.lookup)?;
    // Rewritten content of every file seen, for checking part files' libraries.
    let mut rewritten: HashMap<PathBuf, String> = HashMap::new();
    let mut parts: Vec<(String, PathBuf, PartOf)> = Vec::new();

    for file in files {
        let Some(unit) = read_unit(ctx, file) else {
            continue;
        };
        let prefix = key_scope(ctx, &unit).prefix();
        let outcome = Rewriter::new(ctx.matcher.as_ref(), &ctx.config.lookup, &index)
            .rewrite(&unit.content, &prefix);

        let display = ctx.display_path(Path::new(&unit.path));
        for literal in &outcome.ambiguous {
            let location = source_location(&display, &unit.content, literal.line, literal.col);
            ctx.issues.push(Issue::from(AmbiguousMatchIssue {
                location,
                text: literal.text.clone(),
                keys: literal.keys.clone(),
            }));
        }

        let repaired = if with_repair {
            repair_pass.repair(&outcome.content)
        } else {
            RepairOutcome {
                content: outcome.content.clone(),
                ..Default::default()
            }
        };
        record_unresolved(ctx, &display, &repaired);

        let summary = ctx.summary.file_mut(&display, &unit.scope);
        summary.edits = outcome.edits.len();
        summary.import_inserted = outcome.import_inserted;
        summary.repairs = repaired.fixes;
        summary.unresolved = repaired.unresolved.len();
        summary.rewritten = repaired.content != unit.content;

        write_unit(ctx, &unit, &repaired.content);
        if let Some(part) = outcome.library_import {
            let library = Path::new(&unit.path)
                .parent()
                .unwrap_or(Path::new(""))
                .join(&part.library);
            parts.push((display, library, part));
        }
        rewritten.insert(PathBuf::from(&unit.path), repaired.content);
    }

    let import = ctx.config.lookup.import.trim().to_string();
    for (display, library, part) in parts {
        let imported = match rewritten.get(&library) {
            Some(content) => has_import(content, &import),
            None => fs::read_to_string(&library).is_ok_and(|c| has_import(&c, &import)),
        };
        if !imported {
            ctx.issues.push(Issue::from(MissingImportIssue {
                location: FileLocation::new(display, Some(part.line)),
                library: part.library,
                import: import.clone(),
            }));
        }
    }
    Ok(())
}

/// Run only the repair pass over the given files.
pub fn repair(ctx: &mut RunContext, files: &[DiscoveredFile]) -> Result<()> {
    let repair_pass = RepairPass::new(&ctx.config.lookup)?;

    for file in files {
        let Some(unit) = read_unit(ctx, file) else {
            continue;
        };
        let repaired = repair_pass.repair(&unit.content);
        let display = ctx.display_path(Path::new(&unit.path));
        record_unresolved(ctx, &display, &repaired);

        let summary = ctx.summary.file_mut(&display, &unit.scope);
        summary.repairs = repaired.fixes;
        summary.unresolved = repaired.unresolved.len();
        summary.rewritten = repaired.content != unit.content;

        write_unit(ctx, &unit, &repaired.content);
    }
    Ok(())
}

fn record_unresolved(ctx: &mut RunContext, display: &str, repaired: &RepairOutcome) {
    let modifier = ctx.config.lookup.modifier.clone();
    for violation in &repaired.unresolved {
        ctx.issues.push(Issue::from(UnresolvedViolationIssue {
            location: SourceLocation {
                file_path: display.to_string(),
                line: violation.line,
                col: violation.col,
                source_line: violation.source_line.clone(),
            },
            modifier: modifier.clone(),
        }));
    }
}

fn write_unit(ctx: &mut RunContext, unit: &SourceUnit, content: &str) {
    if !ctx.apply {
        return;
    }
    if let Err(e) = unit.write_if_changed(content) {
        ctx.record_file_error(Path::new(&unit.path), &e);
    }
}

fn source_location(file_path: &str, content: &str, line: usize, col: usize) -> SourceLocation {
    SourceLocation {
        file_path: file_path.to_string(),
        line,
        col,
        source_line: content
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .to_string(),
    }
}

/// Merge provided translations, then finish the run.
///
/// `reference` entries go into the reference language unchecked. Target
/// entries are placeholder-checked; rejected ones are reported and not stored.
pub fn merge(
    ctx: &mut RunContext,
    source_name: &str,
    reference: Option<Vec<(String, String)>>,
    translations: LanguageEntries,
) {
    if let Some(entries) = reference {
        let lang = ctx.store.reference_language().to_string();
        match ctx.store.merge(&lang, entries) {
            Ok(outcome) => language_summary(ctx, &lang).record_merge(&outcome),
            Err(e) => record_merge_error(ctx, source_name, &e),
        }
    }

    for (lang, entries) in translations {
        let outcome = match ctx.store.merge_translations(&lang, entries) {
            Ok(outcome) => outcome,
            Err(e) => {
                record_merge_error(ctx, source_name, &e);
                continue;
            }
        };
        for mismatch in &outcome.rejected {
            push_mismatch(ctx, mismatch, false);
        }
        let summary = language_summary(ctx, &lang);
        summary.record_merge(&outcome);
        summary.unknown += outcome.unknown.len();
        ctx.summary.placeholder_mismatches.extend(outcome.rejected);
    }

    finish(ctx);
}

fn record_merge_error(ctx: &mut RunContext, source_name: &str, error: &anyhow::Error) {
    ctx.issues.push(Issue::from(FileErrorIssue {
        file_path: source_name.to_string(),
        error: format!("{:#}", error),
    }));
}

fn language_summary<'a>(ctx: &'a mut RunContext, lang: &str) -> &'a mut LanguageSummary {
    let dir = ctx.config.translations_path(&ctx.root);
    ctx.summary.language_mut(lang, language_path(&dir, lang))
}

/// Fill stand-ins, validate placeholders and write changed translation files.
pub fn finish(ctx: &mut RunContext) {
    let languages: Vec<String> = std::iter::once(ctx.store.reference_language().to_string())
        .chain(ctx.store.targets().map(|t| t.language.clone()))
        .collect();
    for lang in &languages {
        let needed = ctx.store.missing_keys(lang).len();
        if lang != ctx.store.reference_language() {
            language_summary(ctx, lang).stand_ins += needed;
        } else {
            language_summary(ctx, lang);
        }
    }
    ctx.summary.stand_ins_added += ctx.store.sync_stand_ins();

    validate(ctx);

    if ctx.apply {
        for (lang, path, result) in ctx.store.persist_all() {
            match result {
                Ok(outcome) => {
                    let summary = language_summary(ctx, &lang);
                    summary.written = outcome.written;
                    summary.backup = outcome.backup;
                }
                Err(e) => ctx.record_file_error(&path, &e),
            }
        }
    }

    tally(ctx);
}

/// Report stored translations whose placeholders differ from the reference.
pub fn validate(ctx: &mut RunContext) {
    let languages: Vec<String> = ctx.store.targets().map(|t| t.language.clone()).collect();
    for lang in languages {
        for mismatch in ctx.store.validate_placeholders(&lang) {
            push_mismatch(ctx, &mismatch, true);
            ctx.summary.placeholder_mismatches.push(mismatch);
        }
    }
}

fn push_mismatch(ctx: &mut RunContext, mismatch: &PlaceholderMismatch, stored: bool) {
    let (path, line) = match ctx.store.language(&mismatch.language) {
        Some(file) => (file.path.clone(), file.key_line(&mismatch.key)),
        None => (
            language_path(&ctx.config.translations_path(&ctx.root), &mismatch.language),
            None,
        ),
    };
    let file_path = ctx.display_path(&path);
    ctx.issues.push(Issue::from(PlaceholderMismatchIssue {
        location: FileLocation::new(file_path, if stored { line } else { None }),
        language: mismatch.language.clone(),
        key: mismatch.key.clone(),
        expected: mismatch.reference.clone(),
        found: mismatch.translation.clone(),
        stored,
    }));
}

/// Validate placeholders and report reference keys absent from targets.
///
/// Read-only: nothing is synced or written.
pub fn check(ctx: &mut RunContext) {
    validate(ctx);

    let mut missing: Vec<(String, Vec<String>)> = ctx
        .store
        .reference()
        .iter()
        .map(|(key, _)| (key.to_string(), Vec::new()))
        .collect();
    for target in ctx.store.targets() {
        for (key, languages) in missing.iter_mut() {
            if !target.contains_key(key) {
                languages.push(target.language.clone());
            }
        }
    }

    let reference = ctx.store.reference();
    let file_path = ctx.display_path(&reference.path);
    let issues: Vec<Issue> = missing
        .into_iter()
        .filter(|(_, languages)| !languages.is_empty())
        .map(|(key, missing_in)| {
            Issue::from(MissingTranslationIssue {
                location: FileLocation::new(file_path.clone(), reference.key_line(&key)),
                key,
                missing_in,
            })
        })
        .collect();
    ctx.issues.extend(issues);
    tally(ctx);
}

/// Recompute summary totals, including the file error count.
pub fn tally(ctx: &mut RunContext) {
    ctx.summary.tally();
    ctx.summary.file_errors = ctx
        .issues
        .iter()
        .filter(|i| matches!(i, Issue::FileError(_)))
        .count();
}
