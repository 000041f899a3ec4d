use std::{env, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use super::{CommandKind, CommandResult, count_severity};
use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, ConfigLoadResult, load_config},
    core::{RunContext, ScanResult, pipeline, scan_files},
    issues::{Report, Severity},
};

/// Load the configuration, apply the CLI overrides and set up the run.
pub fn load_context(common: &CommonArgs, apply: bool) -> Result<RunContext> {
    let root = match &common.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Project root not found: {}", root.display()))?;

    let ConfigLoadResult {
        mut config,
        from_file,
    } = load_config(&root)?;
    if common.verbose && !from_file {
        eprintln!(
            "{} No {} found, using defaults",
            "note:".bold(),
            CONFIG_FILE_NAME
        );
    }

    if let Some(dir) = &common.translations_dir {
        config.translations_dir = dir.clone();
    }
    if let Some(lang) = &common.reference_language {
        config.reference_language = lang.clone();
        config.target_languages.retain(|l| l != lang);
    }
    config.validate()?;

    RunContext::new(config, &root, apply, common.verbose)
}

/// Discover the files of `scopes` under the project root.
pub fn discover(ctx: &RunContext, scopes: &[String]) -> ScanResult {
    scan_files(&ctx.root, scopes, &ctx.config, ctx.verbose)
}

pub fn finish(kind: CommandKind, mut ctx: RunContext, missing_scopes: Vec<String>) -> CommandResult {
    pipeline::tally(&mut ctx);

    let mut issues = ctx.issues;
    issues.sort_by(|a, b| {
        let (a_loc, b_loc) = (a.location(), b.location());
        a_loc
            .file_path()
            .cmp(b_loc.file_path())
            .then_with(|| a_loc.line().cmp(&b_loc.line()))
    });

    CommandResult {
        command: kind,
        summary: ctx.summary,
        error_count: count_severity(&issues, Severity::Error),
        warning_count: count_severity(&issues, Severity::Warning),
        issues,
        missing_scopes,
    }
}

/// Display name for an input file given on the command line.
pub fn input_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
