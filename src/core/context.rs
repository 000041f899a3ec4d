//! Run-scoped state passed explicitly to every pipeline stage.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{
    config::Config,
    core::{
        keys::KeyRegistry,
        matcher::{LiteralMatcher, RegexMatcher},
        store::TranslationStore,
        summary::RunSummary,
    },
    issues::{FileErrorIssue, Issue},
};

/// Everything one invocation reads and mutates.
///
/// Holds the in-memory Translation Store and the key registry, so two contexts
/// never share disambiguation state.
pub struct RunContext {
    pub config: Config,
    pub root: PathBuf,
    pub store: TranslationStore,
    pub keys: KeyRegistry,
    pub matcher: Box<dyn LiteralMatcher>,
    /// Write results to disk; otherwise the run is a dry run.
    pub apply: bool,
    pub verbose: bool,
    pub issues: Vec<Issue>,
    pub summary: RunSummary,
}

impl RunContext {
    /// Load the Translation Store and set up the built-in matcher.
    ///
    /// Fails only when the reference language cannot be loaded. Broken target
    /// files become [`FileErrorIssue`]s.
    pub fn new(config: Config, root: &Path, apply: bool, verbose: bool) -> Result<Self> {
        let store = TranslationStore::load(
            &config.translations_path(root),
            &config.reference_language,
            &config.target_languages,
        )?;

        let issues = store
            .unavailable()
            .iter()
            .map(|u| {
                Issue::from(FileErrorIssue {
                    file_path: display_path(root, &u.path),
                    error: u.error.clone(),
                })
            })
            .collect();

        let matcher = Box::new(RegexMatcher::with_defaults(&config.lookup.suffix));
        let summary = RunSummary {
            applied: apply,
            ..Default::default()
        };

        Ok(Self {
            config,
            root: root.to_path_buf(),
            store,
            keys: KeyRegistry::new(),
            matcher,
            apply,
            verbose,
            issues,
            summary,
        })
    }

    /// Swap the literal matching strategy.
    pub fn with_matcher(mut self, matcher: Box<dyn LiteralMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Path for display, relative to the project root when possible.
    pub fn display_path(&self, path: &Path) -> String {
        display_path(&self.root, path)
    }

    pub fn record_file_error(&mut self, path: &Path, error: &anyhow::Error) {
        self.issues.push(Issue::from(FileErrorIssue {
            file_path: display_path(&self.root, path),
            error: format!("{:#}", error),
        }));
    }
}

pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
