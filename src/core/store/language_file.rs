use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value};

/// What a single merge did to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Added,
    /// A stand-in value was replaced.
    Updated,
    /// An existing real value was left alone.
    Kept,
}

/// Result of persisting one language file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    pub written: bool,
    pub backup: Option<PathBuf>,
}

/// A bracket-wrapped copy of the reference text awaiting real translation.
pub fn make_stand_in(reference_value: &str) -> String {
    format!("[{}]", reference_value)
}

/// One `<lang>.json` file: a flat, insertion-ordered key → text document.
///
/// Non-string values found on disk are preserved untouched but are invisible
/// to lookups and merges.
#[derive(Debug, Clone)]
pub struct LanguageFile {
    pub language: String,
    pub path: PathBuf,
    entries: Map<String, Value>,
    /// Exact on-disk content at load time, `None` when the file did not exist.
    original: Option<String>,
    dirty: bool,
}

impl LanguageFile {
    pub fn empty(language: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            path: path.into(),
            entries: Map::new(),
            original: None,
            dirty: false,
        }
    }

    /// Load a language file; a missing file yields an empty document.
    pub fn load(language: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::empty(language, path));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
        let entries = match value {
            Value::Object(map) => map,
            _ => bail!("Root of JSON file must be an object: {}", path.display()),
        };

        Ok(Self {
            language: language.to_string(),
            path: path.to_path_buf(),
            entries,
            original: Some(content),
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// String entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write `value` under `key` when the key is absent or still holds exactly
    /// `stand_in`. Any other value is real and kept.
    pub fn merge_entry(&mut self, key: &str, value: &str, stand_in: Option<&str>) -> MergeAction {
        match self.entries.get(key) {
            None => {
                self.entries
                    .insert(key.to_string(), Value::String(value.to_string()));
                self.dirty = true;
                MergeAction::Added
            }
            Some(Value::String(existing)) if Some(existing.as_str()) == stand_in => {
                if existing != value {
                    self.entries
                        .insert(key.to_string(), Value::String(value.to_string()));
                    self.dirty = true;
                }
                MergeAction::Updated
            }
            Some(_) => MergeAction::Kept,
        }
    }

    /// 1-based line of `"key":` in the on-disk content, if present.
    pub fn key_line(&self, key: &str) -> Option<usize> {
        let content = self.original.as_deref()?;
        let needle = format!("\"{}\"", key);
        content
            .lines()
            .position(|line| {
                line.trim_start()
                    .strip_prefix(needle.as_str())
                    .is_some_and(|rest| rest.trim_start().starts_with(':'))
            })
            .map(|i| i + 1)
    }

    /// Backup the pre-run content, then atomically replace the file.
    ///
    /// A clean file is left alone. The backup `<file>.bak` always holds the
    /// content read at load time, never an intermediate state.
    pub fn persist(&mut self) -> Result<PersistOutcome> {
        if !self.dirty {
            return Ok(PersistOutcome::default());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let backup = match &self.original {
            Some(original) => {
                let backup_path = sibling_path(&self.path, "bak");
                fs::write(&backup_path, original).with_context(|| {
                    format!("Failed to write backup: {}", backup_path.display())
                })?;
                Some(backup_path)
            }
            None => None,
        };

        let content = serde_json::to_string_pretty(&Value::Object(self.entries.clone()))
            .context("Failed to serialize JSON")?;
        let content = format!("{}\n", content);

        let tmp_path = sibling_path(&self.path, "tmp");
        fs::write(&tmp_path, &content)
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace file: {}", self.path.display()))?;

        self.dirty = false;
        Ok(PersistOutcome {
            written: true,
            backup,
        })
    }
}

/// `en.json` -> `en.json.<extension>`
fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
