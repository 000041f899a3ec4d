use std::{fs, path::Path};

use anyhow::{Context, Result};

/// A source file read at the start of a run.
///
/// Content is never edited in place: rewriting produces a new string which is
/// written back only when it differs from `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Path as reported by discovery; the stable identity of the unit.
    pub path: String,
    /// Owning package/module (the scope identifier given on the command line).
    pub scope: String,
    /// File name of the screen, e.g. `profile_screen.dart`.
    pub screen: String,
    pub content: String,
}

impl SourceUnit {
    pub fn new(
        path: impl Into<String>,
        scope: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let screen = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            scope: scope.into(),
            screen,
            content: content.into(),
        }
    }

    pub fn read(path: &str, scope: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
        Ok(Self::new(path, scope, content))
    }

    /// Write `new_content` back to disk if it differs from what was read.
    ///
    /// Returns whether a write happened.
    pub fn write_if_changed(&self, new_content: &str) -> Result<bool> {
        if new_content == self.content {
            return Ok(false);
        }
        fs::write(&self.path, new_content)
            .with_context(|| format!("Failed to write file: {}", self.path))?;
        Ok(true)
    }
}
