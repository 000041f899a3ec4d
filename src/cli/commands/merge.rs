use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::{
    CommandKind, CommandResult,
    helper::{finish, input_name, load_context},
};
use crate::{
    cli::args::MergeCommand,
    core::pipeline::{self, LanguageEntries},
};

pub fn merge(cmd: MergeCommand) -> Result<CommandResult> {
    let translations = read_translations(&cmd.translations)?;
    let reference = match &cmd.reference {
        Some(path) => Some(string_entries(read_object(path)?, &input_name(path))?),
        None => None,
    };

    let mut ctx = load_context(&cmd.common, cmd.apply)?;
    pipeline::merge(
        &mut ctx,
        &input_name(&cmd.translations),
        reference,
        translations,
    );

    Ok(finish(CommandKind::Merge, ctx, Vec::new()))
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON object: {}", path.display()))
}

/// Read `{ "<lang>": { "<key>": "<text>" } }`, keeping document order.
fn read_translations(path: &Path) -> Result<LanguageEntries> {
    let name = input_name(path);
    read_object(path)?
        .into_iter()
        .map(|(lang, value)| {
            let Value::Object(entries) = value else {
                bail!("{}: translations for '{}' must be an object", name, lang);
            };
            Ok((lang, string_entries(entries, &name)?))
        })
        .collect()
}

fn string_entries(entries: Map<String, Value>, name: &str) -> Result<Vec<(String, String)>> {
    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            _ => bail!("{}: value of '{}' must be a string", name, key),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_read_translations_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, r#"{"fr": {"b": "B", "a": "A"}, "es": {"c": "C"}}"#).unwrap();

        let entries = read_translations(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                (
                    "fr".to_string(),
                    vec![
                        ("b".to_string(), "B".to_string()),
                        ("a".to_string(), "A".to_string())
                    ]
                ),
                ("es".to_string(), vec![("c".to_string(), "C".to_string())]),
            ]
        );
    }

    #[test]
    fn test_read_translations_rejects_non_strings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, r#"{"fr": {"n": 1}}"#).unwrap();

        let err = read_translations(&path).unwrap_err();
        assert!(err.to_string().contains("value of 'n' must be a string"));
    }
}
