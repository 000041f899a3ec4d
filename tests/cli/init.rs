use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Created .relingorc.json"));

    let content = test.read_file(".relingorc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["referenceLanguage"], "en");
    assert_eq!(parsed["translationsDir"], "assets/translations");
    assert_eq!(parsed["lookup"]["suffix"], ".tr()");
    assert_eq!(parsed["lookup"]["runtimeModifier"], "final");
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".relingorc.json already exists"));
    assert_eq!(test.read_file(".relingorc.json")?, "{}");

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", r#"{"ignores": ["[oops"]}"#)?;

    let output = test.run_command(&["check"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid glob pattern in 'ignores'"));

    Ok(())
}
