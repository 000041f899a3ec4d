use anyhow::Result;
use serde_json::Value;

use crate::{CONFIG, CliTest, stderr, stdout};

const EN: &str = "{\n  \"greet_hello\": \"Hello, {name}!\"\n}\n";

fn project() -> Result<CliTest> {
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file("assets/translations/en.json", EN)?;
    Ok(test)
}

#[test]
fn test_merge_applies_matching_translations() -> Result<()> {
    let test = project()?;
    test.write_file(
        "translations.json",
        r#"{"fr": {"greet_hello": "Bonjour, {name} !"}}"#,
    )?;

    let output = test
        .run_command(&["merge", "--translations", "translations.json", "--apply"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("fr: 1 added, 0 updated, 0 kept"));

    let fr: Value = serde_json::from_str(&test.read_file("assets/translations/fr.json")?)?;
    assert_eq!(fr["greet_hello"], "Bonjour, {name} !");
    // the reference language is not touched
    assert_eq!(test.read_file("assets/translations/en.json")?, EN);

    Ok(())
}

#[test]
fn test_merge_rejects_placeholder_mismatch() -> Result<()> {
    let test = project()?;
    test.write_file("translations.json", r#"{"fr": {"greet_hello": "Bonjour !"}}"#)?;

    let output = test
        .run_command(&["merge", "--translations", "translations.json", "--apply"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains(r#"error: "greet_hello"  placeholder-mismatch"#));
    assert!(out.contains("(fr) expected placeholders {name}, found (none)"));
    assert!(out.contains("hint: translation was not applied"));

    let fr: Value = serde_json::from_str(&test.read_file("assets/translations/fr.json")?)?;
    assert_eq!(fr["greet_hello"], "[Hello, {name}!]");

    Ok(())
}

#[test]
fn test_merge_reference_document() -> Result<()> {
    let test = project()?;
    test.write_file("translations.json", "{}")?;
    test.write_file("reference.json", r#"{"home_title": "Home"}"#)?;

    let output = test
        .run_command(&[
            "merge",
            "--translations",
            "translations.json",
            "--reference",
            "reference.json",
            "--apply",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let en: Value = serde_json::from_str(&test.read_file("assets/translations/en.json")?)?;
    assert_eq!(en["home_title"], "Home");
    let fr: Value = serde_json::from_str(&test.read_file("assets/translations/fr.json")?)?;
    assert_eq!(fr["home_title"], "[Home]");
    assert_eq!(test.read_file("assets/translations/en.json.bak")?, EN);

    Ok(())
}

#[test]
fn test_merge_unreadable_document_is_an_error() -> Result<()> {
    let test = project()?;
    test.write_file("translations.json", r#"{"fr": ["not", "an", "object"]}"#)?;

    let output = test
        .run_command(&["merge", "--translations", "translations.json"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("translations for 'fr' must be an object"));

    Ok(())
}
