use anyhow::Result;

use crate::{CONFIG, CliTest, stdout};

#[test]
fn test_check_reports_mismatch_and_missing() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file(
        "assets/translations/en.json",
        "{\n  \"a\": \"Hello {name}\",\n  \"b\": \"Bye\"\n}\n",
    )?;
    test.write_file("assets/translations/fr.json", "{\n  \"a\": \"Bonjour\"\n}\n")?;

    let output = test.run_command(&["check"]).output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains(r#"error: "a"  placeholder-mismatch"#));
    assert!(out.contains("--> assets/translations/fr.json:2"));
    assert!(out.contains(r#"warning: "b"  missing-translation"#));
    assert!(out.contains("--> assets/translations/en.json:3"));
    assert!(out.contains("2 problems (1 error, 1 warning)"));

    // check never writes
    assert!(!test.exists("assets/translations/fr.json.bak"));

    Ok(())
}

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file("assets/translations/en.json", r#"{"a": "Hi {name}"}"#)?;
    test.write_file("assets/translations/fr.json", r#"{"a": "Salut {name}"}"#)?;

    let output = test.run_command(&["check"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No issues found"));

    Ok(())
}

#[test]
fn test_check_broken_target_is_reported() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file("assets/translations/en.json", r#"{"a": "Hi"}"#)?;
    test.write_file("assets/translations/fr.json", "{broken")?;

    let output = test.run_command(&["check"]).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("file-error"));
    assert_eq!(test.read_file("assets/translations/fr.json")?, "{broken");

    Ok(())
}
