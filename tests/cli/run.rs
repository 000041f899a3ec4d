use anyhow::Result;
use insta::assert_snapshot;
use serde_json::Value;

use crate::{CliTest, SCREEN, SCREEN_PATH, stderr, stdout};

#[test]
fn test_run_is_dry_by_default() -> Result<()> {
    let test = CliTest::with_screen()?;

    let output = test.run_command(&["run", "artbeat_ads"]).output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Would add 2 key(s) from 2 literal(s)"));
    assert!(out.contains("Would rewrite 1 file(s)"));
    assert!(out.contains("Run with --apply to write these changes."));

    assert!(!test.exists("assets/translations/en.json"));
    assert_eq!(test.read_file(SCREEN_PATH)?, SCREEN);

    Ok(())
}

#[test]
fn test_run_apply_rewrites_and_persists() -> Result<()> {
    let test = CliTest::with_screen()?;

    let output = test.run_command(&["run", "artbeat_ads", "--apply"]).output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Added 2 key(s) from 2 literal(s)"));

    assert_snapshot!(test.read_file(SCREEN_PATH)?, @r"
    import 'package:flutter/material.dart';
    import 'package:easy_localization/easy_localization.dart';

    class CreateAdScreen extends StatelessWidget {
      @override
      Widget build(BuildContext context) {
        return Column(
          children: [
            Text('ads_create_ad_text_create_ad'.tr()),
            ElevatedButton(
              onPressed: () {},
              child: Text('ads_create_ad_button_save_changes'.tr()),
            ),
          ],
        );
      }
    }
    ");

    assert_snapshot!(test.read_file("assets/translations/fr.json")?, @r#"
    {
      "ads_create_ad_text_create_ad": "[Create Ad]",
      "ads_create_ad_button_save_changes": "[Save Changes]"
    }
    "#);

    Ok(())
}

#[test]
fn test_second_run_is_a_no_op() -> Result<()> {
    let test = CliTest::with_screen()?;
    test.run_command(&["run", "artbeat_ads", "--apply"]).output()?;
    let source = test.read_file(SCREEN_PATH)?;
    let en = test.read_file("assets/translations/en.json")?;

    let output = test.run_command(&["run", "artbeat_ads", "--apply"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Processed 1 source file - no issues found"));

    assert_eq!(test.read_file(SCREEN_PATH)?, source);
    assert_eq!(test.read_file("assets/translations/en.json")?, en);
    assert!(!test.exists("assets/translations/en.json.bak"));

    Ok(())
}

#[test]
fn test_existing_translations_are_backed_up() -> Result<()> {
    let test = CliTest::with_screen()?;
    test.write_file("assets/translations/en.json", "{\n  \"app_title\": \"ArtBeat\"\n}\n")?;

    let output = test.run_command(&["extract", "artbeat_ads", "--apply"]).output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    assert_eq!(
        test.read_file("assets/translations/en.json.bak")?,
        "{\n  \"app_title\": \"ArtBeat\"\n}\n"
    );
    let en = test.read_file("assets/translations/en.json")?;
    assert!(en.starts_with("{\n  \"app_title\": \"ArtBeat\",\n"));
    assert!(en.contains("\"ads_create_ad_button_save_changes\": \"Save Changes\""));
    // extract leaves sources alone
    assert_eq!(test.read_file(SCREEN_PATH)?, SCREEN);

    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let test = CliTest::with_screen()?;

    let output = test.run_command(&["run", "artbeat_ads", "--json"]).output()?;
    assert_eq!(output.status.code(), Some(0));

    let parsed: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(parsed["command"], "run");
    assert_eq!(parsed["summary"]["applied"], false);
    assert_eq!(parsed["summary"]["keysAdded"], 2);
    assert_eq!(parsed["summary"]["standInsAdded"], 2);
    assert_eq!(
        parsed["summary"]["files"][SCREEN_PATH]["keysAdded"][1],
        "ads_create_ad_button_save_changes"
    );
    assert_eq!(parsed["issues"], Value::Array(Vec::new()));

    Ok(())
}

#[test]
fn test_missing_scope_warns() -> Result<()> {
    let test = CliTest::with_screen()?;

    let output = test.run_command(&["run", "artbeat_nope"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("warning: scope 'artbeat_nope' has no source directory"));

    Ok(())
}

#[test]
fn test_scopes_are_required() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.run_command(&["run"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
