use anyhow::Result;
use insta::assert_snapshot;

use crate::{CONFIG, CliTest, stderr, stdout};

const PATH: &str = "packages/artbeat_home/lib/src/screens/home_screen.dart";

#[test]
fn test_repair_removes_enclosing_const() -> Result<()> {
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file(
        PATH,
        r"Widget build(BuildContext context) {
  return const Padding(
    padding: EdgeInsets.all(8),
    child: Text('home_title'.tr()),
  );
}
",
    )?;

    let output = test
        .run_command(&["repair", "artbeat_home", "--apply"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Rewrote 1 file(s): 0 literal(s) replaced, 1 expression(s) repaired"));

    assert_snapshot!(test.read_file(PATH)?, @r"
    Widget build(BuildContext context) {
      return Padding(
        padding: EdgeInsets.all(8),
        child: Text('home_title'.tr()),
      );
    }
    ");

    Ok(())
}

#[test]
fn test_repair_dry_run_leaves_file() -> Result<()> {
    let content = "const title = 'home_title'.tr();\n";
    let test = CliTest::with_file(".relingorc.json", CONFIG)?;
    test.write_file(PATH, content)?;

    let output = test.run_command(&["repair", "artbeat_home"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Would rewrite 1 file(s)"));
    assert_eq!(test.read_file(PATH)?, content);

    Ok(())
}
