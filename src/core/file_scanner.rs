use std::path::{Path, PathBuf};

use colored::Colorize;
use glob::Pattern;
use walkdir::WalkDir;

use crate::config::{Config, TEST_FILE_PATTERNS};

/// A source file found for one scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    pub scope: String,
    pub path: String,
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Files sorted by scope then path, so runs are order-independent.
    pub files: Vec<DiscoveredFile>,
    /// Scopes whose source directory does not exist.
    pub missing_scopes: Vec<String>,
    pub skipped_count: usize,
}

/// Discover the source files of the given scopes.
///
/// Each scope maps to `<root>/<packagesRoot>/<scope>/<sourceDir>`, walked
/// recursively. Files are kept when their extension is configured and no
/// ignore pattern (or test-file pattern) matches.
pub fn scan_files(root: &Path, scopes: &[String], config: &Config, verbose: bool) -> ScanResult {
    let mut result = ScanResult::default();

    let mut glob_patterns: Vec<Pattern> = Vec::new();
    for p in &config.ignores {
        match Pattern::new(p) {
            Ok(pattern) => glob_patterns.push(pattern),
            Err(e) => {
                if verbose {
                    eprintln!(
                        "{} Invalid ignore pattern '{}': {}",
                        "warning:".bold().yellow(),
                        p,
                        e
                    );
                }
            }
        }
    }
    if config.ignore_test_files {
        for p in TEST_FILE_PATTERNS {
            if let Ok(pattern) = Pattern::new(p) {
                glob_patterns.push(pattern);
            }
        }
    }

    for scope in scopes {
        let dir: PathBuf = config.scope_dir(root, scope);
        if !dir.is_dir() {
            result.missing_scopes.push(scope.clone());
            continue;
        }

        for entry in WalkDir::new(&dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && is_scannable_file(path, &config.extensions) {
                result.files.push(DiscoveredFile {
                    scope: scope.clone(),
                    path: path_str.into(),
                });
            }
        }
    }

    result.files.sort();
    result.files.dedup();
    result
}

fn is_scannable_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_scan_scope_files_sorted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "packages/app/lib/src/screens/b_screen.dart");
        touch(root, "packages/app/lib/src/screens/a_screen.dart");
        touch(root, "packages/app/lib/src/screens/nested/c.dart");
        touch(root, "packages/app/lib/src/screens/notes.txt");
        touch(root, "packages/app/lib/src/widgets/w.dart");

        let result = scan_files(root, &["app".to_string()], &Config::default(), false);
        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| Path::new(&f.path).file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a_screen.dart", "b_screen.dart", "c.dart"]);
        assert!(result.files.iter().all(|f| f.scope == "app"));
    }

    #[test]
    fn test_scan_skips_test_files_and_ignores() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "packages/app/lib/src/screens/home_screen.dart");
        touch(root, "packages/app/lib/src/screens/home_screen_test.dart");
        touch(root, "packages/app/lib/src/screens/legacy/old_screen.dart");

        let config = Config {
            ignores: vec!["**/legacy/**".to_string()],
            ..Default::default()
        };
        let result = scan_files(root, &["app".to_string()], &config, false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("home_screen.dart"));
    }

    #[test]
    fn test_scan_reports_missing_scope() {
        let dir = tempdir().unwrap();
        let result = scan_files(dir.path(), &["nope".to_string()], &Config::default(), false);

        assert!(result.files.is_empty());
        assert_eq!(result.missing_scopes, vec!["nope"]);
    }
}
