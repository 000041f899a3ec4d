use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".relingorc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &["**/*_test.dart", "**/test/**", "**/*.g.dart"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_translations_dir")]
    pub translations_dir: String,
    #[serde(default = "default_reference_language")]
    pub reference_language: String,
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,
    #[serde(default = "default_packages_root")]
    pub packages_root: String,
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    #[serde(default)]
    pub scope_prefix: String,
    #[serde(default = "default_screen_suffixes")]
    pub screen_suffixes: Vec<String>,
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default)]
    pub ignore_texts: Vec<String>,
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// How the host language spells a translation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    /// Appended to a quoted key to look it up, e.g. `'home_title'.tr()`.
    #[serde(default = "default_lookup_suffix")]
    pub suffix: String,
    /// Import line that brings the lookup extension into scope.
    #[serde(default = "default_lookup_import")]
    pub import: String,
    /// Keyword marking compile-time constant expressions.
    #[serde(default = "default_modifier")]
    pub modifier: String,
    /// Keyword replacing `modifier` on declarations that become runtime values.
    #[serde(default = "default_runtime_modifier")]
    pub runtime_modifier: String,
}

fn default_translations_dir() -> String {
    "assets/translations".to_string()
}

fn default_reference_language() -> String {
    "en".to_string()
}

fn default_target_languages() -> Vec<String> {
    ["es", "fr", "de", "pt", "zh"].map(String::from).to_vec()
}

fn default_packages_root() -> String {
    "packages".to_string()
}

fn default_source_dir() -> String {
    "lib/src/screens".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["dart".to_string()]
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_screen_suffixes() -> Vec<String> {
    ["_screen.dart", ".dart"].map(String::from).to_vec()
}

fn default_min_text_length() -> usize {
    3
}

fn default_lookup_suffix() -> String {
    ".tr()".to_string()
}

fn default_lookup_import() -> String {
    "import 'package:easy_localization/easy_localization.dart';".to_string()
}

fn default_modifier() -> String {
    "const".to_string()
}

fn default_runtime_modifier() -> String {
    "final".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            suffix: default_lookup_suffix(),
            import: default_lookup_import(),
            modifier: default_modifier(),
            runtime_modifier: default_runtime_modifier(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translations_dir: default_translations_dir(),
            reference_language: default_reference_language(),
            target_languages: default_target_languages(),
            packages_root: default_packages_root(),
            source_dir: default_source_dir(),
            extensions: default_extensions(),
            ignores: Vec::new(),
            ignore_test_files: default_ignore_test_files(),
            scope_prefix: String::new(),
            screen_suffixes: default_screen_suffixes(),
            min_text_length: default_min_text_length(),
            ignore_texts: Vec::new(),
            lookup: LookupConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` is invalid, if the lookup
    /// spelling is empty, or if the reference language is also listed as a target.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.lookup.suffix.trim().is_empty() {
            bail!("'lookup.suffix' must not be empty");
        }
        if self.lookup.modifier.trim().is_empty() {
            bail!("'lookup.modifier' must not be empty");
        }
        if self.lookup.runtime_modifier.trim().is_empty() {
            bail!("'lookup.runtimeModifier' must not be empty");
        }

        if self.target_languages.contains(&self.reference_language) {
            bail!(
                "Reference language '{}' must not also be listed in 'targetLanguages'",
                self.reference_language
            );
        }

        Ok(())
    }

    /// Directory holding the sources of one scope (package).
    pub fn scope_dir(&self, root: &Path, scope: &str) -> PathBuf {
        root.join(&self.packages_root)
            .join(scope)
            .join(&self.source_dir)
    }

    pub fn translations_path(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.translations_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reference_language, "en");
        assert_eq!(config.target_languages.len(), 5);
        assert_eq!(config.lookup.suffix, ".tr()");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{
              "translationsDir": "i18n",
              "targetLanguages": ["fr"],
              "lookup": { "suffix": ".i18n" }
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.translations_dir, "i18n");
        assert_eq!(config.target_languages, vec!["fr"]);
        assert_eq!(config.lookup.suffix, ".i18n");
        assert_eq!(config.lookup.modifier, "const");
        assert_eq!(config.screen_suffixes, default_screen_suffixes());
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("packages").join("app");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "scopePrefix": "artbeat_" }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.scope_prefix, "artbeat_");
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.translations_dir, "assets/translations");
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_reference_in_targets() {
        let config = Config {
            target_languages: vec!["en".to_string(), "fr".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_empty_suffix_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "lookup": { "suffix": "" } }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_scope_dir() {
        let config = Config::default();
        let dir = config.scope_dir(Path::new("/proj"), "artbeat_ads");
        assert_eq!(dir, PathBuf::from("/proj/packages/artbeat_ads/lib/src/screens"));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = default_config_json().unwrap();
        assert!(json.contains("translationsDir"));
        assert!(json.contains("minTextLength"));
    }
}
