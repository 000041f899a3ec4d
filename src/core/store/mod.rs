//! Translation Store: one ordered key → text document per language.
//!
//! The reference language is authoritative. Every target file mirrors its keys,
//! holding either a real translation or a bracket-wrapped stand-in.

mod language_file;
mod placeholder;

pub use language_file::{LanguageFile, MergeAction, PersistOutcome, make_stand_in};
pub use placeholder::{PlaceholderMismatch, PlaceholderSet, check_placeholders, strip_placeholders};

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::Serialize;

/// What a merge into one language did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// Keys whose real value was left alone.
    pub kept: Vec<String>,
    /// Translations rejected for placeholder differences.
    pub rejected: Vec<PlaceholderMismatch>,
    /// Translations for keys the reference language does not have.
    pub unknown: Vec<String>,
}

/// A target file that exists but could not be loaded; it is never written.
#[derive(Debug, Clone)]
pub struct UnavailableLanguage {
    pub language: String,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug)]
pub struct TranslationStore {
    reference: LanguageFile,
    targets: Vec<LanguageFile>,
    unavailable: Vec<UnavailableLanguage>,
}

impl TranslationStore {
    /// Load `<dir>/<lang>.json` for the reference and every target language.
    ///
    /// Missing files start empty. A reference file that cannot be loaded is an
    /// error; a broken target file is recorded in [`Self::unavailable`].
    pub fn load(dir: &Path, reference: &str, targets: &[String]) -> Result<Self> {
        let reference = LanguageFile::load(reference, &language_path(dir, reference))?;

        let mut loaded = Vec::new();
        let mut unavailable = Vec::new();
        for lang in targets {
            let path = language_path(dir, lang);
            match LanguageFile::load(lang, &path) {
                Ok(file) => loaded.push(file),
                Err(e) => unavailable.push(UnavailableLanguage {
                    language: lang.clone(),
                    path,
                    error: format!("{:#}", e),
                }),
            }
        }

        Ok(Self {
            reference,
            targets: loaded,
            unavailable,
        })
    }

    pub fn reference(&self) -> &LanguageFile {
        &self.reference
    }

    pub fn reference_language(&self) -> &str {
        &self.reference.language
    }

    pub fn targets(&self) -> impl Iterator<Item = &LanguageFile> {
        self.targets.iter()
    }

    pub fn unavailable(&self) -> &[UnavailableLanguage] {
        &self.unavailable
    }

    /// The loaded document of `lang`, reference or target.
    pub fn language(&self, lang: &str) -> Option<&LanguageFile> {
        if self.reference.language == lang {
            return Some(&self.reference);
        }
        self.targets.iter().find(|f| f.language == lang)
    }

    fn language_mut(&mut self, lang: &str) -> Result<&mut LanguageFile> {
        if self.reference.language == lang {
            return Ok(&mut self.reference);
        }
        if let Some(file) = self.targets.iter_mut().find(|f| f.language == lang) {
            return Ok(file);
        }
        if self.unavailable.iter().any(|u| u.language == lang) {
            bail!("Language '{}' could not be loaded and is skipped", lang);
        }
        bail!("Language '{}' is not configured", lang)
    }

    /// Merge entries into `lang` without placeholder checks.
    ///
    /// A key is written when absent or when its current value is the stand-in
    /// of its reference text.
    pub fn merge<I, K, V>(&mut self, lang: &str, entries: I) -> Result<MergeOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries: Vec<(String, String, Option<String>)> = entries
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_ref();
                (key.to_string(), value.as_ref().to_string(), self.stand_in(lang, key))
            })
            .collect();

        let file = self.language_mut(lang)?;
        let mut outcome = MergeOutcome::default();
        for (key, value, stand_in) in &entries {
            record(&mut outcome, key, file.merge_entry(key, value, stand_in.as_deref()));
        }
        Ok(outcome)
    }

    /// The stand-in a target holds for `key` until translated.
    fn stand_in(&self, lang: &str, key: &str) -> Option<String> {
        if lang == self.reference.language {
            return None;
        }
        self.reference.get(key).map(make_stand_in)
    }

    /// Merge provided translations into a target, validating placeholders.
    ///
    /// Entries with a placeholder mismatch are recorded and not applied; entries
    /// for keys unknown to the reference language are skipped.
    pub fn merge_translations<I, K, V>(&mut self, lang: &str, entries: I) -> Result<MergeOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if lang == self.reference.language {
            bail!("Translations for the reference language '{}' are merged with --reference", lang);
        }

        let mut accepted = Vec::new();
        let mut outcome = MergeOutcome::default();
        for (key, value) in entries {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(reference_value) = self.reference.get(key) else {
                outcome.unknown.push(key.to_string());
                continue;
            };
            match check_placeholders(lang, key, reference_value, value) {
                Some(mismatch) => outcome.rejected.push(mismatch),
                None => accepted.push((
                    key.to_string(),
                    value.to_string(),
                    make_stand_in(reference_value),
                )),
            }
        }

        let file = self.language_mut(lang)?;
        for (key, value, stand_in) in &accepted {
            record(&mut outcome, key, file.merge_entry(key, value, Some(stand_in)));
        }
        Ok(outcome)
    }

    /// Placeholder differences between the reference and `lang`, in reference key order.
    pub fn validate_placeholders(&self, lang: &str) -> Vec<PlaceholderMismatch> {
        let Some(file) = self.language(lang) else {
            return Vec::new();
        };
        self.reference
            .iter()
            .filter_map(|(key, reference_value)| {
                let translated = file.get(key)?;
                check_placeholders(lang, key, reference_value, translated)
            })
            .collect()
    }

    /// Reference keys that `lang` lacks.
    pub fn missing_keys(&self, lang: &str) -> Vec<String> {
        let Some(file) = self.language(lang) else {
            return Vec::new();
        };
        self.reference
            .iter()
            .filter(|(key, _)| !file.contains_key(key))
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Add a new reference entry; targets receive stand-ins on the next sync.
    pub fn add_reference_entry(&mut self, key: &str, value: &str) -> MergeAction {
        self.reference.merge_entry(key, value, None)
    }

    /// Give every target a stand-in for each reference key it lacks.
    ///
    /// Returns the number of stand-ins added across all targets.
    pub fn sync_stand_ins(&mut self) -> usize {
        let mut added = 0;
        for target in &mut self.targets {
            for (key, value) in self.reference.iter() {
                if !target.contains_key(key) {
                    target.merge_entry(key, &make_stand_in(value), None);
                    added += 1;
                }
            }
        }
        added
    }

    /// Back up and write `lang` if it changed during the run.
    pub fn persist(&mut self, lang: &str) -> Result<PersistOutcome> {
        self.language_mut(lang)?.persist()
    }

    /// Persist the reference language first, then every target.
    ///
    /// A failure on one file does not stop the others.
    pub fn persist_all(&mut self) -> Vec<(String, PathBuf, Result<PersistOutcome>)> {
        std::iter::once(&mut self.reference)
            .chain(self.targets.iter_mut())
            .map(|file| {
                let result = file.persist();
                (file.language.clone(), file.path.clone(), result)
            })
            .collect()
    }
}

fn record(outcome: &mut MergeOutcome, key: &str, action: MergeAction) {
    let bucket = match action {
        MergeAction::Added => &mut outcome.added,
        MergeAction::Updated => &mut outcome.updated,
        MergeAction::Kept => &mut outcome.kept,
    };
    bucket.push(key.to_string());
}

pub fn language_path(dir: &Path, lang: &str) -> PathBuf {
    dir.join(format!("{}.json", lang))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn setup(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (lang, content) in files {
            fs::write(dir.path().join(format!("{}.json", lang)), content).unwrap();
        }
        dir
    }

    fn targets(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_translations_rejects_placeholder_mismatch() {
        let dir = setup(&[
            ("en", r#"{"greet_hello": "Hello, {name}!"}"#),
            ("fr", r#"{"greet_hello": "[Hello, {name}!]"}"#),
        ]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();

        let outcome = store
            .merge_translations("fr", [("greet_hello", "Bonjour !")])
            .unwrap();
        assert!(outcome.updated.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].key, "greet_hello");
        assert_eq!(
            store.language("fr").unwrap().get("greet_hello"),
            Some("[Hello, {name}!]")
        );

        let outcome = store
            .merge_translations("fr", [("greet_hello", "Bonjour, {name} !")])
            .unwrap();
        assert_eq!(outcome.updated, vec!["greet_hello"]);
        assert_eq!(
            store.language("fr").unwrap().get("greet_hello"),
            Some("Bonjour, {name} !")
        );
    }

    #[test]
    fn test_merge_translations_never_overwrites_real_value() {
        let dir = setup(&[
            ("en", r#"{"a": "Save", "b": "Cancel"}"#),
            ("es", r#"{"a": "Guardar"}"#),
        ]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["es"])).unwrap();
        let outcome = store
            .merge_translations("es", [("a", "Salvar"), ("b", "Cancelar"), ("zzz", "x")])
            .unwrap();

        assert_eq!(outcome.kept, vec!["a"]);
        assert_eq!(outcome.added, vec!["b"]);
        assert_eq!(outcome.unknown, vec!["zzz"]);
        assert_eq!(store.language("es").unwrap().get("a"), Some("Guardar"));
    }

    #[test]
    fn test_bracketed_translation_is_not_a_stand_in() {
        let dir = setup(&[
            ("en", r#"{"badge": "[Beta]", "save": "Save"}"#),
            ("fr", r#"{"badge": "[Bêta]", "save": "[Save]"}"#),
        ]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();
        let outcome = store
            .merge_translations("fr", [("badge", "(Bêta)"), ("save", "Enregistrer")])
            .unwrap();

        assert_eq!(outcome.kept, vec!["badge"]);
        assert_eq!(outcome.updated, vec!["save"]);
        let fr = store.language("fr").unwrap();
        assert_eq!(fr.get("badge"), Some("[Bêta]"));
        assert_eq!(fr.get("save"), Some("Enregistrer"));

        // The real stand-in of a bracketed reference is still replaceable.
        let dir = setup(&[("en", r#"{"badge": "[Beta]"}"#), ("fr", r#"{"badge": "[[Beta]]"}"#)]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();
        let outcome = store.merge_translations("fr", [("badge", "[Bêta]")]).unwrap();
        assert_eq!(outcome.updated, vec!["badge"]);
    }

    #[test]
    fn test_validate_placeholders_reports_every_language_difference() {
        let dir = setup(&[
            ("en", r#"{"price": "Pay ${amount} now", "plain": "Hi there"}"#),
            ("de", r#"{"price": "Jetzt zahlen", "plain": "Hallo"}"#),
        ]);
        let store = TranslationStore::load(dir.path(), "en", &targets(&["de"])).unwrap();

        let mismatches = store.validate_placeholders("de");
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].key, "price");
        assert_eq!(mismatches[0].reference.to_string(), "${amount}");
    }

    #[test]
    fn test_new_reference_entry_gets_stand_ins_on_sync() {
        let dir = setup(&[("en", "{}")]);
        let mut store =
            TranslationStore::load(dir.path(), "en", &targets(&["fr", "es"])).unwrap();

        assert_eq!(store.add_reference_entry("k", "Save"), MergeAction::Added);
        assert_eq!(store.add_reference_entry("k", "Save"), MergeAction::Kept);
        assert_eq!(store.missing_keys("fr"), vec!["k"]);

        assert_eq!(store.sync_stand_ins(), 2);
        assert_eq!(store.language("fr").unwrap().get("k"), Some("[Save]"));
        assert_eq!(store.language("es").unwrap().get("k"), Some("[Save]"));
    }

    #[test]
    fn test_sync_stand_ins_fills_missing_keys() {
        let dir = setup(&[
            ("en", r#"{"a": "Save", "b": "Cancel"}"#),
            ("fr", r#"{"a": "Enregistrer"}"#),
        ]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();

        assert_eq!(store.missing_keys("fr"), vec!["b"]);
        assert_eq!(store.sync_stand_ins(), 1);
        assert!(store.missing_keys("fr").is_empty());
        assert_eq!(store.language("fr").unwrap().get("b"), Some("[Cancel]"));
        assert_eq!(store.sync_stand_ins(), 0);
    }

    #[test]
    fn test_broken_target_is_unavailable_and_untouched() {
        let broken = "{ not json";
        let dir = setup(&[("en", r#"{"a": "Save"}"#), ("fr", broken)]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();

        assert_eq!(store.unavailable().len(), 1);
        assert!(store.merge("fr", [("a", "x")]).is_err());
        store.sync_stand_ins();
        store.persist_all();
        assert_eq!(
            fs::read_to_string(dir.path().join("fr.json")).unwrap(),
            broken
        );
    }

    #[test]
    fn test_broken_reference_is_fatal() {
        let dir = setup(&[("en", "[")]);
        assert!(TranslationStore::load(dir.path(), "en", &[]).is_err());
    }

    #[test]
    fn test_persist_all_backs_up_changed_files_only() {
        let dir = setup(&[("en", r#"{"a": "Save"}"#), ("fr", r#"{"a": "Enregistrer"}"#)]);
        let mut store = TranslationStore::load(dir.path(), "en", &targets(&["fr"])).unwrap();
        store.add_reference_entry("b", "Cancel");
        store.sync_stand_ins();

        let results = store.persist_all();
        assert_eq!(results.len(), 2);
        assert!(dir.path().join("en.json.bak").exists());
        assert!(dir.path().join("fr.json.bak").exists());

        let en = fs::read_to_string(dir.path().join("en.json")).unwrap();
        assert_eq!(en, "{\n  \"a\": \"Save\",\n  \"b\": \"Cancel\"\n}\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("fr.json.bak")).unwrap(),
            r#"{"a": "Enregistrer"}"#
        );
    }
}
