//! Candidate Classifier: heuristic filter deciding whether a literal is display text.
//!
//! This is a filter, not a grammar. Misses and false positives are expected;
//! the rewriter stays idempotent either way.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    config::Config,
    core::{matcher::Candidate, store::strip_placeholders},
    utils::contains_alphabetic,
};

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9_]*$").unwrap());
static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(?:[.,]\d+)*%?$").unwrap());
static CONSTANT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]+$").unwrap());
static IMPORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:package|dart):|package:").unwrap());
static FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\w\-./]+\.(?:dart|png|jpe?g|gif|svg|webp|json|arb|ttf|otf|mp3|mp4|pdf|txt|html|css|js)$",
    )
    .unwrap()
});
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:https?://|ftp://|mailto:|tel:|www\.)\S*$").unwrap());
static OPERATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[<>=/+\-*!&|%^~?:.,;()\[\]{}]+$").unwrap());
static INTERPOLATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[A-Za-z_{]").unwrap());
static METHOD_CALL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(?:\.\w+)+(?:\(\))?$").unwrap());

const KEY_SUFFIXES: &[&str] = &["_text", "_title", "_label", "_hint"];

/// Decides which candidates are genuine display text.
pub struct Classifier {
    min_text_length: usize,
    ignore_texts: HashSet<String>,
    keyed_suffix: String,
}

impl Classifier {
    pub fn new(config: &Config) -> Self {
        Self {
            min_text_length: config.min_text_length,
            ignore_texts: config.ignore_texts.iter().cloned().collect(),
            keyed_suffix: config.lookup.suffix.clone(),
        }
    }

    pub fn is_display_text(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.ignore_texts.contains(text) {
            return false;
        }

        if IDENTIFIER_REGEX.is_match(text)
            || NUMERIC_REGEX.is_match(text)
            || CONSTANT_REGEX.is_match(text)
            || IMPORT_REGEX.is_match(text)
            || FILE_REGEX.is_match(text)
            || URL_REGEX.is_match(text)
            || OPERATOR_REGEX.is_match(text)
            || METHOD_CALL_REGEX.is_match(text)
        {
            return false;
        }

        if text.contains(self.keyed_suffix.as_str())
            || KEY_SUFFIXES.iter().any(|s| text.ends_with(s))
        {
            return false;
        }

        // Interpolation alone (e.g. `{count}`) is not text.
        if !contains_alphabetic(&strip_placeholders(text)) {
            return false;
        }

        // Values only known at runtime cannot be a fixed translation.
        if INTERPOLATION_REGEX.is_match(text) {
            return false;
        }

        text.chars().count() >= self.min_text_length
            || is_mixed_case(text)
            || has_sentence_punctuation(text)
    }

    /// Keep display text only, one candidate per distinct value.
    ///
    /// The first occurrence wins its position; the role is upgraded to the most
    /// specific pattern that captured the same value.
    pub fn select(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut selected: Vec<Candidate> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for candidate in candidates {
            let text = candidate.text.trim().to_string();
            if !self.is_display_text(&text) {
                continue;
            }
            match index.get(&text) {
                Some(&i) => {
                    if candidate.role.specificity() > selected[i].role.specificity() {
                        selected[i].role = candidate.role;
                    }
                }
                None => {
                    index.insert(text.clone(), selected.len());
                    selected.push(Candidate { text, ..candidate });
                }
            }
        }

        selected
    }
}

fn is_mixed_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && text.chars().any(char::is_lowercase)
}

fn has_sentence_punctuation(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, ' ' | '.' | ',' | '!' | '?' | ':' | ';' | '\'' | '…'))
}
