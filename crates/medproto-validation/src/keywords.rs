//! Keyword normalization and set-overlap matching.
//!
//! Two fragments of clinical text "describe the same thing" when their
//! normalized token sets share enough tokens relative to the smaller set.

use std::collections::BTreeSet;

pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Short tokens that carry meaning in clinical criteria and survive the
/// single-character filter.
pub const MEDICAL_ABBREVIATIONS: [&str; 40] = [
    "pas", "pad", "pa", "fc", "fr", "sao2", "sato2", "o2", "co2", "ph", "hco3", "hb", "ht", "plt",
    "leuco", "glasgow", "gcs", "temp", "glicemia", "mgdl", "mmol", "mmoll", "ui", "mcg", "mg", "ml",
    "kg", "min", "hr", "iv", "vo", "im", "sc", "<", ">", "<=", ">=", "mmhg", "bpm", "spo2",
];

const SEPARATORS: &[char] = &[
    '#', ',', ':', ';', '\u{201C}', '\u{201D}', '"', '(', ')', '/', '%', '[', ']', '{', '}',
];

pub type KeywordSet = BTreeSet<String>;

/// Turns free text into a set of comparable keywords.
#[derive(Debug, Clone)]
pub struct KeywordNormalizer {
    abbreviations: BTreeSet<String>,
}

impl Default for KeywordNormalizer {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl KeywordNormalizer {
    pub fn new<I, S>(extra_abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut abbreviations: BTreeSet<String> =
            MEDICAL_ABBREVIATIONS.iter().map(|s| s.to_string()).collect();
        abbreviations.extend(
            extra_abbreviations
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        Self { abbreviations }
    }

    /// Lowercase, replace separator punctuation with spaces and collapse
    /// whitespace.
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
            .chars()
            .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Keywords of `text`: normalized tokens with one trailing period
    /// removed, keeping multi-character tokens, known abbreviations and
    /// anything that starts with a number.
    pub fn keywords(&self, text: &str) -> KeywordSet {
        self.normalize(text)
            .split(' ')
            .map(|token| token.strip_suffix('.').unwrap_or(token))
            .filter(|token| {
                token.chars().count() > 1
                    || self.abbreviations.contains(*token)
                    || starts_with_number(token)
            })
            .map(str::to_string)
            .collect()
    }
}

/// Keywords of `text` using only the built-in abbreviations.
pub fn keywords_from_text(text: &str) -> KeywordSet {
    KeywordNormalizer::default().keywords(text)
}

/// Whether two keyword sets overlap enough to describe the same concept.
///
/// Empty sets never match. Otherwise the shared-token count divided by the
/// size of the smaller set must reach `threshold`, which makes the relation
/// symmetric.
pub fn significant_keyword_overlap(a: &KeywordSet, b: &KeywordSet, threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let matches = a.intersection(b).count();
    if matches == 0 {
        return false;
    }
    let smaller = a.len().min(b.len());
    matches as f64 / smaller as f64 >= threshold
}

/// True when a leading numeric prefix parses, e.g. `90mmhg`, `-1`, `.5`.
fn starts_with_number(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}
