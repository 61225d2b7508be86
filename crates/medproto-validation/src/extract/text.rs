//! Claims made by the protocol text: conditional decision statements and
//! the section 7 medication lists.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use medproto_core::json::{display_value, is_truthy};
use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::sections::{field, SECTION7_MEDICATION_PATHS};

use crate::keywords::{KeywordNormalizer, KeywordSet};

/// Sections where clinical branching logic lives.
pub const DECISION_SECTIONS: [u32; 5] = [4, 5, 6, 7, 9];

/// Section holding the treatment medication lists.
pub const MEDICATION_SECTION: u32 = 7;

static TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)(?:se|if|caso|quando|critério\s*:\s*|avaliar\s*se)\s*")
        .expect("trigger pattern is valid")
});

static TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\.\s+[A-ZÀ-ÖØ-Þ]|;\s*\S|(?:\s+ou\s+)?\s*(?:então|then|resulta em)|$")
        .expect("terminator pattern is valid")
});

static CONSEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:então|then|resulta em)\s*.*$").expect("consequence pattern is valid")
});

/// A conditional statement found in the protocol text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextualDecision {
    pub text: String,
    pub section_number: u32,
    pub keywords: KeywordSet,
}

/// A medication named in the section 7 treatment lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextualMedication {
    /// Lowercased, trimmed.
    pub name: String,
    pub original_name: String,
    pub section_number: u32,
}

/// Finds decision statements in protocol content.
pub trait DecisionExtractor: Send + Sync {
    fn extract(&self, content: &ProtocolFullContent) -> Vec<TextualDecision>;
}

/// Pattern-based extractor: trigger words (`se`, `if`, `caso`, `quando`,
/// `critério:`, `avaliar se`) followed by a clause that ends at a sentence
/// break, a semicolon, a consequence word or the end of the line.
#[derive(Debug, Clone, Default)]
pub struct PatternDecisionExtractor {
    normalizer: KeywordNormalizer,
}

impl PatternDecisionExtractor {
    pub fn new(normalizer: KeywordNormalizer) -> Self {
        Self { normalizer }
    }

    fn walk(&self, value: &Value, section: u32, out: &mut Vec<TextualDecision>) {
        match value {
            Value::String(text) => self.scan(text, section, out),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(text) => self.scan(text, section, out),
                        Value::Array(nested) => nested.iter().for_each(|v| self.walk(v, section, out)),
                        Value::Object(map) => map.values().for_each(|v| self.walk(v, section, out)),
                        _ => {}
                    }
                }
            }
            Value::Object(map) => self.walk_object(map, section, out),
            _ => {}
        }
    }

    fn walk_object(&self, map: &Map<String, Value>, section: u32, out: &mut Vec<TextualDecision>) {
        match section {
            4 => {
                self.scan_prefixed(map.get(field::INCLUSAO), "Critério de inclusão", section, out);
                self.scan_prefixed(map.get(field::EXCLUSAO), "Critério de exclusão", section, out);
            }
            5 if map.get(field::CRITERIOS_RISCO_GRAVIDADE).is_some_and(Value::is_array) => {
                let criteria = map
                    .get(field::CRITERIOS_RISCO_GRAVIDADE)
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten();
                for criterion in criteria {
                    let Some(name) = criterion.get(field::CRITERIO).filter(|v| is_truthy(v)) else {
                        continue;
                    };
                    let part = |key: &str| {
                        criterion
                            .get(key)
                            .filter(|v| is_truthy(v))
                            .map(|v| display_value(v).into_owned())
                            .unwrap_or_default()
                    };
                    let text = format!(
                        "{}: {} {}",
                        display_value(name),
                        part(field::DESCRICAO),
                        part(field::LIMIAR_NUMERICO_OU_ESTADO)
                    )
                    .trim()
                    .to_string();
                    let keywords = self.normalizer.keywords(&text);
                    out.push(TextualDecision {
                        text,
                        section_number: section,
                        keywords,
                    });
                }
            }
            9 => {
                self.scan_prefixed(map.get(field::CRITERIOS_INTERNACAO), "Critério de internação", section, out);
                self.scan_prefixed(map.get(field::CRITERIOS_ALTA), "Critério de alta", section, out);
            }
            _ => map.values().for_each(|v| self.walk(v, section, out)),
        }
    }

    fn scan_prefixed(&self, list: Option<&Value>, prefix: &str, section: u32, out: &mut Vec<TextualDecision>) {
        let Some(items) = list.and_then(Value::as_array) else {
            return;
        };
        for item in items {
            let text = format!("{prefix}: {}", display_value(item));
            self.scan(&text, section, out);
        }
    }

    /// Run the trigger/terminator scan over one string.
    fn scan(&self, text: &str, section: u32, out: &mut Vec<TextualDecision>) {
        let mut pos = 0;
        while pos < text.len() {
            let Some(trigger) = TRIGGER.find_at(text, pos) else {
                break;
            };
            let clause_start = trigger.end();
            // The clause needs at least one character.
            let Some(first) = text[clause_start..].chars().next() else {
                pos = next_char_boundary(text, trigger.start());
                continue;
            };
            let min_end = clause_start + first.len_utf8();
            let clause_end = TERMINATOR
                .find_at(text, min_end)
                .map(|m| m.start())
                .unwrap_or(text.len());

            let condition = strip_consequence(&text[clause_start..clause_end]);
            if condition.chars().count() > 3 {
                out.push(TextualDecision {
                    text: strip_consequence(&text[trigger.start()..clause_end]),
                    section_number: section,
                    keywords: self.normalizer.keywords(&condition),
                });
            }
            pos = clause_end;
        }
    }
}

impl DecisionExtractor for PatternDecisionExtractor {
    fn extract(&self, content: &ProtocolFullContent) -> Vec<TextualDecision> {
        let mut decisions = Vec::new();
        for number in DECISION_SECTIONS {
            let Some(section) = content.section(number) else {
                continue;
            };
            let section_number = section.section_number.unwrap_or(number);
            self.walk(&section.content, section_number, &mut decisions);
        }
        decisions
    }
}

/// Decision statements found by the default pattern extractor.
pub fn extract_decisions_from_text(content: &ProtocolFullContent) -> Vec<TextualDecision> {
    PatternDecisionExtractor::default().extract(content)
}

/// Medication entries of section 7: objects carrying a `name` key under
/// `tratamentoPacientesInstaveis.medicamentos` or
/// `tratamentoPacientesEstaveis.medicamentosConsiderar`.
pub fn section7_medication_entries(content: &ProtocolFullContent) -> Vec<&Map<String, Value>> {
    let Some(section) = content.section(MEDICATION_SECTION) else {
        return Vec::new();
    };
    SECTION7_MEDICATION_PATHS
        .iter()
        .filter_map(|(group, list)| section.content.get(group)?.get(list)?.as_array())
        .flatten()
        .filter_map(Value::as_object)
        .filter(|entry| entry.contains_key("name"))
        .collect()
}

/// Medications of section 7 that have a non-blank string name.
pub fn extract_medications_from_text(content: &ProtocolFullContent) -> Vec<TextualMedication> {
    section7_medication_entries(content)
        .into_iter()
        .filter_map(|entry| entry.get("name")?.as_str())
        .filter(|name| !name.trim().is_empty())
        .map(|name| TextualMedication {
            name: name.trim().to_lowercase(),
            original_name: name.to_string(),
            section_number: MEDICATION_SECTION,
        })
        .collect()
}

fn strip_consequence(clause: &str) -> String {
    let trimmed = clause.trim();
    CONSEQUENCE.replace(trimmed, "").trim().to_string()
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}
