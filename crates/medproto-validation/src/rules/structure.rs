use std::cmp::Ordering;

use serde_json::json;

use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};
use medproto_core::sections::{self, ContentShape, SECTION_COUNT, SECTION_DEFINITIONS};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;

/// Exactly 13 sections numbered 1..=13, each keyed by its own number.
pub struct SectionPresenceAndOrder;

impl Rule for SectionPresenceAndOrder {
    fn id(&self) -> &'static str {
        "STRUCTURE_SECTIONS_PRESENCE_ORDER"
    }

    fn description(&self) -> &'static str {
        "Ensures all 13 sections are present and correctly numbered from 1 to 13."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Structure
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Structure
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move { Ok(check_presence_and_order(ctx.content)) })
    }
}

fn check_presence_and_order(content: &ProtocolFullContent) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut numbers: Vec<f64> = content
        .keys()
        .filter_map(key_as_number)
        .filter(|n| (1.0..=f64::from(SECTION_COUNT)).contains(n))
        .collect();
    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    if numbers.len() != SECTION_COUNT as usize {
        issues.push(ValidationIssue::error(
            "STRUCTURE_001",
            IssueCategory::Structure,
            format!(
                "O protocolo deve conter exatamente {SECTION_COUNT} seções. Encontradas: {}.",
                numbers.len()
            ),
        ));
    } else if !numbers.iter().zip(1..=SECTION_COUNT).all(|(n, expected)| *n == f64::from(expected)) {
        let found = numbers.iter().map(f64::to_string).collect::<Vec<_>>().join(", ");
        issues.push(ValidationIssue::error(
            "STRUCTURE_002",
            IssueCategory::Structure,
            format!(
                "As seções do protocolo não estão numeradas corretamente de 1 a {SECTION_COUNT}. Seções encontradas: {found}."
            ),
        ));
    }

    let mut keys: Vec<&str> = content.keys().collect();
    keys.sort_by_key(|k| match canonical_index(k) {
        Some(n) => (0, n, String::new()),
        None => (1, 0, k.to_string()),
    });

    for key in keys {
        let from_key = leading_integer(key);
        let matches = match (content.get(key).and_then(|s| s.section_number), from_key) {
            (Some(internal), Some(parsed)) => i64::from(internal) == parsed,
            _ => false,
        };
        if !matches {
            let mut issue = ValidationIssue::error(
                "STRUCTURE_003",
                IssueCategory::Structure,
                format!(
                    "A seção com chave \"{key}\" não corresponde ao seu campo 'sectionNumber' interno ou está malformada."
                ),
            )
            .with_details(json!({ "key": key }));
            if let Some(n) = from_key.and_then(|n| u32::try_from(n).ok()) {
                issue = issue.with_section(n);
            }
            issues.push(issue);
        }
    }

    issues
}

/// Every present section has a non-blank title.
pub struct SectionTitles;

impl Rule for SectionTitles {
    fn id(&self) -> &'static str {
        "STRUCTURE_SECTION_TITLES"
    }

    fn description(&self) -> &'static str {
        "Ensures all section titles are present and non-empty."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Structure
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Structure
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let issues = (1..=SECTION_COUNT)
                .filter(|n| ctx.content.section(*n).is_some_and(|s| s.title.trim().is_empty()))
                .map(|n| {
                    ValidationIssue::error(
                        "STRUCTURE_004",
                        IssueCategory::Structure,
                        format!(
                            "O título da Seção {n} ({}) está ausente ou vazio.",
                            sections::title_for(n)
                        ),
                    )
                    .with_section(n)
                    .with_field("title")
                })
                .collect();
            Ok(issues)
        })
    }
}

/// Sections with a fixed content shape (object or array) actually have it.
pub struct ContentFormat;

impl Rule for ContentFormat {
    fn id(&self) -> &'static str {
        "STRUCTURE_CONTENT_FORMAT"
    }

    fn description(&self) -> &'static str {
        "Ensures sections expected to have structured JSON content have the correct basic format (object/array)."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Structure
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Structure
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let mut issues = Vec::new();
            for def in &SECTION_DEFINITIONS {
                let Some(section) = ctx.content.section(def.number) else {
                    continue;
                };
                if section.content.is_null() || def.shape.matches(&section.content) {
                    continue;
                }
                let found = sections::json_type_name(&section.content);
                let (rule_id, expected) = match def.shape {
                    ContentShape::Object => ("STRUCTURE_005A", "um objeto JSON estruturado"),
                    ContentShape::Array => ("STRUCTURE_005B", "um array JSON"),
                    ContentShape::Any => continue,
                };
                issues.push(
                    ValidationIssue::error(
                        rule_id,
                        IssueCategory::Structure,
                        format!(
                            "O conteúdo da Seção {} ({}) deveria ser {expected}, mas foi encontrado: {found}.",
                            def.number, def.title
                        ),
                    )
                    .with_section(def.number)
                    .with_field("content"),
                );
            }
            Ok(issues)
        })
    }
}

/// Numeric value of a whole key; blank keys read as zero.
fn key_as_number(key: &str) -> Option<f64> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Leading base-10 integer of a key, ignoring any trailing text.
fn leading_integer(key: &str) -> Option<i64> {
    let trimmed = key.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Keys that are canonical array indices sort numerically first.
fn canonical_index(key: &str) -> Option<u32> {
    let n: u32 = key.parse().ok()?;
    (n.to_string() == key).then_some(n)
}
