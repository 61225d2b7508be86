//! Agreement between what the protocol text says and what the flowchart
//! draws. Decisions match by keyword overlap, medications by exact
//! normalized name.

use serde_json::json;

use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;
use crate::config::ValidationConfig;
use crate::extract::text::MEDICATION_SECTION;
use crate::extract::{
    extract_medications_from_text, flowchart_decisions, flowchart_medications, DecisionExtractor,
    PatternDecisionExtractor,
};
use crate::keywords::{significant_keyword_overlap, KeywordNormalizer, KeywordSet};

const CATEGORY: IssueCategory = IssueCategory::FlowchartConsistency;

/// Issue reported instead of any cross check when there is no flowchart.
pub fn flowchart_missing_issue() -> ValidationIssue {
    ValidationIssue::warning(
        "CROSS_FLOWCHART_MISSING",
        CATEGORY,
        "Fluxograma não fornecido para validação cruzada.",
    )
}

/// Text decisions and medications are represented in the flowchart.
pub struct TextElementsInFlowchart;

impl Rule for TextElementsInFlowchart {
    fn id(&self) -> &'static str {
        "CROSS_TEXT_ELEMENTS_IN_FLOWCHART"
    }

    fn description(&self) -> &'static str {
        "Ensures decisions and medications from the protocol text are represented in the flowchart."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::CrossConsistency
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let Some(flowchart) = ctx.flowchart else {
                return Ok(Vec::new());
            };
            Ok(text_elements_in_flowchart(
                ctx.content,
                flowchart,
                ctx.extractor,
                ctx.normalizer,
                ctx.config.overlap_threshold,
            ))
        })
    }
}

/// Flowchart decisions and medications are reflected in the protocol text.
pub struct FlowchartElementsInText;

impl Rule for FlowchartElementsInText {
    fn id(&self) -> &'static str {
        "CROSS_FLOWCHART_ELEMENTS_IN_TEXT"
    }

    fn description(&self) -> &'static str {
        "Ensures decision nodes and medication nodes in the flowchart are reflected in the protocol text."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::CrossConsistency
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let Some(flowchart) = ctx.flowchart else {
                return Ok(Vec::new());
            };
            Ok(flowchart_elements_in_text(
                ctx.content,
                flowchart,
                ctx.extractor,
                ctx.normalizer,
                ctx.config.overlap_threshold,
            ))
        })
    }
}

/// Text-to-flowchart check with the pattern extractor built from `config`.
pub fn check_text_elements_in_flowchart(
    content: &ProtocolFullContent,
    flowchart: &Flowchart,
    config: &ValidationConfig,
) -> Vec<ValidationIssue> {
    let normalizer = KeywordNormalizer::new(&config.extra_abbreviations);
    let extractor = PatternDecisionExtractor::new(normalizer.clone());
    text_elements_in_flowchart(content, flowchart, &extractor, &normalizer, config.overlap_threshold)
}

/// Flowchart-to-text check with the pattern extractor built from `config`.
pub fn check_flowchart_elements_in_text(
    content: &ProtocolFullContent,
    flowchart: &Flowchart,
    config: &ValidationConfig,
) -> Vec<ValidationIssue> {
    let normalizer = KeywordNormalizer::new(&config.extra_abbreviations);
    let extractor = PatternDecisionExtractor::new(normalizer.clone());
    flowchart_elements_in_text(content, flowchart, &extractor, &normalizer, config.overlap_threshold)
}

fn text_elements_in_flowchart(
    content: &ProtocolFullContent,
    flowchart: &Flowchart,
    extractor: &dyn DecisionExtractor,
    normalizer: &KeywordNormalizer,
    threshold: f64,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let node_decisions = flowchart_decisions(flowchart, normalizer);
    let node_medications = flowchart_medications(flowchart);

    for decision in extractor.extract(content) {
        if decision.keywords.is_empty() {
            continue;
        }
        let found = node_decisions
            .iter()
            .any(|node| significant_keyword_overlap(&decision.keywords, &node.keywords, threshold));
        if found {
            continue;
        }
        let preview: String = decision.text.chars().take(70).collect();
        issues.push(
            ValidationIssue::warning(
                "CROSS_TEXT_DECISION_MISSING_IN_FLOWCHART",
                CATEGORY,
                format!(
                    "Decisão textual \"{preview}...\" (Seção {}) não parece ter um nó de decisão correspondente claro no fluxograma. Palavras-chave extraídas do texto: [{}]",
                    decision.section_number,
                    join_keywords(&decision.keywords)
                ),
            )
            .with_section(decision.section_number)
            .with_details(json!({
                "textualDecision": decision.text,
                "keywords": decision.keywords,
            })),
        );
    }

    for medication in extract_medications_from_text(content) {
        if node_medications.iter().any(|m| m.normalized == medication.name) {
            continue;
        }
        issues.push(
            ValidationIssue::warning(
                "CROSS_TEXT_MED_MISSING_IN_FLOWCHART",
                CATEGORY,
                format!(
                    "Medicamento \"{}\" (Seção {}) não encontrado em nós de medicação do fluxograma.",
                    medication.original_name, medication.section_number
                ),
            )
            .with_section(medication.section_number)
            .with_details(json!({ "medicationName": medication.original_name })),
        );
    }

    issues
}

fn flowchart_elements_in_text(
    content: &ProtocolFullContent,
    flowchart: &Flowchart,
    extractor: &dyn DecisionExtractor,
    normalizer: &KeywordNormalizer,
    threshold: f64,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let text_decisions = extractor.extract(content);
    let text_medications = extract_medications_from_text(content);

    for node in flowchart_decisions(flowchart, normalizer) {
        if node.keywords.is_empty() {
            continue;
        }
        let found = text_decisions
            .iter()
            .any(|decision| significant_keyword_overlap(&node.keywords, &decision.keywords, threshold));
        if found {
            continue;
        }
        issues.push(
            ValidationIssue::warning(
                "CROSS_FLOWCHART_DECISION_MISSING_IN_TEXT",
                CATEGORY,
                format!(
                    "O critério de decisão do fluxograma \"{}\" (Nó: {}) não parece ter uma menção correspondente clara no texto do protocolo. Palavras-chave do nó: [{}]",
                    node.criteria,
                    node.title,
                    join_keywords(&node.keywords)
                ),
            )
            .with_details(json!({
                "nodeId": node.node_id,
                "nodeTitle": node.title,
                "criteria": node.criteria,
                "flowchartKeywords": node.keywords,
            })),
        );
    }

    for medication in flowchart_medications(flowchart) {
        if text_medications.iter().any(|m| m.name == medication.normalized) {
            continue;
        }
        issues.push(
            ValidationIssue::warning(
                "CROSS_FLOWCHART_MED_MISSING_IN_TEXT",
                CATEGORY,
                format!(
                    "Medicamento \"{}\" (Nó de fluxograma: {}) não parece ter uma menção correspondente clara no texto do protocolo (Seção {MEDICATION_SECTION}).",
                    medication.name, medication.node_title
                ),
            )
            .with_details(json!({
                "nodeId": medication.node_id,
                "nodeTitle": medication.node_title,
                "medicationName": medication.name,
            })),
        );
    }

    issues
}

fn join_keywords(keywords: &KeywordSet) -> String {
    keywords.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
