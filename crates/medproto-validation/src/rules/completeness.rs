use medproto_core::json::is_blank;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};
use medproto_core::sections::{self, SECTION1_REQUIRED_FIELDS, SECTION_COUNT};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;

/// No section may be missing or empty.
pub struct SectionsHaveContent;

impl Rule for SectionsHaveContent {
    fn id(&self) -> &'static str {
        "COMPLETENESS_SECTIONS_CONTENT"
    }

    fn description(&self) -> &'static str {
        "Ensures all 13 sections have non-empty content."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Completeness
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Completeness
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let issues = (1..=SECTION_COUNT)
                .filter(|n| !ctx.content.section(*n).is_some_and(|s| s.has_content()))
                .map(|n| {
                    ValidationIssue::error(
                        "COMPLETENESS_001",
                        IssueCategory::Completeness,
                        format!(
                            "O conteúdo da Seção {n} ({}) está ausente ou vazio. Todas as seções devem ser preenchidas.",
                            sections::title_for(n)
                        ),
                    )
                    .with_section(n)
                })
                .collect();
            Ok(issues)
        })
    }
}

/// Section 1 carries every identification field.
///
/// Section 1 content that is not a JSON object, arrays included, yields a
/// single `COMPLETENESS_002_FORMAT` error instead of per-field
/// `COMPLETENESS_002` errors, since its fields cannot be addressed by name.
pub struct Section1RequiredFields;

impl Rule for Section1RequiredFields {
    fn id(&self) -> &'static str {
        "COMPLETENESS_SECTION1_REQUIRED_FIELDS"
    }

    fn description(&self) -> &'static str {
        "Ensures all required metadata fields in Section 1 are present and non-empty."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Completeness
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Completeness
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            // A missing section 1 is reported by the structure rules.
            let Some(section) = ctx.content.section(1) else {
                return Ok(Vec::new());
            };
            let Some(fields) = section.content.as_object() else {
                return Ok(vec![
                    ValidationIssue::error(
                        "COMPLETENESS_002_FORMAT",
                        IssueCategory::Completeness,
                        "O conteúdo da Seção 1 não está no formato de objeto esperado, impedindo a verificação de campos obrigatórios.",
                    )
                    .with_section(1),
                ]);
            };

            let issues = SECTION1_REQUIRED_FIELDS
                .iter()
                .filter(|name| is_blank(fields.get(**name)))
                .map(|name| {
                    ValidationIssue::error(
                        "COMPLETENESS_002",
                        IssueCategory::Completeness,
                        format!(
                            "O campo obrigatório '{name}' está ausente ou vazio na Seção 1 (Identificação do Protocolo)."
                        ),
                    )
                    .with_section(1)
                    .with_field(*name)
                })
                .collect();
            Ok(issues)
        })
    }
}
