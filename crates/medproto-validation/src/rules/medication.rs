use serde_json::{json, Map, Value};
use tracing::warn;

use medproto_core::json::{display_value, is_blank};
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;
use crate::extract::text::{section7_medication_entries, MEDICATION_SECTION};

/// Section 7 medications exist in the medication reference.
pub struct MedicationExistence;

impl Rule for MedicationExistence {
    fn id(&self) -> &'static str {
        "MED_EXISTENCE"
    }

    fn description(&self) -> &'static str {
        "Checks if medications listed in the protocol exist in the medication reference."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Medication
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Medication
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let mut issues = Vec::new();
            for entry in section7_medication_entries(ctx.content) {
                let Some(name) = entry.get("name").and_then(Value::as_str) else {
                    warn!(rule_id = self.id(), "skipping section 7 medication with a non-string name");
                    continue;
                };
                match ctx.medications.lookup(name).await {
                    Ok(Some(_)) => {}
                    Ok(None) => issues.push(
                        ValidationIssue::warning(
                            "MEDICATION_001",
                            IssueCategory::Medication,
                            format!(
                                "Medicamento \"{name}\" listado na Seção {MEDICATION_SECTION} não foi encontrado na base de dados de referência."
                            ),
                        )
                        .with_section(MEDICATION_SECTION)
                        .with_field(format!("medicamentos (nome: {name})"))
                        .with_details(json!({ "medicationName": name })),
                    ),
                    Err(e) => {
                        warn!(rule_id = self.id(), medication = name, error = %e, "medication lookup failed");
                    }
                }
            }
            Ok(issues)
        })
    }
}

/// Section 7 medications specify dose, route and frequency.
pub struct MedicationDetailsFormat;

impl Rule for MedicationDetailsFormat {
    fn id(&self) -> &'static str {
        "MED_DETAILS_FORMAT"
    }

    fn description(&self) -> &'static str {
        "Checks if medication dose, route, and frequency are specified."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Medication
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Medication
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        Box::pin(async move {
            let issues = section7_medication_entries(ctx.content)
                .into_iter()
                .flat_map(missing_details)
                .collect();
            Ok(issues)
        })
    }
}

fn missing_details(entry: &Map<String, Value>) -> Vec<ValidationIssue> {
    let name = entry.get("name").map(display_value).unwrap_or_default();
    let checks = [
        ("MEDICATION_002", "dose", "dose", "Dose não especificada"),
        ("MEDICATION_003", "route", "via", "Via de administração não especificada"),
        ("MEDICATION_004", "frequency", "frequência", "Frequência não especificada"),
    ];

    checks
        .into_iter()
        .filter(|(_, key, _, _)| is_blank(entry.get(*key)))
        .map(|(rule_id, _, label, what)| {
            ValidationIssue::error(
                rule_id,
                IssueCategory::Medication,
                format!("{what} para o medicamento \"{name}\" na Seção {MEDICATION_SECTION}."),
            )
            .with_section(MEDICATION_SECTION)
            .with_field(format!("medicamentos ({name} - {label})"))
            .with_details(json!({ "medicationName": name }))
        })
        .collect()
}
