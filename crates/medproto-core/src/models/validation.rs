use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum IssueCategory {
    Structure,
    Completeness,
    Objectivity,
    Medication,
    FlowchartConsistency,
    ContentSpecific,
}

/// One finding produced by a validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationIssue {
    pub rule_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    pub severity: Severity,
    pub category: IssueCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        category: IssueCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            section_number: None,
            field: None,
            message: message.into(),
            severity,
            category,
            details: None,
            suggestion: None,
        }
    }

    pub fn error(rule_id: impl Into<String>, category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Error, category, message)
    }

    pub fn warning(rule_id: impl Into<String>, category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Warning, category, message)
    }

    pub fn with_section(mut self, section_number: u32) -> Self {
        self.section_number = Some(section_number);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let errors = issues.iter().filter(|i| i.is_error()).count();
        Self {
            total_issues: issues.len(),
            errors,
            warnings: issues.len() - errors,
        }
    }
}

/// Aggregated result of one validation run. Valid when there are no
/// error-severity issues; warnings never fail a protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationReport {
    pub protocol_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub checked_at: jiff::Timestamp,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn from_issues(
        protocol_id: impl Into<String>,
        version_id: Option<String>,
        issues: Vec<ValidationIssue>,
        checked_at: jiff::Timestamp,
    ) -> Self {
        let summary = ValidationSummary::from_issues(&issues);
        Self {
            protocol_id: protocol_id.into(),
            version_id,
            is_valid: summary.errors == 0,
            issues,
            checked_at,
            summary,
        }
    }

    pub fn issues_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.rule_id == rule_id)
    }
}
