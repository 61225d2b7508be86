//! medproto-validation
//!
//! Rule-based validation of medical protocols and their flowcharts.
//!
//! Public API:
//! - `Validator::validate_full_protocol()` — run every rule group and
//!   aggregate a `ValidationReport`
//! - `Validator::validate_*()` — run a single rule group
//! - `extract` — decision/medication claims from text and flowchart
//! - `keywords` — keyword normalization and overlap matching
//! - `MedicationLookup` — the injected medication reference

pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod lookup;
pub mod rules;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::join_all;
use jiff::Timestamp;
use tracing::{debug, info};

use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::{ValidationIssue, ValidationReport};

pub use crate::config::ValidationConfig;
pub use crate::error::{LookupError, RuleError, ValidationError};
pub use crate::extract::{DecisionExtractor, PatternDecisionExtractor};
pub use crate::keywords::{significant_keyword_overlap, KeywordNormalizer};
pub use crate::lookup::{InMemoryMedicationLookup, MedicationEntry, MedicationLookup};
pub use crate::rules::{Rule, RuleContext, RuleGroup};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs validation rules against protocol content.
///
/// Holds the rule set, the tunables and the injected collaborators. One
/// validator can serve any number of runs; each run reads an immutable
/// snapshot of the content and flowchart it is given.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
    config: ValidationConfig,
    normalizer: KeywordNormalizer,
    extractor: Box<dyn DecisionExtractor>,
    medications: Arc<dyn MedicationLookup>,
}

impl Validator {
    /// Validator with every built-in rule and the default configuration.
    pub fn new(medications: Arc<dyn MedicationLookup>) -> Self {
        let normalizer = KeywordNormalizer::default();
        Self {
            rules: rules::all_rules(),
            config: ValidationConfig::default(),
            extractor: Box::new(PatternDecisionExtractor::new(normalizer.clone())),
            normalizer,
            medications,
        }
    }

    /// Replace the configuration. Rebuilds the keyword normalizer and the
    /// pattern extractor, so call [`Validator::with_extractor`] afterwards.
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.normalizer = KeywordNormalizer::new(&config.extra_abbreviations);
        self.extractor = Box::new(PatternDecisionExtractor::new(self.normalizer.clone()));
        self.config = config;
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn DecisionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Add a rule after the built-in ones of its group.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replace the whole rule set.
    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule group and aggregate the report, stamped with the
    /// current time.
    pub async fn validate_full_protocol(
        &self,
        protocol_id: impl Into<String>,
        version_id: Option<String>,
        content: &ProtocolFullContent,
        flowchart: Option<&Flowchart>,
    ) -> Result<ValidationReport, ValidationError> {
        self.validate_full_protocol_at(protocol_id, version_id, content, flowchart, Timestamp::now())
            .await
    }

    /// [`Validator::validate_full_protocol`] with an explicit check time.
    /// The time also anchors the recent-reference window of the evidence
    /// rule.
    pub async fn validate_full_protocol_at(
        &self,
        protocol_id: impl Into<String>,
        version_id: Option<String>,
        content: &ProtocolFullContent,
        flowchart: Option<&Flowchart>,
        checked_at: Timestamp,
    ) -> Result<ValidationReport, ValidationError> {
        let protocol_id = protocol_id.into();
        info!(
            protocol_id = %protocol_id,
            sections = content.len(),
            has_flowchart = flowchart.is_some(),
            "starting protocol validation"
        );

        let ctx = self.context(content, flowchart, checked_at);
        let mut issues = Vec::new();
        for group in RuleGroup::ALL {
            if group.needs_flowchart() && flowchart.is_none() {
                continue;
            }
            issues.extend(self.run_group(group, &ctx).await?);
        }
        if flowchart.is_none() {
            issues.push(rules::cross::flowchart_missing_issue());
        }

        let report = ValidationReport::from_issues(protocol_id, version_id, issues, checked_at);
        info!(
            protocol_id = %report.protocol_id,
            is_valid = report.is_valid,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            "protocol validation finished"
        );
        Ok(report)
    }

    pub async fn validate_protocol_structure(
        &self,
        content: &ProtocolFullContent,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        self.run_standalone(RuleGroup::Structure, content, None).await
    }

    pub async fn validate_completeness(
        &self,
        content: &ProtocolFullContent,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        self.run_standalone(RuleGroup::Completeness, content, None).await
    }

    pub async fn validate_medications(
        &self,
        content: &ProtocolFullContent,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        self.run_standalone(RuleGroup::Medication, content, None).await
    }

    pub async fn validate_medical_content(
        &self,
        content: &ProtocolFullContent,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        self.run_standalone(RuleGroup::MedicalContent, content, None).await
    }

    /// Internal consistency of the flowchart graph.
    pub async fn validate_flowchart(
        &self,
        content: &ProtocolFullContent,
        flowchart: &Flowchart,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        self.run_standalone(RuleGroup::Flowchart, content, Some(flowchart)).await
    }

    /// Text against flowchart in both directions. Without a flowchart the
    /// result is the single `CROSS_FLOWCHART_MISSING` warning.
    pub async fn validate_cross_consistency(
        &self,
        content: &ProtocolFullContent,
        flowchart: Option<&Flowchart>,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        if flowchart.is_none() {
            return Ok(vec![rules::cross::flowchart_missing_issue()]);
        }
        self.run_standalone(RuleGroup::CrossConsistency, content, flowchart).await
    }

    async fn run_standalone(
        &self,
        group: RuleGroup,
        content: &ProtocolFullContent,
        flowchart: Option<&Flowchart>,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        let ctx = self.context(content, flowchart, Timestamp::now());
        self.run_group(group, &ctx).await
    }

    fn context<'a>(
        &'a self,
        content: &'a ProtocolFullContent,
        flowchart: Option<&'a Flowchart>,
        checked_at: Timestamp,
    ) -> RuleContext<'a> {
        RuleContext {
            content,
            flowchart,
            config: &self.config,
            normalizer: &self.normalizer,
            extractor: self.extractor.as_ref(),
            medications: self.medications.as_ref(),
            checked_at,
        }
    }

    /// Run the rules of one group concurrently; issues keep rule order.
    async fn run_group(
        &self,
        group: RuleGroup,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<ValidationIssue>, ValidationError> {
        let rules: Vec<&dyn Rule> = self
            .rules
            .iter()
            .map(Box::as_ref)
            .filter(|r| r.group() == group)
            .collect();

        let results = join_all(rules.iter().map(|rule| rule.check(ctx))).await;

        let mut issues = Vec::new();
        for (rule, result) in rules.iter().zip(results) {
            let found = result.map_err(|source| ValidationError::Rule {
                rule_id: rule.id().to_string(),
                source,
            })?;
            issues.extend(found);
        }
        debug!(group = ?group, rules = rules.len(), issues = issues.len(), "rule group finished");
        Ok(issues)
    }
}
