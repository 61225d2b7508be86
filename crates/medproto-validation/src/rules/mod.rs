//! The rule registry.
//!
//! Each rule is a unit struct reporting zero or more issues for one
//! protocol. Rules belong to a [`RuleGroup`]; the orchestrator runs the
//! groups in a fixed order and concatenates their issues.

pub mod completeness;
pub mod cross;
pub mod flowchart;
pub mod medical_content;
pub mod medication;
pub mod structure;

use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};

use crate::BoxFuture;
use crate::config::ValidationConfig;
use crate::error::RuleError;
use crate::extract::DecisionExtractor;
use crate::keywords::KeywordNormalizer;
use crate::lookup::MedicationLookup;

pub type RuleResult = Result<Vec<ValidationIssue>, RuleError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    Structure,
    Completeness,
    Medication,
    MedicalContent,
    Flowchart,
    CrossConsistency,
}

impl RuleGroup {
    /// Groups in the order the orchestrator runs them.
    pub const ALL: [RuleGroup; 6] = [
        RuleGroup::Structure,
        RuleGroup::Completeness,
        RuleGroup::Medication,
        RuleGroup::MedicalContent,
        RuleGroup::Flowchart,
        RuleGroup::CrossConsistency,
    ];

    /// Whether the group only makes sense with a flowchart.
    pub fn needs_flowchart(self) -> bool {
        matches!(self, RuleGroup::Flowchart | RuleGroup::CrossConsistency)
    }
}

/// Everything a rule may read.
pub struct RuleContext<'a> {
    pub content: &'a ProtocolFullContent,
    pub flowchart: Option<&'a Flowchart>,
    pub config: &'a ValidationConfig,
    pub normalizer: &'a KeywordNormalizer,
    pub extractor: &'a dyn DecisionExtractor,
    pub medications: &'a dyn MedicationLookup,
    pub checked_at: jiff::Timestamp,
}

/// Trait implemented by each validation rule.
pub trait Rule: Send + Sync {
    /// Unique identifier (e.g. "STRUCTURE_SECTION_TITLES"). Issues carry
    /// their own, finer-grained rule ids.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Highest severity this rule reports.
    fn severity(&self) -> Severity;

    fn category(&self) -> IssueCategory;

    fn group(&self) -> RuleGroup;

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult>;
}

/// Return all built-in rules, in run order.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(structure::SectionPresenceAndOrder),
        Box::new(structure::SectionTitles),
        Box::new(structure::ContentFormat),
        Box::new(completeness::SectionsHaveContent),
        Box::new(completeness::Section1RequiredFields),
        Box::new(medication::MedicationExistence),
        Box::new(medication::MedicationDetailsFormat),
        Box::new(medical_content::DosageSafety),
        Box::new(medical_content::ProcedureSafety),
        Box::new(medical_content::MonitoringRequirements),
        Box::new(medical_content::EvidenceBase),
        Box::new(flowchart::OrphanNodes),
        Box::new(flowchart::SelfLoops),
        Box::new(flowchart::DanglingEdges),
        Box::new(flowchart::DuplicateNodeIds),
        Box::new(flowchart::NodeTitles),
        Box::new(flowchart::MedicationFields),
        Box::new(cross::TextElementsInFlowchart),
        Box::new(cross::FlowchartElementsInText),
    ]
}

/// Built-in rules of one group.
pub fn rules_in(group: RuleGroup) -> Vec<Box<dyn Rule>> {
    all_rules().into_iter().filter(|r| r.group() == group).collect()
}

/// Look up a rule by ID.
pub fn get_rule(id: &str) -> Option<Box<dyn Rule>> {
    all_rules().into_iter().find(|r| r.id() == id)
}
