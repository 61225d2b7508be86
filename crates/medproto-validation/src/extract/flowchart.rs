//! Claims made by the flowchart: decision criteria and medication tables.

use medproto_core::models::flowchart::Flowchart;

use crate::keywords::{KeywordNormalizer, KeywordSet};

#[derive(Debug, Clone, PartialEq)]
pub struct FlowchartDecision<'a> {
    pub node_id: &'a str,
    pub title: &'a str,
    pub criteria: &'a str,
    pub keywords: KeywordSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowchartMedicationRef<'a> {
    pub node_id: &'a str,
    pub node_title: &'a str,
    pub name: &'a str,
    /// Lowercased, trimmed.
    pub normalized: String,
}

/// Every decision node with the keywords of its criteria.
pub fn flowchart_decisions<'a>(
    flowchart: &'a Flowchart,
    normalizer: &KeywordNormalizer,
) -> Vec<FlowchartDecision<'a>> {
    flowchart
        .decision_nodes()
        .map(|(node, data)| FlowchartDecision {
            node_id: &node.id,
            title: &data.title,
            criteria: &data.criteria,
            keywords: normalizer.keywords(&data.criteria),
        })
        .collect()
}

/// Every medication row across all medication nodes.
pub fn flowchart_medications(flowchart: &Flowchart) -> Vec<FlowchartMedicationRef<'_>> {
    flowchart
        .medication_nodes()
        .flat_map(|(node, data)| {
            data.medications.iter().map(move |med| FlowchartMedicationRef {
                node_id: &node.id,
                node_title: &data.title,
                name: &med.name,
                normalized: med.name.trim().to_lowercase(),
            })
        })
        .collect()
}
