//! Internal consistency of the flowchart graph.

use std::collections::{BTreeMap, HashSet};

use serde_json::json;

use medproto_core::models::flowchart::Flowchart;
use medproto_core::models::validation::{IssueCategory, Severity, ValidationIssue};

use super::{Rule, RuleContext, RuleGroup, RuleResult};
use crate::BoxFuture;

const CATEGORY: IssueCategory = IssueCategory::FlowchartConsistency;

/// Run a check against the flowchart, or report nothing without one.
fn with_flowchart<'a>(
    ctx: &'a RuleContext<'a>,
    check: fn(&Flowchart) -> Vec<ValidationIssue>,
) -> BoxFuture<'a, RuleResult> {
    Box::pin(async move { Ok(ctx.flowchart.map(check).unwrap_or_default()) })
}

/// Nodes other than start/end with no edge at all.
pub struct OrphanNodes;

impl Rule for OrphanNodes {
    fn id(&self) -> &'static str {
        "FLOWCHART_ORPHAN_NODES"
    }

    fn description(&self) -> &'static str {
        "Checks for nodes that are not connected to the main flow (excluding start/end nodes)."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, orphan_nodes)
    }
}

fn orphan_nodes(chart: &Flowchart) -> Vec<ValidationIssue> {
    if chart.nodes.len() <= 1 {
        return Vec::new();
    }
    let connected: HashSet<&str> = chart
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    chart
        .nodes
        .iter()
        .filter(|n| !n.is_start() && !n.is_end() && !connected.contains(n.id.as_str()))
        .map(|n| {
            ValidationIssue::warning(
                "FLOWCHART_ORPHAN_NODE",
                CATEGORY,
                format!(
                    "O nó \"{}\" (ID: {}, Tipo: {}) parece estar órfão (sem conexões de entrada ou saída).",
                    n.title(),
                    n.id,
                    n.kind.type_name()
                ),
            )
            .with_details(json!({ "nodeId": n.id, "nodeTitle": n.title() }))
        })
        .collect()
}

/// Edges pointing back at their own source.
pub struct SelfLoops;

impl Rule for SelfLoops {
    fn id(&self) -> &'static str {
        "FLOWCHART_INFINITE_LOOPS"
    }

    fn description(&self) -> &'static str {
        "Checks for basic infinite loops (self-referential nodes)."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, |chart| {
            chart
                .edges
                .iter()
                .filter(|e| e.source == e.target)
                .map(|e| {
                    ValidationIssue::error(
                        "FLOWCHART_SELF_LOOP",
                        CATEGORY,
                        format!(
                            "O nó ID \"{}\" aponta diretamente para si mesmo, criando um loop infinito.",
                            e.source
                        ),
                    )
                    .with_details(json!({ "nodeId": e.source }))
                })
                .collect()
        })
    }
}

/// Edge endpoints reference existing nodes.
pub struct DanglingEdges;

impl Rule for DanglingEdges {
    fn id(&self) -> &'static str {
        "FLOWCHART_EDGE_ENDPOINTS"
    }

    fn description(&self) -> &'static str {
        "Checks that every edge source and target references an existing node."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, dangling_edges)
    }
}

fn dangling_edges(chart: &Flowchart) -> Vec<ValidationIssue> {
    let ids: HashSet<&str> = chart.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut issues = Vec::new();
    for edge in &chart.edges {
        for (end, node_id) in [("source", &edge.source), ("target", &edge.target)] {
            if ids.contains(node_id.as_str()) {
                continue;
            }
            issues.push(
                ValidationIssue::error(
                    "FLOWCHART_DANGLING_EDGE",
                    CATEGORY,
                    format!(
                        "A aresta \"{}\" referencia um nó inexistente como {end}: \"{node_id}\".",
                        edge.id
                    ),
                )
                .with_details(json!({ "edgeId": edge.id, "end": end, "nodeId": node_id })),
            );
        }
    }
    issues
}

/// Node ids are unique.
pub struct DuplicateNodeIds;

impl Rule for DuplicateNodeIds {
    fn id(&self) -> &'static str {
        "FLOWCHART_NODE_IDS"
    }

    fn description(&self) -> &'static str {
        "Checks that node ids are unique within the flowchart."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, |chart| {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for node in &chart.nodes {
                *counts.entry(node.id.as_str()).or_default() += 1;
            }
            counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(id, count)| {
                    ValidationIssue::error(
                        "FLOWCHART_DUPLICATE_NODE_ID",
                        CATEGORY,
                        format!("O ID de nó \"{id}\" aparece {count} vezes no fluxograma."),
                    )
                    .with_details(json!({ "nodeId": id, "count": count }))
                })
                .collect()
        })
    }
}

/// Every node has a title.
pub struct NodeTitles;

impl Rule for NodeTitles {
    fn id(&self) -> &'static str {
        "FLOWCHART_NODE_TITLES"
    }

    fn description(&self) -> &'static str {
        "Checks that every node has a non-empty title."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, |chart| {
            chart
                .nodes
                .iter()
                .filter(|n| n.title().trim().is_empty())
                .map(|n| {
                    ValidationIssue::warning(
                        "FLOWCHART_NODE_TITLE_MISSING",
                        CATEGORY,
                        format!("O nó \"{}\" (Tipo: {}) não possui título.", n.id, n.kind.type_name()),
                    )
                    .with_details(json!({ "nodeId": n.id }))
                })
                .collect()
        })
    }
}

/// Medication table rows are fully specified.
pub struct MedicationFields;

impl Rule for MedicationFields {
    fn id(&self) -> &'static str {
        "FLOWCHART_MEDICATION_FIELDS"
    }

    fn description(&self) -> &'static str {
        "Checks that flowchart medications have name, dose, route and frequency."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> IssueCategory {
        CATEGORY
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Flowchart
    }

    fn check<'a>(&'a self, ctx: &'a RuleContext<'a>) -> BoxFuture<'a, RuleResult> {
        with_flowchart(ctx, incomplete_medications)
    }
}

fn incomplete_medications(chart: &Flowchart) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (node, data) in chart.medication_nodes() {
        for med in &data.medications {
            let missing: Vec<&str> = [
                ("nome", &med.name),
                ("dose", &med.dose),
                ("via", &med.route),
                ("frequência", &med.frequency),
            ]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label)
            .collect();

            if missing.is_empty() {
                continue;
            }
            issues.push(
                ValidationIssue::warning(
                    "FLOWCHART_MEDICATION_INCOMPLETE",
                    CATEGORY,
                    format!(
                        "O medicamento \"{}\" no nó \"{}\" está incompleto: faltam {}.",
                        med.name,
                        data.title,
                        missing.join(", ")
                    ),
                )
                .with_details(json!({
                    "nodeId": node.id,
                    "medicationName": med.name,
                    "missingFields": missing,
                })),
            );
        }
    }
    issues
}
