//! Lossy conversion between the standard and clinical flowchart schemas.
//!
//! Node ids, positions and edge endpoints always survive a conversion, so
//! a round trip keeps the node count and the edge topology. Node payloads
//! do not: a decision becomes a one-question questionnaire, and converting
//! that back yields a decision whose criteria is the question text.

use medproto_core::models::clinical::{
    ClinicalEdge, ClinicalFlowchart, ClinicalNode, ClinicalNodeKind, ClinicalTerminalData,
    ConductDataNode, ConductNodeData, CustomNodeData, EdgeRule, Medicamento, MedicationSetting,
    Orientacao, Question, QuestionOption, SelectMode, SummaryNodeData, Visibility,
};
use medproto_core::models::flowchart::{
    ActionData, DecisionData, EdgeType, FlowEdge, FlowNode, Flowchart, FlowchartMedication,
    NodeKind, TerminalData, TriageData,
};
use tracing::{debug, warn};

const ALWAYS: &str = "SEMPRE";
const DEFAULT_EDGE_RULE: &str = "Regra nova";
const QUESTIONNAIRE_CRITERIA: &str = "Questionário";
const UNKNOWN_NODE_TITLE: &str = "Nó desconhecido";

/// Convert a standard flowchart into the clinical schema.
pub fn standard_to_clinical(standard: &Flowchart) -> ClinicalFlowchart {
    let nodes = standard.nodes.iter().map(node_to_clinical).collect();
    let edges = standard
        .edges
        .iter()
        .map(|edge| ClinicalEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            data: Some(EdgeRule {
                rule: edge
                    .label
                    .as_deref()
                    .filter(|l| !l.is_empty())
                    .unwrap_or(DEFAULT_EDGE_RULE)
                    .to_string(),
            }),
        })
        .collect();

    ClinicalFlowchart { nodes, edges }
}

/// Convert a clinical flowchart into the standard schema.
pub fn clinical_to_standard(clinical: &ClinicalFlowchart) -> Flowchart {
    let nodes = clinical.nodes.iter().map(node_to_standard).collect();
    let edges = clinical
        .edges
        .iter()
        .map(|edge| FlowEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: None,
            target_handle: None,
            label: edge.rule().map(str::to_string),
            edge_type: Some(EdgeType::Default),
        })
        .collect();

    Flowchart::new(nodes, edges)
}

fn node_to_clinical(node: &FlowNode) -> ClinicalNode {
    debug!(node_id = %node.id, node_type = node.kind.type_name(), "converting node to clinical");

    let kind = match &node.kind {
        NodeKind::Decision(d) => ClinicalNodeKind::Custom(decision_questionnaire(&node.id, d)),
        NodeKind::Triage(d) => ClinicalNodeKind::Summary(SummaryNodeData {
            label: non_empty_or(&d.title, "Triagem"),
            condicao: String::new(),
            descricao: d.description.clone().unwrap_or_default(),
            condicional: Visibility::Visivel,
        }),
        NodeKind::Action(d) => {
            let mut data = ConductDataNode::default();
            if !d.actions.is_empty() {
                data.orientacao.push(Orientacao {
                    id: format!("O{}", node.id),
                    nome: "Orientações".to_string(),
                    condicao: ALWAYS.to_string(),
                    conteudo: html_list(&d.actions),
                    ..Orientacao::default()
                });
            }
            ClinicalNodeKind::Conduct(conduct(non_empty_or(&d.title, "Ação"), data))
        }
        NodeKind::Medication(d) => {
            let medicamento = d
                .medications
                .iter()
                .enumerate()
                .map(|(idx, med)| to_medicamento(&node.id, idx, med))
                .collect();
            let data = ConductDataNode {
                medicamento,
                ..ConductDataNode::default()
            };
            ClinicalNodeKind::Conduct(conduct(non_empty_or(&d.title, "Medicamento"), data))
        }
        NodeKind::Start(d) => ClinicalNodeKind::Custom(empty_questionnaire(terminal_label(d, "Início"))),
        NodeKind::End(d) => ClinicalNodeKind::Custom(empty_questionnaire(terminal_label(d, "Fim"))),
        NodeKind::Unknown { node_type, data } => {
            warn!(node_id = %node.id, %node_type, "unknown standard node type; converting to empty questionnaire");
            let title = data.get("title").and_then(|t| t.as_str()).unwrap_or_default();
            ClinicalNodeKind::Custom(empty_questionnaire(non_empty_or(title, "Nó")))
        }
    };

    ClinicalNode::new(node.id.clone(), node.position, kind)
}

fn node_to_standard(node: &ClinicalNode) -> FlowNode {
    debug!(node_id = %node.id, node_type = node.kind.type_name(), "converting node to standard");

    let kind = match &node.kind {
        ClinicalNodeKind::Custom(d) => NodeKind::Decision(DecisionData {
            title: d.label.clone(),
            criteria: non_empty_or(&d.descricao, QUESTIONNAIRE_CRITERIA),
            ..DecisionData::default()
        }),
        ClinicalNodeKind::Summary(d) => NodeKind::Triage(TriageData {
            title: d.label.clone(),
            description: Some(d.descricao.clone()).filter(|s| !s.is_empty()),
        }),
        ClinicalNodeKind::Conduct(d) => NodeKind::Action(ActionData {
            title: d.label.clone(),
            actions: conduct_summary(d),
        }),
        ClinicalNodeKind::Start(d) => NodeKind::Start(standard_terminal(d)),
        ClinicalNodeKind::End(d) => NodeKind::End(standard_terminal(d)),
        ClinicalNodeKind::Unknown { node_type, data } => {
            warn!(node_id = %node.id, %node_type, "unknown clinical node type; converting to action");
            let label = data.get("label").and_then(|l| l.as_str()).unwrap_or_default();
            NodeKind::Action(ActionData {
                title: non_empty_or(label, UNKNOWN_NODE_TITLE),
                actions: vec!["Ação".to_string()],
            })
        }
    };

    FlowNode::new(node.id.clone(), node.position, kind)
}

fn decision_questionnaire(node_id: &str, decision: &DecisionData) -> CustomNodeData {
    let title = non_empty_or(&decision.title, "Decisão");
    let option = |label: &str| QuestionOption {
        label: label.to_string(),
        ..QuestionOption::default()
    };

    CustomNodeData {
        label: title.clone(),
        condicao: ALWAYS.to_string(),
        descricao: decision.criteria.clone(),
        condicional: Visibility::Visivel,
        questions: vec![Question {
            id: format!("Q{node_id}"),
            titulo: title,
            descricao: decision.criteria.clone(),
            select: SelectMode::Single,
            options: vec![option("Sim"), option("Não")],
            ..Question::default()
        }],
    }
}

fn empty_questionnaire(label: String) -> CustomNodeData {
    CustomNodeData {
        label,
        condicao: ALWAYS.to_string(),
        ..CustomNodeData::default()
    }
}

fn conduct(label: String, data: ConductDataNode) -> ConductNodeData {
    ConductNodeData {
        label,
        conduta_data_node: Some(data),
        ..ConductNodeData::default()
    }
}

fn to_medicamento(node_id: &str, idx: usize, med: &FlowchartMedication) -> Medicamento {
    Medicamento {
        id: format!("M{node_id}-{idx}"),
        nome: med.name.clone(),
        condicional_medicamento: MedicationSetting::IntraHospitalar,
        quantidade: 1,
        nome_med: med.name.clone(),
        posologia: format!(
            "<p>{} {} {}</p>",
            escape_html(&med.dose),
            escape_html(&med.route),
            escape_html(&med.frequency)
        ),
        via: med.route.clone(),
        ..Medicamento::default()
    }
}

/// One count line per populated sub-list of a conduct node.
fn conduct_summary(conduct: &ConductNodeData) -> Vec<String> {
    let mut actions = Vec::new();
    match &conduct.conduta_data_node {
        Some(data) => {
            let counts = [
                (data.medicamento.len(), "medicamento(s)"),
                (data.exame.len(), "exame(s)"),
                (data.orientacao.len(), "orientação(ões)"),
                (data.encaminhamento.len(), "encaminhamento(s)"),
                (data.mensagem.len(), "mensagem(ns)"),
            ];
            actions.extend(
                counts
                    .into_iter()
                    .filter(|(n, _)| *n > 0)
                    .map(|(n, noun)| format!("{n} {noun}")),
            );
        }
        None if !conduct.descricao.is_empty() => actions.push("Protocolo encerrado".to_string()),
        None => {}
    }

    if actions.is_empty() {
        actions.push("Conduta médica".to_string());
    }
    actions
}

fn terminal_label(data: &TerminalData, fallback: &str) -> String {
    non_empty_or(&data.title, fallback)
}

fn standard_terminal(data: &ClinicalTerminalData) -> TerminalData {
    TerminalData {
        title: if data.title.is_empty() {
            data.label.clone()
        } else {
            data.title.clone()
        },
        description: None,
    }
}

fn html_list(items: &[String]) -> String {
    let mut html = String::from("<ul>");
    for item in items {
        html.push_str("<li>");
        html.push_str(&escape_html(item));
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
