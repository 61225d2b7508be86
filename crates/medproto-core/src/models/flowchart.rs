//! Standard flowchart schema: decision / action / medication / triage /
//! start / end nodes, as drawn by the protocol editor.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::{decode_node_data, null_as_default};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

/// One row of a medication node's table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowchartMedication {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dose: String,
    #[serde(deserialize_with = "null_as_default")]
    pub route: String,
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputPosition {
    BottomLeft,
    BottomRight,
    #[default]
    BottomCenter,
    Left,
    Right,
}

/// A labelled output handle on a decision node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionOutput {
    pub id: String,
    pub label: String,
    pub position: OutputPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub criteria: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub outputs: Vec<DecisionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationNodeData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub medications: Vec<FlowchartMedication>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriageData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of start and end nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminalData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Node variants keyed by the JSON `type` discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Start(TerminalData),
    End(TerminalData),
    Decision(DecisionData),
    Action(ActionData),
    Medication(MedicationNodeData),
    Triage(TriageData),
    /// A `type` this schema does not know. Kept verbatim.
    Unknown { node_type: String, data: Value },
}

impl NodeKind {
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Start(_) => "start",
            NodeKind::End(_) => "end",
            NodeKind::Decision(_) => "decision",
            NodeKind::Action(_) => "action",
            NodeKind::Medication(_) => "medication",
            NodeKind::Triage(_) => "triage",
            NodeKind::Unknown { node_type, .. } => node_type,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            NodeKind::Start(d) | NodeKind::End(d) => Some(&d.title),
            NodeKind::Decision(d) => Some(&d.title),
            NodeKind::Action(d) => Some(&d.title),
            NodeKind::Medication(d) => Some(&d.title),
            NodeKind::Triage(d) => Some(&d.title),
            NodeKind::Unknown { data, .. } => data.get("title").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFlowNode")]
pub struct FlowNode {
    pub id: String,
    pub position: Position,
    pub kind: NodeKind,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, position: Position, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            position,
            kind,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, NodeKind::Start(_))
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, NodeKind::End(_))
    }

    pub fn as_decision(&self) -> Option<&DecisionData> {
        match &self.kind {
            NodeKind::Decision(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_medication(&self) -> Option<&MedicationNodeData> {
        match &self.kind {
            NodeKind::Medication(d) => Some(d),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        self.kind.title().unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct RawFlowNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawFlowNode> for FlowNode {
    type Error = CoreError;

    fn try_from(raw: RawFlowNode) -> Result<Self, Self::Error> {
        let RawFlowNode {
            id,
            node_type,
            position,
            data,
        } = raw;

        let kind = match node_type.as_str() {
            "start" => NodeKind::Start(decode_node_data(&id, &node_type, data)?),
            "end" => NodeKind::End(decode_node_data(&id, &node_type, data)?),
            "decision" => NodeKind::Decision(decode_node_data(&id, &node_type, data)?),
            "action" => NodeKind::Action(decode_node_data(&id, &node_type, data)?),
            "medication" => NodeKind::Medication(decode_node_data(&id, &node_type, data)?),
            "triage" => NodeKind::Triage(decode_node_data(&id, &node_type, data)?),
            _ => NodeKind::Unknown { node_type, data },
        };

        Ok(FlowNode { id, position, kind })
    }
}

impl Serialize for FlowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("FlowNode", 4)?;
        node.serialize_field("id", &self.id)?;
        node.serialize_field("type", self.kind.type_name())?;
        node.serialize_field("position", &self.position)?;
        match &self.kind {
            NodeKind::Start(d) | NodeKind::End(d) => node.serialize_field("data", d)?,
            NodeKind::Decision(d) => node.serialize_field("data", d)?,
            NodeKind::Action(d) => node.serialize_field("data", d)?,
            NodeKind::Medication(d) => node.serialize_field("data", d)?,
            NodeKind::Triage(d) => node.serialize_field("data", d)?,
            NodeKind::Unknown { data, .. } => node.serialize_field("data", data)?,
        }
        node.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Default,
    Conditional,
    Orthogonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<EdgeType>,
}

impl FlowEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            label: None,
            edge_type: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A flowchart in the standard schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flowchart {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

impl Flowchart {
    pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
        Self {
            nodes,
            edges,
            viewport: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Decision nodes with their payloads.
    pub fn decision_nodes(&self) -> impl Iterator<Item = (&FlowNode, &DecisionData)> {
        self.nodes
            .iter()
            .filter_map(|n| n.as_decision().map(|d| (n, d)))
    }

    /// Medication nodes with their payloads.
    pub fn medication_nodes(&self) -> impl Iterator<Item = (&FlowNode, &MedicationNodeData)> {
        self.nodes
            .iter()
            .filter_map(|n| n.as_medication().map(|d| (n, d)))
    }
}
