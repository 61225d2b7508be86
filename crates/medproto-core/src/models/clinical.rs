//! Clinical flowchart schema: questionnaire (`custom`), `summary` and
//! `conduct` nodes. Text fields marked as HTML carry rendered markup.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::decode_node_data;
use super::flowchart::Position;
use crate::error::CoreError;

/// Node `type` values accepted by the clinical schema.
pub const CLINICAL_NODE_TYPES: [&str; 5] = ["custom", "summary", "conduct", "start", "end"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visivel,
    Oculto,
}

/// Answer mode of a questionnaire question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectMode {
    /// Multiple choice.
    #[serde(rename = "E")]
    Multiple,
    /// Single choice.
    #[default]
    #[serde(rename = "F")]
    Single,
    /// Free text.
    #[serde(rename = "B")]
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    pub preselected: bool,
    pub exclusive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub uid: String,
    pub titulo: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub expressao: String,
    pub select: SelectMode,
    pub options: Vec<QuestionOption>,
}

/// Questionnaire node payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomNodeData {
    pub label: String,
    pub condicao: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryNodeData {
    pub label: String,
    pub condicao: String,
    pub descricao: String,
    pub condicional: Visibility,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Orientacao {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub condicao: String,
    /// HTML.
    pub conteudo: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamSetting {
    Domiciliar,
    #[default]
    Hospitalar,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Exame {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub condicao: String,
    pub condicional_exame: ExamSetting,
    pub codigo: String,
    pub cid: String,
    pub indicacao: String,
    pub alerta: String,
    pub material: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationSetting {
    #[default]
    #[serde(rename = "intra-hospitalar")]
    IntraHospitalar,
    #[serde(rename = "domiciliar")]
    Domiciliar,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Medicamento {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub condicao: String,
    pub condicional_medicamento: MedicationSetting,
    pub quantidade: u32,
    pub codigo: String,
    pub nome_med: String,
    /// HTML.
    pub posologia: String,
    pub mensagem_medico: String,
    pub via: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Encaminhamento {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub condicao: String,
    pub especialidade: String,
    pub motivo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mensagem {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub condicao: String,
    /// HTML.
    pub conteudo: String,
    pub observacao: String,
}

/// Grouped treatment items of one conduct step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConductDataNode {
    pub orientacao: Vec<Orientacao>,
    pub exame: Vec<Exame>,
    pub medicamento: Vec<Medicamento>,
    pub encaminhamento: Vec<Encaminhamento>,
    pub mensagem: Vec<Mensagem>,
}

impl ConductDataNode {
    pub fn is_empty(&self) -> bool {
        self.orientacao.is_empty()
            && self.exame.is_empty()
            && self.medicamento.is_empty()
            && self.encaminhamento.is_empty()
            && self.mensagem.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conduta {
    #[default]
    Conclusao,
    Encaminhamento,
    Retorno,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConductNodeData {
    pub label: String,
    pub condicao: String,
    pub descricao: String,
    pub condicional: Visibility,
    pub conduta: Conduta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conduta_data_node: Option<ConductDataNode>,
}

/// Payload of clinical start and end nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicalTerminalData {
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClinicalNodeKind {
    Custom(CustomNodeData),
    Summary(SummaryNodeData),
    Conduct(ConductNodeData),
    Start(ClinicalTerminalData),
    End(ClinicalTerminalData),
    /// A `type` outside [`CLINICAL_NODE_TYPES`]. Kept verbatim.
    Unknown { node_type: String, data: Value },
}

impl ClinicalNodeKind {
    pub fn type_name(&self) -> &str {
        match self {
            ClinicalNodeKind::Custom(_) => "custom",
            ClinicalNodeKind::Summary(_) => "summary",
            ClinicalNodeKind::Conduct(_) => "conduct",
            ClinicalNodeKind::Start(_) => "start",
            ClinicalNodeKind::End(_) => "end",
            ClinicalNodeKind::Unknown { node_type, .. } => node_type,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ClinicalNodeKind::Custom(d) => Some(&d.label),
            ClinicalNodeKind::Summary(d) => Some(&d.label),
            ClinicalNodeKind::Conduct(d) => Some(&d.label),
            ClinicalNodeKind::Start(d) | ClinicalNodeKind::End(d) => Some(&d.label),
            ClinicalNodeKind::Unknown { data, .. } => data.get("label").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawClinicalNode")]
pub struct ClinicalNode {
    pub id: String,
    pub position: Position,
    pub kind: ClinicalNodeKind,
}

impl ClinicalNode {
    pub fn new(id: impl Into<String>, position: Position, kind: ClinicalNodeKind) -> Self {
        Self {
            id: id.into(),
            position,
            kind,
        }
    }
}

#[derive(Deserialize)]
struct RawClinicalNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawClinicalNode> for ClinicalNode {
    type Error = CoreError;

    fn try_from(raw: RawClinicalNode) -> Result<Self, Self::Error> {
        let RawClinicalNode {
            id,
            node_type,
            position,
            data,
        } = raw;

        let kind = match node_type.as_str() {
            "custom" => ClinicalNodeKind::Custom(decode_node_data(&id, &node_type, data)?),
            "summary" => ClinicalNodeKind::Summary(decode_node_data(&id, &node_type, data)?),
            "conduct" => ClinicalNodeKind::Conduct(decode_node_data(&id, &node_type, data)?),
            "start" => ClinicalNodeKind::Start(decode_node_data(&id, &node_type, data)?),
            "end" => ClinicalNodeKind::End(decode_node_data(&id, &node_type, data)?),
            _ => ClinicalNodeKind::Unknown { node_type, data },
        };

        Ok(ClinicalNode { id, position, kind })
    }
}

impl Serialize for ClinicalNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("ClinicalNode", 4)?;
        node.serialize_field("id", &self.id)?;
        node.serialize_field("type", self.kind.type_name())?;
        node.serialize_field("position", &self.position)?;
        match &self.kind {
            ClinicalNodeKind::Custom(d) => node.serialize_field("data", d)?,
            ClinicalNodeKind::Summary(d) => node.serialize_field("data", d)?,
            ClinicalNodeKind::Conduct(d) => node.serialize_field("data", d)?,
            ClinicalNodeKind::Start(d) | ClinicalNodeKind::End(d) => {
                node.serialize_field("data", d)?
            }
            ClinicalNodeKind::Unknown { data, .. } => node.serialize_field("data", data)?,
        }
        node.end()
    }
}

/// Transition rule carried by a clinical edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRule {
    #[serde(default)]
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeRule>,
}

impl ClinicalEdge {
    pub fn rule(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.rule.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalFlowchart {
    #[serde(default)]
    pub nodes: Vec<ClinicalNode>,
    #[serde(default)]
    pub edges: Vec<ClinicalEdge>,
}

impl ClinicalFlowchart {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn node(&self, id: &str) -> Option<&ClinicalNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
