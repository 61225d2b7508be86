use serde::Serialize;
use serde_json::Value;

use medproto_core::models::clinical::ClinicalFlowchart;
use medproto_core::models::flowchart::Flowchart;

use crate::convert::clinical_to_standard;
use crate::error::FlowchartError;
use crate::export::FlowchartFormat;
use crate::guard::is_valid_clinical_flowchart;

/// A flowchart in either schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyFlowchart {
    Standard(Flowchart),
    Clinical(ClinicalFlowchart),
}

impl AnyFlowchart {
    /// Detect the schema of untyped JSON. Anything passing
    /// [`is_valid_clinical_flowchart`] is clinical; otherwise it must parse
    /// as a standard flowchart.
    pub fn from_value(value: Value) -> Result<Self, FlowchartError> {
        if is_valid_clinical_flowchart(&value) {
            return Ok(AnyFlowchart::Clinical(serde_json::from_value(value)?));
        }
        if !value.get("nodes").is_some_and(Value::is_array) {
            return Err(FlowchartError::UnrecognizedSchema);
        }
        Ok(AnyFlowchart::Standard(serde_json::from_value(value)?))
    }

    pub fn from_json(json: &str) -> Result<Self, FlowchartError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn format(&self) -> FlowchartFormat {
        match self {
            AnyFlowchart::Standard(_) => FlowchartFormat::Standard,
            AnyFlowchart::Clinical(_) => FlowchartFormat::Clinical,
        }
    }

    /// The flowchart in the standard schema, converting when clinical.
    pub fn into_standard(self) -> Flowchart {
        match self {
            AnyFlowchart::Standard(chart) => chart,
            AnyFlowchart::Clinical(chart) => clinical_to_standard(&chart),
        }
    }
}

impl From<Flowchart> for AnyFlowchart {
    fn from(chart: Flowchart) -> Self {
        AnyFlowchart::Standard(chart)
    }
}

impl From<ClinicalFlowchart> for AnyFlowchart {
    fn from(chart: ClinicalFlowchart) -> Self {
        AnyFlowchart::Clinical(chart)
    }
}
