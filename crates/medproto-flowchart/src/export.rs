use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use medproto_core::models::clinical::ClinicalFlowchart;
use medproto_core::models::flowchart::Flowchart;

use crate::any::AnyFlowchart;
use crate::error::FlowchartError;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowchartFormat {
    Clinical,
    Standard,
}

/// Protocol the exported flowchart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInfo {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowchartExportMetadata {
    pub version: String,
    pub format: FlowchartFormat,
    pub export_date: jiff::Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_title: Option<String>,
}

/// A flowchart wrapped with export metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowchartExport {
    pub metadata: FlowchartExportMetadata,
    pub flowchart: AnyFlowchart,
}

#[derive(Deserialize)]
struct RawExport {
    metadata: FlowchartExportMetadata,
    flowchart: Value,
}

impl FlowchartExport {
    pub fn new(
        flowchart: impl Into<AnyFlowchart>,
        protocol: Option<&ProtocolInfo>,
        export_date: jiff::Timestamp,
    ) -> Self {
        let flowchart = flowchart.into();
        Self {
            metadata: FlowchartExportMetadata {
                version: EXPORT_VERSION.to_string(),
                format: flowchart.format(),
                export_date,
                protocol_id: protocol.map(|p| p.id.clone()),
                protocol_title: protocol.map(|p| p.title.clone()),
            },
            flowchart,
        }
    }

    /// Parse an export document, picking the flowchart schema from
    /// `metadata.format`.
    pub fn from_json(json: &str) -> Result<Self, FlowchartError> {
        let raw: RawExport = serde_json::from_str(json)?;
        if raw.metadata.version != EXPORT_VERSION {
            return Err(FlowchartError::UnsupportedExportVersion(raw.metadata.version));
        }

        let flowchart = match raw.metadata.format {
            FlowchartFormat::Clinical => {
                AnyFlowchart::Clinical(serde_json::from_value::<ClinicalFlowchart>(raw.flowchart)?)
            }
            FlowchartFormat::Standard => {
                AnyFlowchart::Standard(serde_json::from_value::<Flowchart>(raw.flowchart)?)
            }
        };

        Ok(Self {
            metadata: raw.metadata,
            flowchart,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowchartError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wrap a flowchart for export, stamped with the current time. The format
/// follows the flowchart's schema.
pub fn create_flowchart_export(
    flowchart: impl Into<AnyFlowchart>,
    protocol: Option<&ProtocolInfo>,
) -> FlowchartExport {
    let export = FlowchartExport::new(flowchart, protocol, jiff::Timestamp::now());
    info!(
        format = ?export.metadata.format,
        protocol_id = export.metadata.protocol_id.as_deref().unwrap_or("-"),
        "created flowchart export"
    );
    export
}
