//! Subcommand implementations. Each reads its inputs from disk and returns
//! what `main` prints, so they can be driven from tests.

use std::path::Path;
use std::sync::Arc;

use eyre::WrapErr;
use tracing::{info, warn};

use medproto_core::models::protocol::ProtocolFullContent;
use medproto_core::models::validation::ValidationReport;
use medproto_flowchart::{
    clinical_to_standard, create_flowchart_export, is_valid_clinical_flowchart, standard_to_clinical, AnyFlowchart,
    FlowchartFormat, ProtocolInfo,
};
use medproto_validation::{InMemoryMedicationLookup, Validator};

use crate::config::CliConfig;

pub struct ValidateArgs<'a> {
    pub content: &'a Path,
    pub flowchart: Option<&'a Path>,
    pub medications: Option<&'a Path>,
    pub protocol_id: &'a str,
    pub version_id: Option<String>,
}

fn read(path: &Path) -> eyre::Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn load_medications(path: Option<&Path>) -> eyre::Result<InMemoryMedicationLookup> {
    let Some(path) = path else {
        warn!("no medication reference configured; every medication will be reported as unknown");
        return Ok(InMemoryMedicationLookup::default());
    };
    let lookup = InMemoryMedicationLookup::from_json(&read(path)?)
        .wrap_err_with(|| format!("invalid medication reference {}", path.display()))?;
    info!(path = %path.display(), entries = lookup.len(), "loaded medication reference");
    Ok(lookup)
}

/// Validate protocol content, optionally against a flowchart in either schema.
pub async fn validate(args: ValidateArgs<'_>, config: &CliConfig) -> eyre::Result<ValidationReport> {
    let content = ProtocolFullContent::from_json(&read(args.content)?)
        .wrap_err_with(|| format!("invalid protocol content {}", args.content.display()))?;

    let flowchart = match args.flowchart {
        Some(path) => {
            let chart = AnyFlowchart::from_json(&read(path)?)
                .wrap_err_with(|| format!("invalid flowchart {}", path.display()))?;
            info!(format = ?chart.format(), "loaded flowchart");
            Some(chart.into_standard())
        }
        None => None,
    };

    let medications_path = args.medications.or(config.medications_path.as_deref());
    let lookup = load_medications(medications_path)?;

    let validator = Validator::new(Arc::new(lookup)).with_config(config.validation.clone());
    let report = validator
        .validate_full_protocol(args.protocol_id, args.version_id, &content, flowchart.as_ref())
        .await?;
    Ok(report)
}

/// Convert a flowchart file to `target`, returning pretty JSON.
pub fn convert(path: &Path, target: FlowchartFormat) -> eyre::Result<String> {
    let chart = AnyFlowchart::from_json(&read(path)?)?;
    let json = match (chart, target) {
        (AnyFlowchart::Standard(c), FlowchartFormat::Clinical) => {
            serde_json::to_string_pretty(&standard_to_clinical(&c))?
        }
        (AnyFlowchart::Clinical(c), FlowchartFormat::Standard) => {
            serde_json::to_string_pretty(&clinical_to_standard(&c))?
        }
        (already, _) => {
            warn!(format = ?target, "flowchart is already in the requested schema");
            serde_json::to_string_pretty(&already)?
        }
    };
    Ok(json)
}

/// Wrap a flowchart file in an export document.
pub fn export(path: &Path, protocol: Option<ProtocolInfo>) -> eyre::Result<String> {
    let chart = AnyFlowchart::from_json(&read(path)?)?;
    let export = create_flowchart_export(chart, protocol.as_ref());
    Ok(export.to_json_pretty()?)
}

/// Whether a file holds a structurally valid clinical flowchart.
pub fn check_clinical(path: &Path) -> eyre::Result<bool> {
    let value: serde_json::Value = serde_json::from_str(&read(path)?)?;
    Ok(is_valid_clinical_flowchart(&value))
}
