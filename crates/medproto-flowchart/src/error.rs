use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowchartError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported export version: {0}")]
    UnsupportedExportVersion(String),

    #[error("flowchart is neither a standard nor a clinical flowchart")]
    UnrecognizedSchema,
}
