use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid data for node '{node_id}' of type '{node_type}': {source}")]
    InvalidNodeData {
        node_id: String,
        node_type: String,
        source: serde_json::Error,
    },

    #[error("protocol content must be a JSON object keyed by section number")]
    InvalidContentRoot,
}
