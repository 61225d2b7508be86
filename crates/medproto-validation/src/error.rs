use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("rule {rule_id} failed: {source}")]
    Rule {
        rule_id: String,
        #[source]
        source: RuleError,
    },
}

/// A rule could not run at all. Recoverable problems inside a rule are
/// logged and reported as zero issues instead.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("{0}")]
    Failed(String),

    #[error("medication lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("medication reference unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
