use serde::{Deserialize, Serialize};

use crate::keywords::DEFAULT_OVERLAP_THRESHOLD;

/// Tunables for the validation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum `matches / min(|A|, |B|)` for two keyword sets to count as
    /// the same clinical concept.
    pub overlap_threshold: f64,
    /// Extra short tokens kept by keyword extraction, on top of the
    /// built-in medical abbreviations.
    pub extra_abbreviations: Vec<String>,
    /// How many years back (including the current one) a bibliography
    /// reference counts as recent.
    pub recent_reference_years: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            extra_abbreviations: Vec::new(),
            recent_reference_years: 5,
        }
    }
}
