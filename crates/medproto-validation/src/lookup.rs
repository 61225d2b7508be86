//! Medication reference lookup, injected into the medication rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::BoxFuture;
use crate::error::LookupError;

/// One row of the medication reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MedicationEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_dose: None,
            default_route: None,
            default_frequency: None,
            notes: None,
        }
    }
}

/// Resolves medication names against a reference store.
pub trait MedicationLookup: Send + Sync {
    /// Find an entry by name, case-insensitively on the trimmed name.
    /// `Ok(None)` means the medication is not in the reference.
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<MedicationEntry>, LookupError>>;
}

/// Lookup over entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMedicationLookup {
    entries: HashMap<String, MedicationEntry>,
}

impl InMemoryMedicationLookup {
    pub fn new(entries: impl IntoIterator<Item = MedicationEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (normalize_name(&entry.name), entry))
            .collect();
        Self { entries }
    }

    /// Load entries from a JSON array of [`MedicationEntry`] objects.
    pub fn from_json(json: &str) -> Result<Self, LookupError> {
        let entries: Vec<MedicationEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn get(&self, name: &str) -> Option<&MedicationEntry> {
        self.entries.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MedicationLookup for InMemoryMedicationLookup {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<MedicationEntry>, LookupError>> {
        Box::pin(async move { Ok(self.get(name).cloned()) })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
