use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// One of the 13 numbered protocol sections.
///
/// Deserialization never fails: protocol content usually comes straight
/// from an AI completion, and a malformed entry must reach the structure
/// rules instead of aborting the parse. Anything that is not an object, or
/// whose `sectionNumber` is not a whole number, keeps `section_number = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ProtocolSection {
    pub section_number: Option<u32>,
    pub title: String,
    pub content: Value,
}

impl ProtocolSection {
    pub fn new(section_number: u32, title: impl Into<String>, content: Value) -> Self {
        Self {
            section_number: Some(section_number),
            title: title.into(),
            content,
        }
    }

    /// Section content as searchable text: strings verbatim, everything
    /// else as compact JSON.
    pub fn content_text(&self) -> Cow<'_, str> {
        match &self.content {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Whether the section carries any content at all.
    ///
    /// `null`, blank strings, empty objects and empty arrays count as empty.
    pub fn has_content(&self) -> bool {
        match &self.content {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        }
    }

    /// Look up a top-level field when the content is an object.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.as_object().and_then(|map| map.get(name))
    }
}

impl From<Value> for ProtocolSection {
    fn from(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            tracing::warn!("protocol section is not a JSON object; keeping it as malformed");
            return Self {
                section_number: None,
                title: String::new(),
                content: Value::Null,
            };
        };

        let section_number = map.get("sectionNumber").and_then(whole_number);
        let title = map
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let content = map.remove("content").unwrap_or(Value::Null);

        Self {
            section_number,
            title,
            content,
        }
    }
}

fn whole_number(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

/// The full textual content of a protocol version, keyed by section number
/// as a string (`"1"` through `"13"`).
///
/// Keys are kept verbatim so that malformed keys (`"0"`, `"14"`, `"intro"`)
/// survive until the structure rules report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolFullContent {
    sections: BTreeMap<String, ProtocolSection>,
}

impl ProtocolFullContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse untyped JSON (typically AI output) into protocol content.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::InvalidContentRoot);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Insert a section under the key matching its own section number.
    /// Sections without a number are ignored; use [`Self::insert_raw`].
    pub fn insert(&mut self, section: ProtocolSection) {
        if let Some(number) = section.section_number {
            self.sections.insert(number.to_string(), section);
        }
    }

    /// Insert a section under an arbitrary key.
    pub fn insert_raw(&mut self, key: impl Into<String>, section: ProtocolSection) {
        self.sections.insert(key.into(), section);
    }

    pub fn remove(&mut self, key: &str) -> Option<ProtocolSection> {
        self.sections.remove(key)
    }

    /// Section stored under the key for `number`.
    pub fn section(&self, number: u32) -> Option<&ProtocolSection> {
        self.sections.get(&number.to_string())
    }

    pub fn section_mut(&mut self, number: u32) -> Option<&mut ProtocolSection> {
        self.sections.get_mut(&number.to_string())
    }

    pub fn get(&self, key: &str) -> Option<&ProtocolSection> {
        self.sections.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProtocolSection)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<ProtocolSection> for ProtocolFullContent {
    fn from_iter<I: IntoIterator<Item = ProtocolSection>>(iter: I) -> Self {
        let mut content = Self::new();
        for section in iter {
            content.insert(section);
        }
        content
    }
}
