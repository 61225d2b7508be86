pub mod clinical;
pub mod flowchart;
pub mod protocol;
pub mod validation;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;

/// Decode a node's `data` payload into the typed variant for `node_type`.
///
/// A missing or `null` payload decodes to the variant's default.
pub(crate) fn decode_node_data<T>(node_id: &str, node_type: &str, data: Value) -> Result<T, CoreError>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|source| CoreError::InvalidNodeData {
        node_id: node_id.to_string(),
        node_type: node_type.to_string(),
        source,
    })
}

/// Field deserializer that reads an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
