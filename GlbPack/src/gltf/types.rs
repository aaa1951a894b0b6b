//! Core glTF 2.0 structure types.
//!
//! Only the parts of the document that take part in buffer consolidation are
//! typed. Everything else is kept as raw JSON and written back unchanged.
//! Serde emits typed fields before flattened ones, so member order is restored
//! from the source JSON with [`GltfDocument::to_vec_ordered_like`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw JSON members that are carried through untouched.
pub type Passthrough = Map<String, Value>;

/// Asset metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GltfAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Binary buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GltfBuffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Buffer view (slice of a buffer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GltfBufferView {
    pub buffer: usize,
    /// Kept optional so an omitted offset stays omitted on output.
    #[serde(rename = "byteOffset", default, skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<usize>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Image, either URI-backed or stored in a buffer view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GltfImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "bufferView", default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Complete glTF document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GltfDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<GltfAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<GltfBuffer>,
    #[serde(rename = "bufferViews", default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<GltfBufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<GltfImage>,
    /// Accessors, meshes, nodes, extensions and every other top-level member.
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl GltfBufferView {
    /// Byte offset into the buffer, defaulting to 0 when omitted.
    pub fn offset(&self) -> usize {
        self.byte_offset.unwrap_or(0)
    }
}

impl GltfDocument {
    /// Parse a document from `.gltf` JSON bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a JSON object matching the glTF layout.
    pub fn from_slice(json: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Build a document from an already parsed JSON tree.
    ///
    /// # Errors
    /// Returns an error if `value` is not an object matching the glTF layout.
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Serialize to compact JSON bytes.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize to compact JSON bytes, keeping every member that also exists
    /// in `original` at its original position. New members follow the
    /// existing ones.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_vec_ordered_like(&self, original: &Value) -> crate::Result<Vec<u8>> {
        let value = reorder_like(serde_json::to_value(self)?, original);
        Ok(serde_json::to_vec(&value)?)
    }
}

fn reorder_like(value: Value, original: &Value) -> Value {
    match (value, original) {
        (Value::Object(mut members), Value::Object(reference)) => {
            let mut ordered = Map::with_capacity(members.len());
            for (key, child) in reference {
                if let Some(member) = members.shift_remove(key) {
                    ordered.insert(key.clone(), reorder_like(member, child));
                }
            }
            ordered.extend(members);
            Value::Object(ordered)
        }
        (Value::Array(items), Value::Array(reference)) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match reference.get(i) {
                    Some(child) => reorder_like(item, child),
                    None => item,
                })
                .collect(),
        ),
        (value, _) => value,
    }
}
