//! glTF document model
//!
//! Typed view over the parts of a glTF 2.0 document that reference binary
//! resources: buffers, buffer views and images.

pub mod mime;
mod types;

pub use mime::mime_type_for_path;
pub use types::{GltfAsset, GltfBuffer, GltfBufferView, GltfDocument, GltfImage, Passthrough};

/// The glTF version stamped into documents that lack one.
pub const GLTF_VERSION: &str = "2.0";

/// Where a buffer or image URI points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef<'a> {
    /// A file path relative to the document's folder.
    External(&'a str),
    /// An inline `data:` URI, left as is.
    DataUri(&'a str),
}

impl<'a> ResourceRef<'a> {
    /// Classify a URI.
    pub fn parse(uri: &'a str) -> Self {
        let is_data = uri
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
        if is_data {
            ResourceRef::DataUri(uri)
        } else {
            ResourceRef::External(uri)
        }
    }

    /// The relative path, if this is an external file reference.
    pub fn external_path(self) -> Option<&'a str> {
        match self {
            ResourceRef::External(path) => Some(path),
            ResourceRef::DataUri(_) => None,
        }
    }
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    External(&'a str),
    DataUri(&'a str),
    BufferView {
        index: usize,
        mime_type: Option<&'a str>,
    },
    /// Neither `uri` nor `bufferView` is set.
    Unset,
}

impl GltfBuffer {
    /// Classify the buffer's URI. `None` means the buffer has no URI, which
    /// is only valid for the GLB-stored buffer.
    pub fn resource(&self) -> Option<ResourceRef<'_>> {
        self.uri.as_deref().map(ResourceRef::parse)
    }
}

impl GltfImage {
    pub fn source(&self) -> ImageSource<'_> {
        if let Some(uri) = self.uri.as_deref() {
            return match ResourceRef::parse(uri) {
                ResourceRef::External(path) => ImageSource::External(path),
                ResourceRef::DataUri(data) => ImageSource::DataUri(data),
            };
        }
        match self.buffer_view {
            Some(index) => ImageSource::BufferView {
                index,
                mime_type: self.mime_type.as_deref(),
            },
            None => ImageSource::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resource_ref_parse() {
        assert_eq!(ResourceRef::parse("mesh.bin"), ResourceRef::External("mesh.bin"));
        assert_eq!(
            ResourceRef::parse("data:application/octet-stream;base64,AAAA"),
            ResourceRef::DataUri("data:application/octet-stream;base64,AAAA")
        );
        assert_eq!(ResourceRef::parse("DATA:,x").external_path(), None);
        assert_eq!(ResourceRef::parse("dat").external_path(), Some("dat"));
    }

    #[test]
    fn test_image_source() {
        let external = GltfImage {
            uri: Some("tex/albedo.png".into()),
            ..GltfImage::default()
        };
        assert_eq!(external.source(), ImageSource::External("tex/albedo.png"));

        let embedded = GltfImage {
            buffer_view: Some(3),
            mime_type: Some("image/png".into()),
            ..GltfImage::default()
        };
        assert_eq!(
            embedded.source(),
            ImageSource::BufferView {
                index: 3,
                mime_type: Some("image/png")
            }
        );

        assert_eq!(GltfImage::default().source(), ImageSource::Unset);
    }

    #[test]
    fn test_document_passthrough_round_trip() {
        let json = br#"{
            "asset": {"version": "2.0", "copyright": "me"},
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "buffers": [{"uri": "a.bin", "byteLength": 36, "name": "geo"}],
            "bufferViews": [{"buffer": 0, "byteLength": 36, "target": 34962}],
            "extensionsUsed": ["KHR_materials_unlit"]
        }"#;
        let doc = GltfDocument::from_slice(json).unwrap();
        assert_eq!(doc.buffer_views[0].byte_offset, None);
        assert_eq!(doc.buffers[0].extra["name"], "geo");

        let back: serde_json::Value = serde_json::from_slice(&doc.to_vec().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_slice(json).unwrap();
        assert_eq!(back, original);
    }
}
