//! glTF to GLB conversion
//!
//! The conversion runs in three steps:
//! - [`collect_resources`] loads external buffers and images into one aligned region
//! - [`patch_document`] rewrites the document to reference that region
//! - [`write_glb_chunks`] frames the JSON and the region into a GLB container

pub mod collect;
pub mod glb;
mod options;
mod patch;

use std::path::Path;

use serde_json::Value;

use crate::error::Result;
use crate::gltf::GltfDocument;

pub use collect::{
    BinaryRegion, BinarySegment, Collected, EmbeddedImage, FolderSource, MissingResource,
    ResourceSource, collect_resources,
};
pub use glb::{GlbContainer, GlbHeader, read_glb, write_glb, write_glb_chunks};
pub use options::{ConvertOptions, MissingResourcePolicy};
pub use patch::patch_document;

/// Result of converting one glTF document.
#[derive(Debug, Clone)]
pub struct GlbConversion {
    /// The complete GLB container.
    pub glb: Vec<u8>,
    /// Resources that were referenced but not found (left unpatched).
    pub missing: Vec<MissingResource>,
    pub embedded_buffers: usize,
    pub embedded_images: usize,
}

/// Convert `.gltf` JSON bytes to a GLB container, loading external resources
/// from `source`.
///
/// # Errors
/// Returns an error if the JSON is invalid, a resource cannot be read, a
/// resource is missing under [`MissingResourcePolicy::Error`], a view cannot
/// be moved into the GLB buffer, or the result exceeds the GLB size limit.
///
/// Members of the output JSON keep the order they had in `json`.
pub fn convert_gltf_bytes_to_glb<S>(
    json: &[u8],
    source: &S,
    options: &ConvertOptions,
) -> Result<GlbConversion>
where
    S: ResourceSource + ?Sized,
{
    let original: Value = serde_json::from_slice(json)?;
    let document = GltfDocument::from_value(&original)?;
    let collected = collect_resources(&document, source, options)?;
    let patched = patch_document(&document, &collected, options)?;
    let glb = write_glb_chunks(
        &patched.to_vec_ordered_like(&original)?,
        &collected.region.to_bytes(),
    )?;

    Ok(GlbConversion {
        glb,
        embedded_buffers: collected.embedded_buffer_count(),
        embedded_images: collected.embedded_image_count(),
        missing: collected.missing,
    })
}

/// Convert a `.gltf` file to a `.glb` file.
///
/// External resources are resolved relative to the folder containing `input`.
/// The parent folder of `output` is created if needed.
///
/// # Errors
/// Returns an error if reading, conversion, or writing fails.
pub fn convert_gltf_to_glb(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<GlbConversion> {
    tracing::info!("Converting glTF to GLB: {input:?} -> {output:?}");

    let json = std::fs::read(input)?;
    let folder = input.parent().unwrap_or(Path::new("."));
    let conversion = convert_gltf_bytes_to_glb(&json, &FolderSource::new(folder), options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, &conversion.glb)?;

    tracing::info!(
        "Wrote {} bytes ({} buffers, {} images embedded)",
        conversion.glb.len(),
        conversion.embedded_buffers,
        conversion.embedded_images
    );
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_invalid_json_is_parse_error() {
        let source: HashMap<String, Vec<u8>> = HashMap::new();
        let err = convert_gltf_bytes_to_glb(b"{ not json", &source, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[test]
    fn test_non_object_is_parse_error() {
        let source: HashMap<String, Vec<u8>> = HashMap::new();
        let err =
            convert_gltf_bytes_to_glb(b"[1, 2]", &source, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[test]
    fn test_total_length_matches_output() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "buffers": [{"uri": "a.bin", "byteLength": 3}],
            "bufferViews": [{"buffer": 0, "byteLength": 3}]
        }"#;
        let source = HashMap::from([("a.bin".to_string(), vec![1u8, 2, 3])]);

        let conversion =
            convert_gltf_bytes_to_glb(json, &source, &ConvertOptions::default()).unwrap();

        let header = GlbHeader::parse(&conversion.glb).unwrap();
        assert_eq!(header.length as usize, conversion.glb.len());
        assert_eq!(conversion.embedded_buffers, 1);
        assert_eq!(conversion.embedded_images, 0);
    }

    fn json_chunk(glb: &[u8]) -> Vec<u8> {
        let container = read_glb(glb).unwrap();
        let json = container.json().unwrap();
        json.trim_ascii_end().to_vec()
    }

    #[test]
    fn test_unembedded_document_is_byte_identical() {
        let json = br#"{"accessors":[],"asset":{"generator":"x","version":"2.0"},"buffers":[{"byteLength":4,"uri":"data:application/octet-stream;base64,AAAAAA=="}],"bufferViews":[{"byteLength":4,"buffer":0}]}"#;
        let source: HashMap<String, Vec<u8>> = HashMap::new();
        let options = ConvertOptions::default().with_generator("glbpack");

        let conversion = convert_gltf_bytes_to_glb(json, &source, &options).unwrap();

        assert_eq!(json_chunk(&conversion.glb), json.to_vec());
    }

    #[test]
    fn test_member_order_survives_repacking() {
        let json = br#"{"nodes":[],"asset":{"generator":"x","version":"2.0"},"buffers":[{"uri":"a.bin","byteLength":4}],"bufferViews":[{"byteLength":4,"target":34962,"buffer":0,"byteOffset":0}]}"#;
        let source = HashMap::from([("a.bin".to_string(), vec![0u8; 4])]);

        let conversion =
            convert_gltf_bytes_to_glb(json, &source, &ConvertOptions::default()).unwrap();

        assert_eq!(
            json_chunk(&conversion.glb),
            br#"{"nodes":[],"asset":{"generator":"x","version":"2.0"},"buffers":[{"byteLength":4}],"bufferViews":[{"byteLength":4,"target":34962,"buffer":0,"byteOffset":0}]}"#.to_vec()
        );
    }

    #[test]
    fn test_view_offset_overflow_is_reported() {
        let json = format!(
            r#"{{"buffers":[{{"uri":"a.bin","byteLength":4}},{{"uri":"b.bin","byteLength":4}}],
               "bufferViews":[{{"buffer":1,"byteOffset":{},"byteLength":4}}]}}"#,
            usize::MAX
        );
        let source = HashMap::from([
            ("a.bin".to_string(), vec![0u8; 4]),
            ("b.bin".to_string(), vec![0u8; 4]),
        ]);

        let err = convert_gltf_bytes_to_glb(json.as_bytes(), &source, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDocument { .. }));
    }
}
