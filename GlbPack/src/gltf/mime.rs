//! MIME type lookup for embedded images

use std::path::Path;

/// Fallback when the extension is not a known image format.
pub const OCTET_STREAM: &str = "application/octet-stream";

const IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
];

/// Infer an image MIME type from a file extension (case-insensitive).
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return OCTET_STREAM;
    };
    let ext = ext.to_lowercase();

    IMAGE_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map_or(OCTET_STREAM, |(_, mime)| *mime)
}
