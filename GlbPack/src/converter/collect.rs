//! Resource collection
//!
//! Loads every externally referenced buffer and image and lays them out, in
//! document order, in one contiguous 4-byte aligned region. Nothing in the
//! document is changed here; the resulting [`Collected`] layout is applied by
//! [`super::patch_document`].

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use crate::error::{Error, ResourceKind, Result};
use crate::gltf::{GltfDocument, ImageSource, ResourceRef, mime_type_for_path};

use super::options::{ConvertOptions, MissingResourcePolicy};

/// Number of zero bytes needed to bring `len` up to a multiple of 4.
pub const fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Supplies the bytes behind relative resource URIs.
pub trait ResourceSource {
    /// Load the resource at `uri`.
    ///
    /// Returns `Ok(None)` when the resource does not exist; any other failure
    /// is an error.
    fn load(&self, uri: &str) -> Result<Option<Vec<u8>>>;
}

/// Resolves URIs against a folder on disk.
///
/// A URI naming a directory (`""`, `"textures/"`) counts as missing.
#[derive(Debug, Clone)]
pub struct FolderSource {
    root: PathBuf,
}

impl FolderSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for FolderSource {
    fn load(&self, uri: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(uri);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound || path.is_dir() => Ok(None),
            Err(e) => Err(Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {e}", path.display()),
            ))),
        }
    }
}

/// In-memory resources keyed by URI.
impl<S: BuildHasher> ResourceSource for HashMap<String, Vec<u8>, S> {
    fn load(&self, uri: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(uri).cloned())
    }
}

/// One resource placed in the consolidated region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySegment {
    /// Start of the data in the region, always a multiple of 4.
    pub offset: usize,
    pub data: Vec<u8>,
    /// Zero bytes following `data` (0-3).
    pub padding: usize,
}

impl BinarySegment {
    /// Length including trailing padding.
    pub fn padded_len(&self) -> usize {
        self.data.len() + self.padding
    }
}

/// Accumulates segments and tracks the running region length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryRegion {
    segments: Vec<BinarySegment>,
    len: usize,
}

impl BinaryRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and pad it to a 4-byte boundary.
    ///
    /// Returns the offset at which `data` starts.
    pub fn push(&mut self, data: Vec<u8>) -> usize {
        let offset = self.len;
        let padding = padding_for(data.len());
        self.len += data.len() + padding;
        self.segments.push(BinarySegment {
            offset,
            data,
            padding,
        });
        offset
    }

    /// Total length including all padding.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn segments(&self) -> &[BinarySegment] {
        &self.segments
    }

    /// Concatenate all segments and their padding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len);
        for segment in &self.segments {
            bytes.extend_from_slice(&segment.data);
            bytes.resize(bytes.len() + segment.padding, 0);
        }
        bytes
    }
}

/// A buffer or image that could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingResource {
    pub kind: ResourceKind,
    pub index: usize,
    pub uri: String,
}

impl fmt::Display for MissingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} references missing file: {}", self.kind, self.index, self.uri)
    }
}

impl From<MissingResource> for Error {
    fn from(missing: MissingResource) -> Self {
        Error::MissingResource {
            kind: missing.kind,
            index: missing.index,
            uri: missing.uri,
        }
    }
}

/// Placement of an embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub byte_offset: usize,
    pub byte_length: usize,
    pub mime_type: &'static str,
}

/// Layout produced by [`collect_resources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub region: BinaryRegion,
    /// Region offset per original buffer index; `None` if not embedded.
    pub buffer_offsets: Vec<Option<usize>>,
    /// Placement per original image index; `None` if not embedded.
    pub images: Vec<Option<EmbeddedImage>>,
    /// Resources that were referenced but not found.
    pub missing: Vec<MissingResource>,
}

impl Collected {
    pub fn embedded_buffer_count(&self) -> usize {
        self.buffer_offsets.iter().filter(|o| o.is_some()).count()
    }

    pub fn embedded_image_count(&self) -> usize {
        self.images.iter().filter(|i| i.is_some()).count()
    }

    /// Whether any resource ended up in the region.
    pub fn embeds_anything(&self) -> bool {
        self.embedded_buffer_count() > 0 || self.embedded_image_count() > 0
    }
}

/// Load external buffers, then external images, into one aligned region.
///
/// # Errors
/// Returns an error if a resource exists but cannot be read, or if a resource
/// is missing and the policy is [`MissingResourcePolicy::Error`].
pub fn collect_resources<S>(
    document: &GltfDocument,
    source: &S,
    options: &ConvertOptions,
) -> Result<Collected>
where
    S: ResourceSource + ?Sized,
{
    let mut collected = Collected {
        buffer_offsets: vec![None; document.buffers.len()],
        images: vec![None; document.images.len()],
        ..Collected::default()
    };

    for (index, buffer) in document.buffers.iter().enumerate() {
        let Some(uri) = buffer.resource().and_then(ResourceRef::external_path) else {
            continue;
        };
        let Some(data) = source.load(uri)? else {
            collected
                .missing
                .push(missing_resource(ResourceKind::Buffer, index, uri, options)?);
            continue;
        };

        if data.len() < buffer.byte_length {
            tracing::warn!(
                "buffer {index} declares {} bytes but {uri} holds {}",
                buffer.byte_length,
                data.len()
            );
        }

        let size = data.len();
        let offset = collected.region.push(data);
        tracing::debug!("embedded buffer {index} ({uri}, {size} bytes) at offset {offset}");
        collected.buffer_offsets[index] = Some(offset);
    }

    for (index, image) in document.images.iter().enumerate() {
        let ImageSource::External(uri) = image.source() else {
            continue;
        };
        let Some(data) = source.load(uri)? else {
            collected
                .missing
                .push(missing_resource(ResourceKind::Image, index, uri, options)?);
            continue;
        };

        let byte_length = data.len();
        let byte_offset = collected.region.push(data);
        tracing::debug!("embedded image {index} ({uri}, {byte_length} bytes) at offset {byte_offset}");
        collected.images[index] = Some(EmbeddedImage {
            byte_offset,
            byte_length,
            mime_type: mime_type_for_path(Path::new(uri)),
        });
    }

    Ok(collected)
}

fn missing_resource(
    kind: ResourceKind,
    index: usize,
    uri: &str,
    options: &ConvertOptions,
) -> Result<MissingResource> {
    let missing = MissingResource {
        kind,
        index,
        uri: uri.to_string(),
    };
    match options.missing_resources {
        MissingResourcePolicy::Error => Err(missing.into()),
        MissingResourcePolicy::Warn => {
            tracing::warn!("{missing}; reference left unpatched");
            Ok(missing)
        }
    }
}
