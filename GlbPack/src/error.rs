//! Error types for `GlbPack`

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Which kind of glTF entry referenced a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An entry of the `buffers` array.
    Buffer,
    /// An entry of the `images` array.
    Image,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer => f.write_str("buffer"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// The error type for `GlbPack` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== glTF Input Errors ====================
    /// The input is not valid JSON, or not a glTF object.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A buffer or image URI does not resolve to an existing file.
    #[error("{kind} {index} references missing file: {uri}")]
    MissingResource {
        /// Whether the entry is a buffer or an image.
        kind: ResourceKind,
        /// Index of the entry in its array.
        index: usize,
        /// The URI as written in the document.
        uri: String,
    },

    /// The document cannot be repacked as written.
    #[error("invalid glTF document: {message}")]
    InvalidDocument {
        /// Description of what is invalid.
        message: String,
    },

    // ==================== GLB Container Errors ====================
    /// The binary container is malformed.
    #[error("invalid GLB: {message}")]
    InvalidGlb {
        /// Description of what is invalid.
        message: String,
    },

    /// The container would exceed the 32-bit length field.
    #[error("GLB too large: {size} bytes exceeds the 4 GiB limit")]
    GlbTooLarge {
        /// The size that did not fit.
        size: usize,
    },

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    pub(crate) fn invalid_glb(message: impl Into<String>) -> Self {
        Error::InvalidGlb {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_document(message: impl Into<String>) -> Self {
        Error::InvalidDocument {
            message: message.into(),
        }
    }
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// Missing input path, raised before any conversion starts.
pub(crate) fn missing_path(path: &Path) -> Error {
    Error::InvalidPath(format!("{} does not exist", path.display()))
}

/// A specialized Result type for `GlbPack` operations.
pub type Result<T> = std::result::Result<T, Error>;
