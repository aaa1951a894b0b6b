//! # GlbPack
//!
//! Packs glTF 2.0 assets that reference external `.bin` buffers and image
//! files into single self-contained GLB containers.
//!
//! ## Quick Start
//!
//! ### Converting one file
//!
//! ```no_run
//! use glbpack::converter::{ConvertOptions, convert_gltf_to_glb};
//! use std::path::Path;
//!
//! let result = convert_gltf_to_glb(
//!     Path::new("assets/scene.gltf"),
//!     Path::new("assets/glb_output/scene.glb"),
//!     &ConvertOptions::default(),
//! )?;
//! for missing in &result.missing {
//!     eprintln!("warning: {missing}");
//! }
//! # Ok::<(), glbpack::Error>(())
//! ```
//!
//! ### Converting a folder
//!
//! ```no_run
//! use glbpack::prelude::*;
//! use std::path::Path;
//!
//! let input = Path::new("assets");
//! let files = find_gltf_files(input)?;
//! let result = batch_convert(&files, &default_output_dir(input), &ConvertOptions::default(), |_| {});
//! println!("{} converted, {} failed", result.success_count, result.fail_count);
//! # Ok::<(), glbpack::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `glbpack` command-line binary

pub mod batch;
pub mod converter;
pub mod error;
pub mod gltf;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, ResourceKind, Result};

    pub use crate::batch::{
        BatchConvertResult, BatchProgress, batch_convert, default_output_dir, find_gltf_files,
        glb_output_path,
    };
    pub use crate::converter::{
        ConvertOptions, FolderSource, GlbConversion, MissingResource, MissingResourcePolicy,
        ResourceSource, convert_gltf_bytes_to_glb, convert_gltf_to_glb, read_glb,
    };
    pub use crate::gltf::{GltfDocument, ImageSource, ResourceRef};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
