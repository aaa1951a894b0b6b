//! Batch glTF to GLB conversion
//!
//! This module provides file discovery, output path construction and parallel
//! conversion of every `.gltf` file in a folder.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::converter::{ConvertOptions, convert_gltf_to_glb};
use crate::error::{Result, missing_path};

/// Output folder name used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "glb_output";

/// Progress of a batch conversion, reported once per file as it starts.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// 1-based index of the file being processed.
    pub current: usize,
    pub total: usize,
    /// File name being processed.
    pub file: String,
}

/// Result of a batch conversion
#[derive(Debug, Clone, Default)]
pub struct BatchConvertResult {
    /// Number of files written
    pub success_count: usize,
    /// Number of files that failed
    pub fail_count: usize,
    /// Number of missing resources across all written files
    pub warning_count: usize,
    /// Messages for each file processed, in input order
    pub results: Vec<String>,
}

/// Find all `.gltf` files directly inside `dir`.
///
/// # Returns
/// A sorted list of paths. Subfolders are not searched.
///
/// # Errors
/// Returns an error if `dir` does not exist or cannot be read.
pub fn find_gltf_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(missing_path(dir));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("gltf"))
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// The default output folder for an input folder: `<input>/glb_output`.
pub fn default_output_dir(input_dir: &Path) -> PathBuf {
    input_dir.join(DEFAULT_OUTPUT_DIR)
}

/// Output path for one input file: `<output_dir>/<stem>.glb`.
pub fn glb_output_path(input_file: &Path, output_dir: &Path) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy().to_string());
    output_dir.join(format!("{stem}.glb"))
}

/// Convert `files` into `output_dir` in parallel.
///
/// Failures are per file: they are counted and reported in the result, and the
/// remaining files are still converted.
pub fn batch_convert<F>(
    files: &[PathBuf],
    output_dir: &Path,
    options: &ConvertOptions,
    progress: F,
) -> BatchConvertResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let warning_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<String> = files
        .par_iter()
        .map(|input| {
            let name = input
                .file_name()
                .map_or_else(|| input.to_string_lossy(), |n| n.to_string_lossy())
                .to_string();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                file: name.clone(),
            });

            let output = glb_output_path(input, output_dir);
            match convert_gltf_to_glb(input, &output, options) {
                Ok(conversion) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    if conversion.missing.is_empty() {
                        format!("Converted: {name}")
                    } else {
                        warning_counter.fetch_add(conversion.missing.len(), Ordering::SeqCst);
                        let details: Vec<String> =
                            conversion.missing.iter().map(ToString::to_string).collect();
                        format!("Converted with warnings: {name} ({})", details.join("; "))
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to convert {}: {e}", input.display());
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Failed {name}: {e}")
                }
            }
        })
        .collect();

    BatchConvertResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        warning_count: warning_counter.load(Ordering::SeqCst),
        results,
    }
}
