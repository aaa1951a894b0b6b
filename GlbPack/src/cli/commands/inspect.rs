//! CLI command for GLB inspection

use std::path::Path;

use anyhow::Context;

use crate::converter::glb::{ChunkType, read_glb};
use crate::gltf::{ImageSource, ResourceRef};

/// Print the header and chunk table of a GLB file.
pub fn execute(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)?;
    let container =
        read_glb(&bytes).with_context(|| format!("Failed to parse GLB: {}", path.display()))?;

    println!("GLB Information: {}", path.display());
    println!();
    println!("Version:     {}", container.header.version);
    println!("Length:      {} bytes (matches file size)", container.header.length);
    println!("Chunks:      {}", container.chunks.len());
    println!();

    for (i, chunk) in container.chunks.iter().enumerate() {
        let kind = match chunk.chunk_type {
            ChunkType::Json => "JSON".to_string(),
            ChunkType::Bin => "BIN".to_string(),
            ChunkType::Unknown(tag) => format!("{tag:#010x}"),
        };
        println!(
            "  [{i}] {kind:10} | offset {:>10} | {:>10} bytes",
            chunk.offset,
            chunk.data.len()
        );
    }

    let document = container.document()?;
    println!();
    println!("Buffers:      {}", document.buffers.len());
    println!("Buffer views: {}", document.buffer_views.len());
    println!("Images:       {}", document.images.len());
    let external = document
        .buffers
        .iter()
        .filter_map(|b| b.resource().and_then(ResourceRef::external_path))
        .chain(document.images.iter().filter_map(|i| match i.source() {
            ImageSource::External(uri) => Some(uri),
            _ => None,
        }))
        .collect::<Vec<_>>();
    if !external.is_empty() {
        println!();
        println!("Still referencing external files:");
        for uri in external {
            println!("  {uri}");
        }
    }

    Ok(())
}
