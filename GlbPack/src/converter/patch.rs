//! Document patching
//!
//! Applies a [`Collected`] layout to a copy of the document so that it
//! describes the GLB-stored buffer instead of external files.

use crate::error::{Error, Result};
use crate::gltf::{
    GLTF_VERSION, GltfAsset, GltfBuffer, GltfBufferView, GltfDocument, Passthrough,
};

use super::collect::Collected;
use super::options::ConvertOptions;

/// Produce the document that goes into the GLB JSON chunk.
///
/// When anything was embedded, buffer 0 becomes the GLB-stored buffer and
/// views into embedded buffers are retargeted to it with shifted offsets.
/// Buffers that were not embedded (data URIs, missing files) follow buffer 0
/// in their original order, and their views are re-indexed without touching
/// offsets. When nothing was embedded the buffers are left alone.
///
/// The input document is not modified.
///
/// # Errors
/// Returns [`Error::InvalidDocument`] if a retargeted view offset does not fit
/// in `usize`.
pub fn patch_document(
    document: &GltfDocument,
    collected: &Collected,
    options: &ConvertOptions,
) -> Result<GltfDocument> {
    let mut patched = document.clone();

    if collected.embeds_anything() {
        let (buffers, remap) = collapse_buffers(&document.buffers, collected);
        patched.buffers = buffers;

        for (index, view) in patched.buffer_views.iter_mut().enumerate() {
            match collected.buffer_offsets.get(view.buffer) {
                Some(Some(offset)) => {
                    let shifted = view.offset().checked_add(*offset).ok_or_else(|| {
                        Error::invalid_document(format!(
                            "bufferView {index} byteOffset {} overflows when moved by {offset}",
                            view.offset()
                        ))
                    })?;
                    view.byte_offset = Some(shifted);
                    view.buffer = 0;
                }
                Some(None) => view.buffer = remap[view.buffer],
                // Out-of-range reference, not ours to fix
                None => {}
            }
        }

        for (index, placed) in collected.images.iter().enumerate() {
            let Some(placed) = placed else {
                continue;
            };
            patched.buffer_views.push(GltfBufferView {
                buffer: 0,
                byte_offset: Some(placed.byte_offset),
                byte_length: placed.byte_length,
                extra: Passthrough::new(),
            });
            let image = &mut patched.images[index];
            image.uri = None;
            image.buffer_view = Some(patched.buffer_views.len() - 1);
            image.mime_type = Some(placed.mime_type.to_string());
        }
    }

    ensure_asset(&mut patched, collected, options);
    Ok(patched)
}

/// Build the new buffer list and the old-index to new-index map for buffers
/// that stay outside the GLB-stored buffer.
fn collapse_buffers(buffers: &[GltfBuffer], collected: &Collected) -> (Vec<GltfBuffer>, Vec<usize>) {
    let mut collapsed = vec![GltfBuffer {
        uri: None,
        byte_length: collected.region.len(),
        extra: Passthrough::new(),
    }];
    let mut remap = vec![0; buffers.len()];

    for (index, buffer) in buffers.iter().enumerate() {
        if collected.buffer_offsets.get(index).is_none_or(Option::is_none) {
            remap[index] = collapsed.len();
            collapsed.push(buffer.clone());
        }
    }

    (collapsed, remap)
}

/// Adds the required `asset.version`. The generator is only stamped when the
/// document was actually repacked.
fn ensure_asset(document: &mut GltfDocument, collected: &Collected, options: &ConvertOptions) {
    let asset = document.asset.get_or_insert_with(GltfAsset::default);
    if asset.version.is_none() {
        asset.version = Some(GLTF_VERSION.to_string());
    }
    if asset.generator.is_none() && collected.embeds_anything() {
        asset.generator.clone_from(&options.generator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::collect::{BinaryRegion, EmbeddedImage};
    use crate::gltf::GltfImage;
    use pretty_assertions::assert_eq;

    fn buffer(uri: &str, byte_length: usize) -> GltfBuffer {
        GltfBuffer {
            uri: Some(uri.into()),
            byte_length,
            extra: Passthrough::new(),
        }
    }

    fn view(buffer: usize, byte_offset: Option<usize>, byte_length: usize) -> GltfBufferView {
        GltfBufferView {
            buffer,
            byte_offset,
            byte_length,
            extra: Passthrough::new(),
        }
    }

    fn region_of(sizes: &[usize]) -> BinaryRegion {
        let mut region = BinaryRegion::new();
        for &size in sizes {
            region.push(vec![0; size]);
        }
        region
    }

    #[test]
    fn test_second_buffer_views_are_shifted() {
        let document = GltfDocument {
            buffers: vec![buffer("a.bin", 8), buffer("b.bin", 16)],
            buffer_views: vec![view(0, None, 8), view(1, Some(5), 4)],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[8, 16]),
            buffer_offsets: vec![Some(0), Some(8)],
            ..Collected::default()
        };

        let patched = patch_document(&document, &collected, &ConvertOptions::default()).unwrap();

        assert_eq!(patched.buffer_views, vec![view(0, Some(0), 8), view(0, Some(13), 4)]);
        assert_eq!(patched.buffers.len(), 1);
        assert_eq!(patched.buffers[0].byte_length, 24);
        assert_eq!(patched.buffers[0].uri, None);
        // Input untouched
        assert_eq!(document.buffer_views[1], view(1, Some(5), 4));
    }

    #[test]
    fn test_embedded_image_gets_buffer_view() {
        let document = GltfDocument {
            buffers: vec![buffer("a.bin", 10)],
            buffer_views: vec![view(0, None, 10)],
            images: vec![GltfImage {
                uri: Some("tex.jpg".into()),
                ..GltfImage::default()
            }],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[10, 7]),
            buffer_offsets: vec![Some(0)],
            images: vec![Some(EmbeddedImage {
                byte_offset: 12,
                byte_length: 7,
                mime_type: "image/jpeg",
            })],
            ..Collected::default()
        };

        let patched = patch_document(&document, &collected, &ConvertOptions::default()).unwrap();

        assert_eq!(patched.buffers[0].byte_length, 20);
        assert_eq!(patched.buffer_views[1], view(0, Some(12), 7));
        assert_eq!(
            patched.images[0],
            GltfImage {
                buffer_view: Some(1),
                mime_type: Some("image/jpeg".into()),
                ..GltfImage::default()
            }
        );
    }

    #[test]
    fn test_images_only_creates_buffer() {
        let document = GltfDocument {
            images: vec![GltfImage {
                uri: Some("a.png".into()),
                ..GltfImage::default()
            }],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[5]),
            images: vec![Some(EmbeddedImage {
                byte_offset: 0,
                byte_length: 5,
                mime_type: "image/png",
            })],
            ..Collected::default()
        };

        let patched = patch_document(&document, &collected, &ConvertOptions::default()).unwrap();

        assert_eq!(patched.buffers.len(), 1);
        assert_eq!(patched.buffers[0].byte_length, 8);
        assert_eq!(patched.buffer_views, vec![view(0, Some(0), 5)]);
    }

    #[test]
    fn test_unembedded_buffers_are_kept_and_reindexed() {
        let data_uri = "data:application/octet-stream;base64,AAAAAA==";
        let document = GltfDocument {
            buffers: vec![buffer(data_uri, 4), buffer("missing.bin", 8), buffer("c.bin", 4)],
            buffer_views: vec![view(0, None, 4), view(1, Some(4), 4), view(2, Some(2), 2)],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[4]),
            buffer_offsets: vec![None, None, Some(0)],
            ..Collected::default()
        };

        let patched = patch_document(&document, &collected, &ConvertOptions::default()).unwrap();

        assert_eq!(patched.buffers.len(), 3);
        assert_eq!(patched.buffers[0].uri, None);
        assert_eq!(patched.buffers[1].uri.as_deref(), Some(data_uri));
        assert_eq!(patched.buffers[2].uri.as_deref(), Some("missing.bin"));
        assert_eq!(
            patched.buffer_views,
            vec![view(1, None, 4), view(2, Some(4), 4), view(0, Some(2), 2)]
        );
    }

    #[test]
    fn test_nothing_embedded_leaves_buffers() {
        let document = GltfDocument {
            buffers: vec![buffer("missing.bin", 8)],
            buffer_views: vec![view(0, Some(5), 3)],
            ..GltfDocument::default()
        };
        let collected = Collected {
            buffer_offsets: vec![None],
            ..Collected::default()
        };

        let patched = patch_document(&document, &collected, &ConvertOptions::default()).unwrap();

        assert_eq!(patched.buffers, document.buffers);
        assert_eq!(patched.buffer_views, document.buffer_views);
    }

    #[test]
    fn test_asset_version_is_ensured() {
        let document = GltfDocument::default();
        let options = ConvertOptions::default().with_generator("glbpack");

        let patched = patch_document(&document, &Collected::default(), &options).unwrap();

        let asset = patched.asset.unwrap();
        assert_eq!(asset.version.as_deref(), Some("2.0"));
        assert_eq!(asset.generator, None);
    }

    #[test]
    fn test_generator_stamped_when_repacked() {
        let document = GltfDocument {
            buffers: vec![buffer("a.bin", 4)],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[4]),
            buffer_offsets: vec![Some(0)],
            ..Collected::default()
        };
        let options = ConvertOptions::default().with_generator("glbpack");

        let patched = patch_document(&document, &collected, &options).unwrap();

        assert_eq!(patched.asset.unwrap().generator.as_deref(), Some("glbpack"));
    }

    #[test]
    fn test_view_offset_overflow_is_error() {
        let document = GltfDocument {
            buffers: vec![buffer("a.bin", 4), buffer("b.bin", 4)],
            buffer_views: vec![view(1, Some(usize::MAX), 4)],
            ..GltfDocument::default()
        };
        let collected = Collected {
            region: region_of(&[4, 4]),
            buffer_offsets: vec![Some(0), Some(4)],
            ..Collected::default()
        };

        let err = patch_document(&document, &collected, &ConvertOptions::default()).unwrap_err();

        assert!(matches!(err, Error::InvalidDocument { .. }));
    }

    #[test]
    fn test_existing_asset_is_preserved() {
        let document = GltfDocument {
            asset: Some(GltfAsset {
                version: Some("2.0".into()),
                generator: Some("Blender".into()),
                extra: Passthrough::new(),
            }),
            ..GltfDocument::default()
        };
        let options = ConvertOptions::default().with_generator("glbpack");

        let patched = patch_document(&document, &Collected::default(), &options).unwrap();

        assert_eq!(patched.asset, document.asset);
    }
}
