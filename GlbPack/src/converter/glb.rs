//! GLB container framing
//!
//! Layout (all fields little-endian `u32`):
//!
//! ```text
//! magic "glTF" | version 2 | total length
//! JSON chunk length | "JSON" | JSON payload, space padded
//! BIN chunk length  | "BIN\0" | binary payload, zero padded   (optional)
//! ```

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::gltf::GltfDocument;

use super::collect::padding_for;

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F534A; // "JSON"
pub const CHUNK_TYPE_BIN: u32 = 0x004E4942; // "BIN\0"
pub const GLB_HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;

/// Serialize `document` and frame it with `bin` into a GLB container.
///
/// The BIN chunk is omitted when `bin` is empty.
///
/// # Errors
/// Returns an error if JSON serialization fails or the container would not fit
/// the 32-bit length field.
pub fn write_glb(document: &GltfDocument, bin: &[u8]) -> Result<Vec<u8>> {
    let json = document.to_vec()?;
    write_glb_chunks(&json, bin)
}

/// Frame already serialized JSON and binary payloads into a GLB container.
///
/// # Errors
/// Returns an error if the container would not fit the 32-bit length field.
pub fn write_glb_chunks(json: &[u8], bin: &[u8]) -> Result<Vec<u8>> {
    let json_padding = padding_for(json.len());
    let json_chunk_len = json.len() + json_padding;

    let bin_padding = padding_for(bin.len());
    let bin_chunk_len = bin.len() + bin_padding;
    let has_bin = !bin.is_empty();

    let total_len = GLB_HEADER_LEN
        + CHUNK_HEADER_LEN
        + json_chunk_len
        + if has_bin { CHUNK_HEADER_LEN + bin_chunk_len } else { 0 };
    let total = u32::try_from(total_len).map_err(|_| Error::GlbTooLarge { size: total_len })?;

    let mut output = Vec::with_capacity(total_len);

    // GLB header
    output.write_u32::<LittleEndian>(GLB_MAGIC)?;
    output.write_u32::<LittleEndian>(GLB_VERSION)?;
    output.write_u32::<LittleEndian>(total)?;

    // JSON chunk
    output.write_u32::<LittleEndian>(json_chunk_len as u32)?;
    output.write_u32::<LittleEndian>(CHUNK_TYPE_JSON)?;
    output.extend_from_slice(json);
    output.resize(output.len() + json_padding, b' ');

    // Binary chunk
    if has_bin {
        output.write_u32::<LittleEndian>(bin_chunk_len as u32)?;
        output.write_u32::<LittleEndian>(CHUNK_TYPE_BIN)?;
        output.extend_from_slice(bin);
        output.resize(output.len() + bin_padding, 0);
    }

    debug_assert_eq!(output.len(), total_len, "GLB length field out of sync");
    Ok(output)
}

/// The fixed 12-byte GLB header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    /// Declared length of the whole container.
    pub length: u32,
}

impl GlbHeader {
    /// Read and validate the header at the start of `bytes`.
    ///
    /// # Errors
    /// Returns an error if the data is too short, the magic is wrong or the
    /// version is not 2.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GLB_HEADER_LEN {
            return Err(Error::invalid_glb(format!(
                "{} bytes is shorter than the {GLB_HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        let mut cursor = Cursor::new(bytes);
        let header = GlbHeader {
            magic: cursor.read_u32::<LittleEndian>()?,
            version: cursor.read_u32::<LittleEndian>()?,
            length: cursor.read_u32::<LittleEndian>()?,
        };
        if header.magic != GLB_MAGIC {
            return Err(Error::invalid_glb(format!("bad magic {:#010x}", header.magic)));
        }
        if header.version != GLB_VERSION {
            return Err(Error::invalid_glb(format!(
                "unsupported version {}",
                header.version
            )));
        }
        Ok(header)
    }
}

/// Chunk type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    Json,
    Bin,
    Unknown(u32),
}

impl From<u32> for ChunkType {
    fn from(tag: u32) -> Self {
        match tag {
            CHUNK_TYPE_JSON => ChunkType::Json,
            CHUNK_TYPE_BIN => ChunkType::Bin,
            other => ChunkType::Unknown(other),
        }
    }
}

/// A chunk borrowed from a GLB byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbChunk<'a> {
    pub chunk_type: ChunkType,
    /// Offset of the chunk payload within the container.
    pub offset: usize,
    /// Payload including padding.
    pub data: &'a [u8],
}

/// A parsed GLB container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbContainer<'a> {
    pub header: GlbHeader,
    pub chunks: Vec<GlbChunk<'a>>,
}

impl<'a> GlbContainer<'a> {
    /// The JSON chunk payload (with trailing space padding).
    pub fn json(&self) -> Option<&'a [u8]> {
        self.first_of(ChunkType::Json)
    }

    /// The BIN chunk payload, if present.
    pub fn bin(&self) -> Option<&'a [u8]> {
        self.first_of(ChunkType::Bin)
    }

    /// Parse the JSON chunk back into a document.
    ///
    /// # Errors
    /// Returns an error if the JSON chunk is not a valid glTF document.
    pub fn document(&self) -> Result<GltfDocument> {
        let json = self
            .json()
            .ok_or_else(|| Error::invalid_glb("missing JSON chunk"))?;
        GltfDocument::from_slice(json)
    }

    fn first_of(&self, chunk_type: ChunkType) -> Option<&'a [u8]> {
        self.chunks
            .iter()
            .find(|c| c.chunk_type == chunk_type)
            .map(|c| c.data)
    }
}

/// Parse a GLB container, checking the declared length against the data and
/// the chunk table for consistency.
///
/// # Errors
/// Returns [`Error::InvalidGlb`] describing the first inconsistency found.
pub fn read_glb(bytes: &[u8]) -> Result<GlbContainer<'_>> {
    let header = GlbHeader::parse(bytes)?;
    if header.length as usize != bytes.len() {
        return Err(Error::invalid_glb(format!(
            "header declares {} bytes but container holds {}",
            header.length,
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(GLB_HEADER_LEN as u64);
    let mut chunks = Vec::new();

    while (cursor.position() as usize) < bytes.len() {
        let start = cursor.position() as usize;
        if bytes.len() - start < CHUNK_HEADER_LEN {
            return Err(Error::invalid_glb(format!("truncated chunk header at {start}")));
        }
        let length = cursor.read_u32::<LittleEndian>()? as usize;
        let chunk_type = ChunkType::from(cursor.read_u32::<LittleEndian>()?);
        let offset = start + CHUNK_HEADER_LEN;

        if length % 4 != 0 {
            return Err(Error::invalid_glb(format!(
                "chunk at {start} has unaligned length {length}"
            )));
        }
        if chunks.is_empty() && chunk_type != ChunkType::Json {
            return Err(Error::invalid_glb("first chunk is not JSON"));
        }

        if length > bytes.len() - offset {
            return Err(Error::invalid_glb(format!(
                "chunk at {start} overruns the container"
            )));
        }
        cursor.set_position((offset + length) as u64);
        chunks.push(GlbChunk {
            chunk_type,
            offset,
            data: &bytes[offset..offset + length],
        });
    }

    if chunks.is_empty() {
        return Err(Error::invalid_glb("missing JSON chunk"));
    }

    Ok(GlbContainer { header, chunks })
}
