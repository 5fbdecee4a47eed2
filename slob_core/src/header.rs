use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, SlobError};
use crate::format::{IndexDescriptor, ENCODING_UTF8, IDENTITY_SIZE, KNOWN_CODECS, MAGIC};
use crate::read::{
    next, read_array, read_byte_string, read_text, read_tiny_text, read_u32, read_u64, read_u8,
};
use crate::source::Source;

/// Decoded slob file header.
///
/// # Layout (big-endian)
/// ```text
/// magic[8] identity[16] encoding:tiny codec:tiny
/// tag_count:u8 (key:tiny value:tiny)*
/// type_count:u8 (content_type:text)*
/// blob_count:u32 store_offset:u64 size:u64
/// key index       (count:u32, pointers, records)   immediately after
/// group index     (count:u32, pointers, records)   at store_offset
/// ```
#[derive(Debug, Clone)]
pub struct Header {
    pub identity: Uuid,
    pub encoding: String,
    pub compression: String,
    pub tags: HashMap<String, String>,
    pub content_types: Vec<String>,
    /// Group count as declared in the header. The authoritative count used
    /// for bounds checks is the one stored at `store_offset`.
    pub blob_count: u32,
    pub store_offset: u64,
    /// Total size as declared in the header.
    pub size: u64,
    pub refs: IndexDescriptor,
    pub store: IndexDescriptor,
}

impl Header {
    /// Parse the header and locate both positional tables.
    ///
    /// Fails on the first bad field; nothing partially parsed escapes.
    pub fn parse<S: Source + ?Sized>(src: &S) -> Result<Self> {
        let magic: [u8; 8] = read_array(src, 0).map_err(|e| match e {
            SlobError::ShortRead { .. } => {
                SlobError::InvalidFormat("input too short to hold the slob magic".into())
            }
            other => other,
        })?;
        if &magic != MAGIC {
            return Err(SlobError::InvalidFormat(format!(
                "magic mismatch: expected {:02x?}, got {:02x?}",
                MAGIC, magic
            )));
        }
        let mut pos = MAGIC.len() as u64;

        let identity = Uuid::from_bytes(read_array(src, pos)?);
        pos += IDENTITY_SIZE as u64;

        let (encoding, n) = read_byte_string(src, pos)?;
        pos = next(pos, n)?;
        if encoding != ENCODING_UTF8.as_bytes() {
            return Err(SlobError::UnsupportedEncoding(
                String::from_utf8_lossy(&encoding).into_owned(),
            ));
        }

        let (compression, n) = read_tiny_text(src, pos)?;
        pos = next(pos, n)?;
        if !KNOWN_CODECS.contains(&compression.as_str()) {
            return Err(SlobError::UnsupportedCodec(compression));
        }

        let tag_count = read_u8(src, pos)?;
        pos = next(pos, 1)?;
        let mut tags = HashMap::with_capacity(tag_count as usize);
        for _ in 0..tag_count {
            let (key, n) = read_tiny_text(src, pos)?;
            pos = next(pos, n)?;
            let (value, n) = read_tiny_text(src, pos)?;
            pos = next(pos, n)?;
            tags.insert(key, value);
        }

        let type_count = read_u8(src, pos)?;
        pos = next(pos, 1)?;
        let mut content_types = Vec::with_capacity(type_count as usize);
        for _ in 0..type_count {
            let (content_type, n) = read_text(src, pos)?;
            pos = next(pos, n)?;
            content_types.push(content_type);
        }

        let blob_count = read_u32(src, pos)?;
        pos = next(pos, 4)?;
        let store_offset = read_u64(src, pos)?;
        pos = next(pos, 8)?;
        let size = read_u64(src, pos)?;
        pos = next(pos, 8)?;

        let refs = read_descriptor(src, pos)?;
        let store = read_descriptor(src, store_offset)?;

        debug!(
            compression = %compression,
            tags = tags.len(),
            content_types = content_types.len(),
            keys = refs.count,
            groups = store.count,
            "parsed slob header"
        );

        Ok(Self {
            identity,
            encoding: ENCODING_UTF8.to_string(),
            compression,
            tags,
            content_types,
            blob_count,
            store_offset,
            size,
            refs,
            store,
        })
    }
}


fn read_descriptor<S: Source + ?Sized>(src: &S, pos: u64) -> Result<IndexDescriptor> {
    let count = read_u32(src, pos)?;
    IndexDescriptor::at(pos, count).ok_or_else(|| SlobError::overflow("index descriptor"))
}
