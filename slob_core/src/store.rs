use tracing::trace;

use crate::blob::Blob;
use crate::config::Config;
use crate::error::{Result, SlobError};
use crate::format::IndexDescriptor;
use crate::read::{next, read_bytes, read_u32, read_u64};
use crate::source::Source;

/// Final result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Borrowed view of the group index.
///
/// Group record layout, at `data_offset + pointer`:
/// ```text
/// [item_count:u32] [item_count × u8 content-type index] [compressed_len:u32] [compressed bytes]
/// ```
/// Every lookup decompresses the whole group; nothing is cached between calls.
pub struct GroupStore<'a, S: ?Sized> {
    src: &'a S,
    info: IndexDescriptor,
    compression: &'a str,
    content_types: &'a [String],
    config: &'a Config,
}

impl<S: ?Sized> std::fmt::Debug for GroupStore<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupStore")
            .field("info", &self.info)
            .field("compression", &self.compression)
            .field("content_types", &self.content_types)
            .field("max_group_size", &self.config.max_group_size)
            .finish_non_exhaustive()
    }
}

impl<'a, S: Source + ?Sized> GroupStore<'a, S> {
    pub(crate) fn new(
        src: &'a S,
        info: IndexDescriptor,
        compression: &'a str,
        content_types: &'a [String],
        config: &'a Config,
    ) -> Self {
        Self {
            src,
            info,
            compression,
            content_types,
            config,
        }
    }

    /// Number of compressed groups (not items).
    pub fn len(&self) -> usize {
        self.info.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Item at `slot` of group `group`, with its content type resolved.
    pub fn get(&self, group: usize, slot: usize) -> Result<Item> {
        let blob = self.blob(group)?;
        let content = blob.get(slot)?;
        let type_index = blob.content_type(slot).ok_or(SlobError::OutOfRange {
            what: "slot",
            index: slot as u64,
            len: blob.len() as u64,
        })?;
        let content_type = self
            .content_types
            .get(usize::from(type_index))
            .ok_or(SlobError::OutOfRange {
                what: "content type",
                index: u64::from(type_index),
                len: self.content_types.len() as u64,
            })?
            .clone();
        Ok(Item {
            content_type,
            content,
        })
    }

    /// Read and decompress group `group`.
    pub fn blob(&self, group: usize) -> Result<Blob> {
        if group >= self.len() {
            return Err(SlobError::OutOfRange {
                what: "group",
                index: group as u64,
                len: self.info.len(),
            });
        }
        let pointer_at = self
            .info
            .pointer_offset(group as u64)
            .ok_or_else(|| SlobError::overflow("group pointer"))?;
        let pointer = read_u64(self.src, pointer_at)?;
        let pos = self
            .info
            .data_offset
            .checked_add(pointer)
            .ok_or_else(|| SlobError::overflow("group record"))?;
        self.read_blob(pos)
    }

    fn read_blob(&self, mut pos: u64) -> Result<Blob> {
        let item_count = read_u32(self.src, pos)?;
        pos = next(pos, 4)?;
        let content_types = read_bytes(self.src, pos, u64::from(item_count))?;
        pos = next(pos, u64::from(item_count))?;
        let compressed_len = read_u32(self.src, pos)?;
        pos = next(pos, 4)?;
        // Exactly this group's bytes; the codec never sees its neighbours.
        let compressed = read_bytes(self.src, pos, u64::from(compressed_len))?;

        let decompressor = self
            .config
            .registry
            .resolve(self.compression)
            .ok_or_else(|| SlobError::UnknownCodec(self.compression.to_string()))?;
        let content = decompressor
            .decompress(&compressed, self.config.max_group_size)
            .map_err(|source| SlobError::CodecFailure {
                codec: self.compression.to_string(),
                source,
            })?;
        trace!(
            items = item_count,
            compressed = compressed_len,
            decompressed = content.len(),
            "decoded group"
        );
        Ok(Blob::new(content_types, content))
    }
}
