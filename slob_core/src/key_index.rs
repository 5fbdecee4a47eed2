use tracing::trace;

use crate::error::{Result, SlobError};
use crate::format::IndexDescriptor;
use crate::read::{next, read_text, read_tiny_text, read_u16, read_u32, read_u64};
use crate::source::Source;

/// One dictionary entry: a key and the `(group, slot)` coordinate of its item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub key: String,
    /// Index of the compressed group holding the item.
    pub group: u32,
    /// Position of the item inside its group.
    pub slot: u16,
    /// Optional anchor inside the item; empty when absent.
    pub fragment: String,
}

/// Borrowed view of the key index.
///
/// Record layout, at `data_offset + pointer`:
/// `key:text group:u32 slot:u16 fragment:tiny`.
pub struct KeyIndex<'a, S: ?Sized> {
    src: &'a S,
    info: IndexDescriptor,
}

impl<S: ?Sized> std::fmt::Debug for KeyIndex<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIndex")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<'a, S: Source + ?Sized> KeyIndex<'a, S> {
    pub(crate) fn new(src: &'a S, info: IndexDescriptor) -> Self {
        Self { src, info }
    }

    /// Number of records, as declared by the index.
    pub fn len(&self) -> usize {
        self.info.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Decode the record at `position`.
    pub fn get(&self, position: usize) -> Result<KeyRecord> {
        let pos = self.record_offset(position)?;
        self.read_record(pos)
    }

    /// First record whose key equals `key` exactly.
    ///
    /// Linear scan that decodes only the key of each candidate. Keys are
    /// usually stored sorted, but nothing in the format guarantees it, so no
    /// binary search is attempted.
    pub fn find(&self, key: &str) -> Result<KeyRecord> {
        for position in 0..self.len() {
            let pos = self.record_offset(position)?;
            let (candidate, _) = read_text(self.src, pos)?;
            if candidate == key {
                trace!(key, position, "key found");
                return self.read_record(pos);
            }
        }
        trace!(key, scanned = self.len(), "key not found");
        Err(SlobError::NotFound(key.to_string()))
    }

    /// Records in position order. Stops after yielding the first error.
    pub fn iter(&self) -> KeyIter<'a, S> {
        KeyIter {
            index: KeyIndex::new(self.src, self.info),
            position: 0,
            failed: false,
        }
    }

    fn record_offset(&self, position: usize) -> Result<u64> {
        if position >= self.len() {
            return Err(SlobError::OutOfRange {
                what: "key index position",
                index: position as u64,
                len: self.info.len(),
            });
        }
        let pointer_at = self
            .info
            .pointer_offset(position as u64)
            .ok_or_else(|| SlobError::overflow("key index pointer"))?;
        let pointer = read_u64(self.src, pointer_at)?;
        self.info
            .data_offset
            .checked_add(pointer)
            .ok_or_else(|| SlobError::overflow("key record"))
    }

    fn read_record(&self, mut pos: u64) -> Result<KeyRecord> {
        let (key, n) = read_text(self.src, pos)?;
        pos = next(pos, n)?;
        let group = read_u32(self.src, pos)?;
        pos = next(pos, 4)?;
        let slot = read_u16(self.src, pos)?;
        pos = next(pos, 2)?;
        let (fragment, _) = read_tiny_text(self.src, pos)?;
        Ok(KeyRecord {
            key,
            group,
            slot,
            fragment,
        })
    }
}

impl<'a, S: Source + ?Sized> IntoIterator for &KeyIndex<'a, S> {
    type Item = Result<KeyRecord>;
    type IntoIter = KeyIter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy, ordered walk over a [`KeyIndex`].
///
/// Yields `Ok` records until the index is exhausted, or a single `Err` after
/// which it is fused. A second pass needs a fresh iterator.
pub struct KeyIter<'a, S: ?Sized> {
    index: KeyIndex<'a, S>,
    position: usize,
    failed: bool,
}

impl<S: ?Sized> std::fmt::Debug for KeyIter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIter")
            .field("index", &self.index)
            .field("position", &self.position)
            .field("failed", &self.failed)
            .finish()
    }
}

impl<'a, S: Source + ?Sized> Iterator for KeyIter<'a, S> {
    type Item = Result<KeyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.index.len() {
            return None;
        }
        let record = self.index.get(self.position);
        self.position += 1;
        if record.is_err() {
            self.failed = true;
        }
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.index.len().saturating_sub(self.position);
        (0, Some(remaining))
    }
}

impl<'a, S: Source + ?Sized> std::iter::FusedIterator for KeyIter<'a, S> {}
