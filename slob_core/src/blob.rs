use crate::error::{Result, SlobError};
use crate::format::LOCAL_POINTER_SIZE;
use crate::read::{read_bytes, read_u32};

/// One decompressed group.
///
/// ```text
/// [item_count × u32 local pointer] [len:u32 bytes] [len:u32 bytes] ...
///                                  ^ data_offset
/// ```
/// Local pointers are relative to `data_offset`. Built per lookup and
/// dropped afterwards.
#[derive(Debug)]
pub struct Blob {
    content_types: Vec<u8>,
    content: Vec<u8>,
    data_offset: u64,
}

impl Blob {
    pub fn new(content_types: Vec<u8>, content: Vec<u8>) -> Self {
        let data_offset = content_types.len() as u64 * LOCAL_POINTER_SIZE;
        Self {
            content_types,
            content,
            data_offset,
        }
    }

    /// Number of items (slots) in the group.
    pub fn len(&self) -> usize {
        self.content_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content_types.is_empty()
    }

    /// Local content-type index of `slot`, if the slot exists.
    pub fn content_type(&self, slot: usize) -> Option<u8> {
        self.content_types.get(slot).copied()
    }

    /// Raw bytes of the item at `slot`.
    pub fn get(&self, slot: usize) -> Result<Vec<u8>> {
        if slot >= self.content_types.len() {
            return Err(SlobError::OutOfRange {
                what: "slot",
                index: slot as u64,
                len: self.content_types.len() as u64,
            });
        }
        let content = &self.content[..];
        let pointer = read_u32(content, slot as u64 * LOCAL_POINTER_SIZE)?;
        let pos = self.data_offset + u64::from(pointer);
        let len = read_u32(content, pos)?;
        read_bytes(content, pos + 4, u64::from(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decompressed layout for `items`, in the order given.
    fn layout(items: &[&[u8]]) -> Vec<u8> {
        let mut pointers = Vec::new();
        let mut data = Vec::new();
        for item in items {
            pointers.extend_from_slice(&(data.len() as u32).to_be_bytes());
            data.extend_from_slice(&(item.len() as u32).to_be_bytes());
            data.extend_from_slice(item);
        }
        pointers.extend(data);
        pointers
    }

    #[test]
    fn test_get_each_slot() {
        let blob = Blob::new(vec![0, 1, 0], layout(&[b"alpha", b"", b"gamma"]));
        assert_eq!(blob.len(), 3);
        assert_eq!(blob.get(0).unwrap(), b"alpha");
        assert_eq!(blob.get(1).unwrap(), b"");
        assert_eq!(blob.get(2).unwrap(), b"gamma");
        assert_eq!(blob.content_type(1), Some(1));
    }

    #[test]
    fn test_slot_out_of_range() {
        let blob = Blob::new(vec![0], layout(&[b"only"]));
        let err = blob.get(1).unwrap_err();
        assert!(err.is_out_of_range(), "got {err:?}");
        assert_eq!(blob.content_type(1), None);
    }

    #[test]
    fn test_more_types_than_pointers() {
        // Content-type array claims 4 items, buffer only has room for one pointer.
        let blob = Blob::new(vec![0; 4], layout(&[b"x"]));
        for slot in 0..4 {
            assert!(matches!(blob.get(slot), Err(SlobError::ShortRead { .. })));
        }
    }

    #[test]
    fn test_bad_item_length() {
        let mut bytes = layout(&[b"abc"]);
        bytes[4..8].copy_from_slice(&u32::MAX.to_be_bytes());
        let blob = Blob::new(vec![0], bytes);
        assert!(matches!(blob.get(0), Err(SlobError::ShortRead { .. })));
    }
}
