/// Magic bytes at offset 0 of every slob file: `!-1SLOB` followed by 0x1F.
pub const MAGIC: &[u8; 8] = b"!-1SLOB\x1f";

/// Size of the identity (UUID) field following the magic.
pub const IDENTITY_SIZE: usize = 16;

/// The only text encoding the format allows.
pub const ENCODING_UTF8: &str = "utf-8";

/// Codec names accepted by the header grammar.
///
/// Being listed here does not mean a decompressor is registered for the name;
/// that is checked later, when a group is decoded.
pub const KNOWN_CODECS: &[&str] = &["bz2", "zlib", "lzma2"];

/// Width of one entry in a position table (key index and group index).
pub const POINTER_SIZE: u64 = 8;

/// Width of one entry in a decompressed group's local pointer table.
pub const LOCAL_POINTER_SIZE: u64 = 4;

/// Default ceiling on the decompressed size of a single group: 256 MiB.
pub const DEFAULT_MAX_GROUP_SIZE: usize = 256 * 1024 * 1024;

/// Location of one positional table and the records it points into.
///
/// Layout at `count_offset`:
/// ```text
/// [count: u32] [count × u64 pointer] [records ...]
///               ^ pos_offset          ^ data_offset
/// ```
/// Pointers are relative to `data_offset`, not absolute file offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub count: u32,
    pub pos_offset: u64,
    pub data_offset: u64,
}

impl IndexDescriptor {
    /// Descriptor for a table whose count field sits at `count_offset`.
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn at(count_offset: u64, count: u32) -> Option<Self> {
        let pos_offset = count_offset.checked_add(4)?;
        let data_offset = pos_offset.checked_add(u64::from(count).checked_mul(POINTER_SIZE)?)?;
        Some(Self {
            count,
            pos_offset,
            data_offset,
        })
    }

    /// File offset of the pointer for entry `index`.
    pub fn pointer_offset(&self, index: u64) -> Option<u64> {
        self.pos_offset.checked_add(index.checked_mul(POINTER_SIZE)?)
    }

    /// Number of entries.
    pub fn len(&self) -> u64 {
        u64::from(self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
