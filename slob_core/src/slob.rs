use std::collections::HashMap;
use std::path::Path;

use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::format::IDENTITY_SIZE;
use crate::header::Header;
use crate::key_index::{KeyIndex, KeyIter, KeyRecord};
use crate::source::{FileSource, Source};
use crate::store::{GroupStore, Item};

/// Random-access reader for one slob container.
///
/// # Open sequence
/// 1. Parse the header (magic, identity, encoding, codec, tags, content types).
/// 2. Locate the key index immediately after the header.
/// 3. Locate the group index at the header's store offset.
///
/// Nothing else is read up front. After `open` the container is immutable,
/// and every read names its own offset, so `&Slob` can be shared across
/// threads as long as the source supports concurrent positioned reads.
///
/// # Access pattern
/// [`find`](Slob::find) scans the key index, then reads and decompresses the
/// single group holding the item. [`get`](Slob::get) skips the scan.
pub struct Slob<S> {
    source: S,
    header: Header,
    config: Config,
}

impl<S> std::fmt::Debug for Slob<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slob")
            .field("header", &self.header)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Slob<FileSource> {
    /// Open a slob file on disk with the default configuration.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening slob file");
        Self::open(FileSource::open(path)?)
    }
}

impl<S: Source> Slob<S> {
    pub fn open(source: S) -> Result<Self> {
        Self::open_with(source, Config::default())
    }

    pub fn open_with(source: S, config: Config) -> Result<Self> {
        let header = Header::parse(&source)?;
        debug!(
            uuid = %header.identity,
            compression = %header.compression,
            keys = header.refs.count,
            groups = header.store.count,
            "opened slob"
        );
        Ok(Self {
            source,
            header,
            config,
        })
    }

    /// Item stored under `key`.
    pub fn find(&self, key: &str) -> Result<Item> {
        let record = self.key_index().find(key)?;
        self.get_ref(&record)
    }

    /// Item at `slot` of group `group`.
    pub fn get(&self, group: usize, slot: usize) -> Result<Item> {
        self.store().get(group, slot)
    }

    /// Item a key record points at.
    pub fn get_ref(&self, record: &KeyRecord) -> Result<Item> {
        self.get(record.group as usize, usize::from(record.slot))
    }

    /// Every key record, in index order.
    pub fn keys(&self) -> KeyIter<'_, S> {
        self.key_index().iter()
    }

    /// Number of compressed groups.
    pub fn size(&self) -> usize {
        self.store().len()
    }

    /// Number of key records.
    pub fn key_count(&self) -> usize {
        self.key_index().len()
    }

    pub fn key_index(&self) -> KeyIndex<'_, S> {
        KeyIndex::new(&self.source, self.header.refs)
    }

    pub fn store(&self) -> GroupStore<'_, S> {
        GroupStore::new(
            &self.source,
            self.header.store,
            &self.header.compression,
            &self.header.content_types,
            &self.config,
        )
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The 16 raw identity bytes.
    pub fn identity(&self) -> &[u8; IDENTITY_SIZE] {
        self.header.identity.as_bytes()
    }

    pub fn uuid(&self) -> Uuid {
        self.header.identity
    }

    pub fn encoding(&self) -> &str {
        &self.header.encoding
    }

    pub fn compression(&self) -> &str {
        &self.header.compression
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.header.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.header.tags.get(name).map(String::as_str)
    }

    pub fn content_types(&self) -> &[String] {
        &self.header.content_types
    }

    /// Group count as declared in the header (see [`size`](Slob::size) for the indexed count).
    pub fn blob_count(&self) -> u32 {
        self.header.blob_count
    }

    pub fn store_offset(&self) -> u64 {
        self.header.store_offset
    }

    /// Total size as declared in the header.
    pub fn total_size(&self) -> u64 {
        self.header.size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
