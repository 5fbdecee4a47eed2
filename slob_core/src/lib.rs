//! Read-only decoder for slob dictionary containers.
//!
//! A slob file holds a header, a key index mapping keys to `(group, slot)`
//! coordinates, and a pool of compressed groups of items. [`Slob`] opens one
//! over any position-addressed [`Source`] and answers lookups without loading
//! the file into memory.
pub mod blob;
pub mod config;
pub mod error;
pub mod format;
pub mod header;
pub mod key_index;
mod read;
pub mod slob;
pub mod source;
pub mod store;

pub use blob::Blob;
pub use config::Config;
pub use error::{Result, SlobError};
pub use format::{IndexDescriptor, KNOWN_CODECS, MAGIC};
pub use header::Header;
pub use key_index::{KeyIndex, KeyIter, KeyRecord};
pub use slob::Slob;
pub use source::{FileSource, Source};
pub use store::{GroupStore, Item};
pub use uuid::Uuid;
