use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::decompressor::Decompressor;
use crate::lzma2_codec::Lzma2Decompressor;
use crate::zlib_codec::ZlibDecompressor;

/// Name-keyed table of decompressors.
///
/// Built once, then only read. Lookups take `&self` and never lock, so a
/// single registry can back any number of concurrent group reads.
#[derive(Default, Clone)]
pub struct Registry {
    decompressors: HashMap<&'static str, Arc<dyn Decompressor>>,
}

impl Registry {
    /// An empty registry. Every `resolve` fails until something is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every decompressor bundled with this crate.
    pub fn bundled() -> Self {
        Self::new()
            .with(Arc::new(ZlibDecompressor))
            .with(Arc::new(Lzma2Decompressor))
    }

    /// Add (or replace) the decompressor for `decompressor.name()`.
    pub fn with(mut self, decompressor: Arc<dyn Decompressor>) -> Self {
        self.decompressors.insert(decompressor.name(), decompressor);
        self
    }

    /// Look up the decompressor registered for a header codec name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Decompressor>> {
        let found = self.decompressors.get(name).cloned();
        trace!(codec = name, found = found.is_some(), "resolve decompressor");
        found
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decompressors.contains_key(name)
    }

    /// Registered codec names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.decompressors.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("codecs", &self.names())
            .finish()
    }
}

/// The process-wide registry of bundled decompressors.
///
/// Initialized on first use and read-only from then on.
pub fn registry() -> Arc<Registry> {
    static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
    GLOBAL.get_or_init(|| Arc::new(Registry::bundled())).clone()
}
