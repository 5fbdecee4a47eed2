use std::sync::Arc;

use slob_codecs::Registry;

use crate::format::DEFAULT_MAX_GROUP_SIZE;

/// Options applied when a container is opened.
#[derive(Debug, Clone)]
pub struct Config {
    /// Decompressors consulted when a group is decoded. Defaults to the
    /// process-wide bundled registry.
    pub registry: Arc<Registry>,
    /// Largest decompressed group accepted, in bytes. A group that inflates
    /// past this fails with a codec error instead of exhausting memory.
    pub max_group_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: slob_codecs::registry(),
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
        }
    }
}

impl Config {
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_max_group_size(mut self, max_group_size: usize) -> Self {
        self.max_group_size = max_group_size;
        self
    }
}
