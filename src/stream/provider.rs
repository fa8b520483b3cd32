use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

/// Source of raw resource bytes, addressed by path.
///
/// Each call is a complete load; implementations hold no handles between calls.
pub trait ResourceProvider {
    fn load_resource(&self, path: &str) -> Option<Vec<u8>>;
}

/// Loads resources from files under a root directory
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceProvider for DirectoryProvider {
    fn load_resource(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.root.join(path);
        match std::fs::read(&full) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(path = %full.display(), error = %e, "resource unavailable");
                None
            }
        }
    }
}

/// In-memory resources keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    resources: HashMap<String, Vec<u8>, ahash::RandomState>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.resources.insert(path.into(), data);
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.resources.remove(path)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceProvider for MemoryProvider {
    fn load_resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.get(path).cloned()
    }
}
