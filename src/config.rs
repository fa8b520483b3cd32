use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stream::ChunkCompression;

/// Cache budgets and chunk compression for infinite maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Byte budget for cached chunk index tables
    pub index_cache_budget: usize,
    /// Byte budget for cached decompressed chunk payloads
    pub chunk_cache_budget: usize,
    pub compression: ChunkCompression,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            index_cache_budget: 256 * 1024,
            chunk_cache_budget: 16 * 1024 * 1024,
            compression: ChunkCompression::Deflate,
        }
    }
}

impl StreamConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidUsage(format!("invalid stream config: {e}")))
    }
}
