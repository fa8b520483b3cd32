//! Per-layer chunk index tables.
//!
//! ```text
//! count: u32
//! repeat count:
//!   key: u64              packed chunk coordinate
//!   segment_id: u16
//!   segment_offset: u16
//!   compressed_length: u16
//! ```

use std::collections::HashMap;

use crate::codec::format::INDEX_ENTRY_SIZE;
use crate::codec::{BinaryReader, ChunkKey};
use crate::error::{Error, Result};

/// Where one chunk's compressed bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkLocator {
    pub segment_id: u16,
    pub segment_offset: u16,
    pub compressed_length: u16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkIndex {
    entries: HashMap<ChunkKey, ChunkLocator, ahash::RandomState>,
}

impl ChunkIndex {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let count = reader.read_u32_le()? as usize;

        let needed = count.checked_mul(INDEX_ENTRY_SIZE);
        if needed.map_or(true, |n| n > reader.remaining()) {
            return Err(Error::corrupt(
                reader.position(),
                format!(
                    "index table declares {count} chunks but only {} bytes follow",
                    reader.remaining()
                ),
            ));
        }

        let mut entries = HashMap::with_capacity_and_hasher(count, ahash::RandomState::default());
        for _ in 0..count {
            let key = ChunkKey(reader.read_u64_le()?);
            let locator = ChunkLocator {
                segment_id: reader.read_u16_le()?,
                segment_offset: reader.read_u16_le()?,
                compressed_length: reader.read_u16_le()?,
            };
            entries.insert(key, locator);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: ChunkKey) -> Option<ChunkLocator> {
        self.entries.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate resident size, used as the cache charge
    pub fn byte_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.entries.len() * (std::mem::size_of::<ChunkKey>() + std::mem::size_of::<ChunkLocator>())
    }
}
