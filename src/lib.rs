//! Tilestream
//!
//! Decoder and streaming loader for binary tile maps. A map's info resource
//! is decoded into a [`MapDescriptor`]; tiles are then pulled on demand into
//! any [`TileSink`], either by region (finite maps) or by chunk from
//! deflated segments through per-map LRU caches (infinite maps).

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod map;
pub mod stream;

#[cfg(test)]
mod testing;

pub use cache::{CacheStats, LruCache};
pub use codec::{ChunkKey, Color, Point, PropertyBag, PropertyValue, Size, TileFlags, TileRect};
pub use config::StreamConfig;
pub use error::{Error, ErrorKind, Result};
pub use map::{
    LayerDescriptor, MapDescriptor, ObjectDescriptor, ObjectGroupDescriptor, ObjectShape,
};
pub use stream::{
    AreaFill, ChunkCompression, ChunkFill, Decompressor, DirectoryProvider, MemoryProvider,
    ResourceProvider, StreamSource, TileGrid, TileSink, EMPTY_TILE,
};
