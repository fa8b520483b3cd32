pub mod provider;
pub mod decompress;
pub mod sink;
pub mod index;
pub mod engine;

pub use provider::{DirectoryProvider, MemoryProvider, ResourceProvider};
pub use decompress::{ChunkCompression, Decompressor};
pub use sink::{Cell, TileGrid, TileSink, EMPTY_TILE};
pub use index::{ChunkIndex, ChunkLocator};
pub use engine::{AreaFill, ChunkCacheKey, ChunkFill, StreamSource, TileRecord};
