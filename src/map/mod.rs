pub mod descriptor;
pub mod decoder;
pub mod tile_properties;

pub use descriptor::{
    LayerDescriptor, ObjectDescriptor, ObjectGroupDescriptor, ObjectRect, ObjectShape,
};
pub use decoder::decode_map;
pub use tile_properties::TilePropertyTable;

use crate::cache::CacheStats;
use crate::codec::format::info_path;
use crate::codec::{Color, PropertyBag, Size};
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::stream::engine::ChunkCaches;
use crate::stream::ResourceProvider;
use descriptor::{LayerMap, ObjectGroupMap};

/// A decoded map header with its layer and object group metadata.
///
/// Everything but the chunk caches is fixed once decoded. Infinite maps own
/// an index-table cache and a chunk-payload cache; finite maps own neither.
/// The caches are not synchronised, so a descriptor shared between threads
/// needs an external lock.
#[derive(Debug)]
pub struct MapDescriptor {
    pub(crate) base_path: String,
    pub(crate) version: u16,
    pub(crate) size: Size,
    pub(crate) chunk_size: Size,
    pub(crate) infinite: bool,
    pub(crate) background: Color,
    pub(crate) properties: PropertyBag,
    pub(crate) layers: LayerMap,
    pub(crate) object_groups: ObjectGroupMap,
    pub(crate) tile_properties: TilePropertyTable,
    pub(crate) caches: Option<ChunkCaches>,
}

impl MapDescriptor {
    /// Load and decode `{base_path}.info` through `provider`.
    pub fn load(
        provider: &dyn ResourceProvider,
        base_path: &str,
        config: &StreamConfig,
    ) -> Result<Self> {
        let path = info_path(base_path);
        let data = provider.load_resource(&path).ok_or_else(|| Error::missing(path))?;
        decode_map(&data, base_path, config)
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Chunk extent in tiles; only meaningful for infinite maps
    pub fn chunk_size(&self) -> Size {
        self.chunk_size
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn layer(&self, name: &str) -> Option<&LayerDescriptor> {
        self.layers.get(name)
    }

    /// Layers in declaration order
    pub fn layers(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.layers.values()
    }

    pub fn object_group(&self, name: &str) -> Option<&ObjectGroupDescriptor> {
        self.object_groups.get(name)
    }

    /// Object groups in declaration order
    pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroupDescriptor> {
        self.object_groups.values()
    }

    pub fn tile_property_table(&self) -> &TilePropertyTable {
        &self.tile_properties
    }

    pub fn tile_properties(&self, tileset: usize, tile_id: i32) -> Option<&PropertyBag> {
        self.tile_properties.get(tileset, tile_id)
    }

    /// `(index tables, chunk payloads)` counters, for infinite maps
    pub fn cache_stats(&self) -> Option<(CacheStats, CacheStats)> {
        self.caches.as_ref().map(|c| (c.indices.stats(), c.chunks.stats()))
    }

    /// Drop every cached index table and chunk payload.
    pub fn purge_caches(&mut self) {
        if let Some(caches) = &mut self.caches {
            caches.indices.clear();
            caches.chunks.clear();
        }
    }
}
