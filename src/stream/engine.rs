//! Chunk streaming engine.
//!
//! Finite layers are one contiguous resource of tile records. Infinite layers
//! go through a two-level lookup: the layer's index table maps a chunk
//! coordinate to a locator, and the locator addresses a deflated byte range
//! inside one of the layer's segment resources. Both levels are cached per
//! map under separate byte budgets.

use tracing::{debug, warn};

use crate::cache::LruCache;
use crate::codec::format::{index_path, layer_path, segment_path, TILE_RECORD_SIZE};
use crate::codec::{ChunkKey, Color, Point, Size, TileFlags, TileRect};
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::map::{LayerDescriptor, MapDescriptor};
use super::decompress::Decompressor;
use super::index::{ChunkIndex, ChunkLocator};
use super::provider::ResourceProvider;
use super::sink::{TileSink, EMPTY_TILE};

/// Chunk payload cache key: layer-name hash plus packed chunk coordinate
pub type ChunkCacheKey = (u32, ChunkKey);

/// The two caches owned by an infinite map
#[derive(Debug)]
pub struct ChunkCaches {
    pub(crate) indices: LruCache<String, ChunkIndex>,
    pub(crate) chunks: LruCache<ChunkCacheKey, Vec<u8>>,
}

impl ChunkCaches {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            indices: LruCache::new("index-tables", config.index_cache_budget),
            chunks: LruCache::new("chunk-payloads", config.chunk_cache_budget),
        }
    }
}

/// Borrowed capabilities needed to fetch chunk bytes
#[derive(Clone, Copy)]
pub struct StreamSource<'a> {
    pub provider: &'a dyn ResourceProvider,
    pub decompressor: &'a dyn Decompressor,
}

impl<'a> StreamSource<'a> {
    pub fn new(provider: &'a dyn ResourceProvider, decompressor: &'a dyn Decompressor) -> Self {
        Self { provider, decompressor }
    }
}

/// Outcome of streaming one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFill {
    /// No authored content; the chunk's extent was reset to empty tiles
    Empty,
    Loaded { tiles: usize },
}

/// Totals for a multi-chunk area load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AreaFill {
    pub loaded_chunks: usize,
    pub empty_chunks: usize,
    pub tiles: usize,
}

/// One fixed-width record from a tile stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRecord {
    pub tileset: u8,
    pub flags: TileFlags,
    pub tile_id: i32,
}

impl TileRecord {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let &[tileset, flags, a, b, c, d] = bytes else {
            return None;
        };
        Some(Self {
            tileset,
            flags: TileFlags::from_bits_retain(flags),
            tile_id: i32::from_le_bytes([a, b, c, d]),
        })
    }

    /// Apply a sprite remap table.
    ///
    /// Ids that index into the table are replaced and tagged
    /// [`TileFlags::FROM_REMAP`]; all others pass through unchanged.
    pub fn remapped(self, remap: Option<&[i32]>) -> (i32, TileFlags) {
        let mapped = remap.and_then(|table| {
            usize::try_from(self.tile_id).ok().and_then(|i| table.get(i)).copied()
        });
        match mapped {
            Some(id) => (id, self.flags | TileFlags::FROM_REMAP),
            None => (self.tile_id, self.flags),
        }
    }
}

/// Counts non-negative ids that missed the remap table, for one warning per call
#[derive(Default)]
struct RemapMisses(usize);

impl RemapMisses {
    fn check(&mut self, record: &TileRecord, remap: Option<&[i32]>) {
        if let Some(table) = remap {
            if record.tile_id >= 0 && record.tile_id as usize >= table.len() {
                self.0 += 1;
            }
        }
    }

    fn report(&self, layer: &str, remap: Option<&[i32]>) {
        if self.0 > 0 {
            warn!(
                layer,
                unmapped = self.0,
                table_len = remap.map_or(0, <[i32]>::len),
                "tile ids outside remap table left unchanged"
            );
        }
    }
}

fn offset_point(origin: Point, dx: i64, dy: i64) -> Point {
    Point::new(
        (origin.x as i64 + dx).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        (origin.y as i64 + dy).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    )
}

impl MapDescriptor {
    fn require_layer(&self, name: &str) -> Result<&LayerDescriptor> {
        self.layers
            .get(name)
            .ok_or_else(|| Error::InvalidUsage(format!("map '{}' has no layer '{name}'", self.base_path)))
    }

    /// Stream part of a finite layer into `sink`.
    ///
    /// Cells of `layer` inside `rect` are written at `origin` plus their
    /// offset from the rectangle's top-left corner, row by row. Tiles with
    /// per-tile properties get them attached as cell data. Returns the
    /// number of tiles written. A tile stream shorter than the layer's
    /// declared size fails with `CorruptSection` once the cursor reaches its
    /// end; cells already written are left as they are.
    pub fn load_region<S: TileSink + ?Sized>(
        &self,
        provider: &dyn ResourceProvider,
        layer: &str,
        rect: TileRect,
        origin: Point,
        remap: Option<&[i32]>,
        sink: &mut S,
    ) -> Result<usize> {
        if self.infinite {
            return Err(Error::InvalidUsage(format!(
                "map '{}' is infinite; stream it by chunk",
                self.base_path
            )));
        }
        let desc = self.require_layer(layer)?;
        let Size { width, height } = desc.size;

        let path = layer_path(&self.base_path, desc.hash);
        let data = provider.load_resource(&path).ok_or_else(|| Error::missing(path.clone()))?;

        let row_start = rect.y.max(0) as i64;
        let row_end = rect.bottom().min(height as i64);
        let col_start = rect.x.max(0) as i64;
        let col_end = rect.right().min(width as i64);

        let mut written = 0;
        let mut misses = RemapMisses::default();

        for ly in row_start..row_end {
            for lx in col_start..col_end {
                let at = (ly as usize * width as usize + lx as usize) * TILE_RECORD_SIZE;
                let Some(record) = data.get(at..at + TILE_RECORD_SIZE).and_then(TileRecord::from_bytes)
                else {
                    misses.report(layer, remap);
                    return Err(Error::corrupt(
                        data.len(),
                        format!(
                            "{path} ends at row {ly} of layer '{layer}' ({width}x{height}, {written} tiles written)"
                        ),
                    ));
                };

                misses.check(&record, remap);
                let (tile_id, flags) = record.remapped(remap);
                let dest = offset_point(origin, lx - rect.x as i64, ly - rect.y as i64);
                sink.set_tile(layer, dest.x, dest.y, tile_id, Color::WHITE, flags);

                if let Some(props) = self.tile_properties.get(record.tileset as usize, record.tile_id) {
                    sink.set_tile_data(layer, dest.x, dest.y, Some(props));
                }
                written += 1;
            }
        }

        misses.report(layer, remap);
        Ok(written)
    }

    /// Resolve (loading and caching on a miss) the index table of the layer
    /// whose name hashes to `layer_hash`.
    pub fn resolve_index(
        &mut self,
        provider: &dyn ResourceProvider,
        layer_hash: u32,
    ) -> Result<&ChunkIndex> {
        let path = index_path(&self.base_path, layer_hash);
        let caches = self.caches.as_mut().ok_or_else(|| {
            Error::InvalidUsage(format!("map '{}' is finite and has no chunk index", self.base_path))
        })?;

        if !caches.indices.touch(&path) {
            let data = provider.load_resource(&path).ok_or_else(|| Error::missing(path.clone()))?;
            let index = ChunkIndex::parse(&data)?;
            debug!(path = %path, chunks = index.len(), "loaded chunk index");
            let size = index.byte_size();
            caches.indices.put(path.clone(), index, size);
        }

        caches
            .indices
            .peek(&path)
            .ok_or_else(|| Error::missing(path))
    }

    /// Locator for one chunk, or `None` if the layer has no content there
    pub fn locate_chunk(
        &mut self,
        provider: &dyn ResourceProvider,
        layer: &str,
        chunk: ChunkKey,
    ) -> Result<Option<ChunkLocator>> {
        let hash = self.require_layer(layer)?.hash;
        Ok(self.resolve_index(provider, hash)?.get(chunk))
    }

    /// Stream one chunk of an infinite layer into `sink`.
    ///
    /// The chunk's top-left tile lands on `origin`. A chunk missing from the
    /// layer's index is an intentionally empty region: its whole extent is
    /// reset to [`EMPTY_TILE`] and cell data is cleared. A chunk that fails to
    /// decode aborts the call; cells already written are left as they are.
    pub fn load_chunk<S: TileSink + ?Sized>(
        &mut self,
        source: StreamSource<'_>,
        layer: &str,
        chunk: ChunkKey,
        origin: Point,
        remap: Option<&[i32]>,
        sink: &mut S,
    ) -> Result<ChunkFill> {
        if !self.infinite {
            return Err(Error::InvalidUsage(format!(
                "map '{}' is finite; stream it by region",
                self.base_path
            )));
        }
        let hash = self.require_layer(layer)?.hash;
        let chunk_size = self.chunk_size;

        let Some(locator) = self.resolve_index(source.provider, hash)?.get(chunk) else {
            fill_empty(sink, layer, chunk_size, origin);
            return Ok(ChunkFill::Empty);
        };

        let payload = self.chunk_payload(source, layer, hash, chunk, locator)?;
        let tiles = write_chunk(sink, layer, payload, chunk_size, origin, remap);
        Ok(ChunkFill::Loaded { tiles })
    }

    /// Stream every chunk covering `rect` of an infinite layer.
    ///
    /// Whole chunks are written: a chunk's tile `(x, y)` lands at `origin`
    /// plus its offset from the rectangle's top-left corner, so cells outside
    /// `rect` are written too when it is not chunk-aligned.
    pub fn load_area<S: TileSink + ?Sized>(
        &mut self,
        source: StreamSource<'_>,
        layer: &str,
        rect: TileRect,
        origin: Point,
        remap: Option<&[i32]>,
        sink: &mut S,
    ) -> Result<AreaFill> {
        if !self.infinite {
            return Err(Error::InvalidUsage(format!(
                "map '{}' is finite; stream it by region",
                self.base_path
            )));
        }
        self.require_layer(layer)?;

        let mut fill = AreaFill::default();
        if rect.is_empty() {
            return Ok(fill);
        }
        let (Ok(last_x), Ok(last_y)) = (i32::try_from(rect.right() - 1), i32::try_from(rect.bottom() - 1))
        else {
            return Err(Error::InvalidUsage(format!(
                "area {}x{} at ({}, {}) extends past the tile coordinate range",
                rect.width, rect.height, rect.x, rect.y
            )));
        };

        let size = self.chunk_size;
        let first = ChunkKey::from_tile(rect.x, rect.y, size);
        let last = ChunkKey::from_tile(last_x, last_y, size);

        for cy in first.y()..=last.y() {
            for cx in first.x()..=last.x() {
                let dest = offset_point(
                    origin,
                    cx as i64 * size.width as i64 - rect.x as i64,
                    cy as i64 * size.height as i64 - rect.y as i64,
                );
                match self.load_chunk(source, layer, ChunkKey::pack(cx, cy), dest, remap, sink)? {
                    ChunkFill::Empty => fill.empty_chunks += 1,
                    ChunkFill::Loaded { tiles } => {
                        fill.loaded_chunks += 1;
                        fill.tiles += tiles;
                    }
                }
            }
        }

        Ok(fill)
    }

    fn chunk_payload(
        &mut self,
        source: StreamSource<'_>,
        layer: &str,
        hash: u32,
        chunk: ChunkKey,
        locator: ChunkLocator,
    ) -> Result<&[u8]> {
        let seg_path = segment_path(&self.base_path, hash, locator.segment_id);
        let chunk_size = self.chunk_size;
        let caches = self.caches.as_mut().ok_or_else(|| {
            Error::InvalidUsage(format!("map '{}' has no chunk cache", self.base_path))
        })?;
        let key = (hash, chunk);

        if !caches.chunks.touch(&key) {
            let segment = source
                .provider
                .load_resource(&seg_path)
                .ok_or_else(|| Error::missing(seg_path.clone()))?;

            let offset = locator.segment_offset as usize;
            let length = locator.compressed_length as usize;
            let payload = source.decompressor.decompress(&segment, offset, length).ok_or_else(|| {
                Error::corrupt(
                    offset,
                    format!(
                        "chunk ({}, {}) of layer '{layer}' does not decompress from {seg_path} ({length} bytes)",
                        chunk.x(),
                        chunk.y()
                    ),
                )
            })?;

            let expected = chunk_size.area() * TILE_RECORD_SIZE;
            if payload.len() < expected {
                return Err(Error::corrupt(
                    offset,
                    format!(
                        "chunk ({}, {}) of layer '{layer}' holds {} bytes, extent needs {expected}",
                        chunk.x(),
                        chunk.y(),
                        payload.len()
                    ),
                ));
            }

            debug!(
                layer,
                x = chunk.x(),
                y = chunk.y(),
                compressed = length,
                raw = payload.len(),
                "decompressed chunk"
            );
            let size = payload.len();
            caches.chunks.put(key, payload, size);
        }

        caches
            .chunks
            .peek(&key)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::missing(seg_path))
    }
}

fn fill_empty<S: TileSink + ?Sized>(sink: &mut S, layer: &str, size: Size, origin: Point) {
    for ly in 0..size.height as i64 {
        for lx in 0..size.width as i64 {
            let dest = offset_point(origin, lx, ly);
            sink.set_tile(layer, dest.x, dest.y, EMPTY_TILE, Color::WHITE, TileFlags::empty());
            sink.set_tile_data(layer, dest.x, dest.y, None);
        }
    }
}

fn write_chunk<S: TileSink + ?Sized>(
    sink: &mut S,
    layer: &str,
    payload: &[u8],
    size: Size,
    origin: Point,
    remap: Option<&[i32]>,
) -> usize {
    let capacity = size.area();
    if payload.len() != capacity * TILE_RECORD_SIZE {
        warn!(layer, len = payload.len(), capacity, "chunk payload longer than chunk extent");
    }

    let width = size.width as usize;
    let mut misses = RemapMisses::default();
    let mut written = 0;

    for (i, bytes) in payload.chunks_exact(TILE_RECORD_SIZE).take(capacity).enumerate() {
        let Some(record) = TileRecord::from_bytes(bytes) else {
            break;
        };
        misses.check(&record, remap);
        let (tile_id, flags) = record.remapped(remap);
        let dest = offset_point(origin, (i % width) as i64, (i / width) as i64);
        sink.set_tile(layer, dest.x, dest.y, tile_id, Color::WHITE, flags);
        written += 1;
    }

    misses.report(layer, remap);
    written
}
