//! Fixture encoders for unit tests.

use std::collections::BTreeMap;
use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::codec::format::{
    index_path, info_path, layer_path, segment_path, DocumentType, SectionTag, FORMAT_VERSION,
    MAGIC, PROPERTY_SENTINEL, TILE_RECORD_SIZE,
};
use crate::codec::{layer_hash, BinaryWriter, ChunkKey, Color, Point, PropertyBag, TileFlags};
use crate::map::ObjectShape;
use crate::stream::{MemoryProvider, TileSink};

pub fn record(tileset: u8, flags: u8, tile_id: i32) -> [u8; TILE_RECORD_SIZE] {
    let id = tile_id.to_le_bytes();
    [tileset, flags, id[0], id[1], id[2], id[3]]
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub struct ObjectSpec {
    name: String,
    shape: u8,
    points: Vec<Point>,
}

impl ObjectSpec {
    pub fn new(name: &str, shape: ObjectShape) -> Self {
        Self::raw_shape(name, shape as u8)
    }

    pub fn raw_shape(name: &str, shape: u8) -> Self {
        Self { name: name.to_string(), shape, points: Vec::new() }
    }

    pub fn points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }
}

enum Section {
    Layer { name: String, width: u32, height: u32, chunk_count: u32 },
    ObjectGroup { name: String, objects: Vec<ObjectSpec> },
    RawTilesetBlocks(Vec<i32>),
}

pub struct MapBuilder {
    version: u16,
    width: u32,
    height: u32,
    infinite: bool,
    chunk_width: u16,
    chunk_height: u16,
    background: Color,
    properties: Option<PropertyBag>,
    sections: Vec<Section>,
    tile_properties: BTreeMap<usize, Vec<(i32, PropertyBag)>>,
}

impl MapBuilder {
    fn new(width: u32, height: u32, infinite: bool, chunk_width: u16, chunk_height: u16) -> Self {
        Self {
            version: FORMAT_VERSION,
            width,
            height,
            infinite,
            chunk_width,
            chunk_height,
            background: Color::TRANSPARENT,
            properties: None,
            sections: Vec::new(),
            tile_properties: BTreeMap::new(),
        }
    }

    pub fn finite(width: u32, height: u32) -> Self {
        Self::new(width, height, false, 0, 0)
    }

    pub fn infinite(chunk_width: u16, chunk_height: u16) -> Self {
        Self::new(0, 0, true, chunk_width, chunk_height)
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn properties(mut self, bag: PropertyBag) -> Self {
        self.properties = Some(bag);
        self
    }

    pub fn layer(mut self, name: &str, width: u32, height: u32) -> Self {
        self.sections.push(Section::Layer { name: name.to_string(), width, height, chunk_count: 0 });
        self
    }

    pub fn chunked_layer(mut self, name: &str, chunk_count: u32) -> Self {
        self.sections.push(Section::Layer { name: name.to_string(), width: 0, height: 0, chunk_count });
        self
    }

    pub fn object_group(mut self, name: &str, objects: Vec<ObjectSpec>) -> Self {
        self.sections.push(Section::ObjectGroup { name: name.to_string(), objects });
        self
    }

    pub fn tile_property(mut self, tileset: usize, tile_id: i32, bag: PropertyBag) -> Self {
        self.tile_properties.entry(tileset).or_default().push((tile_id, bag));
        self
    }

    /// Tileset property section with empty blocks under the given indices
    pub fn raw_tileset_blocks(mut self, indices: &[i32]) -> Self {
        self.sections.push(Section::RawTilesetBlocks(indices.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.write_u16_le(MAGIC);
        w.write_u16_le(self.version);
        w.write_u8(DocumentType::Map as u8);
        w.write_u32_le(self.width);
        w.write_u32_le(self.height);
        w.write_color(self.background);
        w.write_bool(self.infinite);
        w.write_u16_le(self.chunk_width);
        w.write_u16_le(self.chunk_height);
        write_optional_bag(&mut w, self.properties.as_ref());

        for section in &self.sections {
            match section {
                Section::Layer { name, width, height, chunk_count } => {
                    w.write_u8(SectionTag::TileLayer as u8);
                    w.write_string(name);
                    w.write_u32_le(*width);
                    w.write_u32_le(*height);
                    w.write_point(Point::new(0, 0));
                    w.write_bool(true);
                    w.write_u8(255);
                    write_optional_bag(&mut w, None);
                    if self.infinite {
                        w.write_u32_le(*chunk_count);
                    }
                }
                Section::ObjectGroup { name, objects } => {
                    w.write_u8(SectionTag::ObjectGroup as u8);
                    w.write_string(name);
                    w.write_color(Color::WHITE);
                    w.write_u8(255);
                    w.write_bool(true);
                    w.write_point(Point::new(0, 0));
                    write_optional_bag(&mut w, None);
                    w.write_u32_le(objects.len() as u32);
                    for object in objects {
                        w.write_string(&object.name);
                        w.write_string("");
                        w.write_u8(object.shape);
                        for v in [1, 2, 16, 16] {
                            w.write_i32_le(v);
                        }
                        w.write_f32_le(0.0);
                        w.write_bool(true);
                        write_optional_bag(&mut w, None);
                        w.write_u32_le(object.points.len() as u32);
                        for point in &object.points {
                            w.write_point(*point);
                        }
                    }
                }
                Section::RawTilesetBlocks(indices) => {
                    w.write_u8(SectionTag::TilesetProperties as u8);
                    for index in indices {
                        w.write_i32_le(*index);
                        w.write_i32_le(PROPERTY_SENTINEL);
                    }
                    w.write_i32_le(PROPERTY_SENTINEL);
                }
            }
        }

        if let Some(&last) = self.tile_properties.keys().next_back() {
            w.write_u8(SectionTag::TilesetProperties as u8);
            for tileset in 0..=last {
                w.write_i32_le(tileset as i32);
                for (tile_id, bag) in self.tile_properties.get(&tileset).into_iter().flatten() {
                    w.write_i32_le(*tile_id);
                    bag.write(&mut w).unwrap();
                }
                w.write_i32_le(PROPERTY_SENTINEL);
            }
            w.write_i32_le(PROPERTY_SENTINEL);
        }

        w.write_u8(SectionTag::End as u8);
        w.into_vec()
    }

    /// Info resource plus one raw tile stream per finite layer
    pub fn install(&self, base: &str, layers: &[(&str, Vec<[u8; TILE_RECORD_SIZE]>)]) -> MemoryProvider {
        let mut provider = MemoryProvider::new();
        provider.insert(info_path(base), self.build());
        for (name, tiles) in layers {
            provider.insert(layer_path(base, layer_hash(name)), tiles.concat());
        }
        provider
    }

    /// Info resource plus index table and deflated segments for one infinite layer
    pub fn install_chunked(&self, base: &str, layer: &str, chunks: &[ChunkSpec]) -> MemoryProvider {
        let hash = layer_hash(layer);
        let mut provider = MemoryProvider::new();
        provider.insert(info_path(base), self.build());

        let mut segments: BTreeMap<u16, Vec<u8>> = BTreeMap::new();
        let mut index = BinaryWriter::new();
        index.write_u32_le(chunks.len() as u32);
        for chunk in chunks {
            let segment = segments.entry(chunk.segment).or_default();
            let compressed = deflate(&chunk.tiles.concat());
            index.write_u64_le(ChunkKey::from(chunk.coord).0);
            index.write_u16_le(chunk.segment);
            index.write_u16_le(segment.len() as u16);
            index.write_u16_le(compressed.len() as u16);
            segment.extend_from_slice(&compressed);
        }

        provider.insert(index_path(base, hash), index.into_vec());
        for (id, bytes) in segments {
            provider.insert(segment_path(base, hash, id), bytes);
        }
        provider
    }
}

fn write_optional_bag(w: &mut BinaryWriter, bag: Option<&PropertyBag>) {
    w.write_bool(bag.is_some());
    if let Some(bag) = bag {
        bag.write(w).unwrap();
    }
}

pub struct ChunkSpec {
    coord: (i32, i32),
    segment: u16,
    tiles: Vec<[u8; TILE_RECORD_SIZE]>,
}

impl ChunkSpec {
    pub fn new(coord: (i32, i32), segment: u16, tiles: Vec<[u8; TILE_RECORD_SIZE]>) -> Self {
        Self { coord, segment, tiles }
    }
}

/// Sink that logs every call in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub tiles: Vec<(i32, i32, i32, TileFlags)>,
    pub data: Vec<(i32, i32, Option<PropertyBag>)>,
}

impl RecordingSink {
    pub fn tile_positions(&self) -> Vec<(i32, i32)> {
        self.tiles.iter().map(|&(x, y, _, _)| (x, y)).collect()
    }

    pub fn tile_ids(&self) -> Vec<i32> {
        self.tiles.iter().map(|&(_, _, id, _)| id).collect()
    }

    pub fn tile_flags(&self) -> Vec<TileFlags> {
        self.tiles.iter().map(|&(_, _, _, flags)| flags).collect()
    }
}

impl TileSink for RecordingSink {
    fn set_tile(&mut self, _layer: &str, x: i32, y: i32, tile_id: i32, _color: Color, flags: TileFlags) {
        self.tiles.push((x, y, tile_id, flags));
    }

    fn set_tile_data(&mut self, _layer: &str, x: i32, y: i32, data: Option<&PropertyBag>) {
        self.data.push((x, y, data.cloned()));
    }
}
