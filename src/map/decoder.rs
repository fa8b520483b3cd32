//! Binary map decoder.
//!
//! Header layout (little-endian):
//!
//! ```text
//! magic: u16 = 0x0FE5
//! version: u16            <= FORMAT_VERSION
//! document_type: u8       0x01 = map
//! width: u32, height: u32
//! background: [u8; 4]     RGBA
//! infinite: bool
//! chunk_width: u16, chunk_height: u16
//! has_properties: bool, [PropertyBag]
//! sections...             tag: u8, terminated by 0xFF
//! ```

use tracing::debug;

use crate::codec::format::{DocumentType, SectionTag, FORMAT_VERSION, MAGIC};
use crate::codec::{layer_hash, BinaryReader, PropertyBag, Size};
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::stream::engine::ChunkCaches;
use super::descriptor::{
    LayerDescriptor, LayerMap, ObjectDescriptor, ObjectGroupDescriptor, ObjectGroupMap, ObjectRect,
    ObjectShape,
};
use super::tile_properties::TilePropertyTable;
use super::MapDescriptor;

struct Header {
    version: u16,
    size: Size,
    background: crate::codec::Color,
    infinite: bool,
    chunk_size: Size,
    properties: PropertyBag,
}

/// Decode an info resource into a map descriptor.
///
/// No descriptor is produced unless the whole resource decodes.
pub fn decode_map(data: &[u8], base_path: &str, config: &StreamConfig) -> Result<MapDescriptor> {
    let mut reader = BinaryReader::new(data);
    let header = read_header(&mut reader)?;

    let mut layers = LayerMap::default();
    let mut object_groups = ObjectGroupMap::default();
    let mut tile_properties = TilePropertyTable::new();

    loop {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        match SectionTag::from_u8(tag) {
            Some(SectionTag::TileLayer) => {
                let layer = read_layer(&mut reader, header.infinite)?;
                layers.insert(layer.name.clone(), layer);
            }
            Some(SectionTag::ObjectGroup) => {
                let group = read_object_group(&mut reader)?;
                object_groups.insert(group.name.clone(), group);
            }
            Some(SectionTag::TilesetProperties) => {
                tile_properties = TilePropertyTable::read(&mut reader)?;
            }
            Some(SectionTag::End) => break,
            None => {
                return Err(Error::corrupt(offset, format!("unknown section tag {tag:#04x}")));
            }
        }
    }

    debug!(
        base_path,
        version = header.version,
        infinite = header.infinite,
        layers = layers.len(),
        object_groups = object_groups.len(),
        tilesets_with_properties = tile_properties.tileset_count(),
        "decoded map"
    );

    let caches = header.infinite.then(|| ChunkCaches::new(config));

    Ok(MapDescriptor {
        base_path: base_path.to_string(),
        version: header.version,
        size: header.size,
        chunk_size: header.chunk_size,
        infinite: header.infinite,
        background: header.background,
        properties: header.properties,
        layers,
        object_groups,
        tile_properties,
        caches,
    })
}

fn read_header(reader: &mut BinaryReader) -> Result<Header> {
    let malformed = |e: Error| Error::MalformedHeader(e.to_string());

    let magic = reader.read_u16_le().map_err(malformed)?;
    if magic != MAGIC {
        return Err(Error::MalformedHeader(format!(
            "bad magic {magic:#06x}, expected {MAGIC:#06x}"
        )));
    }

    let version = reader.read_u16_le().map_err(malformed)?;
    if version > FORMAT_VERSION {
        return Err(Error::UnsupportedVersion { found: version, supported: FORMAT_VERSION });
    }

    let doc_type = reader.read_u8().map_err(malformed)?;
    if DocumentType::from_u8(doc_type) != Some(DocumentType::Map) {
        return Err(Error::MalformedHeader(format!("document type {doc_type:#04x} is not a map")));
    }

    let size = Size::new(
        reader.read_u32_le().map_err(malformed)?,
        reader.read_u32_le().map_err(malformed)?,
    );
    let background = reader.read_color().map_err(malformed)?;
    let infinite = reader.read_bool().map_err(malformed)?;
    let chunk_size = Size::new(
        reader.read_u16_le().map_err(malformed)? as u32,
        reader.read_u16_le().map_err(malformed)? as u32,
    );
    if infinite && chunk_size.area() == 0 {
        return Err(Error::MalformedHeader(format!(
            "infinite map declares empty chunk extent {}x{}",
            chunk_size.width, chunk_size.height
        )));
    }

    let properties = PropertyBag::read_optional(reader).map_err(malformed)?;

    Ok(Header { version, size, background, infinite, chunk_size, properties })
}

fn read_layer(reader: &mut BinaryReader, infinite: bool) -> Result<LayerDescriptor> {
    let name = reader.read_string()?;
    let size = Size::new(reader.read_u32_le()?, reader.read_u32_le()?);
    let offset = reader.read_point()?;
    let visible = reader.read_bool()?;
    let alpha = reader.read_u8()?;
    let properties = PropertyBag::read_optional(reader)?;
    let chunk_count = if infinite { reader.read_u32_le()? } else { 0 };
    let hash = layer_hash(&name);

    Ok(LayerDescriptor { name, size, offset, visible, alpha, properties, chunk_count, hash })
}

fn read_object_group(reader: &mut BinaryReader) -> Result<ObjectGroupDescriptor> {
    let name = reader.read_string()?;
    let tint = reader.read_color()?;
    let alpha = reader.read_u8()?;
    let visible = reader.read_bool()?;
    let offset = reader.read_point()?;
    let properties = PropertyBag::read_optional(reader)?;

    let count = reader.read_u32_le()? as usize;
    // Each object is well over a byte, so `remaining` bounds the allocation
    let mut objects = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        objects.push(read_object(reader)?);
    }

    Ok(ObjectGroupDescriptor { name, tint, alpha, visible, offset, properties, objects })
}

fn read_object(reader: &mut BinaryReader) -> Result<ObjectDescriptor> {
    let name = reader.read_string()?;
    let kind = reader.read_string()?;

    let shape_offset = reader.position();
    let shape_byte = reader.read_u8()?;
    let shape = ObjectShape::from_u8(shape_byte).ok_or_else(|| {
        Error::corrupt(shape_offset, format!("unknown object shape {shape_byte}"))
    })?;

    let rect = ObjectRect {
        x: reader.read_i32_le()?,
        y: reader.read_i32_le()?,
        width: reader.read_i32_le()?,
        height: reader.read_i32_le()?,
    };
    let rotation = reader.read_f32_le()?;
    let visible = reader.read_bool()?;
    let properties = PropertyBag::read_optional(reader)?;

    let point_count = reader.read_u32_le()? as usize;
    let mut points = Vec::with_capacity(if shape.has_points() {
        point_count.min(reader.remaining() / 8)
    } else {
        0
    });
    for _ in 0..point_count {
        let point = reader.read_point()?;
        if shape.has_points() {
            points.push(point);
        }
    }

    Ok(ObjectDescriptor { name, kind, shape, rect, rotation, visible, points, properties })
}
