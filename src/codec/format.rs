//! Binary layout constants and resource naming.
//!
//! A map exported under base path `maps/world` consists of:
//!
//! ```text
//! maps/world.info                  header + sections
//! maps/world_{hash}.layer          finite layer: raw tile records, row-major
//! maps/world_{hash}.index          infinite layer: chunk index table
//! maps/world_{hash}_{segment}.seg  infinite layer: deflated chunks, back to back
//! ```
//!
//! `{hash}` is the layer-name hash rendered as 8 lower-case hex digits.

pub const MAGIC: u16 = 0x0FE5;
pub const FORMAT_VERSION: u16 = 0x0001;

/// Size in bytes of one `(tileset_index: u8, flags: u8, tile_id: i32)` record
pub const TILE_RECORD_SIZE: usize = 6;

/// Size in bytes of one index table entry: key u64 + three u16 fields
pub const INDEX_ENTRY_SIZE: usize = 14;

/// Terminator for tile ids and tileset indices in the tileset property section
pub const PROPERTY_SENTINEL: i32 = -1;

/// Upper bound on tileset blocks in one tileset property section
pub const MAX_TILESET_BLOCKS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DocumentType {
    Map = 0x01,
}

impl DocumentType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(Self::Map),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SectionTag {
    TileLayer = 0x01,
    ObjectGroup = 0x02,
    TilesetProperties = 0x03,
    End = 0xFF,
}

impl SectionTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(Self::TileLayer),
            0x02 => Some(Self::ObjectGroup),
            0x03 => Some(Self::TilesetProperties),
            0xFF => Some(Self::End),
            _ => None,
        }
    }
}

/// Stable hash of a layer name; `\` and `/` hash identically.
pub fn layer_hash(name: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    let mut scratch = [0u8; 64];
    for piece in name.as_bytes().chunks(scratch.len()) {
        let buf = &mut scratch[..piece.len()];
        buf.copy_from_slice(piece);
        for b in buf.iter_mut() {
            if *b == b'\\' {
                *b = b'/';
            }
        }
        hasher.update(buf);
    }
    hasher.finalize()
}

fn layer_stem(base: &str, hash: u32) -> String {
    format!("{base}_{hash:08x}")
}

pub fn info_path(base: &str) -> String {
    format!("{base}.info")
}

pub fn layer_path(base: &str, hash: u32) -> String {
    format!("{}.layer", layer_stem(base, hash))
}

pub fn index_path(base: &str, hash: u32) -> String {
    format!("{}.index", layer_stem(base, hash))
}

pub fn segment_path(base: &str, hash: u32, segment: u16) -> String {
    format!("{}_{segment}.seg", layer_stem(base, hash))
}
