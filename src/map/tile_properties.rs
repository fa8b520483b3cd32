//! Per-tile property tables, one per tileset in declaration order.
//!
//! Section layout:
//!
//! ```text
//! repeat:
//!   tileset_index: i32      -1 ends the section; otherwise previous + 1
//!   repeat:
//!     tile_id: i32          -1 ends this tileset block
//!     properties: PropertyBag
//! ```

use std::collections::HashMap;

use crate::codec::format::{MAX_TILESET_BLOCKS, PROPERTY_SENTINEL};
use crate::codec::{BinaryReader, PropertyBag};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TilePropertyTable {
    tilesets: Vec<HashMap<i32, PropertyBag, ahash::RandomState>>,
}

impl TilePropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tileset_count(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    /// Properties for a tile; an unknown tileset index is treated as "no properties".
    pub fn get(&self, tileset: usize, tile_id: i32) -> Option<&PropertyBag> {
        self.tilesets.get(tileset)?.get(&tile_id)
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mut tilesets = Vec::new();

        loop {
            if tilesets.len() >= MAX_TILESET_BLOCKS {
                return Err(Error::corrupt(
                    reader.position(),
                    format!("tileset property section exceeds {MAX_TILESET_BLOCKS} blocks"),
                ));
            }

            let offset = reader.position();
            let index = reader.read_i32_le()?;
            if index == PROPERTY_SENTINEL {
                break;
            }
            let expected = tilesets.len() as i32;
            if index != expected {
                return Err(Error::corrupt(
                    offset,
                    format!("tileset property block {index} out of sequence, expected {expected}"),
                ));
            }

            let mut tiles = HashMap::default();
            loop {
                let tile_id = reader.read_i32_le()?;
                if tile_id == PROPERTY_SENTINEL {
                    break;
                }
                tiles.insert(tile_id, PropertyBag::read(reader)?);
            }
            tilesets.push(tiles);
        }

        Ok(Self { tilesets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BinaryWriter, PropertyValue};
    use crate::error::ErrorKind;

    fn bag(key: &str, v: i32) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert(key, PropertyValue::Int(v));
        bag
    }

    fn write_block(w: &mut BinaryWriter, index: i32, tiles: &[(i32, PropertyBag)]) {
        w.write_i32_le(index);
        for (id, props) in tiles {
            w.write_i32_le(*id);
            props.write(w).unwrap();
        }
        w.write_i32_le(PROPERTY_SENTINEL);
    }

    #[test]
    fn test_read_sequential_blocks() {
        let mut w = BinaryWriter::new();
        write_block(&mut w, 0, &[(3, bag("damage", 5)), (7, bag("slow", 1))]);
        write_block(&mut w, 1, &[]);
        write_block(&mut w, 2, &[(0, bag("water", 1))]);
        w.write_i32_le(PROPERTY_SENTINEL);
        let data = w.into_vec();

        let mut reader = BinaryReader::new(&data);
        let table = TilePropertyTable::read(&mut reader).unwrap();
        assert!(reader.is_empty());

        assert_eq!(table.tileset_count(), 3);
        assert_eq!(table.get(0, 3).and_then(|b| b.get_int("damage")), Some(5));
        assert_eq!(table.get(2, 0).and_then(|b| b.get_int("water")), Some(1));
        assert!(table.get(1, 3).is_none());
        assert!(table.get(9, 3).is_none());
    }

    #[test]
    fn test_gap_in_tileset_index_is_corrupt() {
        let mut w = BinaryWriter::new();
        write_block(&mut w, 0, &[(1, bag("a", 1))]);
        write_block(&mut w, 2, &[(1, bag("b", 2))]);
        w.write_i32_le(PROPERTY_SENTINEL);
        let data = w.into_vec();

        let err = TilePropertyTable::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
    }

    #[test]
    fn test_first_block_must_be_zero() {
        let mut w = BinaryWriter::new();
        write_block(&mut w, 1, &[]);
        w.write_i32_le(PROPERTY_SENTINEL);
        let data = w.into_vec();

        let err = TilePropertyTable::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
    }

    #[test]
    fn test_unterminated_section_hits_block_cap() {
        let mut w = BinaryWriter::new();
        for i in 0..=MAX_TILESET_BLOCKS as i32 {
            write_block(&mut w, i, &[]);
        }
        let data = w.into_vec();

        let err = TilePropertyTable::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
        assert!(err.to_string().contains("exceeds 256 blocks"));
    }

    #[test]
    fn test_truncated_block_is_corrupt() {
        let mut w = BinaryWriter::new();
        w.write_i32_le(0);
        w.write_i32_le(4);
        let data = w.into_vec();

        let err = TilePropertyTable::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
    }
}
