//! Typed key/value property bags.
//!
//! On the wire a bag is five back-to-back runs, one per value type, in the
//! fixed order string, bool, int, float, color. Each run is a u16 count
//! followed by that many `(key, value)` pairs. Every run is always present,
//! even when its count is zero.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use super::reader::BinaryReader;
use super::types::Color;
use super::writer::BinaryWriter;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Int(i32),
    Float(f32),
    Color(Color),
}

/// Insertion-ordered property map.
///
/// Equality compares contents only, not insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    values: IndexMap<String, PropertyValue, ahash::RandomState>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert or overwrite; an overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn get_color(&self, key: &str) -> Option<Color> {
        match self.get(key)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mut bag = Self::new();

        for _ in 0..reader.read_u16_le()? {
            let key = reader.read_string()?;
            bag.insert(key, PropertyValue::String(reader.read_string()?));
        }
        for _ in 0..reader.read_u16_le()? {
            let key = reader.read_string()?;
            bag.insert(key, PropertyValue::Bool(reader.read_bool()?));
        }
        for _ in 0..reader.read_u16_le()? {
            let key = reader.read_string()?;
            bag.insert(key, PropertyValue::Int(reader.read_i32_le()?));
        }
        for _ in 0..reader.read_u16_le()? {
            let key = reader.read_string()?;
            bag.insert(key, PropertyValue::Float(reader.read_f32_le()?));
        }
        for _ in 0..reader.read_u16_le()? {
            let key = reader.read_string()?;
            bag.insert(key, PropertyValue::Color(reader.read_color()?));
        }

        Ok(bag)
    }

    /// Read a bag guarded by a leading presence flag
    pub fn read_optional(reader: &mut BinaryReader) -> Result<Self> {
        if reader.read_bool()? {
            Self::read(reader)
        } else {
            Ok(Self::new())
        }
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.write_run(writer, |v| matches!(v, PropertyValue::String(_)))?;
        self.write_run(writer, |v| matches!(v, PropertyValue::Bool(_)))?;
        self.write_run(writer, |v| matches!(v, PropertyValue::Int(_)))?;
        self.write_run(writer, |v| matches!(v, PropertyValue::Float(_)))?;
        self.write_run(writer, |v| matches!(v, PropertyValue::Color(_)))
    }

    fn write_run(&self, writer: &mut BinaryWriter, select: fn(&PropertyValue) -> bool) -> Result<()> {
        let count = self.values.values().filter(|v| select(v)).count();
        let count = u16::try_from(count).map_err(|_| {
            Error::InvalidUsage(format!("property run of {count} entries exceeds u16 count"))
        })?;
        writer.write_u16_le(count);

        for (key, value) in self.values.iter().filter(|(_, v)| select(v)) {
            writer.write_string(key);
            match value {
                PropertyValue::String(s) => writer.write_string(s),
                PropertyValue::Bool(b) => writer.write_bool(*b),
                PropertyValue::Int(i) => writer.write_i32_le(*i),
                PropertyValue::Float(f) => writer.write_f32_le(*f),
                PropertyValue::Color(c) => writer.write_color(*c),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn encode(bag: &PropertyBag) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        bag.write(&mut writer).unwrap();
        writer.into_vec()
    }

    #[test]
    fn test_interleaved_insertion_roundtrip() {
        let mut bag = PropertyBag::new();
        bag.insert("tint", PropertyValue::Color(Color::rgba(10, 20, 30, 40)));
        bag.insert("name", PropertyValue::String("spawn".into()));
        bag.insert("speed", PropertyValue::Float(1.5));
        bag.insert("solid", PropertyValue::Bool(true));
        bag.insert("hp", PropertyValue::Int(-12));
        bag.insert("label", PropertyValue::String(String::new()));

        let data = encode(&bag);
        let mut reader = BinaryReader::new(&data);
        let decoded = PropertyBag::read(&mut reader).unwrap();

        assert!(reader.is_empty());
        assert_eq!(decoded, bag);
        // Decode order follows the wire's type runs
        let keys: Vec<&str> = decoded.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["name", "label", "solid", "hp", "speed", "tint"]);
    }

    #[test]
    fn test_empty_bag_is_five_zero_counts() {
        let data = encode(&PropertyBag::new());
        assert_eq!(data, [0u8; 10]);

        let mut reader = BinaryReader::new(&data);
        assert!(PropertyBag::read(&mut reader).unwrap().is_empty());
    }

    #[test]
    fn test_later_duplicate_key_overwrites() {
        let mut writer = BinaryWriter::new();
        writer.write_u16_le(1);
        writer.write_string("v");
        writer.write_string("text");
        writer.write_u16_le(0);
        writer.write_u16_le(1);
        writer.write_string("v");
        writer.write_i32_le(9);
        writer.write_u16_le(0);
        writer.write_u16_le(0);

        let data = writer.into_vec();
        let bag = PropertyBag::read(&mut BinaryReader::new(&data)).unwrap();
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get_int("v"), Some(9));
        assert_eq!(bag.get_str("v"), None);
    }

    #[test]
    fn test_missing_run_is_corrupt() {
        // Only four runs present
        let data = [0u8; 8];
        let err = PropertyBag::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
    }

    #[test]
    fn test_typed_getters() {
        let mut bag = PropertyBag::new();
        bag.insert("n", PropertyValue::Int(3));
        bag.insert("c", PropertyValue::Color(Color::WHITE));

        assert_eq!(bag.get_float("n"), Some(3.0));
        assert_eq!(bag.get_bool("n"), None);
        assert_eq!(bag.get_color("c"), Some(Color::WHITE));
        assert_eq!(bag.get_str("missing"), None);
    }

    #[test]
    fn test_optional_flag() {
        let data = [0u8];
        let bag = PropertyBag::read_optional(&mut BinaryReader::new(&data)).unwrap();
        assert!(bag.is_empty());
    }
}
