use crate::error::{Error, Result};
use super::types::{Color, Point};

/// Longest string the format allows (length prefix is a u16)
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Bounds-checked little-endian reader over an in-memory resource
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn eof(&self, need: usize) -> Error {
        Error::corrupt(
            self.pos,
            format!("unexpected end of data: need {need} bytes, have {}", self.remaining()),
        )
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.eof(n));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a string prefixed with its u16 byte length
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u16_le()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corrupt(start, "invalid UTF-8 string"))
    }

    /// Read a color (RGBA)
    pub fn read_color(&mut self) -> Result<Color> {
        let [r, g, b, a] = self.read_array()?;
        Ok(Color { r, g, b, a })
    }

    /// Read a point (two i32 values)
    pub fn read_point(&mut self) -> Result<Point> {
        Ok(Point {
            x: self.read_i32_le()?,
            y: self.read_i32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0302);
        assert_eq!(reader.read_u32_le().unwrap(), 0x07060504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_string() {
        let data = [0x05, 0x00, b'h', b'e', b'l', b'l', b'o'];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_string().unwrap(), "hello");
    }

    #[test]
    fn test_truncated_read_is_corrupt_section() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);
        reader.read_u8().unwrap();

        let err = reader.read_u32_le().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSection);
        // Position does not advance on failure
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_string_length_past_end() {
        let data = [0x10, 0x00, b'a'];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_string().unwrap_err().kind(), ErrorKind::CorruptSection);
    }

    #[test]
    fn test_invalid_utf8() {
        let data = [0x02, 0x00, 0xC3, 0x28];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_string().unwrap_err().kind(), ErrorKind::CorruptSection);
    }
}
