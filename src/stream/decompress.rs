use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Expands a compressed byte range into a fresh buffer.
///
/// Returns `None` when the range is out of bounds or the bytes do not decode.
pub trait Decompressor {
    fn decompress(&self, buffer: &[u8], offset: usize, length: usize) -> Option<Vec<u8>>;
}

/// Compression applied to chunk bytes inside segment resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkCompression {
    /// Raw deflate stream, no header
    #[default]
    Deflate,
    /// Deflate wrapped in a zlib header and checksum
    Zlib,
}

impl Decompressor for ChunkCompression {
    fn decompress(&self, buffer: &[u8], offset: usize, length: usize) -> Option<Vec<u8>> {
        let end = offset.checked_add(length)?;
        let input = buffer.get(offset..end)?;

        let mut out = Vec::new();
        let result = match self {
            Self::Deflate => DeflateDecoder::new(input).read_to_end(&mut out),
            Self::Zlib => ZlibDecoder::new(input).read_to_end(&mut out),
        };
        match result {
            Ok(_) => Some(out),
            Err(e) => {
                debug!(compression = ?self, offset, length, error = %e, "decompression failed");
                None
            }
        }
    }
}
