pub mod reader;
pub mod writer;
pub mod types;
pub mod property;
pub mod format;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
pub use types::*;
pub use property::{PropertyBag, PropertyValue};
pub use format::{layer_hash, DocumentType, SectionTag, FORMAT_VERSION, MAGIC, TILE_RECORD_SIZE};
