use bitflags::bitflags;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Integer 2D point (tile or pixel units depending on context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Tile rectangle: `x`/`y` inclusive, extending `width`x`height` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && (x as i64) < self.right() && y >= self.y && (y as i64) < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Packed chunk grid coordinate: x in the high 32 bits, y in the low 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ChunkKey(pub u64);

impl ChunkKey {
    pub fn pack(x: i32, y: i32) -> Self {
        Self(((x as u32 as u64) << 32) | (y as u32 as u64))
    }

    pub fn x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    pub fn y(self) -> i32 {
        self.0 as u32 as i32
    }

    pub fn unpack(self) -> (i32, i32) {
        (self.x(), self.y())
    }

    /// Chunk containing the given tile, for a chunk extent of `size`
    pub fn from_tile(x: i32, y: i32, size: Size) -> Self {
        let w = size.width.max(1) as i64;
        let h = size.height.max(1) as i64;
        Self::pack((x as i64).div_euclid(w) as i32, (y as i64).div_euclid(h) as i32)
    }
}

impl From<(i32, i32)> for ChunkKey {
    fn from((x, y): (i32, i32)) -> Self {
        Self::pack(x, y)
    }
}

bitflags! {
    /// Per-tile flag byte carried in every tile record.
    ///
    /// Unknown bits authored by the producer are retained as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u8 {
        const FLIP_X = 0x01;
        const FLIP_Y = 0x02;
        const FLIP_DIAGONAL = 0x04;
        /// Tile id was translated through a sprite remap table
        const FROM_REMAP = 0x80;
    }
}
