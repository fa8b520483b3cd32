use std::collections::HashMap;

use crate::codec::{Color, Point, PropertyBag, Size, TileFlags};

/// Tile id written to cells with no authored content
pub const EMPTY_TILE: i32 = -1;

/// Destination for decoded tiles
pub trait TileSink {
    fn set_tile(&mut self, layer: &str, x: i32, y: i32, tile_id: i32, color: Color, flags: TileFlags);

    /// Attach auxiliary data to a cell; `None` clears it.
    fn set_tile_data(&mut self, layer: &str, x: i32, y: i32, data: Option<&PropertyBag>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub tile_id: i32,
    pub color: Color,
    pub flags: TileFlags,
}

impl Cell {
    pub const EMPTY: Self = Self {
        tile_id: EMPTY_TILE,
        color: Color::WHITE,
        flags: TileFlags::empty(),
    };

    pub fn is_empty(&self) -> bool {
        self.tile_id == EMPTY_TILE
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounded in-memory tile grid.
///
/// Covers `size` cells starting at `origin`; writes outside are ignored. The
/// layer name passed to the sink methods is not used.
#[derive(Debug, Clone)]
pub struct TileGrid {
    origin: Point,
    size: Size,
    cells: Vec<Cell>,
    data: HashMap<(i32, i32), PropertyBag, ahash::RandomState>,
}

impl TileGrid {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            cells: vec![Cell::EMPTY; size.area()],
            data: HashMap::default(),
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x as i64 - self.origin.x as i64;
        let ly = y as i64 - self.origin.y as i64;
        if lx < 0 || ly < 0 || lx >= self.size.width as i64 || ly >= self.size.height as i64 {
            return None;
        }
        Some(ly as usize * self.size.width as usize + lx as usize)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn data(&self, x: i32, y: i32) -> Option<&PropertyBag> {
        self.data.get(&(x, y))
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl TileSink for TileGrid {
    fn set_tile(&mut self, _layer: &str, x: i32, y: i32, tile_id: i32, color: Color, flags: TileFlags) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { tile_id, color, flags };
        }
    }

    fn set_tile_data(&mut self, _layer: &str, x: i32, y: i32, data: Option<&PropertyBag>) {
        if self.index(x, y).is_none() {
            return;
        }
        match data {
            Some(bag) => {
                self.data.insert((x, y), bag.clone());
            }
            None => {
                self.data.remove(&(x, y));
            }
        }
    }
}
