use indexmap::IndexMap;

use crate::codec::{Color, Point, PropertyBag, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub name: String,
    pub size: Size,
    pub offset: Point,
    pub visible: bool,
    pub alpha: u8,
    pub properties: PropertyBag,
    /// Declared chunk count; informational, only set for infinite maps
    pub chunk_count: u32,
    /// Hash of `name`, used to derive this layer's resource names
    pub hash: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectShape {
    Rect = 0,
    Ellipse = 1,
    Polygon = 2,
    Polyline = 3,
    Point = 4,
}

impl ObjectShape {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Rect),
            1 => Some(Self::Ellipse),
            2 => Some(Self::Polygon),
            3 => Some(Self::Polyline),
            4 => Some(Self::Point),
            _ => None,
        }
    }

    pub fn has_points(self) -> bool {
        matches!(self, Self::Polygon | Self::Polyline)
    }
}

/// Object bounds in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub name: String,
    pub kind: String,
    pub shape: ObjectShape,
    pub rect: ObjectRect,
    /// Degrees clockwise
    pub rotation: f32,
    pub visible: bool,
    /// Outline for polygons and polylines; empty for every other shape
    pub points: Vec<Point>,
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroupDescriptor {
    pub name: String,
    pub tint: Color,
    pub alpha: u8,
    pub visible: bool,
    pub offset: Point,
    pub properties: PropertyBag,
    pub objects: Vec<ObjectDescriptor>,
}

impl ObjectGroupDescriptor {
    pub fn object(&self, name: &str) -> Option<&ObjectDescriptor> {
        self.objects.iter().find(|o| o.name == name)
    }
}

pub type LayerMap = IndexMap<String, LayerDescriptor, ahash::RandomState>;
pub type ObjectGroupMap = IndexMap<String, ObjectGroupDescriptor, ahash::RandomState>;
