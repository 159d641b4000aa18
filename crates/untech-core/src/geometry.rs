use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned grid position (0-indexed)
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct UPoint {
    pub x: u32,
    pub y: u32,
}

impl UPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        UPoint { x, y }
    }

    pub const fn origin() -> Self {
        UPoint { x: 0, y: 0 }
    }
}

impl fmt::Display for UPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl TryFrom<Point> for UPoint {
    type Error = Point;

    /// Fails (returning the input) if either component is negative
    fn try_from(p: Point) -> Result<Self, Self::Error> {
        match (u32::try_from(p.x), u32::try_from(p.y)) {
            (Ok(x), Ok(y)) => Ok(UPoint { x, y }),
            _ => Err(p),
        }
    }
}

/// Unsigned grid size
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct USize {
    pub width: u32,
    pub height: u32,
}

impl USize {
    pub const fn new(width: u32, height: u32) -> Self {
        USize { width, height }
    }

    /// Number of cells covered by this size
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a position lies inside a rectangle of this size anchored at the origin
    pub fn contains(&self, p: UPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Component-wise minimum
    pub fn min(self, other: USize) -> USize {
        USize::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// True if both dimensions are no larger than `limit`'s
    pub fn fits_within(&self, limit: USize) -> bool {
        self.width <= limit.width && self.height <= limit.height
    }
}

impl fmt::Display for USize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Signed position, used when a cursor may hang off the top or left of a grid
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl From<UPoint> for Point {
    fn from(p: UPoint) -> Self {
        Point {
            x: p.x as i32,
            y: p.y as i32,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle in grid coordinates
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct URect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl URect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        URect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(origin: UPoint, size: USize) -> Self {
        URect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> UPoint {
        UPoint::new(self.x, self.y)
    }

    pub fn size(&self) -> USize {
        USize::new(self.width, self.height)
    }

    /// One past the rightmost column
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom row
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, p: UPoint) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Check if this rectangle lies entirely inside a grid of `size`
    pub fn fits_within(&self, size: USize) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|r| r <= size.width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|b| b <= size.height)
    }
}

impl fmt::Display for URect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.origin(), self.size())
    }
}
