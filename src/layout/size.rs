/// A position in window pixels. Coordinates may be negative (a scrolled
/// content grid sits above and left of its viewport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0,
            height: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn is_negative(&self) -> bool {
        self.width < 0 || self.height < 0
    }

    /// True when `other` fits inside this size on both axes.
    pub fn contains(&self, other: Size) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::zero()
    }
}
