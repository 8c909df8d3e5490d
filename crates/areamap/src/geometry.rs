//! Integer geometry shared by records, providers and the builder.
//!
//! Fine coordinates are collision cells; one room-grid unit spans
//! [`CELLS_PER_UNIT`] fine cells on each axis.

use serde::{Deserialize, Serialize};

/// Fine cells per room-grid unit (and per coarse path cell)
pub const CELLS_PER_UNIT: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Scale a room-grid position to fine cells
    pub const fn to_cells(self) -> Self {
        Self::new(self.x * CELLS_PER_UNIT, self.y * CELLS_PER_UNIT)
    }

    pub const fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn to_cells(self) -> Self {
        Self::new(self.width * CELLS_PER_UNIT, self.height * CELLS_PER_UNIT)
    }

    pub const fn area(self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

/// Inclusive-exclusive rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Default for Rect {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Rect {
    /// Sentinel for "nothing merged yet"
    pub const INVALID: Rect = Rect::new(-1, -1, -1, -1);

    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// True once at least one rectangle has been merged in
    pub const fn is_valid(&self) -> bool {
        self.x0 >= 0 && self.y0 >= 0 && self.x0 <= self.x1 && self.y0 <= self.y1
    }

    pub const fn is_ordered(&self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }

    /// Grow to cover `other`; an invalid `self` is replaced outright
    pub fn include(&mut self, other: &Rect) {
        if !self.is_valid() {
            *self = *other;
            return;
        }
        self.x0 = self.x0.min(other.x0);
        self.y0 = self.y0.min(other.y0);
        self.x1 = self.x1.max(other.x1);
        self.y1 = self.y1.max(other.y1);
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }
}
