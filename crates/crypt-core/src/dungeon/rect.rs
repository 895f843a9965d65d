//! Axis-aligned integer rectangles
//!
//! Rectangles are stored as origin plus size. A rectangle covers the cells
//! `x..x + width` by `y..y + height`.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellSet};

/// A rectangle on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Center cell, rounded toward the origin
    pub const fn center(&self) -> Cell {
        Cell::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Check if the rectangle has positive area
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Check if a cell lies inside this rectangle
    pub const fn contains_cell(&self, c: Cell) -> bool {
        c.x >= self.x && c.x < self.right() && c.y >= self.y && c.y < self.bottom()
    }

    /// Check if this rectangle contains another
    pub const fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.right() >= other.right()
            && self.y <= other.y
            && self.bottom() >= other.bottom()
    }

    /// Check if this rectangle intersects another
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Calculate the intersection of two rectangles
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        ))
    }

    /// Shrink by `by` cells on every side (negative grows)
    pub const fn inset(&self, by: i32) -> Rect {
        Rect::new(
            self.x + by,
            self.y + by,
            self.width - 2 * by,
            self.height - 2 * by,
        )
    }

    /// Grow by `by` cells on every side
    pub const fn expand(&self, by: i32) -> Rect {
        self.inset(-by)
    }

    /// Every cell covered by the rectangle
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.x..self.right())
            .flat_map(move |x| (self.y..self.bottom()).map(move |y| Cell::new(x, y)))
    }

    /// Collect the covered cells into a set
    pub fn to_cell_set(&self) -> CellSet {
        self.cells().collect()
    }
}
