//! Grid cells and cell sets
//!
//! A `Cell` is an integer coordinate. Floor, wall and corridor sets are
//! ordered sets so that anything iterating them is reproducible.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ordered set of cells
pub type CellSet = BTreeSet<Cell>;

/// Cardinal directions (N, E, S, W)
pub const DIRS_4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// All eight neighbor offsets, clockwise from north
pub const DIRS_8: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Integer grid coordinate
///
/// Ordered by `x` then `y`, which is the "smaller coordinate first" rule
/// used to canonicalize edges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell shifted by an offset
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The 4 cardinal neighbors
    pub fn neighbors4(self) -> impl Iterator<Item = Cell> {
        DIRS_4.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// The 8 surrounding neighbors
    pub fn neighbors8(self) -> impl Iterator<Item = Cell> {
        DIRS_8.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Euclidean distance to another cell
    pub fn distance(self, other: Cell) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan distance to another cell
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Walls are the 8-neighbors of floor that are not floor themselves
pub fn derive_walls(floor: &CellSet) -> CellSet {
    floor
        .iter()
        .flat_map(|c| c.neighbors8())
        .filter(|n| !floor.contains(n))
        .collect()
}

/// Check if any of the 8 neighbors of `cell` is in `set`
pub fn touches(cell: Cell, set: &CellSet) -> bool {
    cell.neighbors8().any(|n| set.contains(&n))
}

/// Count how many of the 8 neighbors of `cell` are in `set`
pub fn count_neighbors8(cell: Cell, set: &CellSet) -> usize {
    cell.neighbors8().filter(|n| set.contains(n)).count()
}

/// Inclusive bounding box `(min, max)` of a set, None when empty
pub fn bounds(cells: &CellSet) -> Option<(Cell, Cell)> {
    let first = cells.first()?;
    let mut min = *first;
    let mut max = *first;
    for c in cells {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ordering() {
        assert!(Cell::new(0, 5) < Cell::new(1, 0));
        assert!(Cell::new(2, 1) < Cell::new(2, 3));
    }

    #[test]
    fn test_neighbors() {
        let c = Cell::new(3, 3);
        assert_eq!(c.neighbors4().count(), 4);
        assert_eq!(c.neighbors8().count(), 8);
        assert!(c.neighbors4().all(|n| n.manhattan(c) == 1));
        assert!(!c.neighbors8().any(|n| n == c));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Cell::new(0, 0).distance(Cell::new(3, 4)), 5.0);
        assert_eq!(Cell::new(0, 0).manhattan(Cell::new(-3, 4)), 7);
    }

    #[test]
    fn test_derive_walls_single_cell() {
        let floor: CellSet = [Cell::new(0, 0)].into_iter().collect();
        let walls = derive_walls(&floor);
        assert_eq!(walls.len(), 8);
        assert!(walls.is_disjoint(&floor));
    }

    #[test]
    fn test_derive_walls_block() {
        let floor: CellSet = (0..3)
            .flat_map(|x| (0..3).map(move |y| Cell::new(x, y)))
            .collect();
        let walls = derive_walls(&floor);
        // 5x5 ring around a 3x3 block
        assert_eq!(walls.len(), 16);
        assert!(walls.is_disjoint(&floor));
    }

    #[test]
    fn test_bounds() {
        let cells: CellSet = [Cell::new(2, 7), Cell::new(-1, 3), Cell::new(4, 0)]
            .into_iter()
            .collect();
        assert_eq!(bounds(&cells), Some((Cell::new(-1, 0), Cell::new(4, 7))));
        assert_eq!(bounds(&CellSet::new()), None);
    }
}
