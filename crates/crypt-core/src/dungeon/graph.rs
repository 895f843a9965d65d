//! Floor adjacency graph and breadth-first search
//!
//! The graph is rebuilt from the floor set whenever a search is needed.
//! Neighbors are listed in `DIRS_4` order, so visitation order (and with it
//! the farthest-point tie break) only depends on the floor set.

use std::collections::VecDeque;

use hashbrown::HashMap;

use super::cell::{Cell, CellSet, DIRS_4};

/// Floor cell to its 4-adjacent floor cells
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    edges: HashMap<Cell, Vec<Cell>>,
}

impl AdjacencyGraph {
    pub fn from_floor(floor: &CellSet) -> Self {
        let edges = floor
            .iter()
            .map(|&c| {
                let neighbors = DIRS_4
                    .iter()
                    .map(|&(dx, dy)| c.offset(dx, dy))
                    .filter(|n| floor.contains(n))
                    .collect();
                (c, neighbors)
            })
            .collect();
        Self { edges }
    }

    pub fn contains(&self, c: Cell) -> bool {
        self.edges.contains_key(&c)
    }

    pub fn neighbors(&self, c: Cell) -> &[Cell] {
        self.edges.get(&c).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Unweighted breadth-first search from `start`
    pub fn bfs(&self, start: Cell) -> BfsResult {
        let mut distances = HashMap::new();
        let mut parents = HashMap::new();
        let mut order = Vec::new();
        let mut farthest = start;
        let mut max_distance = 0;

        if !self.contains(start) {
            return BfsResult {
                start,
                distances,
                parents,
                order,
                farthest,
                max_distance,
            };
        }

        let mut queue = VecDeque::new();
        distances.insert(start, 0u32);
        queue.push_back(start);

        while let Some(c) = queue.pop_front() {
            let d = distances[&c];
            order.push(c);
            // Strictly greater keeps the first cell to reach a hop count
            if d > max_distance {
                max_distance = d;
                farthest = c;
            }
            for &n in self.neighbors(c) {
                if !distances.contains_key(&n) {
                    distances.insert(n, d + 1);
                    parents.insert(n, c);
                    queue.push_back(n);
                }
            }
        }

        BfsResult {
            start,
            distances,
            parents,
            order,
            farthest,
            max_distance,
        }
    }

    /// Cells of `targets` that cannot be reached from `start`
    pub fn unreachable_from(&self, start: Cell, targets: &[Cell]) -> Vec<Cell> {
        let result = self.bfs(start);
        targets
            .iter()
            .copied()
            .filter(|t| result.distance(*t).is_none())
            .collect()
    }
}

/// Outcome of a breadth-first search
#[derive(Debug, Clone)]
pub struct BfsResult {
    pub start: Cell,
    distances: HashMap<Cell, u32>,
    parents: HashMap<Cell, Cell>,
    /// Cells in visitation order
    pub order: Vec<Cell>,
    /// First visited cell at the maximum hop count
    pub farthest: Cell,
    pub max_distance: u32,
}

impl BfsResult {
    /// Hop count to a cell, None if unreached
    pub fn distance(&self, c: Cell) -> Option<u32> {
        self.distances.get(&c).copied()
    }

    pub fn reached(&self) -> usize {
        self.order.len()
    }

    /// Start-to-target path by following parent pointers
    pub fn path_to(&self, target: Cell) -> Option<Vec<Cell>> {
        self.distance(target)?;
        let mut path = vec![target];
        let mut cur = target;
        while cur != self.start {
            cur = *self.parents.get(&cur)?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Rect;

    fn line(len: i32) -> CellSet {
        (0..len).map(|x| Cell::new(x, 0)).collect()
    }

    #[test]
    fn test_adjacency_is_four_directional() {
        let floor: CellSet = [Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1), Cell::new(2, 2)]
            .into_iter()
            .collect();
        let graph = AdjacencyGraph::from_floor(&floor);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.neighbors(Cell::new(1, 0)).len(), 2);
        assert!(graph.neighbors(Cell::new(2, 2)).is_empty());
        assert!(graph.neighbors(Cell::new(9, 9)).is_empty());
    }

    #[test]
    fn test_farthest_on_straight_corridor() {
        let graph = AdjacencyGraph::from_floor(&line(10));
        let result = graph.bfs(Cell::new(0, 0));
        assert_eq!(result.farthest, Cell::new(9, 0));
        assert_eq!(result.max_distance, 9);
        assert_eq!(result.reached(), 10);
    }

    #[test]
    fn test_path_reconstruction() {
        let graph = AdjacencyGraph::from_floor(&line(6));
        let result = graph.bfs(Cell::new(0, 0));
        let path = result.path_to(result.farthest).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.first(), Some(&Cell::new(0, 0)));
        assert_eq!(path.last(), Some(&Cell::new(5, 0)));
    }

    #[test]
    fn test_farthest_tie_uses_visit_order() {
        // Plus shape: four arm tips are all two hops away
        let floor: CellSet = [
            Cell::new(0, 0),
            Cell::new(0, -1),
            Cell::new(0, -2),
            Cell::new(1, 0),
            Cell::new(2, 0),
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(-1, 0),
            Cell::new(-2, 0),
        ]
        .into_iter()
        .collect();
        let graph = AdjacencyGraph::from_floor(&floor);
        let result = graph.bfs(Cell::new(0, 0));
        assert_eq!(result.max_distance, 2);
        // North is visited first
        assert_eq!(result.farthest, Cell::new(0, -2));
    }

    #[test]
    fn test_hop_count_not_euclidean() {
        let floor = Rect::new(0, 0, 5, 5).to_cell_set();
        let graph = AdjacencyGraph::from_floor(&floor);
        let result = graph.bfs(Cell::new(0, 0));
        assert_eq!(result.max_distance, 8);
        assert_eq!(result.farthest, Cell::new(4, 4));
    }

    #[test]
    fn test_unreachable() {
        let mut floor = line(3);
        floor.insert(Cell::new(10, 10));
        let graph = AdjacencyGraph::from_floor(&floor);
        let targets = [Cell::new(2, 0), Cell::new(10, 10)];
        let missing = graph.unreachable_from(Cell::new(0, 0), &targets);
        assert_eq!(missing, vec![Cell::new(10, 10)]);
        assert_eq!(graph.bfs(Cell::new(50, 50)).reached(), 0);
        assert!(graph.bfs(Cell::new(0, 0)).path_to(Cell::new(10, 10)).is_none());
    }
}
