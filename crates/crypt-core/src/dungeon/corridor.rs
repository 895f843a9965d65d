//! Corridor graph construction
//!
//! Connects room centers in three steps:
//! 1. Build the complete graph of center pairs weighted by distance
//! 2. Keep a minimum spanning tree (Kruskal over a union-find)
//! 3. Re-add short non-tree edges at random as loops
//!
//! Every accepted edge is carved as an L-shaped corridor: vertical leg
//! first, then horizontal.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::rng::DungeonRng;

use super::cell::{Cell, CellSet};

/// Undirected edge between two room centers
///
/// Endpoints are stored smaller-first, so reversed pairs compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: Cell,
    pub b: Cell,
    pub distance: f64,
}

impl Edge {
    pub fn new(p: Cell, q: Cell) -> Self {
        let (a, b) = if p <= q { (p, q) } else { (q, p) };
        Self {
            a,
            b,
            distance: a.distance(b),
        }
    }

    /// Endpoint pair, used for equality and lookups
    pub fn key(&self) -> (Cell, Cell) {
        (self.a, self.b)
    }
}

/// Tracks which nodes are connected (union-find)
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl ConnectivityTracker {
    /// Create a tracker where every node is its own component
    pub fn new(num_nodes: usize) -> Self {
        Self {
            parent: (0..num_nodes).collect(),
            rank: vec![0; num_nodes],
        }
    }

    /// Representative of a node's component
    pub fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = node;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Check if two nodes are in the same component
    pub fn are_connected(&mut self, a: usize, b: usize) -> bool {
        if a >= self.parent.len() || b >= self.parent.len() {
            return false;
        }
        self.find(a) == self.find(b)
    }

    /// Merge two components; returns false if they were already merged
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        if a >= self.parent.len() || b >= self.parent.len() {
            return false;
        }
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            core::cmp::Ordering::Less => self.parent[ra] = rb,
            core::cmp::Ordering::Greater => self.parent[rb] = ra,
            core::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    /// Check if all nodes are connected
    pub fn all_connected(&mut self) -> bool {
        if self.parent.is_empty() {
            return true;
        }
        let root = self.find(0);
        (1..self.parent.len()).all(|n| self.find(n) == root)
    }
}

/// All edges of the complete graph over `centers`
///
/// Duplicate centers collapse into a single node.
pub fn complete_graph(centers: &[Cell]) -> Vec<Edge> {
    let mut nodes = centers.to_vec();
    nodes.sort_unstable();
    nodes.dedup();

    let mut edges = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
    for (i, &p) in nodes.iter().enumerate() {
        for &q in &nodes[i + 1..] {
            edges.push(Edge::new(p, q));
        }
    }
    edges
}

/// Sort edges by ascending distance, then by endpoints
pub fn sort_edges(edges: &mut [Edge]) {
    edges.sort_by(|e, f| {
        e.distance
            .total_cmp(&f.distance)
            .then_with(|| e.key().cmp(&f.key()))
    });
}

/// Kruskal's minimum spanning tree over `centers`
///
/// Returns the tree edges and the remaining edges, both in ascending
/// distance order.
pub fn kruskal(centers: &[Cell]) -> (Vec<Edge>, Vec<Edge>) {
    let mut nodes = centers.to_vec();
    nodes.sort_unstable();
    nodes.dedup();

    let mut edges = complete_graph(&nodes);
    sort_edges(&mut edges);

    let node_index = |c: Cell| nodes.binary_search(&c).ok();
    let mut tracker = ConnectivityTracker::new(nodes.len());
    let mut tree = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut rest = Vec::new();

    for edge in edges {
        let (Some(ia), Some(ib)) = (node_index(edge.a), node_index(edge.b)) else {
            continue;
        };
        if tracker.merge(ia, ib) {
            tree.push(edge);
        } else {
            rest.push(edge);
        }
    }
    (tree, rest)
}

/// Cells of an L-shaped corridor from `from` to `to`
///
/// Walks vertically to the destination row, then horizontally to the
/// destination column. Both endpoints are included.
pub fn l_corridor(from: Cell, to: Cell) -> Vec<Cell> {
    let mut path = Vec::with_capacity(from.manhattan(to) as usize + 1);
    let mut pos = from;
    path.push(pos);
    while pos.y != to.y {
        pos.y += (to.y - pos.y).signum();
        path.push(pos);
    }
    while pos.x != to.x {
        pos.x += (to.x - pos.x).signum();
        path.push(pos);
    }
    path
}

/// Accepted edges of a corridor graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorPlan {
    /// Spanning tree edges
    pub tree: Vec<Edge>,
    /// Extra edges creating alternate routes
    pub loops: Vec<Edge>,
}

impl CorridorPlan {
    /// Tree edges followed by loop edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.tree.iter().chain(self.loops.iter())
    }

    /// Carve every edge into a corridor set
    pub fn carve(&self) -> CellSet {
        let mut corridors = CellSet::new();
        for edge in self.edges() {
            corridors.extend(l_corridor(edge.a, edge.b));
        }
        corridors
    }
}

/// Builds the corridor graph between room centers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorGraphBuilder {
    /// Probability of keeping a short non-tree edge
    pub loop_chance: f64,
    /// Only edges shorter than this can become loops
    pub loop_max_distance: f64,
}

impl CorridorGraphBuilder {
    pub fn new(loop_chance: f64, loop_max_distance: f64) -> Self {
        Self {
            loop_chance,
            loop_max_distance,
        }
    }

    /// Choose the edges to carve
    pub fn plan(&self, centers: &[Cell], rng: &mut DungeonRng) -> CorridorPlan {
        let (tree, rest) = kruskal(centers);
        let mut loops = Vec::new();
        for edge in rest {
            // Roll first so the random stream does not depend on distances
            let roll = rng.chance(self.loop_chance);
            if roll && edge.distance < self.loop_max_distance {
                loops.push(edge);
            }
        }
        debug!(
            "corridor graph: {} centers, {} tree edges, {} loop edges",
            centers.len(),
            tree.len(),
            loops.len()
        );
        CorridorPlan { tree, loops }
    }

    /// Plan and carve in one step
    pub fn build(&self, centers: &[Cell], rng: &mut DungeonRng) -> (CorridorPlan, CellSet) {
        let plan = self.plan(centers, rng);
        let corridors = plan.carve();
        (plan, corridors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_tracker() {
        let mut tracker = ConnectivityTracker::new(5);

        assert!(!tracker.are_connected(0, 1));
        assert!(tracker.merge(0, 1));
        assert!(tracker.are_connected(0, 1));
        assert!(!tracker.are_connected(0, 2));

        // Connecting 1 and 2 also connects 0 and 2
        tracker.merge(1, 2);
        assert!(tracker.are_connected(0, 2));
        assert!(!tracker.merge(0, 2));
        assert!(!tracker.all_connected());

        tracker.merge(2, 3);
        tracker.merge(3, 4);
        assert!(tracker.all_connected());
        assert!(!tracker.are_connected(0, 9));
    }

    #[test]
    fn test_edge_canonical() {
        let p = Cell::new(5, 1);
        let q = Cell::new(2, 8);
        assert_eq!(Edge::new(p, q), Edge::new(q, p));
        assert_eq!(Edge::new(p, q).a, q);
    }

    #[test]
    fn test_complete_graph_size() {
        let centers: Vec<_> = (0..6).map(|i| Cell::new(i * 3, i % 2)).collect();
        assert_eq!(complete_graph(&centers).len(), 15);
    }

    #[test]
    fn test_mst_edge_count_and_connectivity() {
        let centers = vec![
            Cell::new(0, 0),
            Cell::new(10, 0),
            Cell::new(0, 10),
            Cell::new(10, 10),
            Cell::new(30, 5),
        ];
        let (tree, rest) = kruskal(&centers);
        assert_eq!(tree.len(), centers.len() - 1);
        assert_eq!(tree.len() + rest.len(), 10);

        let mut tracker = ConnectivityTracker::new(centers.len());
        let idx = |c: Cell| centers.iter().position(|&x| x == c).unwrap();
        for e in &tree {
            tracker.merge(idx(e.a), idx(e.b));
        }
        assert!(tracker.all_connected());
    }

    #[test]
    fn test_mst_is_minimal_on_line() {
        let centers = vec![Cell::new(0, 0), Cell::new(20, 0), Cell::new(10, 0)];
        let (tree, _) = kruskal(&centers);
        let total: f64 = tree.iter().map(|e| e.distance).sum();
        assert_eq!(total, 20.0);
    }

    #[test]
    fn test_l_corridor_shape() {
        let path = l_corridor(Cell::new(0, 0), Cell::new(5, 5));
        assert_eq!(path.len(), 11);
        assert_eq!(path[0], Cell::new(0, 0));
        assert_eq!(path[5], Cell::new(0, 5));
        assert_eq!(path[10], Cell::new(5, 5));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
    }

    #[test]
    fn test_l_corridor_bends_once() {
        let path = l_corridor(Cell::new(4, 9), Cell::new(-2, 1));
        let dirs: Vec<_> = path
            .windows(2)
            .map(|w| (w[1].x - w[0].x, w[1].y - w[0].y))
            .collect();
        let bends = dirs.windows(2).filter(|d| d[0] != d[1]).count();
        assert_eq!(bends, 1);
        // Vertical leg comes first
        assert_eq!(dirs[0], (0, -1));
    }

    #[test]
    fn test_loops_respect_distance_cutoff() {
        let centers: Vec<_> = (0..8)
            .flat_map(|i| (0..2).map(move |j| Cell::new(i * 12, j * 40)))
            .collect();
        let builder = CorridorGraphBuilder::new(1.0, 25.0);
        let plan = builder.plan(&centers, &mut DungeonRng::new(42));
        assert_eq!(plan.tree.len(), centers.len() - 1);
        assert!(!plan.loops.is_empty());
        assert!(plan.loops.iter().all(|e| e.distance < 25.0));
        for l in &plan.loops {
            assert!(!plan.tree.contains(l));
        }
    }

    #[test]
    fn test_no_loops_when_chance_zero() {
        let centers: Vec<_> = (0..5).map(|i| Cell::new(i * 5, i * 3)).collect();
        let builder = CorridorGraphBuilder::new(0.0, 25.0);
        let plan = builder.plan(&centers, &mut DungeonRng::new(1));
        assert!(plan.loops.is_empty());
    }

    #[test]
    fn test_carve_connects_centers() {
        let centers: Vec<_> = vec![Cell::new(0, 0), Cell::new(8, 3), Cell::new(-4, 12)];
        let builder = CorridorGraphBuilder::new(0.5, 25.0);
        let (_, corridors) = builder.build(&centers, &mut DungeonRng::new(3));
        assert!(centers.iter().all(|c| corridors.contains(c)));

        let components = crate::dungeon::connected_components(&corridors);
        assert_eq!(components.len(), 1);
    }
}
