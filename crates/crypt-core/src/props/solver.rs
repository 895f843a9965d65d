//! Greedy constraint solver for prop placement
//!
//! Works like a wave-function-collapse pass without backtracking: the
//! uncollapsed cell with the fewest candidates is collapsed by a weighted
//! draw, then its eight neighbors are narrowed by local rules. A cell whose
//! candidates run out collapses to `Empty`.
//!
//! Neighbor rules:
//! - Pillar: uncollapsed neighbors can only be empty
//! - Fire: neighbors lose crate, barrel and rug
//! - Crate or barrel: neighbors lose fire and pillar
//! - Any other non-empty, non-rug prop: neighbors lose pillar
//! - Rug below the max radius: neighbors favor rug
//! - Rug at the max radius: neighbors lose rug
//!
//! Rugs do not strike pillar, so a pillar may land beside an earlier rug.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use log::trace;

use crate::consts::{RUG_GROWTH_BOOST, RUG_SEED_BOOST};
use crate::dungeon::{Cell, CellSet, touches};
use crate::rng::DungeonRng;

use super::types::{PropMask, PropType, PropWeights};

/// Solver state of one floor cell
#[derive(Debug, Clone, PartialEq)]
pub struct PropCell {
    pub position: Cell,
    /// Remaining candidate types
    pub domain: PropMask,
    pub collapsed: bool,
    /// Final type, meaningful once collapsed
    pub prop: PropType,
    /// Local weight table, starts from the room's table
    pub weights: [f32; PropType::COUNT],
    /// Rug hops from the cluster seed, set when collapsed to rug
    pub cluster_distance: Option<u32>,
    pub wall_adjacent: bool,
}

impl PropCell {
    fn new(position: Cell, walls: &CellSet, weights: &PropWeights) -> Self {
        let wall_adjacent = touches(position, walls);
        Self {
            position,
            domain: PropMask::for_cell(wall_adjacent),
            collapsed: false,
            prop: PropType::Empty,
            weights: weights.to_array(),
            cluster_distance: None,
            wall_adjacent,
        }
    }

    fn force(&mut self, prop: PropType) {
        self.domain = prop.mask();
        self.collapsed = true;
        self.prop = prop;
    }
}

/// Result of solving one room
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropSolution {
    /// Every input cell with its final type
    pub placements: BTreeMap<Cell, PropType>,
    /// Cluster distance of every rug cell
    pub cluster_distance: BTreeMap<Cell, u32>,
    /// Cells whose domain ran out
    pub exhausted: usize,
    /// Cell that received the rug seed boost
    pub rug_seed: Option<Cell>,
}

impl PropSolution {
    /// Number of cells holding `prop`
    pub fn count(&self, prop: PropType) -> usize {
        self.placements.values().filter(|p| **p == prop).count()
    }
}

/// Places props over a room's floor
#[derive(Debug, Clone)]
pub struct PropPlacementSolver<'a> {
    weights: &'a PropWeights,
    walls: &'a CellSet,
    max_radius: u32,
    seed_chance: f64,
}

impl<'a> PropPlacementSolver<'a> {
    pub fn new(
        weights: &'a PropWeights,
        walls: &'a CellSet,
        max_radius: u32,
        seed_chance: f64,
    ) -> Self {
        Self {
            weights,
            walls,
            max_radius,
            seed_chance,
        }
    }

    /// Solve `cells`; cells also in `reserved` are fixed to `Empty`
    pub fn solve(&self, cells: &CellSet, reserved: &CellSet, rng: &mut DungeonRng) -> PropSolution {
        let mut grid = Grid::new(cells, self.walls, self.weights);
        for &c in reserved {
            if let Some(i) = grid.index_of(c) {
                grid.cells[i].force(PropType::Empty);
            }
        }

        let rug_seed = if rng.chance(self.seed_chance) {
            self.seed_rug(&mut grid, rng)
        } else {
            None
        };

        let mut exhausted = 0;
        while let Some(i) = grid.lowest_entropy(rng) {
            let prop = match self.choose(&grid.cells[i], rng) {
                Some(p) => p,
                None => {
                    trace!("domain exhausted at {:?}, leaving it empty", grid.cells[i].position);
                    exhausted += 1;
                    PropType::Empty
                }
            };
            grid.cells[i].force(prop);

            if prop == PropType::Rug {
                let distance = grid.rug_distance(i);
                grid.cells[i].cluster_distance = Some(distance);
            }
            self.propagate(&mut grid, i);
        }

        let mut solution = PropSolution {
            exhausted,
            rug_seed,
            ..Default::default()
        };
        for cell in &grid.cells {
            solution.placements.insert(cell.position, cell.prop);
            if let Some(d) = cell.cluster_distance {
                solution.cluster_distance.insert(cell.position, d);
            }
        }
        solution
    }

    /// Boost rug likelihood on one open-floor cell
    fn seed_rug(&self, grid: &mut Grid, rng: &mut DungeonRng) -> Option<Cell> {
        let candidates: Vec<usize> = grid
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.collapsed && !c.wall_adjacent && c.domain.has(PropType::Rug))
            .map(|(i, _)| i)
            .collect();
        let &i = rng.choose(&candidates)?;
        let cell = &mut grid.cells[i];
        cell.weights[PropType::Rug.index()] *= RUG_SEED_BOOST;
        trace!("rug seed at {:?}", cell.position);
        Some(cell.position)
    }

    /// Weighted draw over a cell's domain
    ///
    /// Falls back to a uniform draw when every candidate weighs zero, and
    /// to None when the domain is empty.
    fn choose(&self, cell: &PropCell, rng: &mut DungeonRng) -> Option<PropType> {
        let types: Vec<PropType> = cell.domain.types().collect();
        if types.is_empty() {
            return None;
        }
        let weights: Vec<f32> = types.iter().map(|t| cell.weights[t.index()]).collect();
        match rng.weighted_index(&weights) {
            Some(i) => Some(types[i]),
            None => rng.choose(&types).copied(),
        }
    }

    /// Narrow the uncollapsed neighbors of a freshly collapsed cell
    fn propagate(&self, grid: &mut Grid, i: usize) {
        let source = &grid.cells[i];
        let prop = source.prop;
        let distance = source.cluster_distance;

        let mut remove = PropMask::empty();
        let mut only_empty = false;
        let mut rug_boost = false;
        match prop {
            PropType::Empty => return,
            PropType::Pillar => only_empty = true,
            PropType::Fire => remove |= PropMask::CRATE | PropMask::BARREL | PropMask::RUG,
            PropType::Crate | PropType::Barrel => remove |= PropMask::FIRE | PropMask::PILLAR,
            PropType::Rug => {
                if distance.unwrap_or(0) < self.max_radius {
                    rug_boost = true;
                } else {
                    remove |= PropMask::RUG;
                }
            }
        }
        if prop != PropType::Rug {
            remove |= PropMask::PILLAR;
        }

        for n in grid.neighbor_indices(i) {
            let cell = &mut grid.cells[n];
            if cell.collapsed {
                continue;
            }
            if only_empty {
                cell.domain &= PropMask::EMPTY;
            } else {
                cell.domain.remove(remove);
            }
            if rug_boost {
                cell.weights[PropType::Rug.index()] *= RUG_GROWTH_BOOST;
            }
        }
    }
}

/// Solver cells plus a position index
struct Grid {
    cells: Vec<PropCell>,
    index: HashMap<Cell, usize>,
}

impl Grid {
    fn new(cells: &CellSet, walls: &CellSet, weights: &PropWeights) -> Self {
        let cells: Vec<PropCell> = cells
            .iter()
            .map(|&c| PropCell::new(c, walls, weights))
            .collect();
        let index = cells.iter().enumerate().map(|(i, c)| (c.position, i)).collect();
        Self { cells, index }
    }

    fn index_of(&self, c: Cell) -> Option<usize> {
        self.index.get(&c).copied()
    }

    fn neighbor_indices(&self, i: usize) -> Vec<usize> {
        self.cells[i]
            .position
            .neighbors8()
            .filter_map(|n| self.index_of(n))
            .collect()
    }

    /// Uncollapsed cell with the smallest domain, random among ties
    fn lowest_entropy(&self, rng: &mut DungeonRng) -> Option<usize> {
        let mut best = u32::MAX;
        let mut ties = Vec::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.collapsed {
                continue;
            }
            let size = cell.domain.size();
            if size < best {
                best = size;
                ties.clear();
            }
            if size == best {
                ties.push(i);
            }
        }
        rng.choose(&ties).copied()
    }

    /// 1 + the smallest distance among collapsed rug neighbors, 0 if none
    fn rug_distance(&self, i: usize) -> u32 {
        self.neighbor_indices(i)
            .into_iter()
            .filter_map(|n| {
                let cell = &self.cells[n];
                if cell.collapsed && cell.prop == PropType::Rug {
                    cell.cluster_distance
                } else {
                    None
                }
            })
            .min()
            .map_or(0, |d| d + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Rect, derive_walls};

    fn room(w: i32, h: i32) -> (CellSet, CellSet) {
        let floor = Rect::new(0, 0, w, h).to_cell_set();
        let walls = derive_walls(&floor);
        (floor, walls)
    }

    fn heavy(prop: PropType) -> PropWeights {
        let mut w = PropWeights {
            empty: 0.1,
            crates: 0.1,
            barrels: 0.1,
            pillars: 0.1,
            fires: 0.1,
            rugs: 0.1,
        };
        match prop {
            PropType::Empty => w.empty = 100.0,
            PropType::Crate => w.crates = 100.0,
            PropType::Barrel => w.barrels = 100.0,
            PropType::Pillar => w.pillars = 100.0,
            PropType::Fire => w.fires = 100.0,
            PropType::Rug => w.rugs = 100.0,
        }
        w
    }

    #[test]
    fn test_every_cell_collapsed_once() {
        let (floor, walls) = room(8, 6);
        let weights = PropWeights::standard();
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.6);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(42));
        assert_eq!(solution.placements.len(), floor.len());
        assert!(floor.iter().all(|c| solution.placements.contains_key(c)));
        assert_eq!(solution.exhausted, 0);
    }

    #[test]
    fn test_reserved_cells_stay_empty() {
        let (floor, walls) = room(6, 6);
        let reserved: CellSet = [Cell::new(0, 0), Cell::new(3, 3), Cell::new(50, 50)]
            .into_iter()
            .collect();
        let weights = heavy(PropType::Fire);
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.0);
        let solution = solver.solve(&floor, &reserved, &mut DungeonRng::new(1));
        assert_eq!(solution.placements[&Cell::new(0, 0)], PropType::Empty);
        assert_eq!(solution.placements[&Cell::new(3, 3)], PropType::Empty);
        assert!(!solution.placements.contains_key(&Cell::new(50, 50)));
    }

    #[test]
    fn test_pillars_never_adjacent() {
        let (floor, walls) = room(12, 12);
        let weights = heavy(PropType::Pillar);
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.0);
        for seed in 0..20 {
            let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(seed));
            assert!(solution.count(PropType::Pillar) > 0);
            for (c, p) in &solution.placements {
                if *p == PropType::Pillar {
                    for n in c.neighbors8() {
                        assert_ne!(solution.placements.get(&n), Some(&PropType::Pillar));
                    }
                }
            }
        }
    }

    #[test]
    fn test_pillar_empties_open_neighbors() {
        let (floor, walls) = room(10, 10);
        let mut weights = heavy(PropType::Pillar);
        weights.rugs = 0.0;
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.0);
        for seed in 0..20 {
            let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(seed));
            for (c, p) in &solution.placements {
                if *p == PropType::Pillar {
                    for n in c.neighbors8().filter_map(|n| solution.placements.get(&n)) {
                        assert_eq!(*n, PropType::Empty);
                    }
                }
            }
        }
    }

    #[test]
    fn test_earlier_rug_may_border_pillar() {
        let (floor, walls) = room(8, 7);
        let mut weights = heavy(PropType::Rug);
        weights.pillars = 50.0;
        let solver = PropPlacementSolver::new(&weights, &walls, 0, 1.0);
        for seed in 0..20 {
            let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(seed));
            for (c, p) in &solution.placements {
                if *p == PropType::Pillar {
                    for n in c.neighbors8().filter_map(|n| solution.placements.get(&n)) {
                        assert!(matches!(n, PropType::Empty | PropType::Rug), "{n:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_fire_keeps_crates_away() {
        let (floor, walls) = room(10, 10);
        let mut weights = heavy(PropType::Fire);
        weights.crates = 50.0;
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.0);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(5));
        for (c, p) in &solution.placements {
            if *p == PropType::Fire {
                for n in c.neighbors8() {
                    let np = solution.placements.get(&n);
                    assert_ne!(np, Some(&PropType::Crate));
                    assert_ne!(np, Some(&PropType::Barrel));
                    assert_ne!(np, Some(&PropType::Pillar));
                }
            }
        }
    }

    #[test]
    fn test_wall_rules() {
        let (floor, walls) = room(10, 10);
        let mut weights = heavy(PropType::Crate);
        weights.rugs = 100.0;
        let solver = PropPlacementSolver::new(&weights, &walls, 3, 1.0);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(9));
        for (c, p) in &solution.placements {
            let by_wall = touches(*c, &walls);
            if p.needs_wall() {
                assert!(by_wall, "{} at {:?} away from walls", p, c);
            }
            if p.avoids_wall() {
                assert!(!by_wall, "{} at {:?} against a wall", p, c);
            }
        }
    }

    #[test]
    fn test_rug_radius_bounded() {
        let (floor, walls) = room(16, 16);
        let weights = heavy(PropType::Rug);
        for radius in [0, 1, 2, 4] {
            let solver = PropPlacementSolver::new(&weights, &walls, radius, 1.0);
            for seed in 0..10 {
                let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(seed));
                assert!(solution.count(PropType::Rug) > 0);
                assert!(solution.cluster_distance.values().all(|d| *d <= radius));
                assert_eq!(solution.cluster_distance.len(), solution.count(PropType::Rug));
            }
        }
    }

    #[test]
    fn test_zero_radius_rugs_isolated() {
        let (floor, walls) = room(12, 12);
        let weights = heavy(PropType::Rug);
        let solver = PropPlacementSolver::new(&weights, &walls, 0, 1.0);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(3));
        for (c, p) in &solution.placements {
            if *p == PropType::Rug {
                let mut around = c.neighbors8().filter_map(|n| solution.placements.get(&n));
                assert!(around.all(|n| *n != PropType::Rug));
            }
        }
    }

    #[test]
    fn test_rug_seed_on_open_floor() {
        let (floor, walls) = room(10, 10);
        let weights = PropWeights::standard();
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 1.0);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(2));
        let seed = solution.rug_seed.expect("seed chance is 1");
        assert!(!touches(seed, &walls));

        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.0);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(2));
        assert_eq!(solution.rug_seed, None);
    }

    #[test]
    fn test_all_zero_weights_still_collapse() {
        let (floor, walls) = room(5, 5);
        let weights = PropWeights {
            empty: 0.0,
            crates: 0.0,
            barrels: 0.0,
            pillars: 0.0,
            fires: 0.0,
            rugs: 0.0,
        };
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.5);
        let solution = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(0));
        assert_eq!(solution.placements.len(), 25);
    }

    #[test]
    fn test_empty_input() {
        let weights = PropWeights::standard();
        let walls = CellSet::new();
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 1.0);
        let solution = solver.solve(&CellSet::new(), &CellSet::new(), &mut DungeonRng::new(0));
        assert!(solution.placements.is_empty());
        assert_eq!(solution.rug_seed, None);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (floor, walls) = room(9, 7);
        let weights = PropWeights::boss();
        let solver = PropPlacementSolver::new(&weights, &walls, 2, 0.6);
        let a = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(77));
        let b = solver.solve(&floor, &CellSet::new(), &mut DungeonRng::new(77));
        assert_eq!(a, b);
    }
}
