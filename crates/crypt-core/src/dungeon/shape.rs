//! Room shape synthesis
//!
//! Turns a room rectangle and its role into floor cells:
//! - Standard and Start rooms: the rectangle inset by the room offset
//! - Boss rooms: a disc inscribed in the rectangle
//! - Puzzle rooms: a fixed-size square around the center, whatever the
//!   leaf size, clipped only to the region
//! - Organic mode: random walks from the center, smoothed with a cellular
//!   automaton, reduced to the largest island and clipped to the interior

use std::collections::VecDeque;

use log::trace;

use crate::config::{GeneratorConfig, RandomWalkParams, RoomShapeMode};
use crate::consts::MAX_PUZZLE_ROOM_SIZE;
use crate::rng::DungeonRng;

use super::cell::{Cell, CellSet, DIRS_4, bounds, count_neighbors8};
use super::rect::Rect;
use super::room::{Room, RoomRole};

/// Renders room floors from rectangles and roles
#[derive(Debug, Clone)]
pub struct RoomShaper {
    pub mode: RoomShapeMode,
    pub offset: i32,
    pub walk: RandomWalkParams,
    pub smoothing_iterations: u32,
    pub puzzle_size: i32,
    pub boss_margin: i32,
    pub puzzle_margin: i32,
    /// Expanded rooms are clipped to this region
    pub region: Rect,
}

impl RoomShaper {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            mode: config.shape_mode,
            offset: config.room_offset,
            walk: config.random_walk,
            smoothing_iterations: config.smoothing_iterations,
            puzzle_size: config.puzzle_room_size.clamp(1, MAX_PUZZLE_ROOM_SIZE),
            boss_margin: config.boss_margin,
            puzzle_margin: config.puzzle_margin,
            region: config.region(),
        }
    }

    /// Provisional floor used before roles are known
    pub fn skeleton(&self, room: &Room) -> CellSet {
        inset_rect(room.rect, self.offset)
    }

    /// Final floor for a classified room
    pub fn shape(&self, room: &Room, rng: &mut DungeonRng) -> CellSet {
        if self.mode == RoomShapeMode::Organic {
            return self.organic(room.rect, rng);
        }

        match room.role {
            RoomRole::Boss => {
                let area = self.expanded(room.rect, self.boss_margin);
                disc(area)
            }
            RoomRole::Puzzle => {
                // Fixed size regardless of the leaf; neighbors settle overlaps
                let side = self.puzzle_size + 2 * self.puzzle_margin.max(0);
                centered_square(room.center(), side)
                    .into_iter()
                    .filter(|c| self.region.contains_cell(*c))
                    .collect()
            }
            RoomRole::Start | RoomRole::Standard | RoomRole::Undefined => {
                inset_rect(room.rect, self.offset)
            }
        }
    }

    /// Grow a room rectangle by `margin`, staying inside the region
    fn expanded(&self, rect: Rect, margin: i32) -> Rect {
        if margin <= 0 {
            return rect;
        }
        rect.expand(margin).intersection(&self.region).unwrap_or(rect)
    }

    fn organic(&self, rect: Rect, rng: &mut DungeonRng) -> CellSet {
        let center = rect.center();
        let mut floor = CellSet::new();
        for _ in 0..self.walk.walkers.max(1) {
            floor.extend(run_random_walk(&self.walk, center, rng));
        }

        let floor = smooth(&floor, self.smoothing_iterations);
        let floor = remove_islands(&floor);

        let interior = rect.inset(self.offset);
        let mut clipped: CellSet = floor
            .into_iter()
            .filter(|c| interior.contains_cell(*c))
            .collect();
        if clipped.is_empty() {
            trace!("organic room at {:?} eroded away, keeping center", rect);
            clipped.insert(center);
        }
        clipped
    }
}

/// The rectangle shrunk by `offset` on every side
pub fn inset_rect(rect: Rect, offset: i32) -> CellSet {
    rect.inset(offset).to_cell_set()
}

/// Filled disc inscribed in `rect`
///
/// Radius is half the smaller side minus one; degenerate rectangles give
/// just the center.
pub fn disc(rect: Rect) -> CellSet {
    let center = rect.center();
    let radius = rect.width.min(rect.height) / 2 - 1;
    if radius <= 0 {
        return [center].into_iter().collect();
    }
    let r2 = radius * radius;
    let mut cells = CellSet::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                cells.insert(center.offset(dx, dy));
            }
        }
    }
    cells
}

/// A `side` x `side` square containing `center`
pub fn centered_square(center: Cell, side: i32) -> CellSet {
    let side = side.max(1);
    let half = side / 2;
    Rect::new(center.x - half, center.y - half, side, side).to_cell_set()
}

/// One random walk of `length` 4-directional steps
pub fn random_walk(start: Cell, length: u32, rng: &mut DungeonRng) -> CellSet {
    let mut path = CellSet::new();
    let mut current = start;
    path.insert(current);
    for _ in 0..length {
        let (dx, dy) = DIRS_4[rng.rn2(4) as usize];
        current = current.offset(dx, dy);
        path.insert(current);
    }
    path
}

/// Repeated random walks, optionally restarting from a visited cell
pub fn run_random_walk(params: &RandomWalkParams, start: Cell, rng: &mut DungeonRng) -> CellSet {
    let mut current = start;
    let mut floor = CellSet::new();
    floor.insert(start);
    for _ in 0..params.iterations {
        let path = random_walk(current, params.walk_length, rng);
        floor.extend(path);
        if params.start_randomly_each_iteration {
            let idx = rng.rn2(floor.len() as u32) as usize;
            if let Some(c) = floor.iter().nth(idx) {
                current = *c;
            }
        }
    }
    floor
}

/// Cellular-automaton smoothing
///
/// Each pass looks at the previous pass only. A cell is floor when more
/// than four of its eight neighbors are floor, keeps its state at exactly
/// four, and is cleared otherwise.
pub fn smooth(floor: &CellSet, iterations: u32) -> CellSet {
    let mut current = floor.clone();
    for _ in 0..iterations {
        let Some((min, max)) = bounds(&current) else {
            break;
        };
        let mut next = CellSet::new();
        for x in min.x - 1..=max.x + 1 {
            for y in min.y - 1..=max.y + 1 {
                let cell = Cell::new(x, y);
                let n = count_neighbors8(cell, &current);
                if n > 4 || (n == 4 && current.contains(&cell)) {
                    next.insert(cell);
                }
            }
        }
        current = next;
    }
    current
}

/// 4-connected components, in ascending order of their smallest cell
pub fn connected_components(floor: &CellSet) -> Vec<CellSet> {
    let mut seen = CellSet::new();
    let mut components = Vec::new();

    for &start in floor {
        if seen.contains(&start) {
            continue;
        }
        let mut component = CellSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);

        while let Some(c) = queue.pop_front() {
            component.insert(c);
            for n in c.neighbors4() {
                if floor.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Keep only the largest 4-connected component
///
/// Ties keep the component found first.
pub fn remove_islands(floor: &CellSet) -> CellSet {
    let mut best: Option<CellSet> = None;
    for component in connected_components(floor) {
        if best.as_ref().is_none_or(|b| component.len() > b.len()) {
            best = Some(component);
        }
    }
    best.unwrap_or_default()
}
