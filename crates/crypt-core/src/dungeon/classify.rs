//! Room role classification
//!
//! - Start: room whose center is closest to the configured start position
//! - Boss: room holding the BFS-farthest floor cell from the Start center
//! - Main path: parent-pointer path from Start to that cell
//! - Puzzle: sampled from off-path rooms first, then on-path ones
//! - Standard: everything left

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::rng::DungeonRng;

use super::cell::Cell;
use super::graph::AdjacencyGraph;
use super::room::{Room, RoomId, RoomRole};

/// Rooms and cells on the Start-to-Boss route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPath {
    /// Rooms in traversal order, Start first and Boss last
    pub rooms: Vec<RoomId>,
    /// Floor cells from the Start center to the Boss target
    pub cells: Vec<Cell>,
}

impl MainPath {
    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains(&id)
    }
}

/// Outcome of classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub start: RoomId,
    pub boss: RoomId,
    /// Hop distance from the Start center to the Boss target cell
    pub boss_distance: u32,
    pub main_path: MainPath,
    /// Puzzle rooms in draw order
    pub puzzles: Vec<RoomId>,
}

/// Assigns roles to partitioned rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomClassifier {
    pub start_position: Cell,
    pub puzzle_count: usize,
}

impl RoomClassifier {
    pub fn new(start_position: Cell, puzzle_count: usize) -> Self {
        Self {
            start_position,
            puzzle_count,
        }
    }

    /// Classify `rooms` in place over the floor graph
    ///
    /// Any previous classification is discarded first.
    pub fn classify(
        &self,
        rooms: &mut [Room],
        graph: &AdjacencyGraph,
        rng: &mut DungeonRng,
    ) -> Result<Classification> {
        if rooms.is_empty() {
            return Err(GenerationError::NoRooms);
        }
        if rooms.len() < 2 {
            return Err(GenerationError::NotEnoughRooms {
                found: rooms.len(),
                required: 2,
            });
        }

        for room in rooms.iter_mut() {
            room.role = RoomRole::Undefined;
            room.on_main_path = false;
            room.is_key_puzzle = false;
        }

        let start = self.find_start(rooms);
        let start_center = rooms[start.index()].center();
        let search = graph.bfs(start_center);

        let (boss, target) = match room_at(rooms, search.farthest).filter(|id| *id != start) {
            Some(id) => (id, search.farthest),
            None => {
                warn!(
                    "farthest cell {:?} is not in a non-start room, using farthest room center",
                    search.farthest
                );
                let id = farthest_room(rooms, start, |c| search.distance(c)).ok_or_else(|| {
                    GenerationError::DisconnectedGraph {
                        unreachable: rooms.iter().map(|r| r.id).filter(|id| *id != start).collect(),
                    }
                })?;
                (id, rooms[id.index()].center())
            }
        };
        let boss_distance = search.distance(target).unwrap_or(0);

        let cells = search
            .path_to(target)
            .ok_or_else(|| GenerationError::DisconnectedGraph {
                unreachable: vec![boss],
            })?;
        let main_path = trace_main_path(rooms, &cells, start, boss);
        for id in &main_path.rooms {
            rooms[id.index()].on_main_path = true;
        }

        rooms[start.index()].role = RoomRole::Start;
        rooms[boss.index()].role = RoomRole::Boss;

        let puzzles = self.pick_puzzles(rooms, rng);
        for room in rooms.iter_mut() {
            if room.role == RoomRole::Undefined {
                room.role = RoomRole::Standard;
            }
        }

        debug!(
            "classified {} rooms: start {} boss {} at {} hops, {} path rooms, puzzles {:?}",
            rooms.len(),
            start,
            boss,
            boss_distance,
            main_path.rooms.len(),
            puzzles
        );

        Ok(Classification {
            start,
            boss,
            boss_distance,
            main_path,
            puzzles,
        })
    }

    /// Room with the center closest to the start position, lowest id on ties
    fn find_start(&self, rooms: &[Room]) -> RoomId {
        rooms
            .iter()
            .min_by(|a, b| {
                let da = a.center().distance(self.start_position);
                let db = b.center().distance(self.start_position);
                da.total_cmp(&db)
            })
            .map(|r| r.id)
            .unwrap_or(RoomId(0))
    }

    /// Mark puzzle rooms; `rooms` must already have Start and Boss set
    fn pick_puzzles(&self, rooms: &mut [Room], rng: &mut DungeonRng) -> Vec<RoomId> {
        let eligible = |r: &&Room| !matches!(r.role, RoomRole::Start | RoomRole::Boss);

        let mut pool: Vec<RoomId> = rooms
            .iter()
            .filter(eligible)
            .filter(|r| !r.on_main_path)
            .map(|r| r.id)
            .collect();
        if pool.len() < self.puzzle_count {
            pool.extend(
                rooms
                    .iter()
                    .filter(eligible)
                    .filter(|r| r.on_main_path)
                    .map(|r| r.id),
            );
        }

        let picks: Vec<RoomId> = rng
            .sample_indices(pool.len(), self.puzzle_count)
            .into_iter()
            .map(|i| pool[i])
            .collect();

        for id in &picks {
            let room = &mut rooms[id.index()];
            room.role = RoomRole::Puzzle;
            room.is_key_puzzle = room.on_main_path;
        }
        picks
    }
}

/// Room whose rectangle contains `c`, lowest id first
pub fn room_at(rooms: &[Room], c: Cell) -> Option<RoomId> {
    rooms.iter().find(|r| r.contains(c)).map(|r| r.id)
}

/// Non-start room whose center is the most hops away
fn farthest_room(
    rooms: &[Room],
    start: RoomId,
    distance: impl Fn(Cell) -> Option<u32>,
) -> Option<RoomId> {
    let mut best: Option<(RoomId, u32)> = None;
    for room in rooms.iter().filter(|r| r.id != start) {
        if let Some(d) = distance(room.center())
            && best.is_none_or(|(_, bd)| d > bd)
        {
            best = Some((room.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Rooms touched by the path in order of first appearance
fn trace_main_path(rooms: &[Room], cells: &[Cell], start: RoomId, boss: RoomId) -> MainPath {
    let mut order = vec![start];
    for &c in cells {
        if let Some(id) = room_at(rooms, c)
            && id != boss
            && !order.contains(&id)
        {
            order.push(id);
        }
    }
    order.push(boss);
    MainPath {
        rooms: order,
        cells: cells.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::cell::CellSet;
    use crate::dungeon::corridor::l_corridor;
    use crate::dungeon::rect::Rect;
    use crate::dungeon::room::rooms_from_rects;

    /// Row of `n` 10x10 rooms joined by a straight corridor
    fn row_of_rooms(n: i32) -> (Vec<Room>, AdjacencyGraph) {
        let rects: Vec<_> = (0..n).map(|i| Rect::new(i * 10, 0, 10, 10)).collect();
        let rooms = rooms_from_rects(&rects);
        let mut floor = CellSet::new();
        for r in &rects {
            floor.extend(r.inset(1).cells());
        }
        floor.extend(l_corridor(rects[0].center(), rects[n as usize - 1].center()));
        (rooms, AdjacencyGraph::from_floor(&floor))
    }

    #[test]
    fn test_start_and_boss_on_row() {
        let (mut rooms, graph) = row_of_rooms(5);
        let classifier = RoomClassifier::new(Cell::new(0, 0), 0);
        let result = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(1))
            .unwrap();
        assert_eq!(result.start, RoomId(0));
        assert_eq!(result.boss, RoomId(4));
        assert_eq!(
            result.main_path.rooms,
            vec![RoomId(0), RoomId(1), RoomId(2), RoomId(3), RoomId(4)]
        );
        assert!(rooms.iter().all(|r| r.on_main_path));
        assert_eq!(rooms[0].role, RoomRole::Start);
        assert_eq!(rooms[4].role, RoomRole::Boss);
        assert!(rooms[1..4].iter().all(|r| r.role == RoomRole::Standard));
    }

    #[test]
    fn test_start_closest_to_position() {
        let (mut rooms, graph) = row_of_rooms(4);
        let classifier = RoomClassifier::new(Cell::new(100, 5), 0);
        let result = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(1))
            .unwrap();
        assert_eq!(result.start, RoomId(3));
        assert_eq!(result.boss, RoomId(0));
        assert_eq!(result.main_path.rooms.first(), Some(&RoomId(3)));
        assert_eq!(result.main_path.rooms.last(), Some(&RoomId(0)));
    }

    #[test]
    fn test_on_path_puzzles_are_key() {
        let (mut rooms, graph) = row_of_rooms(5);
        let classifier = RoomClassifier::new(Cell::new(0, 0), 2);
        let result = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(8))
            .unwrap();
        assert_eq!(result.puzzles.len(), 2);
        for id in &result.puzzles {
            let room = &rooms[id.index()];
            assert_eq!(room.role, RoomRole::Puzzle);
            assert!(room.is_key_puzzle);
        }
    }

    #[test]
    fn test_off_path_rooms_preferred_for_puzzles() {
        // Spine of three rooms plus two side rooms hanging off the middle
        let rects = vec![
            Rect::new(0, 0, 10, 10),
            Rect::new(10, 0, 10, 10),
            Rect::new(60, 0, 10, 10),
            Rect::new(10, 10, 10, 10),
            Rect::new(10, -10, 10, 10),
        ];
        let mut rooms = rooms_from_rects(&rects);
        let mut floor = CellSet::new();
        for r in &rects {
            floor.extend(r.inset(1).cells());
        }
        floor.extend(l_corridor(rects[0].center(), rects[2].center()));
        floor.extend(l_corridor(rects[4].center(), rects[3].center()));
        let graph = AdjacencyGraph::from_floor(&floor);

        let classifier = RoomClassifier::new(Cell::new(0, 0), 2);
        let result = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(4))
            .unwrap();
        assert_eq!(result.boss, RoomId(2));
        let mut puzzles = result.puzzles.clone();
        puzzles.sort();
        assert_eq!(puzzles, vec![RoomId(3), RoomId(4)]);
        assert!(puzzles.iter().all(|id| !rooms[id.index()].is_key_puzzle));
        assert_eq!(rooms[1].role, RoomRole::Standard);
    }

    #[test]
    fn test_puzzle_count_capped_by_pool() {
        let (mut rooms, graph) = row_of_rooms(3);
        let classifier = RoomClassifier::new(Cell::new(0, 0), 10);
        let result = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(2))
            .unwrap();
        assert_eq!(result.puzzles, vec![RoomId(1)]);
    }

    #[test]
    fn test_exactly_one_start_and_boss() {
        let (mut rooms, graph) = row_of_rooms(6);
        let classifier = RoomClassifier::new(Cell::new(25, 5), 3);
        classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(5))
            .unwrap();
        let starts = rooms.iter().filter(|r| r.role == RoomRole::Start).count();
        let bosses = rooms.iter().filter(|r| r.role == RoomRole::Boss).count();
        assert_eq!((starts, bosses), (1, 1));
        assert!(rooms.iter().all(|r| r.role != RoomRole::Undefined));
    }

    #[test]
    fn test_single_room_rejected() {
        let mut rooms = rooms_from_rects(&[Rect::new(0, 0, 10, 10)]);
        let graph = AdjacencyGraph::from_floor(&Rect::new(1, 1, 8, 8).to_cell_set());
        let classifier = RoomClassifier::new(Cell::new(0, 0), 1);
        let err = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(0))
            .unwrap_err();
        assert!(matches!(err, GenerationError::NotEnoughRooms { found: 1, .. }));

        let err = classifier
            .classify(&mut [], &graph, &mut DungeonRng::new(0))
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoRooms));
    }

    #[test]
    fn test_disconnected_rooms_rejected() {
        let rects = [Rect::new(0, 0, 10, 10), Rect::new(30, 0, 10, 10)];
        let mut rooms = rooms_from_rects(&rects);
        let floor: CellSet = rects.iter().flat_map(|r| r.inset(1).to_cell_set()).collect();
        let graph = AdjacencyGraph::from_floor(&floor);
        let classifier = RoomClassifier::new(Cell::new(0, 0), 0);
        let err = classifier
            .classify(&mut rooms, &graph, &mut DungeonRng::new(0))
            .unwrap_err();
        assert!(matches!(err, GenerationError::DisconnectedGraph { .. }));
    }
}
