//! Dungeon generation pipeline
//!
//! Runs in two phases:
//! 1. Skeleton: partition the region, lay provisional inset floors, plan and
//!    carve corridors, then classify rooms over that floor graph
//! 2. Render: shape each room from its now-known role, re-carve the planned
//!    corridors, rebuild floor, walls and adjacency, check connectivity and
//!    place props room by room
//!
//! The returned `DungeonLayout` is a frozen snapshot.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, Result};
use crate::props::{PropPlacementSolver, PropType};
use crate::rng::DungeonRng;

use super::cell::{Cell, CellSet, bounds, derive_walls};
use super::classify::{Classification, MainPath, RoomClassifier};
use super::corridor::{CorridorGraphBuilder, CorridorPlan};
use super::graph::AdjacencyGraph;
use super::partition::SpacePartitioner;
use super::rect::Rect;
use super::room::{Room, RoomId, RoomRole, RoomTable, rooms_from_rects};
use super::shape::RoomShaper;

/// Receives each finished room, e.g. to spawn entities or objects
pub trait RoomConsumer {
    fn consume_room(&mut self, room: &Room, floor: &CellSet, props: &BTreeMap<Cell, PropType>);
}

/// The finished level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    seed: u64,
    region: Rect,
    floor: CellSet,
    walls: CellSet,
    corridors: CellSet,
    rooms: Vec<Room>,
    room_floors: RoomTable<CellSet>,
    #[serde(with = "prop_pairs")]
    props: BTreeMap<Cell, PropType>,
    main_path: MainPath,
    plan: CorridorPlan,
    start: RoomId,
    boss: RoomId,
}

impl DungeonLayout {
    /// Seed of the random source the run started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    /// Walkable cells: room floors and corridors
    pub fn floor(&self) -> &CellSet {
        &self.floor
    }

    pub fn walls(&self) -> &CellSet {
        &self.walls
    }

    pub fn corridors(&self) -> &CellSet {
        &self.corridors
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    /// Floor cells rendered for a room
    pub fn room_floor(&self, id: RoomId) -> Option<&CellSet> {
        self.room_floors.get(id)
    }

    /// Props of a single room
    pub fn room_props(&self, id: RoomId) -> Option<BTreeMap<Cell, PropType>> {
        let floor = self.room_floors.get(id)?;
        Some(
            floor
                .iter()
                .filter_map(|c| self.props.get(c).map(|p| (*c, *p)))
                .collect(),
        )
    }

    /// Every room floor cell mapped to its prop
    pub fn props(&self) -> &BTreeMap<Cell, PropType> {
        &self.props
    }

    pub fn main_path(&self) -> &MainPath {
        &self.main_path
    }

    pub fn corridor_plan(&self) -> &CorridorPlan {
        &self.plan
    }

    pub fn start_room(&self) -> &Room {
        &self.rooms[self.start.index()]
    }

    pub fn boss_room(&self) -> &Room {
        &self.rooms[self.boss.index()]
    }

    pub fn rooms_with_role(&self, role: RoomRole) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.role == role)
    }

    /// Text rendering for diagnostics
    ///
    /// `#` wall, `.` room floor, `,` corridor outside rooms, prop glyphs,
    /// `S` and `B` at the Start and Boss centers.
    pub fn render_ascii(&self) -> String {
        let all: CellSet = self.floor.union(&self.walls).copied().collect();
        let Some((min, max)) = bounds(&all) else {
            return String::new();
        };
        let in_room: CellSet = self
            .room_floors
            .iter()
            .flat_map(|(_, cells)| cells.iter().copied())
            .collect();
        let start = self.start_room().center();
        let boss = self.boss_room().center();

        let mut out = String::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let c = Cell::new(x, y);
                let ch = if c == start {
                    'S'
                } else if c == boss {
                    'B'
                } else if self.walls.contains(&c) {
                    '#'
                } else if let Some(p) = self.props.get(&c).filter(|p| **p != PropType::Empty) {
                    p.glyph()
                } else if self.corridors.contains(&c) && !in_room.contains(&c) {
                    ','
                } else if self.floor.contains(&c) {
                    '.'
                } else {
                    ' '
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

/// Cell-keyed maps as `[cell, prop]` pairs, since JSON keys must be strings
mod prop_pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dungeon::Cell;
    use crate::props::PropType;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Cell, PropType>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Cell, PropType>, D::Error> {
        let pairs = Vec::<(Cell, PropType)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// Phase 1 output
struct Skeleton {
    rooms: Vec<Room>,
    plan: CorridorPlan,
    classification: Classification,
}

/// Runs the generation pipeline
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    config: GeneratorConfig,
    rng: DungeonRng,
}

impl DungeonGenerator {
    /// Create a generator with an explicit random source
    pub fn new(config: GeneratorConfig, rng: DungeonRng) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Create a generator seeded from `config.seed`
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        let rng = DungeonRng::new(config.seed);
        Self::new(config, rng)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Restart the random stream from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = DungeonRng::new(seed);
    }

    /// Generate a level
    pub fn generate(&mut self) -> Result<DungeonLayout> {
        self.run(None)
    }

    /// Generate a level and hand every room to `consumer`
    pub fn generate_with(&mut self, consumer: &mut dyn RoomConsumer) -> Result<DungeonLayout> {
        self.run(Some(consumer))
    }

    fn run(&mut self, consumer: Option<&mut dyn RoomConsumer>) -> Result<DungeonLayout> {
        let seed = self.rng.seed();
        let skeleton = self.skeleton()?;
        let layout = self.render(seed, skeleton)?;

        if let Some(consumer) = consumer {
            for room in &layout.rooms {
                let props = layout.room_props(room.id).unwrap_or_default();
                consumer.consume_room(room, &layout.room_floors[room.id], &props);
            }
        }
        Ok(layout)
    }

    /// Phase 1: rooms, provisional floor, corridor plan and roles
    fn skeleton(&mut self) -> Result<Skeleton> {
        let config = &self.config;
        let partitioner = SpacePartitioner::new(config.min_room_width, config.min_room_height);
        let rects = partitioner.partition(config.region(), &mut self.rng);
        match rects.len() {
            0 => return Err(GenerationError::NoRooms),
            1 => {
                return Err(GenerationError::NotEnoughRooms {
                    found: 1,
                    required: 2,
                });
            }
            _ => {}
        }
        let mut rooms = rooms_from_rects(&rects);

        let shaper = RoomShaper::from_config(config);
        let mut floor: CellSet = rooms.iter().flat_map(|r| shaper.skeleton(r)).collect();

        let centers: Vec<Cell> = rooms.iter().map(Room::center).collect();
        let builder =
            CorridorGraphBuilder::new(config.loop_edge_chance, config.loop_edge_max_distance);
        let (plan, corridors) = builder.build(&centers, &mut self.rng);
        floor.extend(corridors.iter().copied());

        let graph = AdjacencyGraph::from_floor(&floor);
        let classifier = RoomClassifier::new(config.start_position, config.puzzle_room_count);
        let classification = classifier.classify(&mut rooms, &graph, &mut self.rng)?;

        debug!(
            "skeleton: {} rooms, {} provisional floor cells",
            rooms.len(),
            floor.len()
        );
        Ok(Skeleton {
            rooms,
            plan,
            classification,
        })
    }

    /// Phase 2: final shapes, walls, connectivity check and props
    fn render(&mut self, seed: u64, skeleton: Skeleton) -> Result<DungeonLayout> {
        let Skeleton {
            rooms,
            plan,
            classification,
        } = skeleton;
        let config = &self.config;
        let shaper = RoomShaper::from_config(config);

        // Cells go to the lowest room id that claims them
        let mut claimed = CellSet::new();
        let mut room_floors: RoomTable<CellSet> = RoomTable::with_len(rooms.len());
        for room in &rooms {
            let cells: CellSet = shaper
                .shape(room, &mut self.rng)
                .into_iter()
                .filter(|c| !claimed.contains(c))
                .collect();
            claimed.extend(cells.iter().copied());
            room_floors[room.id] = cells;
        }

        let corridors = plan.carve();
        let mut floor = claimed;
        floor.extend(corridors.iter().copied());
        let walls = derive_walls(&floor);

        let graph = AdjacencyGraph::from_floor(&floor);
        let start_center = rooms[classification.start.index()].center();
        let centers: Vec<Cell> = rooms.iter().map(Room::center).collect();
        let missing = graph.unreachable_from(start_center, &centers);
        if !missing.is_empty() {
            let unreachable = rooms
                .iter()
                .filter(|r| missing.contains(&r.center()))
                .map(|r| r.id)
                .collect();
            return Err(GenerationError::DisconnectedGraph { unreachable });
        }

        let mut props = BTreeMap::new();
        for room in &rooms {
            let cells = &room_floors[room.id];
            let mut reserved: CellSet = cells
                .iter()
                .filter(|c| corridors.contains(c) || config.reserved.contains(c))
                .copied()
                .collect();
            if room.role == RoomRole::Start {
                reserved.insert(room.center());
            }

            let weights = config.prop_weights.for_role(room.role);
            let solver = PropPlacementSolver::new(
                weights,
                &walls,
                config.rug_max_radius,
                config.rug_seed_chance,
            );
            let solution = solver.solve(cells, &reserved, &mut self.rng);
            debug!(
                "room {} ({}): {} cells, {} props, {} exhausted",
                room.id,
                room.role,
                cells.len(),
                solution.placements.len() - solution.count(PropType::Empty),
                solution.exhausted
            );
            props.extend(solution.placements);
        }

        debug!(
            "rendered: {} floor cells, {} walls, {} corridor cells, {} main path rooms",
            floor.len(),
            walls.len(),
            corridors.len(),
            classification.main_path.rooms.len()
        );

        Ok(DungeonLayout {
            seed,
            region: config.region(),
            floor,
            walls,
            corridors,
            rooms,
            room_floors,
            props,
            main_path: classification.main_path,
            plan,
            start: classification.start,
            boss: classification.boss,
        })
    }
}
