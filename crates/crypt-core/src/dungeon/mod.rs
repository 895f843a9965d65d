//! Dungeon layout system
//!
//! Contains cells, rectangles, rooms, partitioning, room shapes, corridors,
//! classification and the generation pipeline.

mod cell;
mod classify;
mod corridor;
mod generation;
mod graph;
mod partition;
mod rect;
mod room;
mod shape;

pub use cell::{
    Cell, CellSet, DIRS_4, DIRS_8, bounds, count_neighbors8, derive_walls, touches,
};
pub use classify::{Classification, MainPath, RoomClassifier, room_at};
pub use corridor::{
    ConnectivityTracker, CorridorGraphBuilder, CorridorPlan, Edge, complete_graph, kruskal,
    l_corridor, sort_edges,
};
pub use generation::{DungeonGenerator, DungeonLayout, RoomConsumer};
pub use graph::{AdjacencyGraph, BfsResult};
pub use partition::SpacePartitioner;
pub use rect::Rect;
pub use room::{Room, RoomId, RoomRole, RoomTable, rooms_from_rects};
pub use shape::{
    RoomShaper, centered_square, connected_components, disc, inset_rect, random_walk,
    remove_islands, run_random_walk, smooth,
};
