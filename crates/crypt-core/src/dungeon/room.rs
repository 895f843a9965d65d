//! Rooms, room roles and ID-indexed room tables
//!
//! Rooms are identified by a `RoomId` assigned when partitioning emits
//! them, never by their geometry. Per-room data lives in `RoomTable`s
//! indexed by that id.

use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use super::cell::Cell;
use super::rect::Rect;

/// Stable room identifier (index into the room list)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoomId(pub u32);

impl RoomId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Functional role of a room
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum RoomRole {
    /// Not yet classified
    #[default]
    Undefined,
    /// Player entry room
    Start,
    /// Farthest room, hosts the boss arena
    Boss,
    /// Puzzle room, either gating progression or optional
    Puzzle,
    /// Everything else
    Standard,
}

impl RoomRole {
    /// Lowercase name used in log records and errors
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A partitioned room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Partition leaf this room was built from
    pub rect: Rect,
    pub role: RoomRole,
    /// Whether at least one main-path cell lies in this room
    pub on_main_path: bool,
    /// Puzzle rooms on the main path gate progression
    pub is_key_puzzle: bool,
}

impl Room {
    /// Create a new unclassified room
    pub fn new(id: RoomId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            role: RoomRole::Undefined,
            on_main_path: false,
            is_key_puzzle: false,
        }
    }

    /// Center cell of the room's rectangle
    pub fn center(&self) -> Cell {
        self.rect.center()
    }

    pub fn contains(&self, c: Cell) -> bool {
        self.rect.contains_cell(c)
    }

    pub fn is_puzzle(&self) -> bool {
        self.role == RoomRole::Puzzle
    }
}

/// Build rooms from partition leaves, assigning ids in order
pub fn rooms_from_rects(rects: &[Rect]) -> Vec<Room> {
    rects
        .iter()
        .enumerate()
        .map(|(i, r)| Room::new(RoomId(i as u32), *r))
        .collect()
}

/// Per-room data indexed by `RoomId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTable<T> {
    entries: Vec<T>,
}

impl<T> RoomTable<T> {
    /// Build a table with one entry per room id `0..len`
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            entries: (0..len).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: RoomId) -> Option<&T> {
        self.entries.get(id.index())
    }

    /// Iterate `(id, entry)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (RoomId, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (RoomId(i as u32), e))
    }
}

impl<T: Default> RoomTable<T> {
    pub fn with_len(len: usize) -> Self {
        Self::from_fn(len, |_| T::default())
    }
}

impl<T> Index<RoomId> for RoomTable<T> {
    type Output = T;

    fn index(&self, id: RoomId) -> &T {
        &self.entries[id.index()]
    }
}

impl<T> IndexMut<RoomId> for RoomTable<T> {
    fn index_mut(&mut self, id: RoomId) -> &mut T {
        &mut self.entries[id.index()]
    }
}
