//! Prop types, solver domains and weight tables

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::dungeon::RoomRole;

/// Decorative, non-blocking prop placed on a floor cell
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum PropType {
    /// No prop
    #[default]
    Empty = 0,
    Crate = 1,
    Barrel = 2,
    Pillar = 3,
    /// Brazier or campfire
    Fire = 4,
    /// Cluster-forming floor covering
    Rug = 5,
}

impl PropType {
    pub const COUNT: usize = 6;

    pub const fn mask(self) -> PropMask {
        PropMask::from_bits_truncate(1 << self as u8)
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Must stand next to a wall
    pub const fn needs_wall(self) -> bool {
        matches!(self, PropType::Crate | PropType::Barrel)
    }

    /// Must not stand next to a wall
    pub const fn avoids_wall(self) -> bool {
        matches!(self, PropType::Rug)
    }

    /// Glyph used by debug renderings
    pub const fn glyph(self) -> char {
        match self {
            PropType::Empty => '.',
            PropType::Crate => 'c',
            PropType::Barrel => 'b',
            PropType::Pillar => 'O',
            PropType::Fire => '^',
            PropType::Rug => '~',
        }
    }
}

bitflags! {
    /// Candidate prop types of a solver cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PropMask: u8 {
        const EMPTY = 1 << 0;
        const CRATE = 1 << 1;
        const BARREL = 1 << 2;
        const PILLAR = 1 << 3;
        const FIRE = 1 << 4;
        const RUG = 1 << 5;
    }
}

impl PropMask {
    /// Static domain of a cell given its wall adjacency
    pub fn for_cell(wall_adjacent: bool) -> Self {
        PropType::iter()
            .filter(|t| {
                if wall_adjacent {
                    !t.avoids_wall()
                } else {
                    !t.needs_wall()
                }
            })
            .fold(PropMask::empty(), |m, t| m | t.mask())
    }

    pub fn has(self, t: PropType) -> bool {
        self.contains(t.mask())
    }

    /// Number of remaining candidates
    pub fn size(self) -> u32 {
        self.bits().count_ones()
    }

    /// Candidate types in declaration order
    pub fn types(self) -> impl Iterator<Item = PropType> {
        PropType::iter().filter(move |t| self.has(*t))
    }
}

/// Relative likelihood of each prop type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropWeights {
    pub empty: f32,
    pub crates: f32,
    pub barrels: f32,
    pub pillars: f32,
    pub fires: f32,
    pub rugs: f32,
}

impl PropWeights {
    pub fn get(&self, t: PropType) -> f32 {
        match t {
            PropType::Empty => self.empty,
            PropType::Crate => self.crates,
            PropType::Barrel => self.barrels,
            PropType::Pillar => self.pillars,
            PropType::Fire => self.fires,
            PropType::Rug => self.rugs,
        }
    }

    /// Weights indexed by `PropType::index`
    pub fn to_array(&self) -> [f32; PropType::COUNT] {
        let mut out = [0.0; PropType::COUNT];
        for t in PropType::iter() {
            out[t.index()] = self.get(t);
        }
        out
    }

    pub fn is_valid(&self) -> bool {
        PropType::iter().all(|t| {
            let w = self.get(t);
            w.is_finite() && w >= 0.0
        })
    }

    /// Storerooms: crates and barrels along the walls
    pub fn standard() -> Self {
        Self {
            empty: 10.0,
            crates: 1.5,
            barrels: 1.5,
            pillars: 0.6,
            fires: 0.4,
            rugs: 0.5,
        }
    }

    /// Arena: pillars and braziers, little clutter
    pub fn boss() -> Self {
        Self {
            empty: 10.0,
            crates: 0.3,
            barrels: 0.3,
            pillars: 1.5,
            fires: 1.0,
            rugs: 0.8,
        }
    }

    /// Mostly clear floor for puzzle objects
    pub fn puzzle() -> Self {
        Self {
            empty: 14.0,
            crates: 0.5,
            barrels: 0.5,
            pillars: 0.8,
            fires: 0.3,
            rugs: 0.3,
        }
    }

    /// Camp: a fire and rugs, few obstacles
    pub fn start() -> Self {
        Self {
            empty: 14.0,
            crates: 1.0,
            barrels: 1.0,
            pillars: 0.2,
            fires: 0.6,
            rugs: 1.0,
        }
    }
}

impl Default for PropWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// One weight table per room role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePropWeights {
    pub start: PropWeights,
    pub boss: PropWeights,
    pub puzzle: PropWeights,
    pub standard: PropWeights,
}

impl RolePropWeights {
    /// Table for a role; unclassified rooms use the standard table
    pub fn for_role(&self, role: RoomRole) -> &PropWeights {
        match role {
            RoomRole::Start => &self.start,
            RoomRole::Boss => &self.boss,
            RoomRole::Puzzle => &self.puzzle,
            RoomRole::Standard | RoomRole::Undefined => &self.standard,
        }
    }

    /// First role whose table is invalid
    pub fn invalid_role(&self) -> Option<RoomRole> {
        [
            RoomRole::Start,
            RoomRole::Boss,
            RoomRole::Puzzle,
            RoomRole::Standard,
        ]
        .into_iter()
        .find(|r| !self.for_role(*r).is_valid())
    }
}

impl Default for RolePropWeights {
    fn default() -> Self {
        Self {
            start: PropWeights::start(),
            boss: PropWeights::boss(),
            puzzle: PropWeights::puzzle(),
            standard: PropWeights::standard(),
        }
    }
}
