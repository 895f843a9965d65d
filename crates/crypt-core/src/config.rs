//! Generator configuration
//!
//! A single serde value carries every tunable of a generation run. It can
//! be built in code from `Default` or parsed from JSON, and is validated
//! before the pipeline touches it.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::dungeon::{Cell, CellSet, Rect};
use crate::error::ConfigError;
use crate::props::RolePropWeights;

/// How room floors are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomShapeMode {
    /// Role-specific geometric shapes
    #[default]
    Rectangular,
    /// Random-walk blobs for every room
    Organic,
}

/// Random walk parameters for organic rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkParams {
    /// Walks per walker
    pub iterations: u32,
    /// Steps per walk
    pub walk_length: u32,
    /// Restart each walk from a random visited cell instead of the center
    pub start_randomly_each_iteration: bool,
    /// Independent walkers seeded at the room center
    pub walkers: u32,
}

impl Default for RandomWalkParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_WALK_ITERATIONS,
            walk_length: DEFAULT_WALK_LENGTH,
            start_randomly_each_iteration: true,
            walkers: 1,
        }
    }
}

/// Everything a generation run needs besides the random source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,

    // Region
    pub origin: Cell,
    pub width: i32,
    pub height: i32,

    // Partitioning and shapes
    pub min_room_width: i32,
    pub min_room_height: i32,
    pub room_offset: i32,
    pub shape_mode: RoomShapeMode,
    pub random_walk: RandomWalkParams,
    pub smoothing_iterations: u32,
    pub boss_margin: i32,
    pub puzzle_margin: i32,
    pub puzzle_room_size: i32,

    // Corridors
    pub loop_edge_chance: f64,
    pub loop_edge_max_distance: f64,

    // Classification
    pub start_position: Cell,
    pub puzzle_room_count: usize,

    // Props
    pub prop_weights: RolePropWeights,
    pub rug_max_radius: u32,
    pub rug_seed_chance: f64,
    /// Cells owned by another placement system, never given props
    pub reserved: CellSet,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            origin: Cell::new(0, 0),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_room_width: DEFAULT_MIN_ROOM_WIDTH,
            min_room_height: DEFAULT_MIN_ROOM_HEIGHT,
            room_offset: DEFAULT_ROOM_OFFSET,
            shape_mode: RoomShapeMode::Rectangular,
            random_walk: RandomWalkParams::default(),
            smoothing_iterations: 0,
            boss_margin: 0,
            puzzle_margin: 0,
            puzzle_room_size: MAX_PUZZLE_ROOM_SIZE,
            loop_edge_chance: LOOP_EDGE_CHANCE,
            loop_edge_max_distance: LOOP_EDGE_MAX_DISTANCE,
            start_position: Cell::new(0, 0),
            puzzle_room_count: DEFAULT_PUZZLE_ROOMS,
            prop_weights: RolePropWeights::default(),
            rug_max_radius: DEFAULT_RUG_MAX_RADIUS,
            rug_seed_chance: DEFAULT_RUG_SEED_CHANCE,
            reserved: CellSet::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a JSON document and validate it
    ///
    /// Missing fields take their default values.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The bounding region
    pub fn region(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.width, self.height)
    }

    /// Reject configurations that cannot produce a usable level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_room_width <= 0 || self.min_room_height <= 0 {
            return Err(ConfigError::InvalidMinimumSize {
                min_width: self.min_room_width,
                min_height: self.min_room_height,
            });
        }

        if self.width < self.min_room_width || self.height < self.min_room_height {
            return Err(ConfigError::RegionTooSmall {
                width: self.width,
                height: self.height,
                min_width: self.min_room_width,
                min_height: self.min_room_height,
            });
        }

        let min_side = self.min_room_width.min(self.min_room_height);
        if self.room_offset < 0 || 2 * self.room_offset >= min_side {
            return Err(ConfigError::OffsetTooLarge {
                offset: self.room_offset,
                min_width: self.min_room_width,
                min_height: self.min_room_height,
            });
        }

        for (name, value) in [
            ("loop_edge_chance", self.loop_edge_chance),
            ("rug_seed_chance", self.rug_seed_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if let Some(role) = self.prop_weights.invalid_role() {
            return Err(ConfigError::InvalidWeights { role: role.name() });
        }

        if self.shape_mode == RoomShapeMode::Organic {
            let walk = &self.random_walk;
            if walk.walkers == 0 || walk.iterations == 0 || walk.walk_length == 0 {
                return Err(ConfigError::InvalidWalk);
            }
        }

        Ok(())
    }
}
