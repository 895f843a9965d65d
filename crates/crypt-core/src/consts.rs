//! Generation tuning constants
//!
//! Defaults for the configuration live here so that tests and the config
//! layer agree on them.

/// Default bounding region
pub const DEFAULT_WIDTH: i32 = 70;
pub const DEFAULT_HEIGHT: i32 = 70;

/// Default minimum leaf size for space partitioning
pub const DEFAULT_MIN_ROOM_WIDTH: i32 = 14;
pub const DEFAULT_MIN_ROOM_HEIGHT: i32 = 14;

/// Default inset between a partition leaf and its floor
pub const DEFAULT_ROOM_OFFSET: i32 = 1;

/// Chance that a non-MST edge becomes a loop corridor
pub const LOOP_EDGE_CHANCE: f64 = 0.5;

/// Non-MST edges at or beyond this length never become loops
pub const LOOP_EDGE_MAX_DISTANCE: f64 = 25.0;

/// Largest side of a puzzle room's square floor
pub const MAX_PUZZLE_ROOM_SIZE: i32 = 10;

/// Default number of puzzle rooms
pub const DEFAULT_PUZZLE_ROOMS: usize = 2;

/// Random walk defaults for organic rooms
pub const DEFAULT_WALK_ITERATIONS: u32 = 10;
pub const DEFAULT_WALK_LENGTH: u32 = 10;

/// Rug clusters stop growing at this distance from their seed
pub const DEFAULT_RUG_MAX_RADIUS: u32 = 2;

/// Chance that a room gets a seeded rug cell
pub const DEFAULT_RUG_SEED_CHANCE: f64 = 0.6;

/// Weight multiplier applied to the seeded rug cell
pub const RUG_SEED_BOOST: f32 = 50.0;

/// Weight multiplier applied to rug neighbors while a cluster grows
pub const RUG_GROWTH_BOOST: f32 = 8.0;
