//! crypt-core: procedural dungeon generation
//!
//! Builds a seeded 2D grid level: space partitioning into rooms, corridor
//! graph, room role classification, role-driven room shapes and decorative
//! prop placement. No I/O; a `DungeonLayout` is returned for the caller to
//! render or populate.
//!
//! ```no_run
//! use crypt_core::{DungeonGenerator, GeneratorConfig};
//!
//! let config = GeneratorConfig { seed: 42, ..Default::default() };
//! let layout = DungeonGenerator::from_config(config)?.generate()?;
//! println!("{}", layout.render_ascii());
//! # Ok::<(), crypt_core::GenerationError>(())
//! ```

pub mod config;
pub mod consts;
pub mod dungeon;
pub mod error;
pub mod props;
mod rng;

pub use config::{GeneratorConfig, RandomWalkParams, RoomShapeMode};
pub use dungeon::{
    Cell, CellSet, DungeonGenerator, DungeonLayout, Rect, Room, RoomConsumer, RoomId, RoomRole,
};
pub use error::{ConfigError, GenerationError};
pub use props::{PropType, PropWeights, RolePropWeights};
pub use rng::DungeonRng;
