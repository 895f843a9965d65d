//! Generation and configuration errors

use thiserror::Error;

use crate::dungeon::RoomId;

/// Problems with a generator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("region {width}x{height} cannot hold a {min_width}x{min_height} room")]
    RegionTooSmall {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },

    #[error("minimum room size must be positive, got {min_width}x{min_height}")]
    InvalidMinimumSize { min_width: i32, min_height: i32 },

    #[error("room offset {offset} leaves no floor in a {min_width}x{min_height} room")]
    OffsetTooLarge {
        offset: i32,
        min_width: i32,
        min_height: i32,
    },

    #[error("{name} must be within 0..=1, got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("prop weights for {role} rooms must be finite and non-negative")]
    InvalidWeights { role: &'static str },

    #[error("organic rooms need at least one walker, iteration and step")]
    InvalidWalk,

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures that leave a level structurally unusable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("space partitioning produced no rooms")]
    NoRooms,

    #[error("only {found} room(s) produced, at least {required} needed")]
    NotEnoughRooms { found: usize, required: usize },

    #[error("rooms not reachable from the start room: {unreachable:?}")]
    DisconnectedGraph { unreachable: Vec<RoomId> },
}

/// Result alias for generation
pub type Result<T> = core::result::Result<T, GenerationError>;
