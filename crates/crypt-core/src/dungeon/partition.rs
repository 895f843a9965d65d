//! Binary space partitioning of the dungeon region
//!
//! Rectangles are split breadth-first. A rectangle is only split along an
//! axis where it is at least twice the minimum size, at a random interior
//! offset. Rectangles that can no longer be split become rooms.
//!
//! Split offsets are uniform over the whole axis, so one side of a split may
//! end up smaller than the minimum. Such pieces are dropped when they are
//! dequeued, which means the room count varies from seed to seed.

use std::collections::VecDeque;

use log::debug;

use crate::rng::DungeonRng;

use super::rect::Rect;

/// Splits a region into room-sized leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacePartitioner {
    pub min_width: i32,
    pub min_height: i32,
}

impl SpacePartitioner {
    pub fn new(min_width: i32, min_height: i32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    /// Partition `region` into leaf rectangles, in emission order
    pub fn partition(&self, region: Rect, rng: &mut DungeonRng) -> Vec<Rect> {
        let mut queue = VecDeque::new();
        let mut leaves = Vec::new();
        let mut dropped = 0usize;
        queue.push_back(region);

        while let Some(rect) = queue.pop_front() {
            if rect.width < self.min_width || rect.height < self.min_height {
                dropped += 1;
                continue;
            }

            let can_split_h = rect.height >= self.min_height * 2;
            let can_split_v = rect.width >= self.min_width * 2;

            // Coin flip picks which axis is tried first
            let horizontal_first = rng.chance(0.5);
            let split = if horizontal_first {
                if can_split_h {
                    Some(split_horizontally(rect, rng))
                } else if can_split_v {
                    Some(split_vertically(rect, rng))
                } else {
                    None
                }
            } else if can_split_v {
                Some(split_vertically(rect, rng))
            } else if can_split_h {
                Some(split_horizontally(rect, rng))
            } else {
                None
            };

            match split {
                Some((a, b)) => {
                    queue.push_back(a);
                    queue.push_back(b);
                }
                None => leaves.push(rect),
            }
        }

        debug!(
            "partitioned {}x{} region into {} rooms ({} undersized pieces dropped)",
            region.width,
            region.height,
            leaves.len(),
            dropped
        );
        leaves
    }
}

/// Split into left and right halves at a random column
fn split_vertically(rect: Rect, rng: &mut DungeonRng) -> (Rect, Rect) {
    let x_split = rng.range(1, rect.width);
    (
        Rect::new(rect.x, rect.y, x_split, rect.height),
        Rect::new(rect.x + x_split, rect.y, rect.width - x_split, rect.height),
    )
}

/// Split into top and bottom halves at a random row
fn split_horizontally(rect: Rect, rng: &mut DungeonRng) -> (Rect, Rect) {
    let y_split = rng.range(1, rect.height);
    (
        Rect::new(rect.x, rect.y, rect.width, y_split),
        Rect::new(rect.x, rect.y + y_split, rect.width, rect.height - y_split),
    )
}
