//! Static table layout: playing field, pockets, spots

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A pocket opening
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub pos: Vec2,
    /// Ball centres within this distance drop
    pub sink_radius: f32,
}

/// Table geometry (never mutated during a match)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Four corners, then the two side pockets (top, bottom)
    pub pockets: [Pocket; 6],
    /// Cue ball start and scratch respawn point
    pub baulk: Vec2,
    /// Front ball of the rack
    pub rack_apex: Vec2,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(TABLE_LEFT, TABLE_TOP, TABLE_RIGHT, TABLE_BOTTOM, POCKET_SINK_RADIUS)
    }
}

impl Table {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32, sink_radius: f32) -> Self {
        let mid_x = (left + right) * 0.5;
        let mid_y = (top + bottom) * 0.5;
        let width = right - left;
        let pocket = |x: f32, y: f32| Pocket {
            pos: Vec2::new(x, y),
            sink_radius,
        };
        Self {
            left,
            top,
            right,
            bottom,
            pockets: [
                pocket(left, top),
                pocket(right, top),
                pocket(left, bottom),
                pocket(right, bottom),
                pocket(mid_x, top),
                pocket(mid_x, bottom),
            ],
            baulk: Vec2::new(left + width * 0.25, mid_y),
            rack_apex: Vec2::new(left + width * 0.68, mid_y),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Whether a point lies on the cloth
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Clamp a ball centre so the ball stays on the cloth
    pub fn clamp_inside(&self, p: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left + radius, self.right - radius),
            p.y.clamp(self.top + radius, self.bottom - radius),
        )
    }

    /// Index of the pocket whose sink radius contains `p`, nearest first
    pub fn nearest_pocket(&self, p: Vec2) -> Option<usize> {
        self.pockets
            .iter()
            .enumerate()
            .filter(|(_, pocket)| p.distance(pocket.pos) < pocket.sink_radius)
            .min_by(|(_, a), (_, b)| {
                p.distance_squared(a.pos)
                    .partial_cmp(&p.distance_squared(b.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Whether `p` sits within `margin` of two rails at once
    pub fn in_corner(&self, p: Vec2, margin: f32) -> bool {
        let near_x = p.x - self.left < margin || self.right - p.x < margin;
        let near_y = p.y - self.top < margin || self.bottom - p.y < margin;
        near_x && near_y
    }
}
