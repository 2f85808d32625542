//! Blind Break - billiards in the dark
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, visibility, turn rules, AI)
//! - `tuning`: Data-driven game balance
//! - `stats`: Per-match statistics
//! - `render`: Read-only snapshot for renderers

pub mod render;
pub mod sim;
pub mod stats;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use render::RenderSnapshot;
pub use stats::MatchStats;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (120 Hz sub-steps)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Velocities are expressed in units per tick of this rate
    pub const REFERENCE_HZ: f32 = 60.0;

    /// Playing field (inside the cushions)
    pub const TABLE_LEFT: f32 = 60.0;
    pub const TABLE_TOP: f32 = 60.0;
    pub const TABLE_RIGHT: f32 = 740.0;
    pub const TABLE_BOTTOM: f32 = 440.0;
    /// A ball whose centre comes this close to a pocket centre drops
    pub const POCKET_SINK_RADIUS: f32 = 18.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Number of object balls in the rack
    pub const OBJECT_BALLS: u32 = 7;

    /// Per-reference-tick velocity retention
    pub const FRICTION: f32 = 0.985;
    /// Below this speed a ball snaps to rest
    pub const MIN_SPEED: f32 = 0.05;
    pub const WALL_RESTITUTION: f32 = 0.75;
    pub const BALL_RESTITUTION: f32 = 0.94;
    /// Collision impulse that shakes the camera
    pub const SHAKE_IMPULSE: f32 = 6.0;
    /// Collision impulse that also flashes chromatic aberration
    pub const CHROMATIC_IMPULSE: f32 = 11.0;
    pub const SINK_DURATION: f32 = 0.4;
    pub const SCRATCH_RESPAWN_DELAY: f32 = 1.2;

    /// Moving faster than this leaves trail samples and light
    pub const TRAIL_SPEED: f32 = 0.5;
    /// Maximum trail samples per ball
    pub const TRAIL_LENGTH: usize = 4;
    /// Manhattan travel between cue-ball light deposits
    pub const LIGHT_DEPOSIT_SPACING: f32 = 8.0;
    pub const TRAIL_ZONE_RADIUS: f32 = 55.0;
    /// Seconds a light zone keeps glowing
    pub const TRAIL_DURATION: f32 = 4.0;
    pub const CUE_LIGHT_RADIUS: f32 = 95.0;
    /// Light at or below this counts as darkness
    pub const LIGHT_THRESHOLD: f32 = 0.1;
    /// Zones and ghosts older than this many rounds are forgotten
    pub const MEMORY_ROUNDS: u32 = 2;

    /// Turn rules
    pub const ROUNDS: u32 = 7;
    pub const SETTLE_DELAY: f32 = 0.5;
    pub const CORNER_MARGIN: f32 = 28.0;
    pub const CORNER_NUDGE: f32 = 24.0;
    pub const REMINDER_DELAY: f32 = 1.5;
    pub const BANNER_DURATION: f32 = 2.5;

    /// Shot strength range (units per reference tick)
    pub const MIN_SHOT_SPEED: f32 = 3.0;
    pub const MAX_SHOT_SPEED: f32 = 22.0;
    /// Shots above this power fraction kick the camera
    pub const STRONG_SHOT_POWER: f32 = 0.8;

    /// Recon scan
    pub const RECON_BEAM_DURATION: f32 = 0.8;
    pub const RECON_SPREAD_DEG: f32 = 18.0;
    pub const RECON_LENGTH: f32 = 320.0;
    pub const RECON_STEP: f32 = 40.0;
    /// Most sample points a single recon beam may walk
    pub const MAX_RECON_SAMPLES: u32 = 64;
    pub const RECON_ZONE_RADIUS: f32 = 45.0;

    /// AI
    pub const AI_THINK_DELAY: f32 = 1.0;
    pub const AI_VISIBILITY_THRESHOLD: f32 = 0.1;
    pub const AI_GHOST_VARIANCE_DEG: f32 = 8.0;
    pub const AI_PROBE_VARIANCE_DEG: f32 = 15.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Absolute angular difference, wrapped to [0, π]
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Unit vector pointing along `theta`
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_angle_between_takes_short_way() {
        let d = angle_between(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);
    }
}
