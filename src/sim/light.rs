//! Visibility model
//!
//! The table is dark. Light comes from the cue ball itself and from fading
//! zones it leaves behind (or a recon scan drops). Light does not stack: the
//! brightest source at a point wins.

use glam::Vec2;

use super::state::{GameState, LightSource, LightZone};

/// Linear radial falloff: 1 at the centre, 0 at `radius`
#[inline]
fn falloff(p: Vec2, center: Vec2, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - p.distance(center) / radius).max(0.0)
}

/// Fraction of a zone's intensity left at `now` (1 fresh, 0 expired)
#[inline]
pub fn fade(zone: &LightZone, now: f32, duration: f32) -> f32 {
    let age = now - zone.created_at;
    if age >= duration || duration <= 0.0 {
        0.0
    } else {
        (1.0 - age.max(0.0) / duration).clamp(0.0, 1.0)
    }
}

/// Zone intensity left at `now`
#[inline]
pub fn remaining_intensity(zone: &LightZone, now: f32, duration: f32) -> f32 {
    zone.intensity * fade(zone, now, duration)
}

/// Light contributed by the cue ball alone
pub fn cue_light(state: &GameState, p: Vec2) -> f32 {
    let cue = state.cue();
    if !cue.in_play() {
        return 0.0;
    }
    falloff(p, cue.pos, state.tuning.cue_light_radius)
}

/// Brightest residual zone at `p`
pub fn zone_light(state: &GameState, p: Vec2) -> f32 {
    let duration = state.tuning.trail_duration;
    state
        .zones
        .iter()
        .map(|z| falloff(p, z.pos, z.radius) * remaining_intensity(z, state.time, duration))
        .fold(0.0, f32::max)
}

/// Light level at `p` in [0, 1]
pub fn light_level(state: &GameState, p: Vec2) -> f32 {
    let cue = cue_light(state, p);
    if cue > 0.0 {
        return cue;
    }
    zone_light(state, p).min(1.0)
}

/// Light level at a ball's centre
pub fn ball_light(state: &GameState, ball_id: u32) -> f32 {
    state
        .ball(ball_id)
        .map(|b| light_level(state, b.pos))
        .unwrap_or(0.0)
}

/// Add a zone stamped with the current time and round
pub fn deposit(state: &mut GameState, pos: Vec2, radius: f32, source: LightSource) {
    state.zones.push(LightZone {
        pos,
        radius,
        intensity: 1.0,
        round: state.round,
        created_at: state.time,
        source,
    });
}

/// Drop zones whose glow has run out
pub fn expire_zones(state: &mut GameState) {
    let now = state.time;
    let duration = state.tuning.trail_duration;
    state.zones.retain(|z| now - z.created_at < duration);
}

/// Drop zones and ghost memories from more than `memory_rounds` rounds ago
pub fn forget_old_rounds(state: &mut GameState) {
    let round = state.round;
    let keep = state.tuning.memory_rounds;
    state.zones.retain(|z| round.saturating_sub(z.round) <= keep);
    state.ghosts.retain(|g| round.saturating_sub(g.round) <= keep);
}

/// Remember where every lit ball was last seen
pub fn refresh_last_lit(state: &mut GameState) {
    let threshold = state.tuning.light_threshold;
    let lit: Vec<(usize, Vec2)> = state
        .balls
        .iter()
        .enumerate()
        .filter(|(_, b)| b.in_play() && light_level(state, b.pos) > threshold)
        .map(|(i, b)| (i, b.pos))
        .collect();
    for (i, pos) in lit {
        state.balls[i].last_lit = pos;
    }
}
