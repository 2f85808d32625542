//! Read-only render surface
//!
//! A renderer never touches [`GameState`] directly. It takes a
//! [`RenderSnapshot`] once per frame: GPU-ready instance records for balls,
//! light zones and ghost memories, plus the HUD fields.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::light::{self, remaining_intensity};
use crate::sim::{GameState, Side, TurnPhase};

/// Ball flags packed into `BallInstance::flags`
pub mod ball_flags {
    pub const CUE: u32 = 1;
    pub const SINKING: u32 = 1 << 1;
    /// Above the visibility threshold
    pub const VISIBLE: u32 = 1 << 2;
}

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct FrameGlobals {
    pub table_min: [f32; 2], // offset 0
    pub table_max: [f32; 2], // offset 8
    pub time: f32,           // offset 16
    pub screen_shake: f32,   // offset 20
    pub chromatic: f32,      // offset 24
    pub ball_count: u32,     // offset 28
    pub light_count: u32,    // offset 32
    pub ghost_count: u32,    // offset 36
    pub cue_light_radius: f32,
    pub _pad: u32, // pad to 48 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct BallInstance {
    pub pos: [f32; 2],
    pub vel: [f32; 2],
    pub radius: f32,
    /// Light level at the ball centre (0-1)
    pub light: f32,
    pub squash: f32,
    pub sink_scale: f32,
    pub id: u32,
    pub flags: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct LightInstance {
    pub pos: [f32; 2],
    pub radius: f32,
    /// Intensity after fading
    pub intensity: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct GhostInstance {
    pub pos: [f32; 2],
    pub ball_id: u32,
    /// Rounds since the memory was refreshed
    pub age: u32,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub globals: FrameGlobals,
    /// Alive balls, including ones dropping into a pocket
    pub balls: Vec<BallInstance>,
    pub lights: Vec<LightInstance>,
    pub ghosts: Vec<GhostInstance>,
    /// Cue trail, newest first
    pub cue_trail: Vec<[f32; 2]>,
    pub turn: Side,
    pub phase: TurnPhase,
    pub round: u32,
    pub rounds: u32,
    pub player_score: i32,
    pub ai_score: i32,
    pub recon_available: bool,
    pub ai_thinking: bool,
    pub banner: Option<String>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let threshold = state.tuning.light_threshold;

        let balls: Vec<BallInstance> = state
            .balls
            .iter()
            .filter(|b| b.alive || b.sinking)
            .map(|b| {
                let level = if b.in_play() {
                    light::light_level(state, b.pos)
                } else {
                    0.0
                };
                let fx = state.fx.balls.get(b.id as usize).copied().unwrap_or_default();
                let mut flags = 0;
                if b.is_cue() {
                    flags |= ball_flags::CUE;
                }
                if b.sinking {
                    flags |= ball_flags::SINKING;
                }
                if level > threshold {
                    flags |= ball_flags::VISIBLE;
                }
                BallInstance {
                    pos: b.pos.to_array(),
                    vel: b.vel.to_array(),
                    radius: b.radius,
                    light: level,
                    squash: fx.squash,
                    sink_scale: fx.sink_scale,
                    id: b.id,
                    flags,
                }
            })
            .collect();

        let duration = state.tuning.trail_duration;
        let lights: Vec<LightInstance> = state
            .zones
            .iter()
            .map(|z| LightInstance {
                pos: z.pos.to_array(),
                radius: z.radius,
                intensity: remaining_intensity(z, state.time, duration),
            })
            .filter(|l| l.intensity > 0.0)
            .collect();

        let ghosts: Vec<GhostInstance> = state
            .ghosts
            .iter()
            .map(|g| GhostInstance {
                pos: g.pos.to_array(),
                ball_id: g.ball_id,
                age: state.round.saturating_sub(g.round),
            })
            .collect();

        let table = &state.table;
        let globals = FrameGlobals {
            table_min: [table.left, table.top],
            table_max: [table.right, table.bottom],
            time: state.time,
            screen_shake: state.fx.shake,
            chromatic: state.fx.chromatic,
            ball_count: balls.len() as u32,
            light_count: lights.len() as u32,
            ghost_count: ghosts.len() as u32,
            cue_light_radius: state.tuning.cue_light_radius,
            _pad: 0,
        };

        Self {
            globals,
            balls,
            lights,
            ghosts,
            cue_trail: state.cue().trail.iter().map(|t| t.pos.to_array()).collect(),
            turn: state.turn,
            phase: state.phase,
            round: state.round.min(state.tuning.rounds),
            rounds: state.tuning.rounds,
            player_score: state.scores.player,
            ai_score: state.scores.ai,
            recon_available: !*state.recon_used.get(state.turn),
            ai_thinking: state.ai_thinking,
            banner: state.banner.as_ref().map(|b| b.text.clone()),
        }
    }

    /// Ball instances as raw bytes for a GPU buffer
    pub fn ball_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.balls)
    }

    pub fn light_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lights)
    }

    pub fn globals_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.globals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::LightSource;

    #[test]
    fn test_gpu_record_sizes() {
        assert_eq!(std::mem::size_of::<FrameGlobals>(), 48);
        assert_eq!(std::mem::size_of::<BallInstance>(), 40);
        assert_eq!(std::mem::size_of::<LightInstance>(), 16);
        assert_eq!(std::mem::size_of::<GhostInstance>(), 16);
    }

    #[test]
    fn test_capture_fresh_rack() {
        let state = GameState::new(6);
        let snap = RenderSnapshot::capture(&state);
        assert_eq!(snap.balls.len(), 8);
        assert_eq!(snap.globals.ball_count, 8);
        assert_eq!(snap.ball_bytes().len(), 8 * 40);
        assert_eq!(snap.turn, Side::Player);
        assert_eq!(snap.round, 1);
        assert!(snap.recon_available);

        let cue = snap.balls[0];
        assert_eq!(cue.flags & ball_flags::CUE, ball_flags::CUE);
        assert_eq!(cue.flags & ball_flags::VISIBLE, ball_flags::VISIBLE);
        // Rack starts in the dark
        assert!(
            snap.balls[1..]
                .iter()
                .all(|b| b.flags & ball_flags::VISIBLE == 0)
        );
    }

    #[test]
    fn test_capture_lights_and_removed_balls() {
        let mut state = GameState::new(6);
        state.balls[4].alive = false;
        let pos = state.balls[2].pos;
        light::deposit(&mut state, pos, 40.0, LightSource::Recon);
        let snap = RenderSnapshot::capture(&state);

        assert_eq!(snap.balls.len(), 7);
        assert!(snap.balls.iter().all(|b| b.id != 4));
        assert_eq!(snap.lights.len(), 1);
        assert_eq!(snap.light_bytes().len(), 16);
        let lit = snap.balls.iter().find(|b| b.id == 2).unwrap();
        assert!(lit.flags & ball_flags::VISIBLE != 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(6);
        let json = serde_json::to_string(&RenderSnapshot::capture(&state)).unwrap();
        assert!(json.contains("\"phase\":\"Aim\""));
    }
}
