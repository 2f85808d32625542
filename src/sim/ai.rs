//! AI opponent
//!
//! The planner sees only what the table shows it: balls above the
//! visibility threshold, plus ghost memories of where dark balls were last
//! seen. Priority each turn:
//!
//! 1. scripted recon scan on its chosen round
//! 2. best direct pot among visible balls
//! 3. a nudge toward a remembered ghost
//! 4. a blind probe at the rack apex

use glam::Vec2;
use rand::Rng;

use super::events::GameEvent;
use super::light;
use super::shot::{ShotError, fire_recon, fire_shot};
use super::state::{Deferred, GameState, Side, TurnPhase};
use crate::{angle_between, heading};

/// Aim point sits this many ball radii behind the target (two diameters)
const AIM_OFFSET_RADII: f32 = 4.0;
/// Lateral clearance a blocker needs from the cue line
const CLEARANCE_RADII: f32 = 2.5;
/// Cue distance mapping to full direct-shot power
const POWER_DISTANCE: f32 = 400.0;
/// Retry delay when the cue ball is still off the table
const RETRY_DELAY: f32 = 0.25;

/// A scored pot attempt: one ball into one pocket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotCandidate {
    pub ball_id: u32,
    /// Pocket index into `Table::pockets`
    pub pocket: usize,
    /// Where the cue ball is sent
    pub aim_point: Vec2,
    /// Heading from the cue ball to `aim_point`
    pub angle: f32,
    pub cue_distance: f32,
    pub pocket_distance: f32,
    /// Difference between the cue line and the ball-to-pocket line (radians)
    pub cut_angle: f32,
    /// No visible ball sits near the cue line
    pub path_clear: bool,
    pub score: f32,
    /// Suggested power in [0.2, 0.75]
    pub power: f32,
}

/// What the planner decided to do this turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    Recon { angle: f32 },
    Direct(ShotCandidate),
    Ghost { ball_id: u32, angle: f32, power: f32 },
    Probe { angle: f32, power: f32 },
}

/// Score potting `ball_id` into `pocket`
///
/// `None` when the cue or the target is off the table, or the target sits
/// exactly on the pocket.
pub fn evaluate_candidate(state: &GameState, ball_id: u32, pocket: usize) -> Option<ShotCandidate> {
    let cue = state.cue();
    let ball = state.ball(ball_id)?;
    let pocket_pos = state.table.pockets.get(pocket)?.pos;
    if !cue.in_play() || !ball.in_play() || ball.is_cue() {
        return None;
    }

    let to_pocket = pocket_pos - ball.pos;
    let pocket_distance = to_pocket.length();
    if pocket_distance < 1e-4 {
        return None;
    }
    let pocket_dir = to_pocket / pocket_distance;

    let aim_point = ball.pos - pocket_dir * (ball.radius * AIM_OFFSET_RADII);
    let angle = heading(cue.pos, aim_point);
    let cue_distance = cue.pos.distance(aim_point);
    let cut_angle = angle_between(angle, heading(ball.pos, pocket_pos));
    let path_clear = path_is_clear(state, cue.pos, aim_point, ball_id);

    let mut score = 100.0 - 0.5 * pocket_distance - 200.0 * cut_angle;
    if path_clear {
        score += 500.0;
    }

    Some(ShotCandidate {
        ball_id,
        pocket,
        aim_point,
        angle,
        cue_distance,
        pocket_distance,
        cut_angle,
        path_clear,
        score,
        power: (cue_distance / POWER_DISTANCE).clamp(0.2, 0.75),
    })
}

/// No visible ball other than the target crowds the segment `from -> to`
fn path_is_clear(state: &GameState, from: Vec2, to: Vec2, target: u32) -> bool {
    let seg = to - from;
    let len = seg.length();
    if len < 1e-4 {
        return true;
    }
    let dir = seg / len;
    let clearance = state.cue().radius * CLEARANCE_RADII;
    let threshold = state.tuning.ai_visibility_threshold;

    !state
        .object_balls_in_play()
        .filter(|b| b.id != target)
        .filter(|b| light::light_level(state, b.pos) > threshold)
        .any(|b| {
            let rel = b.pos - from;
            let along = rel.dot(dir);
            along > 0.0 && along < len && rel.perp_dot(dir).abs() < clearance
        })
}

/// Best direct shot over every visible ball and every pocket
pub fn best_direct_shot(state: &GameState) -> Option<ShotCandidate> {
    let threshold = state.tuning.ai_visibility_threshold;
    let pockets = state.table.pockets.len();

    state
        .object_balls_in_play()
        .filter(|b| light::light_level(state, b.pos) > threshold)
        .flat_map(|b| (0..pockets).filter_map(move |p| evaluate_candidate(state, b.id, p)))
        .fold(None, |best: Option<ShotCandidate>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
}

/// Pick this turn's action for `side`
///
/// Consumes randomness only for ghost and probe shots.
pub fn plan(state: &mut GameState, side: Side) -> AiDecision {
    let origin = if state.cue().in_play() {
        state.cue().pos
    } else {
        state.table.baulk
    };

    if side == Side::Ai && !state.recon_used.ai && state.round == state.ai_recon_round {
        return AiDecision::Recon {
            angle: heading(origin, state.table.center()),
        };
    }

    if let Some(best) = best_direct_shot(state) {
        return AiDecision::Direct(best);
    }

    let keep = state.tuning.memory_rounds;
    let round = state.round;
    let ghost = state
        .ghosts
        .iter()
        .find(|g| {
            round.saturating_sub(g.round) <= keep
                && state.ball(g.ball_id).is_some_and(|b| b.in_play())
        })
        .copied();

    if let Some(ghost) = ghost {
        let variance = state.tuning.ghost_variance();
        let angle = heading(origin, ghost.pos) + state.rng.random_range(-variance..=variance);
        let power = state.rng.random_range(0.3..0.6);
        return AiDecision::Ghost {
            ball_id: ghost.ball_id,
            angle,
            power,
        };
    }

    let variance = state.tuning.probe_variance();
    let angle = heading(origin, state.table.rack_apex) + state.rng.random_range(-variance..=variance);
    let power = state.rng.random_range(0.3..0.7);
    AiDecision::Probe { angle, power }
}

/// Begin the visible think delay for the side now on turn
pub fn begin_turn(state: &mut GameState) {
    if state.ai_thinking {
        return;
    }
    state.ai_thinking = true;
    state.push_event(GameEvent::AiThinking);
    let delay = state.tuning.ai_think_delay;
    state.schedule(delay, Deferred::AiThink);
}

/// Think delay elapsed: plan and act for the side on turn
pub fn take_turn(state: &mut GameState) {
    state.ai_thinking = false;
    let side = state.turn;
    if state.phase != TurnPhase::Aim || !state.is_ai_controlled(side) {
        log::debug!("AI think dropped ({:?}, {:?})", state.phase, side);
        return;
    }

    let decision = plan(state, side);
    log::debug!("{:?} AI decision: {:?}", side, decision);

    let result = match decision {
        AiDecision::Recon { angle } => fire_recon(state, side, angle),
        AiDecision::Direct(c) => fire_shot(state, side, c.angle, c.power),
        AiDecision::Ghost { angle, power, .. } | AiDecision::Probe { angle, power } => {
            fire_shot(state, side, angle, power)
        }
    };

    match result {
        Ok(()) => {}
        Err(ShotError::CueNotInPlay) => {
            state.ai_thinking = true;
            state.schedule(RETRY_DELAY, Deferred::AiThink);
        }
        Err(e) => log::warn!("AI shot refused: {e}"),
    }
}

/// Let the planner drive the player side too (demo mode)
pub fn set_autopilot(state: &mut GameState, enabled: bool) {
    state.autopilot = enabled;
    if enabled && state.phase == TurnPhase::Aim {
        begin_turn(state);
    }
}
