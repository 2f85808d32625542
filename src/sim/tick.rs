//! Fixed timestep simulation tick
//!
//! [`advance`] is the only entry point the host calls per frame. It slices the
//! frame into fixed sub-steps and runs, per sub-step: clock, deferred work,
//! integrator, zone expiry, settle check, presentation decay.

use super::ai;
use super::events::GameEvent;
use super::light;
use super::physics::{self, all_balls_at_rest};
use super::shot;
use super::state::{Deferred, GameState, TurnPhase};
use super::turn;
use crate::consts::{MAX_SUBSTEPS, REFERENCE_HZ, SIM_DT};

/// Advance the match by a frame delta (seconds)
///
/// Deltas longer than `MAX_SUBSTEPS` fixed steps are truncated so a stalled
/// host does not trigger a catch-up spiral.
pub fn advance(state: &mut GameState, frame_dt: f32) {
    if frame_dt.is_nan() || frame_dt <= 0.0 {
        return;
    }
    let dt = frame_dt.min(SIM_DT * MAX_SUBSTEPS as f32);
    let steps = (dt / SIM_DT).ceil().max(1.0) as u32;
    let step_dt = dt / steps as f32;
    for _ in 0..steps {
        tick(state, step_dt);
    }
}

/// Advance the game state by one sub-step
pub fn tick(state: &mut GameState, dt: f32) {
    decay_presentation(state, dt);
    if state.phase == TurnPhase::Ended {
        return;
    }

    state.time += dt;
    state.time_ticks += 1;

    run_due(state);

    if state.phase == TurnPhase::Rolling || !all_balls_at_rest(state) {
        physics::step(state, dt);
    }
    light::expire_zones(state);
    turn::update(state, dt);
}

/// Fire every scheduled action whose deadline has passed, earliest first
fn run_due(state: &mut GameState) {
    loop {
        let now = state.time;
        let next = state
            .scheduled
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due))
            .map(|(i, _)| i);
        let Some(idx) = next else {
            break;
        };
        let action = state.scheduled.remove(idx).action;
        dispatch(state, action);
    }
}

fn dispatch(state: &mut GameState, action: Deferred) {
    match action {
        Deferred::RespawnCue => physics::respawn_cue(state),
        Deferred::ReconDeposit {
            side,
            origin,
            angle,
        } => shot::deposit_recon(state, side, origin, angle),
        Deferred::AiThink => ai::take_turn(state),
        Deferred::ScoringReminder => {
            if state.pocketed_this_turn || state.phase == TurnPhase::Ended {
                log::debug!("Scoring reminder suppressed");
            } else {
                state.push_event(GameEvent::ScoringReminder);
            }
        }
    }
}

/// Squash, shake, chromatic flash and banner all run down with real time
fn decay_presentation(state: &mut GameState, dt: f32) {
    let ticks = dt * REFERENCE_HZ;

    for fx in &mut state.fx.balls {
        fx.squash *= 0.85f32.powf(ticks);
        if fx.squash < 0.01 {
            fx.squash = 0.0;
        }
    }

    state.fx.shake *= 0.9f32.powf(ticks);
    if state.fx.shake < 0.01 {
        state.fx.shake = 0.0;
    }

    state.fx.chromatic = (state.fx.chromatic - dt).max(0.0);

    if let Some(banner) = &mut state.banner {
        banner.remaining -= dt;
        if banner.remaining <= 0.0 {
            state.banner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ai::set_autopilot;
    use crate::sim::shot::fire_shot;
    use crate::sim::state::Side;
    use crate::heading;
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(state: &mut GameState, seconds: f32) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            advance(state, FRAME);
        }
    }

    #[test]
    fn test_advance_splits_into_fixed_steps() {
        let mut state = GameState::new(1);
        advance(&mut state, FRAME);
        assert_eq!(state.time_ticks, 2);
        assert!((state.time - FRAME).abs() < 1e-6);
    }

    #[test]
    fn test_advance_caps_long_frames() {
        let mut state = GameState::new(1);
        advance(&mut state, 5.0);
        assert_eq!(state.time_ticks, MAX_SUBSTEPS as u64);
        assert!(state.time <= SIM_DT * MAX_SUBSTEPS as f32 + 1e-6);

        advance(&mut state, 0.0);
        advance(&mut state, f32::NAN);
        advance(&mut state, -1.0);
        assert_eq!(state.time_ticks, MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_scheduled_actions_fire_in_deadline_order() {
        let mut state = GameState::new(1);
        state.cue_mut().alive = false;
        state.schedule(0.05, Deferred::ScoringReminder);
        state.schedule(0.01, Deferred::RespawnCue);
        advance(&mut state, 0.1);
        assert!(state.scheduled.is_empty());
        assert!(state.cue().alive);
        assert!(state.events.contains(&GameEvent::ScoringReminder));
    }

    #[test]
    fn test_reminder_suppressed_after_a_pot() {
        let mut state = GameState::new(1);
        state.pocketed_this_turn = true;
        state.schedule(0.0, Deferred::ScoringReminder);
        advance(&mut state, FRAME);
        assert!(!state.events.contains(&GameEvent::ScoringReminder));
    }

    #[test]
    fn test_scratch_respawns_cue_and_passes_turn() {
        let mut state = GameState::new(3);
        for ball in state.balls.iter_mut().filter(|b| !b.is_cue() && b.id != 7) {
            ball.alive = false;
        }
        let corner = state.table.pockets[0].pos;
        state.cue_mut().pos = corner + Vec2::new(40.0, 40.0);
        let angle = heading(state.cue().pos, corner);
        fire_shot(&mut state, Side::Player, angle, 0.3).unwrap();

        run(&mut state, 0.5);
        assert_eq!(state.scores.player, -1);
        assert!(!state.cue().alive);

        run(&mut state, 1.0);
        assert!(state.cue().alive);
        assert_eq!(state.cue().pos, state.table.baulk);
        assert_eq!(state.cue().vel, Vec2::ZERO);
        assert_eq!(state.turn, Side::Ai);
        assert_eq!(state.phase, TurnPhase::Aim);
        assert!(state.ai_thinking);
        assert_eq!(state.stats.player.scratches, 1);
    }

    #[test]
    fn test_presentation_decays() {
        let mut state = GameState::new(1);
        state.fx.squash(3, 0.8);
        state.shake(0.6, 0.2);
        state.fx.chromatic = 0.15;
        run(&mut state, 1.0);
        assert_eq!(state.fx.balls[3].squash, 0.0);
        assert_eq!(state.fx.shake, 0.0);
        assert_eq!(state.fx.chromatic, 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        set_autopilot(&mut a, true);
        set_autopilot(&mut b, true);

        run(&mut a, 30.0);
        run(&mut b, 30.0);

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.round, b.round);
        let pos_a: Vec<Vec2> = a.balls.iter().map(|x| x.pos).collect();
        let pos_b: Vec<Vec2> = b.balls.iter().map(|x| x.pos).collect();
        assert_eq!(pos_a, pos_b);
    }

    #[test]
    fn test_autopilot_match_runs_to_the_end() {
        let mut state = GameState::new(2024);
        set_autopilot(&mut state, true);

        let mut elapsed = 0.0;
        while !state.is_over() && elapsed < 900.0 {
            advance(&mut state, FRAME);
            elapsed += FRAME;
        }

        let outcome = state.outcome.expect("match should finish");
        assert!(outcome.cleared || state.round > state.tuning.rounds);
        for side in [Side::Player, Side::Ai] {
            let s = state.stats.side(side);
            assert_eq!(
                *state.scores.get(side),
                s.lit_pockets as i32 - s.scratches as i32
            );
        }
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::MatchEnded(_)))
        );
    }
}
