//! Ball physics integrator
//!
//! One call to [`step`] advances every ball in play by `dt` seconds:
//! integrate and damp, emit trail light, bounce off rails, drop into pockets,
//! resolve ball pairs, then run pocket-drop timers.

use glam::Vec2;

use super::collision::{ball_pocket_collision, resolve_ball_pair, resolve_walls};
use super::events::{GameEvent, SoundKind, colors};
use super::light;
use super::state::{Deferred, GameState, LightSource, TurnPhase};
use crate::consts::REFERENCE_HZ;

/// Advance all balls by `dt` seconds
pub fn step(state: &mut GameState, dt: f32) {
    let ticks = dt * REFERENCE_HZ;
    let damping = state.tuning.friction.powf(ticks);
    let min_speed = state.tuning.min_speed;
    let trail_speed = state.tuning.trail_speed;
    let wall_restitution = state.tuning.wall_restitution;
    let max_shot_speed = state.tuning.max_shot_speed;

    for i in 0..state.balls.len() {
        if !state.balls[i].in_play() {
            continue;
        }

        // Integration & damping
        let speed = {
            let ball = &mut state.balls[i];
            ball.pos += ball.vel * ticks;
            ball.vel *= damping;
            if ball.speed() < min_speed {
                ball.stop();
            }
            ball.speed()
        };

        // Trail samples and cue light
        if speed > trail_speed {
            state.balls[i].record_trail();
            if state.balls[i].is_cue() {
                emit_cue_light(state);
            }
        }

        // Rails
        let table = &state.table;
        if let Some(hit) = resolve_walls(&mut state.balls[i], table, wall_restitution) {
            let id = state.balls[i].id;
            state.fx.squash(id, hit.impact / max_shot_speed);
            state.push_event(GameEvent::Sound(SoundKind::Cushion));
        }

        // Pockets
        if let Some(pocket) = ball_pocket_collision(state.balls[i].pos, &state.table) {
            sink_ball(state, i, pocket);
        }
    }

    resolve_pairs(state);

    // Pair separation can push a ball back through a rail
    for ball in state.balls.iter_mut().filter(|b| b.in_play()) {
        resolve_walls(ball, &state.table, wall_restitution);
    }

    decay_sinking(state, dt);
    light::refresh_last_lit(state);
}

/// Drop a light zone every few units the cue ball travels
fn emit_cue_light(state: &mut GameState) {
    let pos = state.cue().pos;
    let spacing = state.tuning.light_deposit_spacing;
    let far_enough = state
        .last_deposit
        .is_none_or(|last| (pos - last).abs().element_sum() >= spacing);
    if far_enough {
        let radius = state.tuning.trail_zone_radius;
        light::deposit(state, pos, radius, LightSource::Trail);
        state.last_deposit = Some(pos);
    }
}

/// Sequential impulse pass over every unique pair
fn resolve_pairs(state: &mut GameState) {
    let restitution = state.tuning.ball_restitution;
    let shake_impulse = state.tuning.shake_impulse;
    let chromatic_impulse = state.tuning.chromatic_impulse;
    let max_shot_speed = state.tuning.max_shot_speed;
    let n = state.balls.len();

    for i in 0..n {
        for j in (i + 1)..n {
            if !state.balls[i].in_play() || !state.balls[j].in_play() {
                continue;
            }
            let (head, tail) = state.balls.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            let Some(impulse) = resolve_ball_pair(a, b, restitution) else {
                continue;
            };
            if impulse <= 0.0 {
                continue;
            }

            let (a_id, b_id) = (a.id, b.id);
            let contact = (a.pos + b.pos) * 0.5;
            let squash = impulse / max_shot_speed;
            state.fx.squash(a_id, squash);
            state.fx.squash(b_id, squash);
            state.push_event(GameEvent::Sound(SoundKind::Collision));

            if impulse > shake_impulse {
                state.shake((impulse / max_shot_speed).min(0.5), 0.15);
                state.push_event(GameEvent::VisualBurst {
                    pos: contact,
                    color: colors::SPARK,
                    count: 6,
                });
            }
            if impulse > chromatic_impulse {
                state.fx.chromatic = 0.15;
            }
        }
    }
}

/// Run pocket-drop timers; balls leave play when theirs runs out
fn decay_sinking(state: &mut GameState, dt: f32) {
    let duration = state.tuning.sink_duration;
    for ball in state.balls.iter_mut().filter(|b| b.sinking) {
        ball.sink_timer -= dt;
        if let Some(fx) = state.fx.balls.get_mut(ball.id as usize) {
            fx.sink_scale = (ball.sink_timer / duration).clamp(0.0, 1.0);
        }
        if ball.sink_timer <= 0.0 {
            ball.sink_timer = 0.0;
            ball.sinking = false;
            ball.alive = false;
        }
    }
}

/// A ball entered pocket `pocket`
///
/// The cue ball is a scratch: the shooter loses a point and the cue comes
/// back later. An object ball scores for the shooter.
fn sink_ball(state: &mut GameState, idx: usize, pocket: usize) {
    let pocket_pos = state.table.pockets[pocket].pos;
    let owner = state.turn;
    let sink_duration = state.tuning.sink_duration;

    let ball = &mut state.balls[idx];
    ball.sinking = true;
    ball.sink_timer = sink_duration;
    ball.stop();
    let id = ball.id;

    if ball.is_cue() {
        ball.alive = false;
        *state.scores.get_mut(owner) -= 1;
        state.stats.record_scratch(owner);
        state.cue_scratched_this_turn = true;
        state.push_event(GameEvent::Sound(SoundKind::ScratchBonus));
        state.push_event(GameEvent::ScoreLabel {
            pos: pocket_pos,
            text: "-1".to_string(),
            color: colors::SCRATCH,
        });
        if !state.is_scheduled(|d| matches!(d, Deferred::RespawnCue)) {
            let delay = state.tuning.scratch_respawn_delay;
            state.schedule(delay, Deferred::RespawnCue);
        }
        log::info!("Scratch by {:?} in pocket {}", owner, pocket);
    } else {
        *state.scores.get_mut(owner) += 1;
        state.stats.record_pocket(owner);
        state.pocketed_this_turn = true;
        state.ghosts.retain(|g| g.ball_id != id);
        state.push_event(GameEvent::Sound(SoundKind::Pocket));
        state.push_event(GameEvent::VisualBurst {
            pos: pocket_pos,
            color: colors::SCORE,
            count: 16,
        });
        state.push_event(GameEvent::ScoreLabel {
            pos: pocket_pos,
            text: "+1".to_string(),
            color: colors::SCORE,
        });
        log::info!("{:?} pocketed ball {} in pocket {}", owner, id, pocket);
    }
}

/// Bring a scratched cue ball back to the baulk spot
///
/// Stale timers are ignored: the match must still be running and the cue
/// must still be out of play.
pub fn respawn_cue(state: &mut GameState) {
    if state.phase == TurnPhase::Ended || state.cue().alive {
        log::debug!("Cue respawn skipped");
        return;
    }

    let baulk = state.table.baulk;
    let center = state.table.center();
    let step_dir = (center - baulk).normalize_or(Vec2::X);
    let radius = state.cue().radius;

    // Nudge toward the table centre until clear of other balls
    let mut pos = baulk;
    for _ in 0..32 {
        let blocked = state
            .balls
            .iter()
            .filter(|b| !b.is_cue() && b.in_play())
            .any(|b| b.pos.distance(pos) < b.radius + radius);
        if !blocked {
            break;
        }
        pos = state.table.clamp_inside(pos + step_dir * radius, radius);
    }

    let cue = state.cue_mut();
    cue.pos = pos;
    cue.vel = Vec2::ZERO;
    cue.alive = true;
    cue.sinking = false;
    cue.sink_timer = 0.0;
    cue.last_lit = pos;
    cue.clear_trail();
    if let Some(fx) = state.fx.balls.get_mut(0) {
        fx.sink_scale = 1.0;
    }
    log::debug!("Cue ball respawned at {:?}", pos);
}

/// Every ball in play is motionless and nothing is mid-drop
pub fn all_balls_at_rest(state: &GameState) -> bool {
    let eps = state.tuning.min_speed;
    state
        .balls
        .iter()
        .all(|b| !b.sinking && (!b.alive || b.speed() < eps))
}

/// No object ball is left on the table
pub fn all_object_balls_sunk(state: &GameState) -> bool {
    state.object_balls_in_play().next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::Side;
    use proptest::prelude::*;

    /// Table with only the cue ball and ball 3 in play
    fn sparse_state() -> GameState {
        let mut state = GameState::new(11);
        for ball in state.balls.iter_mut().filter(|b| !b.is_cue() && b.id != 3) {
            ball.alive = false;
        }
        state.balls[3].pos = state.table.center();
        state
    }

    #[test]
    fn test_friction_slows_and_snaps_to_zero() {
        let mut state = sparse_state();
        state.cue_mut().vel = Vec2::new(0.0, 2.0);
        for _ in 0..2000 {
            step(&mut state, SIM_DT);
        }
        assert_eq!(state.cue().vel, Vec2::ZERO);
        assert!(state.cue().trail.is_empty());
        assert!(all_balls_at_rest(&state));
    }

    #[test]
    fn test_slow_ball_snaps_exactly() {
        let mut state = sparse_state();
        state.cue_mut().vel = Vec2::new(0.04, 0.0);
        step(&mut state, SIM_DT);
        assert_eq!(state.cue().vel, Vec2::ZERO);
    }

    #[test]
    fn test_damping_is_frame_rate_independent() {
        let mut a = sparse_state();
        let mut b = sparse_state();
        a.cue_mut().vel = Vec2::new(4.0, 0.0);
        b.cue_mut().vel = Vec2::new(4.0, 0.0);
        step(&mut a, 1.0 / 60.0);
        step(&mut b, 1.0 / 120.0);
        step(&mut b, 1.0 / 120.0);
        assert!((a.cue().vel.x - b.cue().vel.x).abs() < 1e-4);
    }

    #[test]
    fn test_moving_cue_leaves_light_zones() {
        let mut state = sparse_state();
        state.cue_mut().vel = Vec2::new(6.0, 0.0);
        for _ in 0..30 {
            step(&mut state, SIM_DT);
        }
        assert!(state.zones.len() > 3);
        assert!(state.zones.iter().all(|z| z.source == LightSource::Trail));
        assert!(state.cue().trail.len() <= crate::consts::TRAIL_LENGTH);
    }

    #[test]
    fn test_object_ball_pocketed_scores_for_owner() {
        let mut state = sparse_state();
        let corner = state.table.pockets[0].pos;
        state.balls[3].pos = corner + Vec2::new(11.0, 11.0);
        step(&mut state, SIM_DT);

        assert_eq!(state.scores.player, 1);
        assert!(state.pocketed_this_turn);
        assert!(state.balls[3].sinking);
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::ScoreLabel { pos, .. } if *pos == corner
        )));

        for _ in 0..120 {
            step(&mut state, SIM_DT);
        }
        assert!(!state.balls[3].alive);
        assert!(!state.balls[3].sinking);
        assert!(all_object_balls_sunk(&state));
    }

    #[test]
    fn test_scratch_penalizes_and_schedules_respawn() {
        let mut state = sparse_state();
        state.turn = Side::Ai;
        let corner = state.table.pockets[3].pos;
        state.cue_mut().pos = corner - Vec2::new(11.0, 11.0);
        step(&mut state, SIM_DT);

        assert_eq!(state.scores.ai, -1);
        assert_eq!(state.stats.ai.scratches, 1);
        assert!(state.cue_scratched_this_turn);
        assert!(!state.cue().alive);
        assert!(state.is_scheduled(|d| matches!(d, Deferred::RespawnCue)));
    }

    #[test]
    fn test_respawn_skipped_when_revived_or_ended() {
        let mut state = sparse_state();
        state.cue_mut().alive = false;
        state.phase = TurnPhase::Ended;
        respawn_cue(&mut state);
        assert!(!state.cue().alive);

        state.phase = TurnPhase::Aim;
        state.cue_mut().vel = Vec2::new(3.0, -2.0);
        respawn_cue(&mut state);
        assert!(state.cue().alive);
        assert_eq!(state.cue().pos, state.table.baulk);
        assert_eq!(state.cue().vel, Vec2::ZERO);
    }

    #[test]
    fn test_respawn_nudges_off_occupied_spot() {
        let mut state = sparse_state();
        let baulk = state.table.baulk;
        state.balls[3].pos = baulk;
        state.cue_mut().alive = false;
        respawn_cue(&mut state);
        let cue = state.cue();
        assert!(cue.pos.distance(state.balls[3].pos) >= cue.radius * 2.0);
        assert!(cue.pos.x > baulk.x);
    }

    #[test]
    fn test_collision_emits_sound() {
        let mut state = sparse_state();
        let target = state.balls[3].pos;
        state.cue_mut().pos = target - Vec2::new(30.0, 0.0);
        state.cue_mut().vel = Vec2::new(8.0, 0.0);
        for _ in 0..20 {
            step(&mut state, SIM_DT);
        }
        assert!(state.balls[3].vel.x > 0.0);
        assert!(
            state
                .events
                .iter()
                .any(|e| *e == GameEvent::Sound(SoundKind::Collision))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn balls_stay_on_the_cloth(
            angle in 0.0f32..std::f32::consts::TAU,
            speed in 1.0f32..22.0,
            seed in 0u64..64,
        ) {
            let mut state = GameState::new(seed);
            state.cue_mut().vel = crate::direction(angle) * speed;
            for _ in 0..600 {
                step(&mut state, SIM_DT);
                for ball in state.balls.iter().filter(|b| b.in_play()) {
                    let r = ball.radius;
                    let t = &state.table;
                    prop_assert!(ball.pos.x >= t.left + r - 1e-3 && ball.pos.x <= t.right - r + 1e-3);
                    prop_assert!(ball.pos.y >= t.top + r - 1e-3 && ball.pos.y <= t.bottom - r + 1e-3);
                }
            }
        }
    }
}
