//! Turn state machine
//!
//! `Aim -> Rolling -> Resolve -> Aim (other side) | Ended`. The resolve step
//! runs synchronously once every ball has been still for the settle delay.

use glam::Vec2;

use super::ai;
use super::events::{Banner, GameEvent, round_banner};
use super::light;
use super::physics::{all_balls_at_rest, all_object_balls_sunk};
use super::state::{AimState, Deferred, GameState, GhostMarker, MatchOutcome, Side, TurnPhase};

/// Side that opens every match and every round
pub const FIRST_SIDE: Side = Side::Player;

/// Settle check while balls roll
pub fn update(state: &mut GameState, dt: f32) {
    if state.phase != TurnPhase::Rolling {
        return;
    }
    if all_balls_at_rest(state) {
        state.settle_timer += dt;
        if state.settle_timer >= state.tuning.settle_delay {
            resolve_turn(state);
        }
    } else {
        state.settle_timer = 0.0;
    }
}

/// Close out the current turn and hand over (or end the match)
pub fn resolve_turn(state: &mut GameState) {
    state.phase = TurnPhase::Resolve;

    light::forget_old_rounds(state);
    update_ghosts(state);

    if all_object_balls_sunk(state) {
        end_match(state, true);
        return;
    }

    let next = state.turn.other();
    if next == FIRST_SIDE {
        state.round += 1;
        if state.round > state.tuning.rounds {
            end_match(state, false);
            return;
        }
        post_round_banner(state);
    }

    state.turn = next;
    state.aim = AimState::default();
    state.settle_timer = 0.0;
    nudge_cue_from_corner(state);
    state.phase = TurnPhase::Aim;
    state.push_event(GameEvent::TurnStarted(next));
    log::debug!("Round {}: {:?} to play", state.round, next);

    if state.is_ai_controlled(next) {
        ai::begin_turn(state);
    }
}

/// Remember dark balls, forget lit ones
fn update_ghosts(state: &mut GameState) {
    let threshold = state.tuning.light_threshold;
    let round = state.round;

    let seen: Vec<(u32, Vec2, bool)> = state
        .object_balls_in_play()
        .map(|b| (b.id, b.last_lit, light::light_level(state, b.pos) > threshold))
        .collect();

    for (id, last_lit, lit) in seen {
        if lit {
            state.ghosts.retain(|g| g.ball_id != id);
            continue;
        }

        match state.ghosts.iter_mut().find(|g| g.ball_id == id) {
            Some(ghost) => {
                ghost.pos = last_lit;
                ghost.round = round;
            }
            None => {
                state.ghosts.push(GhostMarker {
                    ball_id: id,
                    pos: last_lit,
                    round,
                });
                if !state.reminder_scheduled {
                    state.reminder_scheduled = true;
                    let delay = state.tuning.reminder_delay;
                    state.schedule(delay, Deferred::ScoringReminder);
                }
            }
        }
    }
}

fn post_round_banner(state: &mut GameState) {
    let Some(text) = round_banner(state.round, state.tuning.rounds) else {
        return;
    };
    state.banner = Some(Banner {
        text: text.to_string(),
        remaining: state.tuning.banner_duration,
    });
    state.push_event(GameEvent::Banner(text.to_string()));
    if state.round == state.tuning.rounds {
        state.shake(0.5, 0.6);
    }
    log::info!("Round {}: {}", state.round, text);
}

/// Keep a cue ball resting in a pocket mouth from being re-scratched
fn nudge_cue_from_corner(state: &mut GameState) {
    let margin = state.tuning.corner_margin;
    let nudge = state.tuning.corner_nudge;
    let center = state.table.center();
    let cue = &state.balls[0];
    if !cue.in_play() || !state.table.in_corner(cue.pos, margin) {
        return;
    }
    let radius = cue.radius;
    let target = cue.pos + (center - cue.pos).normalize_or_zero() * nudge;
    let pos = state.table.clamp_inside(target, radius);
    state.cue_mut().pos = pos;
}

fn end_match(state: &mut GameState, cleared: bool) {
    let (player, ai) = (state.scores.player, state.scores.ai);
    let winner = match player.cmp(&ai) {
        std::cmp::Ordering::Greater => Some(Side::Player),
        std::cmp::Ordering::Less => Some(Side::Ai),
        std::cmp::Ordering::Equal => None,
    };
    let outcome = MatchOutcome {
        winner,
        player_score: player,
        ai_score: ai,
        cleared,
    };

    state.phase = TurnPhase::Ended;
    state.outcome = Some(outcome);
    state.ai_thinking = false;
    state.scheduled.retain(|s| !matches!(s.action, Deferred::AiThink));
    state.push_event(GameEvent::MatchEnded(outcome));

    log::info!(
        "Match over after round {}: player {} - ai {} ({})",
        state.round.min(state.tuning.rounds),
        player,
        ai,
        if cleared { "table cleared" } else { "round limit" }
    );
    log::info!("Stats: {}", state.stats.summary());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::LightSource;

    fn rolling(state: &mut GameState) {
        state.phase = TurnPhase::Rolling;
    }

    #[test]
    fn test_settle_delay_needs_continuous_rest() {
        let mut state = GameState::new(9);
        rolling(&mut state);
        let delay = state.tuning.settle_delay;

        update(&mut state, delay * 0.6);
        assert_eq!(state.phase, TurnPhase::Rolling);

        state.balls[2].vel = Vec2::new(1.0, 0.0);
        update(&mut state, 0.01);
        assert_eq!(state.settle_timer, 0.0);
        state.balls[2].vel = Vec2::ZERO;

        update(&mut state, delay * 0.6);
        assert_eq!(state.phase, TurnPhase::Rolling);
        update(&mut state, delay * 0.6);
        assert_eq!(state.phase, TurnPhase::Aim);
        assert_eq!(state.turn, Side::Ai);
    }

    #[test]
    fn test_round_advances_after_both_sides() {
        let mut state = GameState::new(9);
        state.turn = Side::Ai;
        rolling(&mut state);
        resolve_turn(&mut state);
        assert_eq!(state.round, 2);
        assert_eq!(state.turn, Side::Player);
        assert!(state.banner.is_some());
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Banner(_)))
        );
    }

    #[test]
    fn test_ai_turn_starts_thinking() {
        let mut state = GameState::new(9);
        rolling(&mut state);
        resolve_turn(&mut state);
        assert_eq!(state.turn, Side::Ai);
        assert!(state.ai_thinking);
        assert!(state.is_scheduled(|d| matches!(d, Deferred::AiThink)));
    }

    #[test]
    fn test_clearing_the_table_ends_match() {
        let mut state = GameState::new(9);
        state.round = 2;
        for ball in state.balls.iter_mut().filter(|b| !b.is_cue()) {
            ball.alive = false;
        }
        state.scores.player = 4;
        state.scores.ai = 3;
        rolling(&mut state);
        resolve_turn(&mut state);

        assert_eq!(state.phase, TurnPhase::Ended);
        let outcome = state.outcome.unwrap();
        assert!(outcome.cleared);
        assert_eq!(outcome.winner, Some(Side::Player));
    }

    #[test]
    fn test_exhaustion_wins_over_round_limit() {
        let mut state = GameState::new(9);
        state.round = state.tuning.rounds;
        state.turn = Side::Ai;
        for ball in state.balls.iter_mut().filter(|b| !b.is_cue()) {
            ball.alive = false;
        }
        rolling(&mut state);
        resolve_turn(&mut state);
        assert!(state.outcome.unwrap().cleared);
    }

    #[test]
    fn test_round_limit_ends_match() {
        let mut state = GameState::new(9);
        state.round = state.tuning.rounds;
        state.turn = Side::Ai;
        state.scores.ai = 2;
        rolling(&mut state);
        resolve_turn(&mut state);

        assert_eq!(state.phase, TurnPhase::Ended);
        let outcome = state.outcome.unwrap();
        assert!(!outcome.cleared);
        assert_eq!(outcome.winner, Some(Side::Ai));
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::MatchEnded(_)))
        );
    }

    #[test]
    fn test_scratch_alone_never_ends_match() {
        let mut state = GameState::new(9);
        state.cue_mut().alive = false;
        state.cue_scratched_this_turn = true;
        state.scores.player = -1;
        rolling(&mut state);
        resolve_turn(&mut state);
        assert_eq!(state.phase, TurnPhase::Aim);
    }

    #[test]
    fn test_dark_balls_become_ghosts_and_lit_ones_clear() {
        let mut state = GameState::new(9);
        rolling(&mut state);
        resolve_turn(&mut state);

        // Rack is beyond the cue light: every object ball is remembered
        assert_eq!(state.ghosts.len(), 7);
        assert!(state.reminder_scheduled);
        let ghost = *state.ghost(4).unwrap();
        assert_eq!(ghost.pos, state.balls[4].last_lit);

        let pos = state.balls[4].pos;
        light::deposit(&mut state, pos, 50.0, LightSource::Recon);
        rolling(&mut state);
        resolve_turn(&mut state);
        assert!(state.ghost(4).is_none());
        assert_eq!(state.ghosts.len(), 6);
    }

    #[test]
    fn test_ghosts_stay_current_while_ball_is_dark() {
        let mut state = GameState::new(9);
        for _ in 0..8 {
            rolling(&mut state);
            resolve_turn(&mut state);
            if state.is_over() {
                break;
            }
        }
        // Long past the memory window for a ghost stamped in round 1
        assert!(state.round > 1 + state.tuning.memory_rounds);
        assert_eq!(state.ghosts.len(), 7);
        // Stamped during the last resolve, before any round increment
        assert!(state.ghosts.iter().all(|g| g.round + 1 >= state.round));
    }

    #[test]
    fn test_reminder_scheduled_once_per_match() {
        let mut state = GameState::new(9);
        rolling(&mut state);
        resolve_turn(&mut state);
        state.ghosts.clear();
        rolling(&mut state);
        resolve_turn(&mut state);
        let reminders = state
            .scheduled
            .iter()
            .filter(|s| matches!(s.action, Deferred::ScoringReminder))
            .count();
        assert_eq!(reminders, 1);
    }

    #[test]
    fn test_cue_nudged_out_of_corner() {
        let mut state = GameState::new(9);
        let t = &state.table;
        let corner = Vec2::new(t.left + 12.0, t.top + 12.0);
        state.cue_mut().pos = corner;
        rolling(&mut state);
        resolve_turn(&mut state);
        let cue = state.cue().pos;
        assert!(cue.x > corner.x && cue.y > corner.y);
    }

    #[test]
    fn test_final_round_shakes_camera() {
        let mut state = GameState::new(9);
        state.round = state.tuning.rounds - 1;
        state.turn = Side::Ai;
        rolling(&mut state);
        resolve_turn(&mut state);
        assert_eq!(state.round, state.tuning.rounds);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::CameraShake { .. }))
        );
    }
}
