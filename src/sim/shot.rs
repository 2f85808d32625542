//! Shot actuator: strikes and recon scans
//!
//! Both intents are only accepted during the aim phase from the side that
//! owns the turn. A rejected intent leaves the state untouched.

use std::fmt;

use glam::Vec2;

use super::events::{GameEvent, SoundKind, colors};
use super::light;
use super::state::{Deferred, GameState, LightSource, Side, TurnPhase};
use crate::direction;

/// Why a shot intent was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotError {
    /// Intents are only taken while aiming
    WrongPhase(TurnPhase),
    /// The other side owns the turn
    NotYourTurn { side: Side, turn: Side },
    /// Scratched cue ball has not come back yet
    CueNotInPlay,
    /// This side already scanned this match
    ReconUsed(Side),
    /// A recon beam is in flight; the turn is spent
    ReconPending,
    /// Angle or power was NaN/infinite
    NonFinite,
}

impl fmt::Display for ShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPhase(phase) => write!(f, "cannot shoot during {phase:?}"),
            Self::NotYourTurn { side, turn } => {
                write!(f, "{side:?} cannot act on {turn:?}'s turn")
            }
            Self::CueNotInPlay => write!(f, "cue ball is not on the table"),
            Self::ReconUsed(side) => write!(f, "{side:?} already used recon"),
            Self::ReconPending => write!(f, "recon scan in progress"),
            Self::NonFinite => write!(f, "angle or power is not a finite number"),
        }
    }
}

impl std::error::Error for ShotError {}

/// Shared admission checks for both intents
fn admit(state: &GameState, side: Side, angle: f32) -> Result<(), ShotError> {
    if state.phase != TurnPhase::Aim {
        return Err(ShotError::WrongPhase(state.phase));
    }
    if side != state.turn {
        return Err(ShotError::NotYourTurn {
            side,
            turn: state.turn,
        });
    }
    if state.aim.recon_pending {
        return Err(ShotError::ReconPending);
    }
    if !angle.is_finite() {
        return Err(ShotError::NonFinite);
    }
    Ok(())
}

/// Per-turn flags cleared when balls start moving
fn begin_rolling(state: &mut GameState) {
    state.phase = TurnPhase::Rolling;
    state.settle_timer = 0.0;
    state.pocketed_this_turn = false;
    state.cue_scratched_this_turn = false;
    state.aim.charging = false;
}

/// Strike the cue ball along `angle` with `power` in [0, 1]
///
/// Power outside the range is clamped.
pub fn fire_shot(state: &mut GameState, side: Side, angle: f32, power: f32) -> Result<(), ShotError> {
    if let Err(e) = admit(state, side, angle) {
        log::debug!("Shot rejected: {e}");
        return Err(e);
    }
    if power.is_nan() {
        return Err(ShotError::NonFinite);
    }
    if !state.cue().in_play() {
        log::debug!("Shot rejected: {}", ShotError::CueNotInPlay);
        return Err(ShotError::CueNotInPlay);
    }

    let power = power.clamp(0.0, 1.0);
    let t = &state.tuning;
    let speed = t.min_shot_speed + (t.max_shot_speed - t.min_shot_speed) * power;
    let strong = power > t.strong_shot_power;

    let cue = state.cue_mut();
    cue.vel = direction(angle) * speed;
    cue.clear_trail();

    begin_rolling(state);
    state.aim.power = power;
    state.stats.record_shot(side);
    state.push_event(GameEvent::Sound(SoundKind::Strike));
    if strong {
        state.shake(0.2 * power, 0.2);
    }

    log::debug!(
        "{:?} shot: angle {:.3} power {:.2} (round {})",
        side,
        angle,
        power,
        state.round
    );
    Ok(())
}

/// Start a recon scan along `angle`
///
/// The beam takes `recon_beam_duration` seconds; the light lands and the
/// turn moves on when [`deposit_recon`] fires.
pub fn fire_recon(state: &mut GameState, side: Side, angle: f32) -> Result<(), ShotError> {
    admit(state, side, angle)?;
    if *state.recon_used.get(side) {
        return Err(ShotError::ReconUsed(side));
    }

    let origin = if state.cue().in_play() {
        state.cue().pos
    } else {
        state.table.baulk
    };
    let duration = state.tuning.recon_beam_duration;

    *state.recon_used.get_mut(side) = true;
    state.aim.recon_pending = true;
    state.aim.recon_mode = false;
    state.stats.record_recon(side);
    state.push_event(GameEvent::ReconBeam {
        origin,
        angle,
        duration,
    });
    state.schedule(
        duration,
        Deferred::ReconDeposit {
            side,
            origin,
            angle,
        },
    );

    log::info!("{:?} recon toward {:.3} rad", side, angle);
    Ok(())
}

/// Sample points of a recon fan: three lobes around `angle`, inside the table
pub fn recon_points(state: &GameState, origin: Vec2, angle: f32) -> Vec<Vec2> {
    let t = &state.tuning;
    let spread = t.recon_spread_deg.to_radians();
    let steps = (t.recon_length / t.recon_step).floor() as u32;

    let mut points = Vec::with_capacity(steps as usize * 3);
    for lobe in [-spread, 0.0, spread] {
        let dir = direction(angle + lobe);
        for s in 1..=steps {
            let p = origin + dir * (s as f32 * t.recon_step);
            if state.table.contains(p) {
                points.push(p);
            }
        }
    }
    points
}

/// Land the recon light and hand the turn to the rolling phase
pub fn deposit_recon(state: &mut GameState, side: Side, origin: Vec2, angle: f32) {
    if state.phase != TurnPhase::Aim || state.turn != side || !state.aim.recon_pending {
        log::debug!("Stale recon deposit dropped");
        return;
    }

    let radius = state.tuning.recon_zone_radius;
    let points = recon_points(state, origin, angle);
    for &p in &points {
        light::deposit(state, p, radius, LightSource::Recon);
    }
    if let Some(&far) = points.last() {
        state.push_event(GameEvent::VisualBurst {
            pos: far,
            color: colors::RECON,
            count: 12,
        });
    }

    state.aim.recon_pending = false;
    begin_rolling(state);
}
