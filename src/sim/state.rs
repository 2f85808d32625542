//! Game state and core simulation types
//!
//! Everything a match needs lives in one [`GameState`] owned by the host loop
//! and passed by `&mut` into every entry point.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{Banner, GameEvent};
use super::table::Table;
use crate::consts::OBJECT_BALLS;
use crate::stats::MatchStats;
use crate::tuning::Tuning;

/// Id of the cue ball
pub const CUE_ID: u32 = 0;

/// Which side of the table is acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }
}

/// Current phase of the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Acting side may shoot or scan
    Aim,
    /// Balls in motion
    Rolling,
    /// Turn bookkeeping (transient, never observed between ticks)
    Resolve,
    /// Match over
    Ended,
}

/// A value kept once per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub player: T,
    pub ai: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Ai => &mut self.ai,
        }
    }
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// 1.0 when recorded, faded by the renderer
    pub alpha: f32,
}

/// A ball on the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// 0 = cue ball, 1..=7 object balls
    pub id: u32,
    pub pos: Vec2,
    /// Units per reference (60 Hz) tick
    pub vel: Vec2,
    pub radius: f32,
    /// In play. Object balls never come back once cleared
    pub alive: bool,
    /// Dropping into a pocket
    pub sinking: bool,
    /// Seconds until a sinking ball leaves the table
    pub sink_timer: f32,
    /// Last position seen under light
    pub last_lit: Vec2,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            alive: true,
            sinking: false,
            sink_timer: 0.0,
            last_lit: pos,
            trail: Vec::with_capacity(crate::consts::TRAIL_LENGTH),
        }
    }

    #[inline]
    pub fn is_cue(&self) -> bool {
        self.id == CUE_ID
    }

    /// Alive and not dropping: takes part in collisions
    #[inline]
    pub fn in_play(&self) -> bool {
        self.alive && !self.sinking
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(
            0,
            TrailPoint {
                pos: self.pos,
                alpha: 1.0,
            },
        );
        self.trail.truncate(crate::consts::TRAIL_LENGTH);
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Zero velocity and drop the trail
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
        self.clear_trail();
    }
}

/// Where a light zone came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightSource {
    /// Left behind by the rolling cue ball
    Trail,
    /// Deposited by a recon scan
    Recon,
}

/// A fading circle of visibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightZone {
    pub pos: Vec2,
    pub radius: f32,
    pub intensity: f32,
    /// Round the zone was created in
    pub round: u32,
    /// Simulation time of creation (seconds)
    pub created_at: f32,
    pub source: LightSource,
}

/// Remembered position of an object ball lost to darkness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostMarker {
    pub ball_id: u32,
    pub pos: Vec2,
    /// Round the memory was last refreshed
    pub round: u32,
}

/// Transient aim-phase input state (reset every turn)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    /// Charged power fraction [0, 1]
    pub power: f32,
    /// Shot is being charged
    pub charging: bool,
    /// Recon aiming mode toggled on
    pub recon_mode: bool,
    /// Recon beam in flight; the turn is spent
    pub recon_pending: bool,
}

/// Render-only per-ball effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallFx {
    /// Squash deformation amount (0 = round), decays every frame
    pub squash: f32,
    /// Scale while dropping into a pocket (1 = full size)
    pub sink_scale: f32,
}

impl Default for BallFx {
    fn default() -> Self {
        Self {
            squash: 0.0,
            sink_scale: 1.0,
        }
    }
}

/// Presentation state kept apart from the physics (indexed by ball id)
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub balls: Vec<BallFx>,
    /// Seconds of chromatic aberration left
    pub chromatic: f32,
    /// Accumulated screen shake (0-1), decays every frame
    pub shake: f32,
}

impl Presentation {
    pub fn new(ball_count: usize) -> Self {
        Self {
            balls: vec![BallFx::default(); ball_count],
            chromatic: 0.0,
            shake: 0.0,
        }
    }

    pub fn squash(&mut self, id: u32, amount: f32) {
        if let Some(fx) = self.balls.get_mut(id as usize) {
            fx.squash = fx.squash.max(amount.min(1.0));
        }
    }
}

/// Work deferred to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Deferred {
    /// Bring a scratched cue ball back to the baulk spot
    RespawnCue,
    /// Land a recon fan of light
    ReconDeposit { side: Side, origin: Vec2, angle: f32 },
    /// AI finished thinking; plan and act
    AiThink,
    /// Show the scoring reminder hint
    ScoringReminder,
}

/// A deferred action and its deadline (simulation seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scheduled {
    pub due: f32,
    pub action: Deferred,
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` on a tie
    pub winner: Option<Side>,
    pub player_score: i32,
    pub ai_score: i32,
    /// Every object ball was cleared before the round limit
    pub cleared: bool,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub table: Table,
    /// Simulation clock (seconds)
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,

    /// Cue ball first, then object balls by id
    pub balls: Vec<Ball>,
    pub zones: Vec<LightZone>,
    pub ghosts: Vec<GhostMarker>,
    /// Position of the most recent cue-trail light deposit
    pub last_deposit: Option<Vec2>,

    /// 1-based round counter
    pub round: u32,
    pub turn: Side,
    pub phase: TurnPhase,
    pub scores: PerSide<i32>,
    pub recon_used: PerSide<bool>,
    /// Round on which the AI spends its recon (3 or 4)
    pub ai_recon_round: u32,
    pub aim: AimState,
    /// Continuous seconds every ball has been at rest while rolling
    pub settle_timer: f32,
    pub pocketed_this_turn: bool,
    pub cue_scratched_this_turn: bool,
    /// Scoring reminder already scheduled this match
    pub reminder_scheduled: bool,
    /// AI think delay in progress
    pub ai_thinking: bool,
    /// AI also plays the player side (demo/idle mode)
    pub autopilot: bool,

    pub scheduled: Vec<Scheduled>,
    pub banner: Option<Banner>,
    pub stats: MatchStats,
    pub outcome: Option<MatchOutcome>,

    /// Pending side effects for the host
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Visual-only effects
    #[serde(skip)]
    pub fx: Presentation,
}

impl GameState {
    /// Create a new match with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new match with explicit tuning
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            table: Table::default(),
            time: 0.0,
            time_ticks: 0,
            balls: Vec::new(),
            zones: Vec::new(),
            ghosts: Vec::new(),
            last_deposit: None,
            round: 1,
            turn: Side::Player,
            phase: TurnPhase::Aim,
            scores: PerSide::default(),
            recon_used: PerSide::default(),
            ai_recon_round: 3,
            aim: AimState::default(),
            settle_timer: 0.0,
            pocketed_this_turn: false,
            cue_scratched_this_turn: false,
            reminder_scheduled: false,
            ai_thinking: false,
            autopilot: false,
            scheduled: Vec::new(),
            banner: None,
            stats: MatchStats::new(),
            outcome: None,
            events: Vec::new(),
            fx: Presentation::default(),
        };
        state.reset();
        state
    }

    /// Re-rack and clear all match state, keeping seed stream and tuning
    pub fn reset(&mut self) {
        use rand::Rng;

        self.time = 0.0;
        self.time_ticks = 0;
        self.rack();
        self.zones.clear();
        self.ghosts.clear();
        self.last_deposit = None;
        self.round = 1;
        self.turn = Side::Player;
        self.phase = TurnPhase::Aim;
        self.scores = PerSide::default();
        self.recon_used = PerSide::default();
        self.ai_recon_round = self.rng.random_range(3..=4);
        self.aim = AimState::default();
        self.settle_timer = 0.0;
        self.pocketed_this_turn = false;
        self.cue_scratched_this_turn = false;
        self.reminder_scheduled = false;
        self.ai_thinking = false;
        self.scheduled.clear();
        self.banner = None;
        self.stats = MatchStats::new();
        self.outcome = None;
        self.events.clear();
        self.fx = Presentation::new(self.balls.len());

        log::info!(
            "Match reset (seed {}, AI recon on round {})",
            self.seed,
            self.ai_recon_round
        );
    }

    /// Cue ball at baulk, object balls in a diamond rack pointing at it
    fn rack(&mut self) {
        let r = self.tuning.ball_radius;
        let gap = r * 2.0 + 1.0;
        let row_offset = gap * 0.866;
        let apex = self.table.rack_apex;

        // (row, vertical offset in ball gaps)
        let layout: [(f32, f32); OBJECT_BALLS as usize] = [
            (0.0, 0.0),
            (1.0, -0.5),
            (1.0, 0.5),
            (2.0, 0.0),
            (3.0, -0.5),
            (3.0, 0.5),
            (4.0, 0.0),
        ];

        self.balls.clear();
        self.balls.push(Ball::new(CUE_ID, self.table.baulk, r));
        for (i, (row, v)) in layout.iter().enumerate() {
            let pos = Vec2::new(apex.x + row * row_offset, apex.y + v * gap);
            self.balls.push(Ball::new(i as u32 + 1, pos, r));
        }
    }

    /// The cue ball. Exists for the whole match by construction
    #[inline]
    pub fn cue(&self) -> &Ball {
        &self.balls[0]
    }

    #[inline]
    pub fn cue_mut(&mut self) -> &mut Ball {
        &mut self.balls[0]
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_mut(&mut self, id: u32) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Object balls still on the table
    pub fn object_balls_in_play(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().filter(|b| !b.is_cue() && b.in_play())
    }

    pub fn ghost(&self, ball_id: u32) -> Option<&GhostMarker> {
        self.ghosts.iter().find(|g| g.ball_id == ball_id)
    }

    /// Side whose shot intents are accepted right now
    pub fn acting_side(&self) -> Option<Side> {
        (self.phase == TurnPhase::Aim).then_some(self.turn)
    }

    /// Whether `side` is driven by the planner
    pub fn is_ai_controlled(&self, side: Side) -> bool {
        side == Side::Ai || self.autopilot
    }

    /// Queue deferred work
    pub fn schedule(&mut self, delay: f32, action: Deferred) {
        self.scheduled.push(Scheduled {
            due: self.time + delay,
            action,
        });
    }

    pub fn is_scheduled(&self, pred: impl Fn(&Deferred) -> bool) -> bool {
        self.scheduled.iter().any(|s| pred(&s.action))
    }

    /// Hand accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Add screen shake and tell the host
    pub fn shake(&mut self, intensity: f32, duration: f32) {
        self.fx.shake = (self.fx.shake + intensity).min(1.0);
        self.events.push(GameEvent::CameraShake {
            intensity,
            duration,
        });
    }

    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::Ended
    }
}
