//! Side effects the simulation asks its host to perform
//!
//! The core never draws or plays audio itself. It pushes events onto
//! `GameState::events`; the host drains them once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{MatchOutcome, Side};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    /// Cue strikes the cue ball
    Strike,
    /// Ball hits ball
    Collision,
    /// Ball hits a rail
    Cushion,
    /// Object ball drops
    Pocket,
    /// Cue ball drops
    ScratchBonus,
}

/// RGB colour hint for bursts and labels
pub type Rgb = [f32; 3];

pub mod colors {
    use super::Rgb;
    pub const SCORE: Rgb = [1.0, 0.85, 0.3];
    pub const SCRATCH: Rgb = [1.0, 0.3, 0.25];
    pub const SPARK: Rgb = [0.85, 0.9, 1.0];
    pub const RECON: Rgb = [0.4, 0.9, 1.0];
}

/// One fire-and-forget request to a host collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundKind),
    CameraShake {
        intensity: f32,
        duration: f32,
    },
    VisualBurst {
        pos: Vec2,
        color: Rgb,
        count: u32,
    },
    ScoreLabel {
        pos: Vec2,
        text: String,
        color: Rgb,
    },
    /// Recon beam started; light lands after `duration`
    ReconBeam {
        origin: Vec2,
        angle: f32,
        duration: f32,
    },
    /// Round-transition banner posted
    Banner(String),
    /// First ball lost to darkness: remind the player how scoring works
    ScoringReminder,
    /// AI began its think delay
    AiThinking,
    /// Turn passed to `Side`
    TurnStarted(Side),
    MatchEnded(MatchOutcome),
}

/// Banner currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    /// Seconds left on screen
    pub remaining: f32,
}

/// Round-transition banner text, if this round has one
pub fn round_banner(round: u32, rounds: u32) -> Option<&'static str> {
    if round == rounds {
        return Some("Final round. The lights are almost out.");
    }
    match round {
        2 => Some("Round 2. Your eyes adjust."),
        4 => Some("Round 4. The table remembers less."),
        6 => Some("Round 6. Shadows lengthen."),
        _ => None,
    }
}
