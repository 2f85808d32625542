//! Game balance values
//!
//! Every number the simulation reads at runtime lives here so a host can
//! override it from JSON. Missing fields fall back to [`crate::consts`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Reasons a tuning file is rejected
#[derive(Debug)]
pub enum TuningError {
    /// The JSON did not parse
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    OutOfRange { field: &'static str, value: f32 },
    /// `min_shot_speed` is above `max_shot_speed`
    ShotSpeedInverted { min: f32, max: f32 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "tuning parse error: {e}"),
            Self::OutOfRange { field, value } => {
                write!(f, "tuning field `{field}` out of range: {value}")
            }
            Self::ShotSpeedInverted { min, max } => {
                write!(f, "min_shot_speed {min} exceeds max_shot_speed {max}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Difficulty presets for the AI opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on the AI's random aim variance
    pub fn variance_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.5,
        }
    }
}

/// Runtime balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub ball_radius: f32,
    pub friction: f32,
    pub min_speed: f32,
    pub wall_restitution: f32,
    pub ball_restitution: f32,
    pub shake_impulse: f32,
    pub chromatic_impulse: f32,
    pub sink_duration: f32,
    pub scratch_respawn_delay: f32,

    // === Light ===
    pub trail_speed: f32,
    pub light_deposit_spacing: f32,
    pub trail_zone_radius: f32,
    pub trail_duration: f32,
    pub cue_light_radius: f32,
    pub light_threshold: f32,
    pub memory_rounds: u32,

    // === Turns ===
    pub rounds: u32,
    pub settle_delay: f32,
    pub corner_margin: f32,
    pub corner_nudge: f32,
    pub reminder_delay: f32,
    pub banner_duration: f32,

    // === Shots ===
    pub min_shot_speed: f32,
    pub max_shot_speed: f32,
    pub strong_shot_power: f32,
    pub recon_beam_duration: f32,
    pub recon_spread_deg: f32,
    pub recon_length: f32,
    pub recon_step: f32,
    pub recon_zone_radius: f32,

    // === AI ===
    pub difficulty: Difficulty,
    pub ai_think_delay: f32,
    pub ai_visibility_threshold: f32,
    pub ai_ghost_variance_deg: f32,
    pub ai_probe_variance_deg: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            friction: FRICTION,
            min_speed: MIN_SPEED,
            wall_restitution: WALL_RESTITUTION,
            ball_restitution: BALL_RESTITUTION,
            shake_impulse: SHAKE_IMPULSE,
            chromatic_impulse: CHROMATIC_IMPULSE,
            sink_duration: SINK_DURATION,
            scratch_respawn_delay: SCRATCH_RESPAWN_DELAY,

            trail_speed: TRAIL_SPEED,
            light_deposit_spacing: LIGHT_DEPOSIT_SPACING,
            trail_zone_radius: TRAIL_ZONE_RADIUS,
            trail_duration: TRAIL_DURATION,
            cue_light_radius: CUE_LIGHT_RADIUS,
            light_threshold: LIGHT_THRESHOLD,
            memory_rounds: MEMORY_ROUNDS,

            rounds: ROUNDS,
            settle_delay: SETTLE_DELAY,
            corner_margin: CORNER_MARGIN,
            corner_nudge: CORNER_NUDGE,
            reminder_delay: REMINDER_DELAY,
            banner_duration: BANNER_DURATION,

            min_shot_speed: MIN_SHOT_SPEED,
            max_shot_speed: MAX_SHOT_SPEED,
            strong_shot_power: STRONG_SHOT_POWER,
            recon_beam_duration: RECON_BEAM_DURATION,
            recon_spread_deg: RECON_SPREAD_DEG,
            recon_length: RECON_LENGTH,
            recon_step: RECON_STEP,
            recon_zone_radius: RECON_ZONE_RADIUS,

            difficulty: Difficulty::Normal,
            ai_think_delay: AI_THINK_DELAY,
            ai_visibility_threshold: AI_VISIBILITY_THRESHOLD,
            ai_ghost_variance_deg: AI_GHOST_VARIANCE_DEG,
            ai_probe_variance_deg: AI_PROBE_VARIANCE_DEG,
        }
    }
}

impl Tuning {
    /// Tuning with a difficulty preset applied
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse and validate a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning (difficulty {})", tuning.difficulty.as_str());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the physics or the turn clock
    pub fn validate(&self) -> Result<(), TuningError> {
        let unit_open = [
            ("friction", self.friction),
            ("wall_restitution", self.wall_restitution),
            ("ball_restitution", self.ball_restitution),
        ];
        for (field, value) in unit_open {
            if !(value > 0.0 && value < 1.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let positive = [
            ("ball_radius", self.ball_radius),
            ("min_speed", self.min_speed),
            ("sink_duration", self.sink_duration),
            ("trail_duration", self.trail_duration),
            ("trail_zone_radius", self.trail_zone_radius),
            ("cue_light_radius", self.cue_light_radius),
            ("light_deposit_spacing", self.light_deposit_spacing),
            ("recon_length", self.recon_length),
            ("recon_step", self.recon_step),
            ("recon_zone_radius", self.recon_zone_radius),
            ("min_shot_speed", self.min_shot_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("settle_delay", self.settle_delay),
            ("scratch_respawn_delay", self.scratch_respawn_delay),
            ("recon_beam_duration", self.recon_beam_duration),
            ("ai_think_delay", self.ai_think_delay),
            ("ai_ghost_variance_deg", self.ai_ghost_variance_deg),
            ("ai_probe_variance_deg", self.ai_probe_variance_deg),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.light_threshold) {
            return Err(TuningError::OutOfRange {
                field: "light_threshold",
                value: self.light_threshold,
            });
        }

        // Both rails must fit around a ball or clamping inverts
        let span = (TABLE_RIGHT - TABLE_LEFT).min(TABLE_BOTTOM - TABLE_TOP);
        if 2.0 * self.ball_radius >= span {
            return Err(TuningError::OutOfRange {
                field: "ball_radius",
                value: self.ball_radius,
            });
        }

        if self.recon_length / self.recon_step > MAX_RECON_SAMPLES as f32 {
            return Err(TuningError::OutOfRange {
                field: "recon_step",
                value: self.recon_step,
            });
        }

        if self.rounds == 0 {
            return Err(TuningError::OutOfRange {
                field: "rounds",
                value: 0.0,
            });
        }

        if self.min_shot_speed > self.max_shot_speed {
            return Err(TuningError::ShotSpeedInverted {
                min: self.min_shot_speed,
                max: self.max_shot_speed,
            });
        }

        Ok(())
    }

    /// AI aim variance for ghost-memory shots, in radians
    pub fn ghost_variance(&self) -> f32 {
        self.ai_ghost_variance_deg.to_radians() * self.difficulty.variance_scale()
    }

    /// AI aim variance for blind probes, in radians
    pub fn probe_variance(&self) -> f32 {
        self.ai_probe_variance_deg.to_radians() * self.difficulty.variance_scale()
    }
}
