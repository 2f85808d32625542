//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated clock only (advanced by the host through [`advance`])
//! - Seeded RNG only
//! - Stable iteration order (by ball id)
//! - No rendering, audio or platform dependencies: side effects leave as
//!   [`GameEvent`]s for the host to drain

pub mod ai;
pub mod aim;
pub mod collision;
pub mod events;
pub mod light;
pub mod physics;
pub mod shot;
pub mod state;
pub mod table;
pub mod tick;
pub mod turn;

pub use ai::{AiDecision, ShotCandidate, evaluate_candidate, set_autopilot};
pub use aim::{AimGuide, AimTarget, aim_guide};
pub use collision::{CollisionResult, ball_ball_contact};
pub use events::{Banner, GameEvent, SoundKind};
pub use light::{ball_light, light_level};
pub use shot::{ShotError, fire_recon, fire_shot};
pub use state::{
    Ball, GameState, GhostMarker, LightSource, LightZone, MatchOutcome, PerSide, Side, TurnPhase,
};
pub use table::{Pocket, Table};
pub use tick::advance;
