//! Aim guide
//!
//! Sphere-traces the cue ball along an aim angle against signed distance
//! fields of the rails and every *visible* object ball. Hidden balls are not
//! in the field, so the guide never gives away what the dark is hiding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::light;
use super::state::GameState;
use super::table::Table;
use crate::direction;

const MAX_STEPS: usize = 128;
const MIN_STEP: f32 = 0.5;
const HIT_EPS: f32 = 0.01;

/// What the traced cue ball touches first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimTarget {
    Ball(u32),
    Rail,
}

/// Predicted first contact along the aim line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimGuide {
    /// Cue ball centre at the moment of contact
    pub contact: Vec2,
    pub target: AimTarget,
    /// Surface normal at contact, pointing back toward the cue ball
    pub normal: Vec2,
    /// Distance the cue ball travels to reach `contact`
    pub distance: f32,
}

impl AimGuide {
    /// Direction an object ball leaves in when struck (none for rails)
    pub fn object_ball_heading(&self) -> Option<Vec2> {
        match self.target {
            AimTarget::Ball(_) => Some(-self.normal),
            AimTarget::Rail => None,
        }
    }
}

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Distance from `p` to the nearest rail, positive on the cloth
#[inline]
pub fn sd_rails(p: Vec2, table: &Table) -> f32 {
    (p.x - table.left)
        .min(table.right - p.x)
        .min(p.y - table.top)
        .min(table.bottom - p.y)
}

/// Surface normal by central differences
fn sdf_gradient<F>(p: Vec2, sdf: F) -> Vec2
where
    F: Fn(Vec2) -> f32,
{
    let eps = 0.5;
    let dx = sdf(p + Vec2::new(eps, 0.0)) - sdf(p - Vec2::new(eps, 0.0));
    let dy = sdf(p + Vec2::new(0.0, eps)) - sdf(p - Vec2::new(0.0, eps));
    Vec2::new(dx, dy).normalize_or_zero()
}

/// March a disc of `radius` from `start` along `dir` until it touches the field
///
/// Returns the distance travelled, or `None` if nothing is hit within `max_dist`.
pub fn sphere_trace<F>(start: Vec2, dir: Vec2, radius: f32, max_dist: f32, sdf: F) -> Option<f32>
where
    F: Fn(Vec2) -> f32,
{
    let mut t = 0.0;
    for _ in 0..MAX_STEPS {
        let d = sdf(start + dir * t);
        if d < radius + HIT_EPS {
            return Some(t);
        }
        t += (d - radius).max(MIN_STEP);
        if t >= max_dist {
            break;
        }
    }
    None
}

/// Predict where a cue ball struck along `angle` first makes contact
///
/// `None` while the cue ball is off the table.
pub fn aim_guide(state: &GameState, angle: f32) -> Option<AimGuide> {
    let cue = state.cue();
    if !cue.in_play() || !angle.is_finite() {
        return None;
    }

    let threshold = state.tuning.ai_visibility_threshold;
    let visible: Vec<(u32, Vec2, f32)> = state
        .object_balls_in_play()
        .filter(|b| light::light_level(state, b.pos) > threshold)
        .map(|b| (b.id, b.pos, b.radius))
        .collect();

    let table = &state.table;
    let ball_field = |p: Vec2| {
        visible
            .iter()
            .map(|&(_, c, r)| sd_circle(p, c, r))
            .fold(f32::MAX, f32::min)
    };
    let scene = |p: Vec2| ball_field(p).min(sd_rails(p, table));

    let dir = direction(angle);
    let max_dist = table.width().hypot(table.height());
    let distance = sphere_trace(cue.pos, dir, cue.radius, max_dist, scene)?;
    let contact = cue.pos + dir * distance;

    let nearest_ball = visible
        .iter()
        .map(|&(id, c, r)| (id, sd_circle(contact, c, r)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let (target, normal) = match nearest_ball {
        Some((id, d)) if d <= sd_rails(contact, table) => {
            (AimTarget::Ball(id), sdf_gradient(contact, ball_field))
        }
        _ => (AimTarget::Rail, sdf_gradient(contact, |p| sd_rails(p, table))),
    };

    Some(AimGuide {
        contact,
        target,
        normal,
        distance,
    })
}
