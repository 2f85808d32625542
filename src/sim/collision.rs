//! Collision detection and response for balls, rails and pockets
//!
//! Pure functions over a couple of balls at a time. The integrator decides
//! what to do with the results (sounds, shake, scoring).

use glam::Vec2;

use super::state::Ball;
use super::table::Table;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Unit normal from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Overlap test between two discs
///
/// Exactly coincident centres have no usable normal and report a miss.
pub fn ball_ball_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = b_pos - a_pos;
    let dist = delta.length();
    let min_dist = a_radius + b_radius;

    if dist >= min_dist || dist < 1e-6 {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: delta / dist,
        penetration: min_dist - dist,
    }
}

/// Separate two overlapping balls and exchange momentum along the normal
///
/// Equal masses. Returns the impulse magnitude when the balls were closing,
/// `Some(0.0)` when they only needed separating, `None` on no contact.
pub fn resolve_ball_pair(a: &mut Ball, b: &mut Ball, restitution: f32) -> Option<f32> {
    let contact = ball_ball_contact(a.pos, a.radius, b.pos, b.radius);
    if !contact.hit {
        return None;
    }
    let n = contact.normal;

    // Symmetric push-out keeps the centre of mass in place
    let half = n * (contact.penetration * 0.5);
    a.pos -= half;
    b.pos += half;

    let closing = (a.vel - b.vel).dot(n);
    if closing <= 0.0 {
        return Some(0.0);
    }

    let impulse = closing * (1.0 + restitution) * 0.5;
    a.vel -= n * impulse;
    b.vel += n * impulse;
    Some(impulse)
}

/// A rail contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    /// Inward normal of the rail
    pub normal: Vec2,
    /// Speed into the rail before the bounce
    pub impact: f32,
}

/// Keep a ball inside the rails, bouncing it off any it crossed
///
/// Returns the hardest hit this step, if any.
pub fn resolve_walls(ball: &mut Ball, table: &Table, restitution: f32) -> Option<WallHit> {
    let r = ball.radius;
    let mut hardest: Option<WallHit> = None;
    let mut record = |normal: Vec2, impact: f32| {
        if hardest.is_none_or(|h| impact > h.impact) {
            hardest = Some(WallHit { normal, impact });
        }
    };

    if ball.pos.x - r < table.left {
        ball.pos.x = table.left + r;
        if ball.vel.x < 0.0 {
            record(Vec2::X, -ball.vel.x);
            ball.vel.x = -ball.vel.x * restitution;
        }
    } else if ball.pos.x + r > table.right {
        ball.pos.x = table.right - r;
        if ball.vel.x > 0.0 {
            record(-Vec2::X, ball.vel.x);
            ball.vel.x = -ball.vel.x * restitution;
        }
    }

    if ball.pos.y - r < table.top {
        ball.pos.y = table.top + r;
        if ball.vel.y < 0.0 {
            record(Vec2::Y, -ball.vel.y);
            ball.vel.y = -ball.vel.y * restitution;
        }
    } else if ball.pos.y + r > table.bottom {
        ball.pos.y = table.bottom - r;
        if ball.vel.y > 0.0 {
            record(-Vec2::Y, ball.vel.y);
            ball.vel.y = -ball.vel.y * restitution;
        }
    }

    hardest
}

/// Pocket the ball centre has fallen into, if any
#[inline]
pub fn ball_pocket_collision(ball_pos: Vec2, table: &Table) -> Option<usize> {
    table.nearest_pocket(ball_pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ball(id: u32, x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut b = Ball::new(id, Vec2::new(x, y), 10.0);
        b.vel = Vec2::new(vx, vy);
        b
    }

    #[test]
    fn test_head_on_transfers_momentum() {
        let mut a = ball(0, 100.0, 100.0, 5.0, 0.0);
        let mut b = ball(1, 119.0, 100.0, 0.0, 0.0);
        let impulse = resolve_ball_pair(&mut a, &mut b, 0.94).unwrap();
        assert!(impulse > 0.0);
        assert!(b.vel.x > a.vel.x);
        assert!((a.pos.distance(b.pos) - 20.0).abs() < 1e-4);
        // momentum conserved
        assert!((a.vel.x + b.vel.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_separation_preserves_center_of_mass() {
        let mut a = ball(0, 100.0, 100.0, 0.0, 0.0);
        let mut b = ball(1, 112.0, 103.0, 0.0, 0.0);
        let before = (a.pos + b.pos) * 0.5;
        assert_eq!(resolve_ball_pair(&mut a, &mut b, 0.9), Some(0.0));
        let after = (a.pos + b.pos) * 0.5;
        assert!(before.distance(after) < 1e-4);
    }

    #[test]
    fn test_coincident_centres_are_ignored() {
        let mut a = ball(0, 100.0, 100.0, 3.0, 0.0);
        let mut b = ball(1, 100.0, 100.0, -3.0, 0.0);
        assert!(resolve_ball_pair(&mut a, &mut b, 0.9).is_none());
        assert!(a.pos.is_finite() && a.vel.is_finite());
        assert!(b.pos.is_finite() && b.vel.is_finite());
    }

    #[test]
    fn test_separating_balls_keep_velocity() {
        let mut a = ball(0, 100.0, 100.0, -2.0, 0.0);
        let mut b = ball(1, 115.0, 100.0, 2.0, 0.0);
        resolve_ball_pair(&mut a, &mut b, 0.9);
        assert_eq!(a.vel, Vec2::new(-2.0, 0.0));
        assert_eq!(b.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_wall_bounce_loses_energy() {
        let table = Table::default();
        let mut b = ball(1, table.right - 5.0, 200.0, 8.0, 1.0);
        let hit = resolve_walls(&mut b, &table, 0.75).unwrap();
        assert_eq!(hit.normal, -Vec2::X);
        assert!((hit.impact - 8.0).abs() < 1e-6);
        assert!((b.vel.x + 6.0).abs() < 1e-5);
        assert_eq!(b.vel.y, 1.0);
        assert_eq!(b.pos.x, table.right - 10.0);
    }

    #[test]
    fn test_no_wall_hit_inside() {
        let table = Table::default();
        let mut b = ball(1, 400.0, 250.0, 8.0, 8.0);
        assert!(resolve_walls(&mut b, &table, 0.75).is_none());
    }

    proptest! {
        #[test]
        fn pair_collision_never_gains_normal_speed(
            dx in 1.0f32..19.0,
            dy in -5.0f32..5.0,
            vax in -20.0f32..20.0,
            vay in -20.0f32..20.0,
            vbx in -20.0f32..20.0,
            vby in -20.0f32..20.0,
            e in 0.1f32..0.99,
        ) {
            let mut a = ball(0, 200.0, 200.0, vax, vay);
            let mut b = ball(1, 200.0 + dx, 200.0 + dy, vbx, vby);
            let n = (b.pos - a.pos).normalize();
            let before = (a.vel - b.vel).dot(n).abs();
            if resolve_ball_pair(&mut a, &mut b, e).is_some() {
                let after = (a.vel - b.vel).dot(n).abs();
                prop_assert!(after <= before + 1e-3);
            }
        }

        #[test]
        fn wall_bounce_never_gains_normal_speed(
            x in 40.0f32..80.0,
            vx in -30.0f32..30.0,
            e in 0.1f32..0.99,
        ) {
            let table = Table::default();
            let mut b = ball(1, x, 250.0, vx, 0.0);
            let before = b.vel.x.abs();
            resolve_walls(&mut b, &table, e);
            prop_assert!(b.vel.x.abs() <= before + 1e-6);
        }
    }
}
