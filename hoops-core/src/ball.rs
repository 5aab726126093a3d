//! The moving-body component attached to a live ball.
//!
//! A ball is born from a throw: the aim direction is tilted upward by the
//! throw angle and scaled by the throw power to seed the velocity. From then
//! on each tick integrates gravity into velocity and velocity into position
//! (semi-implicit Euler). Collision response rewrites the velocity in place.
//!
//! Rest detection is an epsilon-bounded speed test: a ball slower than the
//! tuned threshold for enough consecutive ticks is reported settled so the
//! simulation can remove it.

use crate::scene::Transform;
use crate::types::{BallProperties, Quat, Vec3};

/// Parameters of one throw.
///
/// Defaults match the scale-model court: a gentle lob straight down the -Z
/// aim from half a meter up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throw {
    pub position: Vec3,
    pub rotation: Quat,
    /// Aim direction before the upward tilt. Need not be unit length.
    pub direction: Vec3,
    /// Upward tilt applied to the aim, in degrees.
    pub angle_deg: f64,
    /// Launch speed in m/s.
    pub power: f64,
}

impl Default for Throw {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, 0.0),
            rotation: Quat::IDENTITY,
            direction: Vec3::new(0.0, 0.0, -1.0),
            angle_deg: 15.0,
            power: 0.5,
        }
    }
}

/// Tilt a throw direction upward by `angle_deg`.
///
/// The tilt axis is the horizontal perpendicular of the aim itself
/// (`direction x up`), so a throw toward either end of the court arcs
/// upward rather than flipping for one side. A vertical aim has no
/// horizontal perpendicular and is returned untouched.
fn tilt_upward(direction: Vec3, angle_deg: f64) -> Vec3 {
    let aim = direction.normalized();
    let axis = aim.cross(&Vec3::UP);
    if axis == Vec3::ZERO {
        return aim;
    }
    Quat::from_axis_angle(axis, angle_deg.to_radians()).rotate(aim)
}

/// Velocity, gravity, and lifecycle state of a live ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub velocity: Vec3,
    pub radius: f64,
    /// Constant per-body acceleration.
    pub gravity: Vec3,
    /// Throw parameters the velocity was seeded from. Kept for inspection;
    /// only the spawn reads them.
    pub direction: Vec3,
    pub power: f64,
    pub angle_deg: f64,
    /// Set once this ball has dropped through a rim, so one shot cannot
    /// score twice.
    pub scored: bool,
    slow_ticks: u32,
}

impl Ball {
    /// Seed a ball from a throw: tilt the aim upward, scale by power.
    pub fn from_throw(props: &BallProperties, throw: &Throw) -> Self {
        let direction = tilt_upward(throw.direction, throw.angle_deg);
        Self {
            velocity: direction * throw.power,
            radius: props.radius,
            gravity: props.gravity,
            direction,
            power: throw.power,
            angle_deg: throw.angle_deg,
            scored: false,
            slow_ticks: 0,
        }
    }

    /// Advance one tick: gravity into velocity, velocity into position.
    pub fn integrate(&mut self, transform: &mut Transform, dt: f64) {
        self.velocity += self.gravity * dt;
        transform.translation += self.velocity * dt;
    }

    /// Track the rest condition. Returns true once the ball has stayed
    /// below `rest_speed` for `rest_ticks` consecutive ticks.
    pub fn settled(&mut self, rest_speed: f64, rest_ticks: u32) -> bool {
        if self.velocity.magnitude() < rest_speed {
            self.slow_ticks += 1;
        } else {
            self.slow_ticks = 0;
        }
        self.slow_ticks >= rest_ticks
    }
}

// =============================================================================
// Tests
// =============================================================================
