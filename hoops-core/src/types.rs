//! Core types for the basketball physics simulation.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Mass: kilograms (kg)
//!
//! The court model is a scale model, not a regulation court: the gravity,
//! throw power, and rim dimensions all come from the scale-model asset.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities, directions, and normals.
///
/// Coordinate system:
/// - X: horizontal, along the court length (a goal at each end)
/// - Y: vertical (positive upward)
/// - Z: horizontal, along the court width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// World-up direction.
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < constants::EPSILON {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    /// Component-wise maximum
    pub fn max(&self, other: &Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    /// Reflect vector around a normal
    pub fn reflect(&self, normal: &Self) -> Self {
        *self - *normal * 2.0 * self.dot(normal)
    }

    /// True if all three components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Quat - Unit Quaternion
// =============================================================================

/// A unit quaternion used for node rotations and for tilting throw directions.
///
/// Unit length is maintained by construction: `identity` and `from_axis_angle`
/// always produce unit quaternions, and the Hamilton product of two unit
/// quaternions is a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Rotation of `angle` radians about `axis` (right-hand rule).
    ///
    /// A zero-length axis yields the identity rotation.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let unit = axis.normalized();
        if unit == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let half = 0.5 * angle;
        let (s, c) = half.sin_cos();
        Self {
            w: c,
            x: unit.x * s,
            y: unit.y * s,
            z: unit.z * s,
        }
    }

    /// Hamilton product `self * other` (apply `other` first, then `self`).
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Rotate a vector by this quaternion.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let pure = Quat {
            w: 0.0,
            x: v.x,
            y: v.y,
            z: v.z,
        };
        let rotated = self.mul(&pure).mul(&self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Mat4 - Column-Major 4x4 Matrix
// =============================================================================

/// A column-major 4x4 matrix.
///
/// Only what the collision core needs: composing local transforms into world
/// matrices and pushing points through them. `cols[i]` is the i-th column;
/// `cols[3]` carries the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build a transform matrix from translation, rotation, and scale,
    /// applied in the usual scale-then-rotate-then-translate order.
    pub fn from_translation_rotation_scale(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let (x, y, z, w) = (rotation.x, rotation.y, rotation.z, rotation.w);

        // Rotation matrix columns from the quaternion.
        let r0 = Vec3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + z * w),
            2.0 * (x * z - y * w),
        );
        let r1 = Vec3::new(
            2.0 * (x * y - z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + x * w),
        );
        let r2 = Vec3::new(
            2.0 * (x * z + y * w),
            2.0 * (y * z - x * w),
            1.0 - 2.0 * (x * x + y * y),
        );

        Self {
            cols: [
                [r0.x * scale.x, r0.y * scale.x, r0.z * scale.x, 0.0],
                [r1.x * scale.y, r1.y * scale.y, r1.z * scale.y, 0.0],
                [r2.x * scale.z, r2.y * scale.z, r2.z * scale.z, 0.0],
                [translation.x, translation.y, translation.z, 1.0],
            ],
        }
    }

    /// Matrix product `self * other` (apply `other` first).
    pub fn mul(&self, other: &Self) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * other.cols[c][k]).sum();
            }
        }
        Self { cols }
    }

    /// Transform a point (w = 1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.cols[0][0] * p.x + self.cols[1][0] * p.y + self.cols[2][0] * p.z + self.cols[3][0],
            self.cols[0][1] * p.x + self.cols[1][1] * p.y + self.cols[2][1] * p.z + self.cols[3][1],
            self.cols[0][2] * p.x + self.cols[1][2] * p.y + self.cols[2][2] * p.z + self.cols[3][2],
        )
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Axis-Aligned Bounding Box
// =============================================================================

/// An axis-aligned bounding box, `min[i] <= max[i]` on every axis.
///
/// Two flavors exist at runtime: an object-local box computed once from a
/// mesh and cached on the node, and a world-space box recomputed every tick
/// from the cached box and the node's current world matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A cube of the given half extent centered on the local origin.
    pub fn from_half_extent(half: f64) -> Self {
        Self {
            min: Vec3::new(-half, -half, -half),
            max: Vec3::new(half, half, half),
        }
    }

    /// The smallest box containing both boxes.
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// All eight corners, for transforming the box into another space.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}

// =============================================================================
// Role Tags
// =============================================================================

/// Which end of the court a goal belongs to.
///
/// `Left` is the goal at negative X, `Right` at positive X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalSide {
    Left,
    Right,
}

/// One of the four perimeter fence segments bounding the court rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceSegment {
    /// Fence behind the left goal (x = -half_length).
    LeftEnd,
    /// Fence behind the right goal (x = +half_length).
    RightEnd,
    /// Fence along z = -half_width.
    NearSide,
    /// Fence along z = +half_width.
    FarSide,
}

/// Collision role of a static node, assigned once at scene setup.
///
/// The surface tag replaces per-tick matching on node name strings: the
/// response strategy for a colliding pair is picked by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Generic solid geometry, resolved against its triangle mesh.
    Solid,
    /// A goal hoop's scoring rim, modeled as a flat horizontal disk.
    Rim(GoalSide),
    /// A backboard face with a hand-authored normal.
    Backboard(GoalSide),
    /// A perimeter fence segment with a hand-authored normal.
    Fence(FenceSegment),
}

/// Collision role of a dynamic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    /// The thrown ball: rebounds off surfaces and can score.
    Ball,
    /// A player-controlled probe: receives positional correction only.
    Probe,
}

// =============================================================================
// Ball Properties
// =============================================================================

/// Physical properties of a ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallProperties {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    /// Constant acceleration applied to every live ball.
    pub gravity: Vec3,
}

impl BallProperties {
    /// The scale-model streetball matching the court assets.
    pub fn streetball() -> Self {
        Self {
            name: "Streetball (scale model)".to_string(),
            mass: 0.1,
            radius: 0.07,
            gravity: Vec3::new(0.0, -1.981, 0.0),
        }
    }
}

impl Default for BallProperties {
    fn default() -> Self {
        Self::streetball()
    }
}

// =============================================================================
// Court Layout
// =============================================================================

/// Dimensions and fixed contact normals of the court.
///
/// The rim disks, backboard faces, and fence segments carry hand-authored
/// geometry here rather than deriving it from their render meshes: the rim is
/// a flat disk with a radius, the boards and fences are planes with literal
/// axis-aligned normals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtLayout {
    pub name: String,
    pub half_length: f64,
    pub half_width: f64,
    /// Y coordinate of the playing surface.
    pub floor_y: f64,
    /// Height of the rim plane above the floor.
    pub rim_height: f64,
    /// Distance from the court end to the rim center, along X.
    pub rim_inset: f64,
    pub rim_radius: f64,
}

impl CourtLayout {
    /// The scale-model court the game assets are built around.
    pub fn scale_model() -> Self {
        Self {
            name: "Scale-model court".to_string(),
            half_length: 1.5,
            half_width: 1.0,
            floor_y: 0.0,
            rim_height: 0.95,
            rim_inset: 0.28,
            rim_radius: 0.1075,
        }
    }

    /// Center of the scoring rim disk for one goal.
    pub fn rim_center(&self, side: GoalSide) -> Vec3 {
        let x = self.half_length - self.rim_inset;
        match side {
            GoalSide::Left => Vec3::new(-x, self.floor_y + self.rim_height, 0.0),
            GoalSide::Right => Vec3::new(x, self.floor_y + self.rim_height, 0.0),
        }
    }

    /// Contact normal of a backboard face, pointing back toward the court.
    pub fn backboard_normal(&self, side: GoalSide) -> Vec3 {
        match side {
            GoalSide::Left => Vec3::new(1.0, 0.0, 0.0),
            GoalSide::Right => Vec3::new(-1.0, 0.0, 0.0),
        }
    }

    /// Contact normal of a fence segment, pointing inward.
    pub fn fence_normal(&self, segment: FenceSegment) -> Vec3 {
        match segment {
            FenceSegment::LeftEnd => Vec3::new(1.0, 0.0, 0.0),
            FenceSegment::RightEnd => Vec3::new(-1.0, 0.0, 0.0),
            FenceSegment::NearSide => Vec3::new(0.0, 0.0, 1.0),
            FenceSegment::FarSide => Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Check if a point (x, z) lies within the fenced rectangle, with `margin`
    /// of slack on every side.
    pub fn in_bounds(&self, x: f64, z: f64, margin: f64) -> bool {
        x.abs() <= self.half_length + margin && z.abs() <= self.half_width + margin
    }
}

impl Default for CourtLayout {
    fn default() -> Self {
        Self::scale_model()
    }
}

// =============================================================================
// Tuning
// =============================================================================

/// Response and lifecycle tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Energy retained across a rebound (1.0 = perfectly elastic).
    pub damping: f64,
    /// Fixed time increment for the post-bounce position nudge, decoupled
    /// from the simulation tick so a rebound cannot tunnel back through the
    /// surface on large ticks.
    pub rebound_substep: f64,
    /// Speed below which a ball is considered settling.
    pub rest_speed: f64,
    /// Consecutive slow ticks before a settling ball is removed.
    pub rest_ticks: u32,
    /// Slack outside the fence rectangle (and below the floor) before a ball
    /// counts as out of bounds.
    pub oob_margin: f64,
    /// Default upward tilt of a throw, in degrees.
    pub throw_angle_deg: f64,
    /// Default throw power in m/s.
    pub throw_power: f64,
}

impl Tuning {
    pub fn scale_model() -> Self {
        Self {
            damping: 0.3,
            rebound_substep: 0.01,
            rest_speed: 0.05,
            rest_ticks: 10,
            oob_margin: 0.5,
            throw_angle_deg: 15.0,
            throw_power: 0.5,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::scale_model()
    }
}

// =============================================================================
// Numerical Constants
// =============================================================================

/// Numerical tolerances used across the collision core.
pub mod constants {
    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-10;

    /// Degenerate/parallel rejection threshold for ray-triangle intersection
    pub const RAY_EPSILON: f64 = 1e-7;

    /// Tolerance for the sphere-disk overlap classification
    pub const RIM_TOLERANCE: f64 = 1e-4;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a - b, Vec3::new(-3.0, -3.0, -3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.dot(&b), 32.0); // 1*4 + 2*5 + 3*6 = 32
    }

    #[test]
    fn test_vec3_cross_product() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert!((z.x).abs() < 1e-10);
        assert!((z.y).abs() < 1e-10);
        assert!((z.z - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_vec3_normalized() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let n = v.normalized();
        assert!((n.magnitude() - 1.0).abs() < 1e-10);
        assert!((n.x - 0.6).abs() < 1e-10);
        assert!((n.y - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_vec3_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(v.reflect(&n), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_quat_rotates_about_y() {
        let q = Quat::from_axis_angle(Vec3::UP, std::f64::consts::FRAC_PI_2);
        let v = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        // Right-hand rule: +X rotated 90 degrees about +Y lands on -Z.
        assert!(v.x.abs() < 1e-10, "expected x=0, got {}", v.x);
        assert!((v.z + 1.0).abs() < 1e-10, "expected z=-1, got {}", v.z);
    }

    #[test]
    fn test_quat_from_zero_axis_is_identity() {
        let q = Quat::from_axis_angle(Vec3::ZERO, 1.0);
        assert_eq!(q, Quat::IDENTITY);
        assert_eq!(q.rotate(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_mat4_trs_ordering() {
        // Scale then rotate then translate: a unit X vector scaled by 2,
        // rotated a quarter turn about Y, then translated by (0, 5, 0).
        let m = Mat4::from_translation_rotation_scale(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::from_axis_angle(Vec3::UP, std::f64::consts::FRAC_PI_2),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-10, "expected x=0, got {}", p.x);
        assert!((p.y - 5.0).abs() < 1e-10, "expected y=5, got {}", p.y);
        assert!((p.z + 2.0).abs() < 1e-10, "expected z=-2, got {}", p.z);
    }

    #[test]
    fn test_mat4_mul_composes() {
        let translate = Mat4::from_translation_rotation_scale(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::IDENTITY,
            Vec3::new(1.0, 1.0, 1.0),
        );
        let scale = Mat4::from_translation_rotation_scale(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(3.0, 3.0, 3.0),
        );
        // translate * scale applies the scale first.
        let p = translate.mul(&scale).transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vec3::new(4.0, 3.0, 3.0));
    }

    #[test]
    fn test_aabb_merged() {
        let a = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(3.0, 0.5, 1.0));
        let m = a.merged(&b);
        assert_eq!(m.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(m.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_rim_centers_are_mirrored() {
        let court = CourtLayout::scale_model();
        let left = court.rim_center(GoalSide::Left);
        let right = court.rim_center(GoalSide::Right);
        assert_eq!(left.x, -right.x);
        assert_eq!(left.y, right.y);
        assert_eq!(left.z, right.z);
        assert!(left.x < 0.0, "left rim should sit at negative X");
    }

    #[test]
    fn test_fence_normals_point_inward() {
        let court = CourtLayout::scale_model();
        for segment in [
            FenceSegment::LeftEnd,
            FenceSegment::RightEnd,
            FenceSegment::NearSide,
            FenceSegment::FarSide,
        ] {
            let n = court.fence_normal(segment);
            assert!((n.magnitude() - 1.0).abs() < 1e-10);
            // An inward normal must point from the fence toward the origin.
            let outward_point = match segment {
                FenceSegment::LeftEnd => Vec3::new(-court.half_length, 0.0, 0.0),
                FenceSegment::RightEnd => Vec3::new(court.half_length, 0.0, 0.0),
                FenceSegment::NearSide => Vec3::new(0.0, 0.0, -court.half_width),
                FenceSegment::FarSide => Vec3::new(0.0, 0.0, court.half_width),
            };
            assert!(n.dot(&outward_point) < 0.0, "{:?} normal points outward", segment);
        }
    }

    #[test]
    fn test_court_bounds() {
        let court = CourtLayout::scale_model();
        assert!(court.in_bounds(0.0, 0.0, 0.0));
        assert!(court.in_bounds(court.half_length, 0.0, 0.0));
        assert!(!court.in_bounds(court.half_length + 0.6, 0.0, 0.5));
    }
}
