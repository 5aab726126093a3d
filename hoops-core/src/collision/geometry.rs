//! Pure narrow-phase geometry kernels.
//!
//! Stateless routines over plain geometric values: interval and box overlap
//! for the broad phase, ray-triangle intersection (Möller–Trumbore) for
//! solid rebounds, sphere-disk classification for the scoring rim, and the
//! damped reflection that turns a contact normal into a rebound velocity.

use crate::mesh::Triangle;
use crate::types::{constants, Aabb, Mat4, Vec3};

/// True unless the two intervals are strictly disjoint.
///
/// Touching endpoints count as overlap.
pub fn intervals_overlap(min1: f64, max1: f64, min2: f64, max2: f64) -> bool {
    !(min1 > max2 || min2 > max1)
}

/// Box overlap: interval overlap on all three axes.
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    intervals_overlap(a.min.x, a.max.x, b.min.x, b.max.x)
        && intervals_overlap(a.min.y, a.max.y, b.min.y, b.max.y)
        && intervals_overlap(a.min.z, a.max.z, b.min.z, b.max.z)
}

/// Transform a local-space box into world space.
///
/// A rotated or non-uniformly scaled box does not stay axis-aligned, so the
/// world box is re-derived from the eight transformed corners rather than
/// from the two transformed extremes.
pub fn world_aabb(local: &Aabb, matrix: &Mat4) -> Aabb {
    let corners = local.corners().map(|corner| matrix.transform_point(corner));
    let mut bounds = Aabb::new(corners[0], corners[0]);
    for corner in &corners[1..] {
        bounds.min = bounds.min.min(corner);
        bounds.max = bounds.max.max(corner);
    }
    bounds
}

/// Möller–Trumbore ray-triangle intersection, solved with Cramer's rule.
///
/// Returns the intersection point, or `None` when the ray is parallel to
/// the triangle plane (determinant within the epsilon of zero), the hit
/// falls outside the barycentric bounds, or the hit lies behind or at the
/// ray origin.
pub fn ray_triangle_intersect(origin: Vec3, direction: Vec3, triangle: &Triangle) -> Option<Vec3> {
    let edge1 = triangle.b.position - triangle.a.position;
    let edge2 = triangle.c.position - triangle.a.position;

    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < constants::RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - triangle.a.position;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    if t > constants::RAY_EPSILON {
        Some(origin + direction * t)
    } else {
        None
    }
}

/// Outcome of testing the ball sphere against a rim disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiskHit {
    /// No intersection with the disk.
    Miss,
    /// The sphere's planar cross-section lies wholly inside the disk and the
    /// sphere center has dropped below the disk plane: a clean pass-through.
    Passage,
    /// The sphere grazes the disk edge; the point is a representative
    /// contact on the rim circle.
    Contact(Vec3),
}

/// Classify a sphere against a finite flat disk.
///
/// The sphere's cross-section in the disk plane is a circle of radius
/// `sqrt(r_s^2 - d^2)` where `d` is the center's distance to the plane.
/// That circle is compared against the disk rim by center distance versus
/// the sum and difference of radii. All comparisons carry a fixed
/// tolerance rather than exact equality.
pub fn sphere_disk_intersect(
    disk_center: Vec3,
    disk_radius: f64,
    disk_normal: Vec3,
    sphere_center: Vec3,
    sphere_radius: f64,
) -> DiskHit {
    let normal = disk_normal.normalized();
    if normal == Vec3::ZERO {
        return DiskHit::Miss;
    }

    let offset = sphere_center - disk_center;
    let signed_dist = offset.dot(&normal);
    if signed_dist.abs() > sphere_radius {
        return DiskHit::Miss;
    }

    let circle_radius = (sphere_radius * sphere_radius - signed_dist * signed_dist).sqrt();
    let circle_center = sphere_center - normal * signed_dist;
    let planar = circle_center - disk_center;
    let center_dist = planar.magnitude();

    let tol = constants::RIM_TOLERANCE;
    if center_dist + circle_radius <= disk_radius + tol {
        // Wholly inside the rim opening. A pass-through only counts once the
        // center is on the far side of the plane; a ball still above the rim
        // has not scored yet.
        if signed_dist < 0.0 {
            return DiskHit::Passage;
        }
        return DiskHit::Miss;
    }
    if center_dist - (circle_radius + disk_radius) > tol {
        return DiskHit::Miss;
    }
    if center_dist < tol {
        // Concentric but not wholly inside: no usable contact direction.
        return DiskHit::Miss;
    }

    // Tangent or two-point overlap: one representative point on the rim
    // circle, along the center-to-center line.
    DiskHit::Contact(disk_center + planar * (disk_radius / center_dist))
}

/// Elastic reflection about a normal, attenuated by a damping scalar:
/// `v' = damping * (v - 2 (v . n) n)`.
pub fn reflect_damped(velocity: Vec3, normal: Vec3, damping: f64) -> Vec3 {
    velocity.reflect(&normal) * damping
}

// =============================================================================
// Tests
// =============================================================================
