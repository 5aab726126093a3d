//! Collision response, dispatched by role tags.
//!
//! Once a pair survives the broad phase, the static node's [`SurfaceKind`]
//! and the dynamic node's [`DynamicKind`] pick the strategy:
//!
//! - **Rim** vs ball: sphere-against-disk. A clean pass-through records a
//!   score and nothing else; the ball keeps falling. A graze reflects the
//!   velocity about the center-to-contact direction.
//! - **Probe** vs anything: a discrete positional correction along the
//!   smallest of the six axis-aligned separations. No velocity is involved.
//! - **Backboard / fence** vs ball: reflection about the hand-authored
//!   normal of the face that was hit.
//! - **Generic solid** vs ball: the closest ray-triangle intersection along
//!   the velocity picks the triangle; its averaged vertex normals become the
//!   contact normal.
//!
//! Every rebound damps the velocity and nudges the position along the new
//! velocity by a fixed sub-step, so a fresh rebound cannot re-enter the
//! surface it just left on the next tick.
//!
//! A pair missing a required component is skipped with a debug log; a
//! narrow-phase miss leaves the body untouched for this tick.

use crate::ball::Ball;
use crate::collision::dispatcher::PairHit;
use crate::collision::geometry::{ray_triangle_intersect, reflect_damped, sphere_disk_intersect, DiskHit};
use crate::mesh::Triangle;
use crate::scene::{Scene, Transform};
use crate::simulation::SimEvent;
use crate::types::{CourtLayout, DynamicKind, GoalSide, SurfaceKind, Tuning, Vec3};

/// Resolve one broad-phase hit.
pub(crate) fn resolve_pair(
    scene: &mut Scene,
    hit: &PairHit,
    layout: &CourtLayout,
    tuning: &Tuning,
    events: &mut Vec<SimEvent>,
) {
    let Some(kind) = scene.node(hit.dynamic).and_then(|n| n.dynamic) else {
        return;
    };
    let Some(surface) = scene.node(hit.fixed).and_then(|n| n.surface) else {
        return;
    };

    match (kind, surface) {
        (DynamicKind::Ball, SurfaceKind::Rim(side)) => {
            resolve_rim(scene, hit, side, layout, tuning, events);
        }
        (DynamicKind::Probe, _) => resolve_probe(scene, hit),
        (DynamicKind::Ball, SurfaceKind::Backboard(side)) => {
            resolve_flat(scene, hit, layout.backboard_normal(side), tuning, events);
        }
        (DynamicKind::Ball, SurfaceKind::Fence(segment)) => {
            resolve_flat(scene, hit, layout.fence_normal(segment), tuning, events);
        }
        (DynamicKind::Ball, SurfaceKind::Solid) => resolve_mesh(scene, hit, tuning, events),
    }
}

/// Rebound: damp-reflect the velocity, then nudge the position along the
/// new velocity by the fixed sub-step.
fn apply_rebound(ball: &mut Ball, transform: &mut Transform, normal: Vec3, tuning: &Tuning) {
    ball.velocity = reflect_damped(ball.velocity, normal, tuning.damping);
    transform.translation += ball.velocity * tuning.rebound_substep;
}

/// Ball against a scoring rim.
fn resolve_rim(
    scene: &mut Scene,
    hit: &PairHit,
    side: GoalSide,
    layout: &CourtLayout,
    tuning: &Tuning,
    events: &mut Vec<SimEvent>,
) {
    let Some(node) = scene.node_mut(hit.dynamic) else {
        return;
    };
    let center = node.transform.translation;
    let Some((ball, transform)) = node.ball_and_transform_mut() else {
        tracing::debug!("rim pair without a ball body, skipping");
        return;
    };

    match sphere_disk_intersect(
        layout.rim_center(side),
        layout.rim_radius,
        Vec3::UP,
        center,
        ball.radius,
    ) {
        DiskHit::Passage => {
            if !ball.scored {
                ball.scored = true;
                tracing::info!(?side, "ball dropped through the rim");
                events.push(SimEvent::Score { side });
            }
        }
        DiskHit::Contact(point) => {
            let normal = (point - center).normalized();
            if normal == Vec3::ZERO {
                return;
            }
            apply_rebound(ball, transform, normal, tuning);
            events.push(SimEvent::Rebound {
                ball: hit.dynamic,
                surface: hit.fixed,
            });
        }
        DiskHit::Miss => {}
    }
}

/// Probe against anything: move the probe by the smallest non-negative
/// axis-aligned separation between the two boxes.
fn resolve_probe(scene: &mut Scene, hit: &PairHit) {
    let push = hit.fixed_box.max - hit.dynamic_box.min;
    let pull = hit.dynamic_box.max - hit.fixed_box.min;
    let candidates = [
        (push.x, Vec3::new(1.0, 0.0, 0.0)),
        (push.y, Vec3::new(0.0, 1.0, 0.0)),
        (push.z, Vec3::new(0.0, 0.0, 1.0)),
        (pull.x, Vec3::new(-1.0, 0.0, 0.0)),
        (pull.y, Vec3::new(0.0, -1.0, 0.0)),
        (pull.z, Vec3::new(0.0, 0.0, -1.0)),
    ];

    let mut best = f64::INFINITY;
    let mut correction = Vec3::ZERO;
    for (distance, direction) in candidates {
        if distance >= 0.0 && distance < best {
            best = distance;
            correction = direction * distance;
        }
    }

    if let Some(node) = scene.node_mut(hit.dynamic) {
        node.transform.translation += correction;
    }
}

/// Ball against a face with a hand-authored normal (backboard or fence).
fn resolve_flat(
    scene: &mut Scene,
    hit: &PairHit,
    normal: Vec3,
    tuning: &Tuning,
    events: &mut Vec<SimEvent>,
) {
    let Some(node) = scene.node_mut(hit.dynamic) else {
        return;
    };
    let Some((ball, transform)) = node.ball_and_transform_mut() else {
        tracing::debug!("flat-surface pair without a ball body, skipping");
        return;
    };
    apply_rebound(ball, transform, normal, tuning);
    events.push(SimEvent::Rebound {
        ball: hit.dynamic,
        surface: hit.fixed,
    });
}

/// Ball against generic solid geometry: closest ray-triangle hit along the
/// velocity, contact normal averaged from the winning triangle's vertex
/// normals.
fn resolve_mesh(scene: &mut Scene, hit: &PairHit, tuning: &Tuning, events: &mut Vec<SimEvent>) {
    let (origin, ray) = match scene.node(hit.dynamic).and_then(|n| {
        n.ball
            .as_ref()
            .map(|ball| (n.transform.translation, ball.velocity))
    }) {
        Some(pair) => pair,
        None => {
            tracing::debug!("solid pair without a ball body, skipping");
            return;
        }
    };
    let Some(fixed) = scene.node(hit.fixed) else {
        return;
    };
    let Some(model) = fixed.model.as_ref() else {
        tracing::debug!(name = %fixed.name, "solid node without a mesh, skipping");
        return;
    };

    let mut closest: Option<(f64, Triangle)> = None;
    for mesh in &model.primitives {
        for triangle in mesh.triangles() {
            if let Some(point) = ray_triangle_intersect(origin, ray, &triangle) {
                let distance = (point - origin).magnitude();
                if closest.map_or(true, |(best, _)| distance < best) {
                    closest = Some((distance, triangle));
                }
            }
        }
    }

    // No triangle along the velocity: leave the body untouched this tick.
    let Some((_, triangle)) = closest else {
        return;
    };

    let normal = (triangle.a.normal + triangle.b.normal + triangle.c.normal).normalized();
    if normal == Vec3::ZERO {
        return;
    }

    let Some(node) = scene.node_mut(hit.dynamic) else {
        return;
    };
    let Some((ball, transform)) = node.ball_and_transform_mut() else {
        return;
    };
    apply_rebound(ball, transform, normal, tuning);
    events.push(SimEvent::Rebound {
        ball: hit.dynamic,
        surface: hit.fixed,
    });
}

// =============================================================================
// Tests
// =============================================================================
