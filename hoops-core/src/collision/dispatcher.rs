//! Per-tick broad phase.
//!
//! The dispatcher walks the scene's dynamic and static registries, derives
//! both world boxes for every pair, and hands overlapping pairs to the
//! response module. Pair collection happens before any response runs, so
//! every pair in a tick is judged against the same snapshot of positions
//! even though responses move bodies.

use crate::collision::geometry::{aabb_overlap, world_aabb};
use crate::collision::response;
use crate::scene::{NodeId, Scene};
use crate::simulation::SimEvent;
use crate::types::{Aabb, CourtLayout, Tuning};

/// One broad-phase hit: a dynamic/static pair whose world boxes overlap.
///
/// The boxes are carried along so the response (the probe's minimum
/// translation in particular) works from the same snapshot the overlap was
/// decided on.
#[derive(Debug, Clone, Copy)]
pub struct PairHit {
    pub dynamic: NodeId,
    pub fixed: NodeId,
    pub dynamic_box: Aabb,
    pub fixed_box: Aabb,
}

/// The collision pass run once per simulation tick.
pub struct CollisionPass {
    pub layout: CourtLayout,
    pub tuning: Tuning,
}

impl CollisionPass {
    pub fn new(layout: CourtLayout, tuning: Tuning) -> Self {
        Self { layout, tuning }
    }

    /// Sweep the scene and resolve every overlapping pair. Returns the
    /// events the responses produced (scores, rebounds).
    pub fn run(&self, scene: &mut Scene) -> Vec<SimEvent> {
        let hits = Self::broad_phase(scene);
        let mut events = Vec::new();
        for hit in &hits {
            response::resolve_pair(scene, hit, &self.layout, &self.tuning, &mut events);
        }
        events
    }

    /// Collect all overlapping dynamic/static pairs from the current
    /// position snapshot.
    fn broad_phase(scene: &Scene) -> Vec<PairHit> {
        let mut hits = Vec::new();
        for &dynamic in scene.dynamics() {
            for &fixed in scene.statics() {
                if dynamic == fixed {
                    continue;
                }
                let (Some(dynamic_box), Some(fixed_box)) =
                    (node_world_box(scene, dynamic), node_world_box(scene, fixed))
                else {
                    continue;
                };
                if aabb_overlap(&dynamic_box, &fixed_box) {
                    hits.push(PairHit {
                        dynamic,
                        fixed,
                        dynamic_box,
                        fixed_box,
                    });
                }
            }
        }
        hits
    }
}

/// World-space bounding box of a node, from its cached local box and its
/// current world matrix. `None` if the node is gone or carries no box.
pub fn node_world_box(scene: &Scene, id: NodeId) -> Option<Aabb> {
    let node = scene.node(id)?;
    let Some(local) = node.local_aabb else {
        tracing::debug!(name = %node.name, "node has no bounding box, skipping pair");
        return None;
    };
    Some(world_aabb(&local, &scene.world_matrix(id)))
}

// =============================================================================
// Tests
// =============================================================================
