//! Simulation orchestrator.
//!
//! Owns the scene, the single live ball, and the per-tick pipeline:
//! integrate the moving bodies, run the collision pass, then apply the
//! lifecycle rules (rest detection, out-of-bounds removal). Everything runs
//! synchronously inside [`Simulation::step`]; the scene is never touched by
//! the physics outside of it.
//!
//! At most one ball is live at a time. [`Simulation::spawn_ball`] explicitly
//! evicts the previous ball before attaching the new one, and hands back the
//! new node id.

use crate::ball::{Ball, Throw};
use crate::collision::CollisionPass;
use crate::scene::{Node, NodeId, Scene};
use crate::types::{Aabb, BallProperties, CourtLayout, DynamicKind, GoalSide, Tuning};

/// Why a ball was removed from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The ball stayed below the rest speed long enough.
    CameToRest,
    /// The ball left the fenced court volume.
    OutOfBounds,
}

/// Something the physics produced this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// A ball dropped cleanly through a rim.
    Score { side: GoalSide },
    /// A ball rebounded off a static surface.
    Rebound { ball: NodeId, surface: NodeId },
    /// A ball was removed from the world.
    BallRemoved { ball: NodeId, reason: RemovalReason },
}

/// The simulation world: scene, court, tuning, and the live ball handle.
pub struct Simulation {
    scene: Scene,
    ball_props: BallProperties,
    collision: CollisionPass,
    current_ball: Option<NodeId>,
    time: f64,
    tally: [u32; 2],
}

impl Simulation {
    pub fn new(
        scene: Scene,
        layout: CourtLayout,
        ball_props: BallProperties,
        tuning: Tuning,
    ) -> Self {
        Self {
            scene,
            ball_props,
            collision: CollisionPass::new(layout, tuning),
            current_ball: None,
            time: 0.0,
            tally: [0, 0],
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The live ball, if one exists.
    pub fn current_ball(&self) -> Option<NodeId> {
        self.current_ball
    }

    /// Goals scored on one side so far.
    pub fn score(&self, side: GoalSide) -> u32 {
        match side {
            GoalSide::Left => self.tally[0],
            GoalSide::Right => self.tally[1],
        }
    }

    pub fn layout(&self) -> &CourtLayout {
        &self.collision.layout
    }

    pub fn tuning(&self) -> &Tuning {
        &self.collision.tuning
    }

    /// Launch a new ball, evicting the previous one first.
    pub fn spawn_ball(&mut self, throw: &Throw) -> NodeId {
        if let Some(old) = self.current_ball.take() {
            tracing::debug!("evicting previous ball before spawn");
            self.scene.remove_subtree(old);
        }

        let mut node = Node::new("ball");
        node.transform.translation = throw.position;
        node.transform.rotation = throw.rotation;
        node.dynamic = Some(DynamicKind::Ball);
        node.ball = Some(Ball::from_throw(&self.ball_props, throw));
        node.local_aabb = Some(Aabb::from_half_extent(self.ball_props.radius));

        let id = self.scene.insert(node, None);
        self.current_ball = Some(id);
        tracing::debug!(power = throw.power, angle = throw.angle_deg, "ball spawned");
        id
    }

    /// Advance the world by one tick of `dt` seconds.
    ///
    /// Order within the tick: integration, then the collision pass over one
    /// position snapshot, then lifecycle checks on the live ball.
    pub fn step(&mut self, dt: f64) -> Vec<SimEvent> {
        // Integrate every dynamic body that carries a moving-body component.
        let dynamics: Vec<NodeId> = self.scene.dynamics().to_vec();
        for id in dynamics {
            if let Some(node) = self.scene.node_mut(id) {
                if let Some((ball, transform)) = node.ball_and_transform_mut() {
                    ball.integrate(transform, dt);
                }
            }
        }

        let mut events = self.collision.run(&mut self.scene);
        for event in &events {
            if let SimEvent::Score { side } = event {
                match side {
                    GoalSide::Left => self.tally[0] += 1,
                    GoalSide::Right => self.tally[1] += 1,
                }
            }
        }

        if let Some(reason) = self.ball_removal_due() {
            // The handle is live here: removal_due saw the node.
            if let Some(id) = self.current_ball.take() {
                self.scene.remove_subtree(id);
                tracing::info!(?reason, "ball removed");
                events.push(SimEvent::BallRemoved { ball: id, reason });
            }
        }

        self.time += dt;
        events
    }

    /// Check the live ball against the lifecycle rules.
    fn ball_removal_due(&mut self) -> Option<RemovalReason> {
        let id = self.current_ball?;
        let layout = &self.collision.layout;
        let tuning = &self.collision.tuning;
        let node = self.scene.node_mut(id)?;
        let position = node.transform.translation;
        let ball = node.ball.as_mut()?;

        let below_floor = position.y < layout.floor_y - tuning.oob_margin;
        if below_floor || !layout.in_bounds(position.x, position.z, tuning.oob_margin) {
            return Some(RemovalReason::OutOfBounds);
        }
        if ball.settled(tuning.rest_speed, tuning.rest_ticks) {
            return Some(RemovalReason::CameToRest);
        }
        None
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, Model};
    use crate::types::{SurfaceKind, Vec3};

    fn empty_sim() -> Simulation {
        Simulation::new(
            Scene::new(),
            CourtLayout::scale_model(),
            BallProperties::streetball(),
            Tuning::scale_model(),
        )
    }

    fn sim_with_floor() -> Simulation {
        let mut scene = Scene::new();
        let layout = CourtLayout::scale_model();
        let mesh = Mesh::quad(
            [
                Vec3::new(-layout.half_length, 0.0, -layout.half_width),
                Vec3::new(layout.half_length, 0.0, -layout.half_width),
                Vec3::new(layout.half_length, 0.0, layout.half_width),
                Vec3::new(-layout.half_length, 0.0, layout.half_width),
            ],
            Vec3::UP,
        )
        .unwrap();
        let mut floor = Node::new("floor");
        floor.model = Some(Model::single(mesh));
        floor.surface = Some(SurfaceKind::Solid);
        scene.insert(floor, None);

        Simulation::new(
            scene,
            layout,
            BallProperties::streetball(),
            Tuning::scale_model(),
        )
    }

    fn count_balls(sim: &Simulation) -> usize {
        let mut count = 0;
        sim.scene().traverse(|_, node| {
            if node.ball.is_some() {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn test_at_most_one_live_ball() {
        let mut sim = empty_sim();
        let first = sim.spawn_ball(&Throw::default());
        let second = sim.spawn_ball(&Throw::default());

        assert_ne!(first, second);
        assert_eq!(count_balls(&sim), 1);
        assert_eq!(sim.current_ball(), Some(second));
        assert!(sim.scene().node(first).is_none(), "first ball evicted");
    }

    #[test]
    fn test_step_integrates_gravity() {
        let mut sim = empty_sim();
        let id = sim.spawn_ball(&Throw {
            direction: Vec3::new(0.0, 0.0, -1.0),
            angle_deg: 0.0,
            power: 0.0,
            ..Throw::default()
        });

        sim.step(0.1);

        let node = sim.scene().node(id).unwrap();
        let velocity = node.ball.as_ref().unwrap().velocity;
        assert!((velocity.y + 0.1981).abs() < 1e-9, "got {:?}", velocity);
        // Semi-implicit: the new velocity already moved the position.
        assert!((node.transform.translation.y - (0.5 - 0.01981)).abs() < 1e-9);
    }

    #[test]
    fn test_thrown_ball_bounces_off_floor() {
        let mut sim = sim_with_floor();
        sim.spawn_ball(&Throw {
            position: Vec3::new(0.0, 0.3, 0.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            angle_deg: 0.0,
            power: 0.2,
            ..Throw::default()
        });

        let dt = 1.0 / 60.0;
        let mut bounced = false;
        for _ in 0..240 {
            let events = sim.step(dt);
            if events
                .iter()
                .any(|e| matches!(e, SimEvent::Rebound { .. }))
            {
                bounced = true;
                break;
            }
        }
        assert!(bounced, "a falling ball must rebound off the floor");
    }

    #[test]
    fn test_ball_out_of_bounds_is_removed() {
        let mut sim = empty_sim();
        let id = sim.spawn_ball(&Throw {
            position: Vec3::new(0.0, 0.5, 0.0),
            direction: Vec3::new(1.0, 0.0, 0.0),
            angle_deg: 0.0,
            power: 10.0,
            ..Throw::default()
        });

        let dt = 1.0 / 60.0;
        let mut removed = None;
        for _ in 0..120 {
            let events = sim.step(dt);
            if let Some(SimEvent::BallRemoved { ball, reason }) = events
                .iter()
                .find(|e| matches!(e, SimEvent::BallRemoved { .. }))
            {
                removed = Some((*ball, *reason));
                break;
            }
        }

        let (ball, reason) = removed.expect("a ball flying off court must be removed");
        assert_eq!(ball, id);
        assert_eq!(reason, RemovalReason::OutOfBounds);
        assert_eq!(sim.current_ball(), None);
        assert_eq!(count_balls(&sim), 0);
    }

    #[test]
    fn test_slow_ball_comes_to_rest() {
        let mut sim = empty_sim();
        let id = sim.spawn_ball(&Throw {
            position: Vec3::new(0.0, 0.5, 0.0),
            power: 0.0,
            ..Throw::default()
        });
        // Cancel gravity so the ball just hangs below the rest speed.
        sim.scene_mut()
            .node_mut(id)
            .unwrap()
            .ball
            .as_mut()
            .unwrap()
            .gravity = Vec3::ZERO;

        let mut removed = false;
        for _ in 0..20 {
            let events = sim.step(1.0 / 60.0);
            if events.iter().any(|e| {
                matches!(
                    e,
                    SimEvent::BallRemoved {
                        reason: RemovalReason::CameToRest,
                        ..
                    }
                )
            }) {
                removed = true;
                break;
            }
        }
        assert!(removed, "a hovering ball must settle and be removed");
    }

    #[test]
    fn test_score_tally_accumulates() {
        let mut sim = empty_sim();
        let layout = sim.layout().clone();

        let mut rim = Node::new("rim");
        rim.transform.translation = layout.rim_center(GoalSide::Left);
        rim.surface = Some(SurfaceKind::Rim(GoalSide::Left));
        rim.local_aabb = Some(Aabb::from_half_extent(layout.rim_radius + 0.02));
        sim.scene_mut().insert(rim, None);

        // Drop a ball straight through the left rim.
        let above_rim = layout.rim_center(GoalSide::Left) + Vec3::new(0.0, 0.15, 0.0);
        sim.spawn_ball(&Throw {
            position: above_rim,
            direction: Vec3::new(0.0, -1.0, 0.0),
            angle_deg: 0.0,
            power: 0.5,
            ..Throw::default()
        });

        let mut scored = false;
        for _ in 0..120 {
            let events = sim.step(1.0 / 60.0);
            if events
                .iter()
                .any(|e| matches!(e, SimEvent::Score { side: GoalSide::Left }))
            {
                scored = true;
                break;
            }
        }
        assert!(scored, "a drop through the rim must score");
        assert_eq!(sim.score(GoalSide::Left), 1);
        assert_eq!(sim.score(GoalSide::Right), 0);
    }
}
