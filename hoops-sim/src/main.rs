//! Headless driver: builds the scale-model court, runs a handful of
//! scripted throws, and reports what the physics produced.

use anyhow::Result;

use hoops_core::config::AssetLoader;
use hoops_core::{
    Aabb, BallProperties, CourtLayout, FenceSegment, GoalSide, Mesh, Model, Node, Scene, SimEvent,
    Simulation, SurfaceKind, Throw, Tuning, Vec3,
};

/// Assemble the static court: floor mesh, rims, backboards, and the
/// perimeter fence. Role tags are assigned here, once, at setup.
fn build_court(layout: &CourtLayout) -> Result<Scene> {
    let mut scene = Scene::new();

    let floor = Mesh::quad(
        [
            Vec3::new(-layout.half_length, layout.floor_y, -layout.half_width),
            Vec3::new(layout.half_length, layout.floor_y, -layout.half_width),
            Vec3::new(layout.half_length, layout.floor_y, layout.half_width),
            Vec3::new(-layout.half_length, layout.floor_y, layout.half_width),
        ],
        Vec3::UP,
    )?;
    let mut floor_node = Node::new("floor");
    floor_node.model = Some(Model::single(floor));
    floor_node.surface = Some(SurfaceKind::Solid);
    scene.insert(floor_node, None);

    for side in [GoalSide::Left, GoalSide::Right] {
        let rim_center = layout.rim_center(side);

        let mut rim = Node::new(match side {
            GoalSide::Left => "rim.left",
            GoalSide::Right => "rim.right",
        });
        rim.transform.translation = rim_center;
        rim.surface = Some(SurfaceKind::Rim(side));
        rim.local_aabb = Some(Aabb::new(
            Vec3::new(-layout.rim_radius, -0.02, -layout.rim_radius),
            Vec3::new(layout.rim_radius, 0.02, layout.rim_radius),
        ));
        scene.insert(rim, None);

        // The board hangs behind the rim, facing the court.
        let inward = layout.backboard_normal(side);
        let mut board = Node::new(match side {
            GoalSide::Left => "backboard.left",
            GoalSide::Right => "backboard.right",
        });
        board.transform.translation =
            rim_center - inward * (layout.rim_radius + 0.05) + Vec3::new(0.0, 0.15, 0.0);
        board.surface = Some(SurfaceKind::Backboard(side));
        board.local_aabb = Some(Aabb::new(
            Vec3::new(-0.02, -0.25, -0.45),
            Vec3::new(0.02, 0.25, 0.45),
        ));
        scene.insert(board, None);
    }

    let fence_height = 0.6;
    for segment in [
        FenceSegment::LeftEnd,
        FenceSegment::RightEnd,
        FenceSegment::NearSide,
        FenceSegment::FarSide,
    ] {
        let (name, translation, half_extents) = match segment {
            FenceSegment::LeftEnd => (
                "fence.left-end",
                Vec3::new(-layout.half_length, fence_height / 2.0, 0.0),
                Vec3::new(0.02, fence_height / 2.0, layout.half_width),
            ),
            FenceSegment::RightEnd => (
                "fence.right-end",
                Vec3::new(layout.half_length, fence_height / 2.0, 0.0),
                Vec3::new(0.02, fence_height / 2.0, layout.half_width),
            ),
            FenceSegment::NearSide => (
                "fence.near-side",
                Vec3::new(0.0, fence_height / 2.0, -layout.half_width),
                Vec3::new(layout.half_length, fence_height / 2.0, 0.02),
            ),
            FenceSegment::FarSide => (
                "fence.far-side",
                Vec3::new(0.0, fence_height / 2.0, layout.half_width),
                Vec3::new(layout.half_length, fence_height / 2.0, 0.02),
            ),
        };
        let mut fence = Node::new(name);
        fence.transform.translation = translation;
        fence.surface = Some(SurfaceKind::Fence(segment));
        fence.local_aabb = Some(Aabb::new(-half_extents, half_extents));
        scene.insert(fence, None);
    }

    Ok(scene)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let loader = AssetLoader::new("assets");
    let ball_props = loader.load_ball("streetball").unwrap_or_else(|e| {
        tracing::warn!("falling back to built-in ball properties: {}", e);
        BallProperties::streetball()
    });
    let layout = loader.load_court("scale_model").unwrap_or_else(|e| {
        tracing::warn!("falling back to built-in court layout: {}", e);
        CourtLayout::scale_model()
    });
    let tuning = loader.load_tuning("default").unwrap_or_else(|e| {
        tracing::warn!("falling back to built-in tuning: {}", e);
        Tuning::scale_model()
    });

    let scene = build_court(&layout)?;
    let mut sim = Simulation::new(scene, layout.clone(), ball_props, tuning.clone());

    // A scripted session: free throws at the right goal with varying power
    // and arc. Each throw runs until its ball leaves the world.
    let rim = layout.rim_center(GoalSide::Right);
    let foul_line = Vec3::new(rim.x - 0.6, 0.45, 0.0);
    let throws = [
        (tuning.throw_power, tuning.throw_angle_deg),
        (1.2, 35.0),
        (1.6, 45.0),
        (1.9, 50.0),
        (2.1, 55.0),
    ];

    let dt = 1.0 / 60.0;
    let max_ticks = 600;

    for (index, &(power, angle_deg)) in throws.iter().enumerate() {
        tracing::info!(index, power, angle_deg, "throwing");
        sim.spawn_ball(&Throw {
            position: foul_line,
            direction: Vec3::new(1.0, 0.0, 0.0),
            angle_deg,
            power,
            ..Throw::default()
        });

        let mut ticks = 0;
        while sim.current_ball().is_some() && ticks < max_ticks {
            for event in sim.step(dt) {
                match event {
                    SimEvent::Score { side } => tracing::info!(?side, "score!"),
                    SimEvent::Rebound { surface, .. } => {
                        let name = sim
                            .scene()
                            .node(surface)
                            .map(|n| n.name.clone())
                            .unwrap_or_default();
                        tracing::debug!(surface = %name, "rebound");
                    }
                    SimEvent::BallRemoved { reason, .. } => {
                        tracing::info!(?reason, "throw over");
                    }
                }
            }
            ticks += 1;
        }
        if sim.current_ball().is_some() {
            tracing::info!(index, "throw timed out, ball still live");
        }
    }

    tracing::info!(
        left = sim.score(GoalSide::Left),
        right = sim.score(GoalSide::Right),
        elapsed = sim.time(),
        "session finished"
    );
    Ok(())
}
