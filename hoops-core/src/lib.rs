//! # Hoops Core
//!
//! Collision detection and response for a basketball shooting simulation.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (math types, court layout, properties)
//! - `mesh`: Validated triangle meshes and bounding-volume computation
//! - `scene`: Index-arena world graph with collision registries
//! - `ball`: The moving-body component and throw seeding
//! - `collision`: Broad-phase sweep, narrow-phase kernels, role-tagged response
//! - `config`: YAML-based asset configuration loader
//! - `simulation`: Main orchestrator

pub mod ball;
pub mod collision;
pub mod config;
pub mod mesh;
pub mod scene;
pub mod simulation;
pub mod types;

pub use ball::{Ball, Throw};
pub use collision::CollisionPass;
pub use mesh::{Mesh, Model, Vertex};
pub use scene::{Node, NodeId, Scene, Transform};
pub use simulation::{RemovalReason, SimEvent, Simulation};
pub use types::{
    Aabb, BallProperties, CourtLayout, DynamicKind, FenceSegment, GoalSide, Quat, SurfaceKind,
    Tuning, Vec3,
};
