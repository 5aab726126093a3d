//! Collision detection and response.
//!
//! Two phases run each tick:
//! - **Broad phase** ([`dispatcher`]): every dynamic node is tested against
//!   every static node by world-space AABB overlap. Cheap, conservative,
//!   and evaluated against one position snapshot per tick.
//! - **Narrow phase + response** ([`response`]): surviving pairs are
//!   resolved by the static node's role tag: rim scoring, backboard and
//!   fence rebounds with hand-authored normals, generic triangle-mesh
//!   rebounds, and positional correction for the probe.
//!
//! The pure geometry lives in [`geometry`] and knows nothing about the
//! scene.

pub mod dispatcher;
pub mod geometry;
pub mod response;

pub use dispatcher::CollisionPass;
pub use geometry::{
    aabb_overlap, intervals_overlap, ray_triangle_intersect, reflect_damped,
    sphere_disk_intersect, world_aabb, DiskHit,
};
