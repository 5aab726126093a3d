//! Triangle-mesh data for collision queries.
//!
//! A [`Mesh`] is the collision view of a renderable primitive: vertex
//! positions with per-vertex normals, plus an index buffer consumed in groups
//! of three. Meshes are validated on construction: malformed geometry (an
//! empty or non-triangular index buffer, out-of-range indices, non-finite
//! positions) is rejected at load time so it can never surface as a
//! mid-collision failure.

use crate::types::{Aabb, Vec3};

/// Error type for mesh construction.
#[derive(Debug)]
pub enum MeshError {
    EmptyIndexBuffer,
    /// The index count is not a multiple of three.
    PartialTriangle(usize),
    IndexOutOfRange {
        index: u32,
        vertex_count: usize,
    },
    /// A vertex position contains NaN or infinity.
    NonFinitePosition(usize),
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::EmptyIndexBuffer => write!(f, "mesh has an empty index buffer"),
            MeshError::PartialTriangle(count) => {
                write!(f, "index count {} is not a multiple of 3", count)
            }
            MeshError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "index {} out of range for {} vertices",
                index, vertex_count
            ),
            MeshError::NonFinitePosition(i) => {
                write!(f, "vertex {} has a non-finite position", i)
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// A mesh vertex: position and outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// One triangle of a mesh, by value.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
}

/// A validated triangle mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Validate and build a mesh from a vertex and index buffer.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.is_empty() {
            return Err(MeshError::EmptyIndexBuffer);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(indices.len()));
        }
        for &index in &indices {
            if index as usize >= vertices.len() {
                return Err(MeshError::IndexOutOfRange {
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        for (i, vertex) in vertices.iter().enumerate() {
            if !vertex.position.is_finite() {
                return Err(MeshError::NonFinitePosition(i));
            }
        }
        Ok(Self { vertices, indices })
    }

    /// A rectangular face built from four corners (counter-clockwise when
    /// viewed from the side the normal points toward) sharing one normal.
    ///
    /// The workhorse for court geometry: floors, backboards, fence panels.
    pub fn quad(corners: [Vec3; 4], normal: Vec3) -> Result<Self, MeshError> {
        let unit = normal.normalized();
        let vertices = corners.iter().map(|&p| Vertex::new(p, unit)).collect();
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Iterate the mesh triangles, consuming indices in groups of three.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(|chunk| Triangle {
            a: self.vertices[chunk[0] as usize],
            b: self.vertices[chunk[1] as usize],
            c: self.vertices[chunk[2] as usize],
        })
    }

    /// Object-local bounding box: component-wise min/max over all vertices.
    pub fn local_aabb(&self) -> Aabb {
        let first = self.vertices[0].position;
        let mut bounds = Aabb::new(first, first);
        for vertex in &self.vertices[1..] {
            bounds.min = bounds.min.min(&vertex.position);
            bounds.max = bounds.max.max(&vertex.position);
        }
        bounds
    }
}

/// All collision meshes of one object.
///
/// Mirrors the renderable split into primitives: one object may carry several
/// sub-meshes, and its bounding box is the merge of theirs.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub primitives: Vec<Mesh>,
}

impl Model {
    pub fn new(primitives: Vec<Mesh>) -> Self {
        Self { primitives }
    }

    pub fn single(mesh: Mesh) -> Self {
        Self {
            primitives: vec![mesh],
        }
    }

    /// Merged local bounding box over all primitives, or `None` for an
    /// empty model.
    pub fn local_aabb(&self) -> Option<Aabb> {
        let mut merged: Option<Aabb> = None;
        for mesh in &self.primitives {
            let bounds = mesh.local_aabb();
            merged = Some(match merged {
                Some(acc) => acc.merged(&bounds),
                None => bounds,
            });
        }
        merged
    }
}

// =============================================================================
// Tests
// =============================================================================
