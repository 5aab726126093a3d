//! Index-arena scene graph.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; parent/child links are
//! ids, not pointers. Traversal is depth-first pre-order. The scene also
//! maintains explicit registries of dynamic and static collision
//! participants, so the per-tick broad phase walks two short id lists
//! instead of re-traversing the whole graph twice.
//!
//! Removal detaches a subtree and frees its slots; freed slots are not
//! reused, so a live [`NodeId`] never aliases a later node.

use crate::ball::Ball;
use crate::mesh::Model;
use crate::types::{Aabb, DynamicKind, Mat4, Quat, SurfaceKind, Vec3};

/// Handle to a node in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Local translation/rotation/scale of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// The local transform matrix, scale applied first.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation_rotation_scale(self.translation, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A node in the world graph.
///
/// Collision roles are assigned before insertion: `surface` marks a static
/// collision target, `dynamic` marks a moving participant. Untagged nodes
/// are invisible to the physics pass.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub transform: Transform,
    pub model: Option<Model>,
    /// Object-local bounding box, computed once from the model at insertion
    /// and cached. The world-space flavor is derived fresh every tick.
    pub local_aabb: Option<Aabb>,
    pub surface: Option<SurfaceKind>,
    pub dynamic: Option<DynamicKind>,
    pub ball: Option<Ball>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Split borrow of the ball component and the transform, for response
    /// code that updates velocity and position together.
    pub fn ball_and_transform_mut(&mut self) -> Option<(&mut Ball, &mut Transform)> {
        match self.ball.as_mut() {
            Some(ball) => Some((ball, &mut self.transform)),
            None => None,
        }
    }
}

/// The world: an arena of nodes plus the collision registries.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    roots: Vec<NodeId>,
    dynamics: Vec<NodeId>,
    statics: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent` (or as a root) and return its id.
    ///
    /// If the node carries a model but no cached local box, the box is
    /// computed here. Collision registries are updated from the node's tags.
    /// A stale parent id attaches the node as a root instead.
    pub fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        if node.local_aabb.is_none() {
            node.local_aabb = node.model.as_ref().and_then(Model::local_aabb);
        }

        let id = NodeId(self.nodes.len());
        if node.dynamic.is_some() {
            self.dynamics.push(id);
        }
        if node.surface.is_some() {
            self.statics.push(id);
        }

        match parent.and_then(|p| self.node_mut(p)) {
            Some(parent_node) => {
                parent_node.children.push(id);
                node.parent = parent;
            }
            None => {
                if parent.is_some() {
                    tracing::debug!(name = %node.name, "parent id is stale, attaching as root");
                }
                self.roots.push(id);
            }
        }

        self.nodes.push(Some(node));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Dynamic collision participants, in insertion order.
    pub fn dynamics(&self) -> &[NodeId] {
        &self.dynamics
    }

    /// Static collision targets, in insertion order.
    pub fn statics(&self) -> &[NodeId] {
        &self.statics
    }

    /// Depth-first pre-order traversal over all live nodes.
    pub fn traverse(&self, mut visit: impl FnMut(NodeId, &Node)) {
        for &root in &self.roots {
            self.traverse_from(root, &mut visit);
        }
    }

    fn traverse_from(&self, id: NodeId, visit: &mut impl FnMut(NodeId, &Node)) {
        if let Some(node) = self.node(id) {
            visit(id, node);
            for &child in &node.children {
                self.traverse_from(child, visit);
            }
        }
    }

    /// First node (in traversal order) with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                if node.name == name {
                    return Some(id);
                }
                stack.extend(node.children.iter().rev());
            }
        }
        None
    }

    /// World matrix of a node: the composition of local matrices from the
    /// root down. Never cached, since any ancestor may move between ticks.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        match self.node(id) {
            None => Mat4::IDENTITY,
            Some(node) => {
                let local = node.transform.matrix();
                match node.parent {
                    Some(parent) => self.world_matrix(parent).mul(&local),
                    None => local,
                }
            }
        }
    }

    /// Detach a subtree from its parent and free every node in it.
    pub fn remove_subtree(&mut self, id: NodeId) {
        let parent = match self.node(id) {
            Some(node) => node.parent,
            None => return,
        };
        match parent.and_then(|p| self.node_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        self.dynamics.retain(|&d| self.nodes[d.0].is_some());
        self.statics.retain(|&s| self.nodes[s.0].is_some());
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn floor_mesh() -> Mesh {
        Mesh::quad(
            [
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            Vec3::UP,
        )
        .unwrap()
    }

    #[test]
    fn test_traversal_is_preorder() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::new("root"), None);
        let a = scene.insert(Node::new("a"), Some(root));
        scene.insert(Node::new("a1"), Some(a));
        scene.insert(Node::new("b"), Some(root));

        let mut order = Vec::new();
        scene.traverse(|_, node| order.push(node.name.clone()));
        assert_eq!(order, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_find_by_name() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::new("root"), None);
        let hoop = scene.insert(Node::new("hoop"), Some(root));
        assert_eq!(scene.find_by_name("hoop"), Some(hoop));
        assert_eq!(scene.find_by_name("missing"), None);
    }

    #[test]
    fn test_insert_caches_local_aabb_from_model() {
        let mut scene = Scene::new();
        let mut node = Node::new("floor");
        node.model = Some(Model::single(floor_mesh()));
        let id = scene.insert(node, None);

        let cached = scene.node(id).unwrap().local_aabb.expect("box cached");
        assert_eq!(cached.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(cached.max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_world_matrix_composes_parent_chain() {
        let mut scene = Scene::new();
        let mut root = Node::new("root");
        root.transform.translation = Vec3::new(1.0, 0.0, 0.0);
        let root_id = scene.insert(root, None);

        let mut child = Node::new("child");
        child.transform.translation = Vec3::new(0.0, 2.0, 0.0);
        let child_id = scene.insert(child, Some(root_id));

        let p = scene.world_matrix(child_id).transform_point(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_registries_follow_tags() {
        let mut scene = Scene::new();
        let mut fixed = Node::new("floor");
        fixed.surface = Some(SurfaceKind::Solid);
        let fixed_id = scene.insert(fixed, None);

        let mut mover = Node::new("ball");
        mover.dynamic = Some(DynamicKind::Ball);
        let mover_id = scene.insert(mover, None);

        scene.insert(Node::new("scenery"), None);

        assert_eq!(scene.statics(), [fixed_id]);
        assert_eq!(scene.dynamics(), [mover_id]);
    }

    #[test]
    fn test_remove_subtree_frees_descendants_and_registries() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::new("root"), None);
        let mut mover = Node::new("ball");
        mover.dynamic = Some(DynamicKind::Ball);
        let mover_id = scene.insert(mover, Some(root));
        scene.insert(Node::new("trail"), Some(mover_id));

        assert_eq!(scene.len(), 3);
        scene.remove_subtree(mover_id);

        assert_eq!(scene.len(), 1);
        assert!(scene.node(mover_id).is_none());
        assert!(scene.dynamics().is_empty());
        assert_eq!(scene.find_by_name("trail"), None);
        // The root keeps no dangling child link.
        assert!(scene.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_stale_parent_attaches_as_root() {
        let mut scene = Scene::new();
        let ghost = scene.insert(Node::new("ghost"), None);
        scene.remove_subtree(ghost);

        let id = scene.insert(Node::new("orphan"), Some(ghost));
        assert!(scene.node(id).unwrap().parent().is_none());
        assert_eq!(scene.find_by_name("orphan"), Some(id));
    }
}
