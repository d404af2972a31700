//! Scene graph: a generational arena of group and mesh nodes.
//!
//! The graph always has a root group. Loaded models are mounted as
//! subtrees under it and unmounted when the view switches. Node ids carry
//! a generation so an id from an unmounted model never resolves to a node
//! that later reuses its slot.

mod mesh;
mod transform;

use std::sync::Arc;

use glam::Mat4;
pub use mesh::{Aabb, MeshData};
pub use transform::Transform;

#[cfg(test)]
pub(crate) use mesh::tests::unit_cube;

/// Stable handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A group or mesh node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Display name (from the model asset).
    pub name: String,
    /// Transform relative to the parent.
    pub transform: Transform,
    /// Geometry, `None` for group nodes.
    pub mesh: Option<Arc<MeshData>>,
    /// Hidden nodes (and their subtrees) are neither drawn nor picked.
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// A group node with the given name and transform.
    #[must_use]
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A mesh node.
    #[must_use]
    pub fn mesh(
        name: impl Into<String>,
        transform: Transform,
        mesh: Arc<MeshData>,
    ) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::group(name, transform)
        }
    }

    /// Whether this node carries geometry.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed scene graph with a permanent root group.
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    /// Monotonically increasing generation; bumped on structural mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the root group.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::group("Scene", Transform::IDENTITY)),
            }],
            free: Vec::new(),
            root,
            generation: 1,
            rendered_generation: 0,
        }
    }

    /// The root group every model is mounted under.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Whether only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Whether structure changed since the last [`mark_rendered`](Self::mark_rendered).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Record that the renderer has consumed the current structure.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    /// Resolve an id; `None` if it was removed.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Mutable access to a live node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Insert `node` as the last child of `parent`. Returns `None` if the
    /// parent is not live.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        node.parent = Some(parent);
        node.children.clear();

        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        };

        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        self.generation += 1;
        Some(id)
    }

    /// Remove `id` and its whole subtree. Returns the removed ids in
    /// pre-order. The root cannot be removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root || !self.contains(id) {
            return Vec::new();
        }
        let removed = self.descendants(id);

        let parent = self.node(id).and_then(Node::parent);
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        for gone in &removed {
            let slot = &mut self.slots[gone.index as usize];
            slot.node = None;
            self.free.push(gone.index);
        }
        self.generation += 1;
        removed
    }

    /// `id` followed by all of its descendants, depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Visible mesh nodes under `id` (inclusive), pre-order. A hidden node
    /// hides its subtree.
    #[must_use]
    pub fn visible_meshes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if node.is_mesh() {
                out.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Local-to-world matrix, composing every ancestor's transform.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Find the first live node (pre-order from the root) with `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.node(*id).is_some_and(|n| n.name == name))
    }
}
