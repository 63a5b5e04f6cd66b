//! Typed scene graph.
//!
//! Nodes live in a [`SlotMap`] keyed by [`NodeId`]. Every node carries one
//! of a closed set of kinds, so traversal matches on [`NodeKind`] instead of
//! probing properties.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tw_core::{Result, TwError};
use tw_geometry::TriangleMesh;
use tw_math::{Aabb3, DMat4, Transform, Vector3};

use crate::camera::Camera;
use crate::loader::{Asset, AssetNode};
use crate::visitor::SceneVisitor;

new_key_type! {
    pub struct NodeId;
}

/// Emissive glow added on top of a mesh's base color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emissive {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct MeshNode {
    pub mesh: Arc<TriangleMesh>,
    pub color: [f32; 3],
    pub emissive: Option<Emissive>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshNode {
    pub fn new(mesh: Arc<TriangleMesh>, color: [f32; 3]) -> Self {
        Self {
            mesh,
            color,
            emissive: None,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        direction: Vector3,
    },
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Mesh(MeshNode),
    Group,
    Light(Light),
    Camera(Camera),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: &str, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::identity(),
            visible: true,
            kind,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// A tree of nodes below a single root group.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("scene", NodeKind::Group, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Add a node under `parent` with an identity transform.
    pub fn add(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(TwError::NotFound(format!("Parent node for '{}'", name)));
        }
        let id = self.nodes.insert(Node::new(name, kind, Some(parent)));
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    pub fn add_with_transform(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        transform: Transform,
    ) -> Result<NodeId> {
        let id = self.add(parent, name, kind)?;
        self.nodes[id].transform = transform;
        Ok(id)
    }

    /// Remove a node and its whole subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        if id == self.root {
            return Err(TwError::InvalidOperation("Cannot remove the scene root".into()));
        }
        let parent = match self.nodes.get(id) {
            Some(node) => node.parent,
            None => return Err(TwError::NotFound("Node already removed".into())),
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove everything except the root. Returns the number of nodes removed.
    pub fn clear(&mut self) -> usize {
        let children = std::mem::take(&mut self.nodes[self.root].children);
        let mut removed = 0;
        for child in children {
            let mut stack = vec![child];
            while let Some(current) = stack.pop() {
                if let Some(node) = self.nodes.remove(current) {
                    stack.extend(node.children);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Local-to-world matrix, composed from the root down.
    pub fn world_matrix(&self, id: NodeId) -> DMat4 {
        let mut matrix = DMat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            matrix = node.transform.to_mat4() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Whether the node and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        self.nodes.contains_key(id)
    }

    /// World-space bounds of every mesh in the subtree.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb3> {
        let mut bounds: Option<Aabb3> = None;
        for mesh_id in self.mesh_ids_under(id) {
            let Some(local) = self.nodes[mesh_id].as_mesh().and_then(|m| m.mesh.bounds()) else {
                continue;
            };
            let world = local.transformed(&self.world_matrix(mesh_id));
            bounds = Some(match bounds {
                Some(b) => b.merge(&world),
                None => world,
            });
        }
        bounds
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Depth-first, pre-order traversal of the subtree at `id`.
    pub fn walk<V: SceneVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            match &node.kind {
                NodeKind::Mesh(mesh) => visitor.visit_mesh(current, node, mesh),
                NodeKind::Group => visitor.visit_group(current, node),
                NodeKind::Light(light) => visitor.visit_light(current, node, light),
                NodeKind::Camera(camera) => visitor.visit_camera(current, node, camera),
            }
            stack.extend(node.children.iter().rev());
        }
    }

    /// Mesh nodes in the subtree at `id`, in traversal order.
    pub fn mesh_ids_under(&self, id: NodeId) -> Vec<NodeId> {
        struct Collect(Vec<NodeId>);
        impl SceneVisitor for Collect {
            fn visit_mesh(&mut self, id: NodeId, _node: &Node, _mesh: &MeshNode) {
                self.0.push(id);
            }
        }
        let mut collect = Collect(Vec::new());
        self.walk(id, &mut collect);
        collect.0
    }

    /// Apply `f` to every mesh in the subtree at `id`.
    pub fn for_each_mesh_mut(&mut self, id: NodeId, mut f: impl FnMut(NodeId, &mut MeshNode)) {
        for mesh_id in self.mesh_ids_under(id) {
            if let Some(NodeKind::Mesh(mesh)) = self.nodes.get_mut(mesh_id).map(|n| &mut n.kind) {
                f(mesh_id, mesh);
            }
        }
    }

    /// The child of the root that contains `id` (or `id` itself).
    pub fn top_level(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent = self.nodes.get(current)?.parent?;
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Copy an asset tree under `parent`. Meshes are shared, not duplicated.
    pub fn instantiate(&mut self, parent: NodeId, asset: &Asset) -> Result<NodeId> {
        let id = self.instantiate_node(parent, &asset.root)?;
        self.nodes[id].name = asset.name.clone();
        debug!("instantiated asset '{}' ({} meshes)", asset.name, asset.mesh_count());
        Ok(id)
    }

    fn instantiate_node(&mut self, parent: NodeId, source: &AssetNode) -> Result<NodeId> {
        let kind = match &source.mesh {
            Some(mesh) => NodeKind::Mesh(MeshNode::new(Arc::clone(mesh), source.color)),
            None => NodeKind::Group,
        };
        let id = self.add_with_transform(parent, &source.name, kind, source.transform)?;
        for child in &source.children {
            self.instantiate_node(id, child)?;
        }
        Ok(id)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a node so the largest side of its world bounds becomes `target_size`.
///
/// A node without geometry (or with flat bounds) is treated as size 1.
/// Returns the factor applied.
pub fn fit_to_size(graph: &mut SceneGraph, id: NodeId, target_size: f64) -> Result<f64> {
    if !graph.contains(id) {
        return Err(TwError::NotFound("Node to fit".into()));
    }
    let max_dim = graph
        .world_bounds(id)
        .map(|b| b.max_dimension())
        .filter(|&d| d > 0.0)
        .unwrap_or(1.0);
    let factor = target_size / max_dim;
    if let Some(node) = graph.get_mut(id) {
        node.transform.scale_by(factor);
    }
    Ok(factor)
}
