use crate::camera::Camera;
use crate::graph::{Light, MeshNode, Node, NodeId};

/// Callbacks for [`SceneGraph::walk`](crate::SceneGraph::walk), one per node kind.
///
/// Every method defaults to a no-op, so visitors only implement the kinds
/// they care about.
pub trait SceneVisitor {
    fn visit_mesh(&mut self, _id: NodeId, _node: &Node, _mesh: &MeshNode) {}

    fn visit_group(&mut self, _id: NodeId, _node: &Node) {}

    fn visit_light(&mut self, _id: NodeId, _node: &Node, _light: &Light) {}

    fn visit_camera(&mut self, _id: NodeId, _node: &Node, _camera: &Camera) {}
}
