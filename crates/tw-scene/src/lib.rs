pub mod camera;
#[cfg(test)]
mod fixtures;
pub mod graph;
pub mod loader;
pub mod picking;
pub mod scatter;
pub mod visitor;

// Re-export main types
pub use camera::Camera;
pub use graph::{fit_to_size, Emissive, Light, MeshNode, Node, NodeId, NodeKind, SceneGraph};
pub use loader::{Asset, AssetNode, AssetSource, CachedSource, GltfSource, MemorySource};
pub use picking::{pick, pointer_to_ndc, HighlightOptions, Highlighter, Hit};
pub use scatter::{scatter, ScatterOptions, ScatterReport};
pub use visitor::SceneVisitor;
