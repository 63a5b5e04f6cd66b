//! Pointer picking, hover highlight and animated removal.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use tw_math::{DVec3, Point3, Ray};

use crate::graph::{Emissive, NodeId, NodeKind, SceneGraph};

/// Convert a pixel position inside a `width × height` viewport to normalized
/// device coordinates (`x` right, `y` up, both in `[-1, 1]`).
pub fn pointer_to_ndc(px: f64, py: f64, width: f64, height: f64) -> (f64, f64) {
    (px / width * 2.0 - 1.0, -(py / height) * 2.0 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Top-level object owning the mesh.
    pub object: NodeId,
    pub mesh: NodeId,
    pub distance: f64,
    pub point: Point3,
}

/// Nearest visible mesh hit by `ray`. Bounds reject early; the hit itself
/// is the closest triangle.
///
/// A mesh is skipped when its own name or its top-level object's name is
/// listed in `except`.
pub fn pick(graph: &SceneGraph, ray: &Ray, except: &[&str]) -> Option<Hit> {
    let mut best: Option<Hit> = None;

    for mesh_id in graph.mesh_ids_under(graph.root()) {
        if !graph.is_visible(mesh_id) {
            continue;
        }
        let Some(object) = graph.top_level(mesh_id) else {
            continue;
        };
        let excluded = [mesh_id, object]
            .iter()
            .filter_map(|&id| graph.get(id))
            .any(|node| except.contains(&node.name.as_str()));
        if excluded {
            continue;
        }

        let Some(bounds) = graph.world_bounds(mesh_id) else {
            continue;
        };
        if ray.intersect_aabb(&bounds).is_none() {
            continue;
        }
        let Some(distance) = nearest_triangle(graph, mesh_id, ray) else {
            continue;
        };
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Hit {
                object,
                mesh: mesh_id,
                distance,
                point: ray.at(distance),
            });
        }
    }
    best
}

/// Distance to the closest triangle of a mesh node, tested in world space.
fn nearest_triangle(graph: &SceneGraph, mesh_id: NodeId, ray: &Ray) -> Option<f64> {
    let mesh = graph.get(mesh_id)?.as_mesh()?;
    let world = graph.world_matrix(mesh_id);
    let positions = &mesh.mesh.positions;

    mesh.mesh
        .indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| positions.get(i as usize).map(|&p| world.transform_point3(p)));
            ray.intersect_triangle(a?, b?, c?)
        })
        .min_by(|x, y| x.total_cmp(y))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Seconds a removed object takes to shrink away.
    pub remove_duration: f64,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            color: [0.0, 1.0, 85.0 / 255.0],
            intensity: 0.5,
            remove_duration: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
struct Removal {
    object: NodeId,
    base_scale: DVec3,
    elapsed: f64,
}

/// Hover highlight plus click-to-remove for top-level scene objects.
///
/// Highlighting overrides the emissive of every mesh under the hovered
/// object and remembers what it replaced, so the previous look comes back
/// when the pointer leaves.
#[derive(Debug, Default)]
pub struct Highlighter {
    options: HighlightOptions,
    highlighted: Option<NodeId>,
    saved: HashMap<NodeId, Option<Emissive>>,
    removals: Vec<Removal>,
}

impl Highlighter {
    pub fn new(options: HighlightOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    /// Objects still shrinking.
    pub fn pending_removals(&self) -> Vec<NodeId> {
        self.removals.iter().map(|r| r.object).collect()
    }

    pub fn pointer_move(&mut self, graph: &mut SceneGraph, hit: Option<&Hit>) {
        let target = hit.map(|h| h.object);
        if target == self.highlighted {
            return;
        }
        self.restore(graph);
        self.highlighted = target;
        if let Some(object) = target {
            self.apply(graph, object);
        }
    }

    /// Queue the hit object for removal. Returns false when nothing was hit
    /// or the object is already on its way out.
    pub fn pointer_down(&mut self, graph: &mut SceneGraph, hit: Option<&Hit>) -> bool {
        let Some(hit) = hit else {
            return false;
        };
        self.restore(graph);
        self.highlighted = None;

        if self.removals.iter().any(|r| r.object == hit.object) {
            return false;
        }
        let Some(node) = graph.get(hit.object) else {
            return false;
        };
        debug!("removing '{}'", node.name);
        self.removals.push(Removal {
            object: hit.object,
            base_scale: node.transform.scale,
            elapsed: 0.0,
        });
        true
    }

    /// Advance removal animations by `dt` seconds. Returns the objects that
    /// finished and were taken out of the graph.
    pub fn update(&mut self, graph: &mut SceneGraph, dt: f64) -> Vec<NodeId> {
        let duration = self.options.remove_duration;
        let mut finished = Vec::new();

        self.removals.retain_mut(|removal| {
            removal.elapsed += dt;
            let t = if duration > 0.0 {
                (removal.elapsed / duration).min(1.0)
            } else {
                1.0
            };
            let Some(node) = graph.get_mut(removal.object) else {
                return false;
            };
            if t < 1.0 {
                node.transform.scale = removal.base_scale * (1.0 - t);
                return true;
            }
            if graph.remove(removal.object).is_ok() {
                finished.push(removal.object);
            }
            false
        });
        finished
    }

    fn apply(&mut self, graph: &mut SceneGraph, object: NodeId) {
        let glow = Emissive {
            color: self.options.color,
            intensity: self.options.intensity,
        };
        let saved = &mut self.saved;
        graph.for_each_mesh_mut(object, |id, mesh| {
            saved.entry(id).or_insert(mesh.emissive);
            mesh.emissive = Some(glow);
        });
    }

    fn restore(&mut self, graph: &mut SceneGraph) {
        for (id, emissive) in self.saved.drain() {
            if let Some(NodeKind::Mesh(mesh)) = graph.get_mut(id).map(|n| &mut n.kind) {
                mesh.emissive = emissive;
            }
        }
    }
}
