//! Asset loading.
//!
//! An [`AssetSource`] turns a URL into an [`Asset`] in a single async call.
//! There is no retry: a failed load resolves to [`TwError::AssetLoad`] and
//! the caller decides what to skip.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gltf::mesh::Mode;
use log::{debug, info, warn};
use tw_core::{Result, TwError};
use tw_geometry::TriangleMesh;
use tw_math::{DQuat, DVec3, Point2, Point3, Transform, Vector3};

const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// One node of a loaded model, before it is placed in a scene.
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Arc<TriangleMesh>>,
    pub color: [f32; 3],
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::identity(),
            mesh: None,
            color: DEFAULT_COLOR,
            children: Vec::new(),
        }
    }
}

/// A loaded model: a tree of nodes with shared mesh data.
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub root: AssetNode,
}

impl Asset {
    pub fn mesh_count(&self) -> usize {
        fn count(node: &AssetNode) -> usize {
            node.mesh.is_some() as usize + node.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

/// Anything that can fetch a model by URL.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn load(&self, url: &str) -> Result<Asset>;
}

/// Loads `.gltf` / `.glb` files relative to a base directory.
#[derive(Debug, Clone)]
pub struct GltfSource {
    base_dir: PathBuf,
}

impl GltfSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let trimmed = url.strip_prefix("./").unwrap_or(url);
        self.base_dir.join(trimmed)
    }
}

impl AssetSource for GltfSource {
    async fn load(&self, url: &str) -> Result<Asset> {
        let path = self.resolve(url);
        info!("Loading model: {:?}", path);
        let asset = load_gltf(&path, url)?;
        info!(
            "Model '{}' loaded ({} meshes)",
            asset.name,
            asset.mesh_count()
        );
        Ok(asset)
    }
}

fn load_gltf(path: &Path, url: &str) -> Result<Asset> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| TwError::asset_load(url, e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| TwError::asset_load(url, "file contains no scenes"))?;

    let mut root = AssetNode::group(scene.name().unwrap_or("scene"));
    for node in scene.nodes() {
        root.children.push(convert_node(&node, &buffers, url)?);
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(url)
        .to_string();
    Ok(Asset { name, root })
}

fn convert_node(node: &gltf::Node, buffers: &[gltf::buffer::Data], url: &str) -> Result<AssetNode> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: DVec3::from(translation.map(f64::from)),
        rotation: DQuat::from_xyzw(
            rotation[0] as f64,
            rotation[1] as f64,
            rotation[2] as f64,
            rotation[3] as f64,
        ),
        scale: DVec3::from(scale.map(f64::from)),
    };

    let mut out = AssetNode::group(node.name().unwrap_or("node"));
    out.transform = transform;

    if let Some(mesh) = node.mesh() {
        let (triangles, color) = convert_mesh(&mesh, buffers, url)?;
        if triangles.vertex_count() > 0 {
            out.mesh = Some(Arc::new(triangles));
            out.color = color;
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, buffers, url)?);
    }
    Ok(out)
}

/// Merge every primitive of a glTF mesh into one triangle mesh.
fn convert_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    url: &str,
) -> Result<(TriangleMesh, [f32; 3])> {
    let mut merged = TriangleMesh::default();
    let mut color = None;

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            warn!(
                "{}: skipping {:?} primitive in mesh {:?}",
                url,
                primitive.mode(),
                mesh.name()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Point3> = reader
            .read_positions()
            .ok_or_else(|| TwError::asset_load(url, "mesh primitive has no positions"))?
            .map(|p| Point3::from(p.map(f64::from)))
            .collect();
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut part = TriangleMesh {
            normals: Vec::new(),
            uvs: Vec::new(),
            indices,
            positions,
        };

        match reader.read_normals() {
            Some(normals) => {
                part.normals = normals.map(|n| Vector3::from(n.map(f64::from))).collect();
            }
            None => part.compute_normals(),
        }
        part.uvs = match reader.read_tex_coords(0) {
            Some(uvs) => uvs
                .into_f32()
                .map(|uv| Point2::new(uv[0] as f64, uv[1] as f64))
                .collect(),
            None => vec![Point2::ZERO; part.positions.len()],
        };

        if color.is_none() {
            let base = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            color = Some([base[0], base[1], base[2]]);
        }
        merged.merge(&part);
    }

    debug!(
        "mesh {:?}: {} vertices, {} triangles",
        mesh.name(),
        merged.vertex_count(),
        merged.triangle_count()
    );
    Ok((merged, color.unwrap_or(DEFAULT_COLOR)))
}

/// In-memory assets keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    assets: HashMap<String, Asset>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, asset: Asset) {
        self.assets.insert(url.to_string(), asset);
    }
}

impl AssetSource for MemorySource {
    async fn load(&self, url: &str) -> Result<Asset> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| TwError::asset_load(url, "no such asset"))
    }
}

/// Wraps another source and remembers every successful load.
///
/// Placing one model several times then loads it once; each placement gets
/// its own node tree sharing the same mesh data.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: RefCell<HashMap<String, Asset>>,
    hits: Cell<usize>,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    /// Number of loads served from the cache.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<S: AssetSource> AssetSource for CachedSource<S> {
    async fn load(&self, url: &str) -> Result<Asset> {
        if let Some(asset) = self.cache.borrow().get(url).cloned() {
            self.hits.set(self.hits.get() + 1);
            return Ok(asset);
        }
        let asset = self.inner.load(url).await?;
        self.cache
            .borrow_mut()
            .insert(url.to_string(), asset.clone());
        Ok(asset)
    }
}
