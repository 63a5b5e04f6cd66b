//! One flythrough page: tube, lights, camera, models and the travel
//! controller, with explicit teardown.

use std::time::Duration;

use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tw_core::{Result, TwError, Validate};
use tw_geometry::{place_on_curve, sample_frame, ArcLength, Placement, Tube};
use tw_math::{DQuat, Point3, Transform, Vector3};
use tw_scene::{
    fit_to_size, pick, pointer_to_ndc, Asset, AssetSource, Camera, Highlighter, Hit, Light,
    MeshNode, NodeId, NodeKind, SceneGraph,
};

use crate::config::{CameraMode, ModelPlacement, SessionConfig};
use crate::travel::{LoopTravel, StepTravel};

pub const TUBE_NODE: &str = "tube";
pub const CAMERA_NODE: &str = "spline-camera";

const TUBE_COLOR: [f32; 3] = [1.0, 0.0, 1.0];

/// Camera state for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub t: f64,
    pub position: Point3,
    pub orientation: DQuat,
    pub forward: Vector3,
    pub up: Vector3,
    pub moving: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: Vec<String>,
}

/// What `dispose` released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposeReport {
    pub nodes_released: usize,
    pub models_released: usize,
}

#[derive(Debug, Clone)]
enum Travel {
    Loop(LoopTravel),
    Steps(StepTravel),
}

/// A constructed scene with its camera driven along the tube.
///
/// Owns every scene resource; dropping or
/// disposing the session releases it.
#[derive(Debug)]
pub struct SceneSession {
    config: SessionConfig,
    tube: Tube,
    graph: SceneGraph,
    camera_node: NodeId,
    models: Vec<NodeId>,
    travel: Travel,
    highlighter: Highlighter,
    last_frame: Option<Duration>,
}

impl SceneSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let path = ArcLength::new(config.curve.build())?;
        let tube = Tube::new(path, config.segments, config.tube_radius, config.unit_scale)?;
        tube.validate()?;

        let mut graph = SceneGraph::new();
        let root = graph.root();

        graph.add(
            root,
            "ambient",
            NodeKind::Light(Light::Ambient {
                color: [1.0; 3],
                intensity: 1.0,
            }),
        )?;
        graph.add_with_transform(
            root,
            "sun",
            NodeKind::Light(Light::Directional {
                color: [1.0; 3],
                intensity: 1.2,
                direction: Vector3::NEG_Z,
            }),
            Transform::from_translation(Vector3::Z),
        )?;

        let mesh = tube.to_mesh(config.radial_segments);
        debug!(
            "tube mesh: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        graph.add(
            root,
            TUBE_NODE,
            NodeKind::Mesh(MeshNode::new(mesh.into(), TUBE_COLOR)),
        )?;

        let mut camera = Camera::perspective(
            config.fov_deg,
            config.width / config.height,
            config.near,
            config.far,
        );
        let travel = match config.mode {
            CameraMode::Loop { loop_ms } => {
                Travel::Loop(LoopTravel::new(Duration::from_millis(loop_ms)))
            }
            CameraMode::Steps {
                duration_ms,
                easing,
            } => Travel::Steps(StepTravel::new(
                config.stops(),
                Duration::from_millis(duration_ms),
                easing,
            )),
        };
        let start_t = match &travel {
            Travel::Loop(_) => 0.0,
            Travel::Steps(steps) => steps.current_t(),
        };
        let placement = place_on_curve(&sample_frame(&tube, start_t), config.camera_offset);
        camera.apply_placement(&placement);
        let camera_node = graph.add_with_transform(
            root,
            CAMERA_NODE,
            NodeKind::Camera(camera),
            placement_transform(&placement),
        )?;

        info!(
            "session ready: {} segments, tube length {:.1}, {} stops",
            tube.segments(),
            tube.path().length() * tube.scale,
            config.models.len()
        );

        Ok(Self {
            highlighter: Highlighter::new(config.highlight),
            config,
            tube,
            graph,
            camera_node,
            models: Vec::new(),
            travel,
            last_frame: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tube(&self) -> &Tube {
        &self.tube
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn camera(&self) -> Option<&Camera> {
        match &self.graph.get(self.camera_node)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.graph.get_mut(self.camera_node)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Models still in the scene, in configuration order.
    pub fn models(&self) -> Vec<NodeId> {
        self.models
            .iter()
            .copied()
            .filter(|&id| self.graph.contains(id))
            .collect()
    }

    /// Load every configured model concurrently and place the ones that
    /// arrive. A failed load is logged and skipped; it never aborts the
    /// others.
    pub async fn load_models<S: AssetSource>(&mut self, source: &S) -> LoadReport {
        let placements = self.config.models.clone();
        let results = join_all(placements.iter().map(|m| source.load(&m.url))).await;

        let mut report = LoadReport::default();
        for (model, result) in placements.iter().zip(results) {
            let placed = result.and_then(|asset| self.place_model(model, &asset));
            match placed {
                Ok(id) => {
                    self.models.push(id);
                    report.loaded += 1;
                }
                Err(e) => {
                    error!("Skipping model '{}': {}", model.url, e);
                    report.failed.push(model.url.clone());
                }
            }
        }
        info!(
            "models: {} loaded, {} failed",
            report.loaded,
            report.failed.len()
        );
        report
    }

    fn place_model(&mut self, model: &ModelPlacement, asset: &Asset) -> Result<NodeId> {
        let id = self.graph.instantiate(self.graph.root(), asset)?;
        self.graph.for_each_mesh_mut(id, |_, mesh| {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        });
        fit_to_size(&mut self.graph, id, model.size)?;

        let offset = model
            .offset
            .unwrap_or_else(|| self.config.default_model_offset());
        let placement = place_on_curve(&sample_frame(&self.tube, model.t), offset);
        let node = self
            .graph
            .get_mut(id)
            .ok_or_else(|| TwError::NotFound(format!("Model node for '{}'", model.url)))?;
        node.transform.translation = placement.position;
        node.transform.rotation = placement.orientation;

        info!(
            "placed '{}' at t = {:.3} (offset {:.1})",
            asset.name, model.t, offset
        );
        Ok(id)
    }

    /// Ask the camera to travel to the next stop. Returns whether a move
    /// started; requests during a move are ignored.
    pub fn request_next(&mut self, now: Duration) -> bool {
        match &mut self.travel {
            Travel::Steps(steps) => {
                let started = steps.request_next(now);
                if !started {
                    warn!("Ignoring next-stop request: camera is busy or has no stops");
                }
                started
            }
            Travel::Loop(_) => {
                warn!("Ignoring next-stop request in loop mode");
                false
            }
        }
    }

    pub fn is_moving(&self) -> bool {
        match &self.travel {
            Travel::Steps(steps) => steps.is_moving(),
            Travel::Loop(_) => true,
        }
    }

    /// Advance to `now`: read the travel state once, pose the camera, and
    /// run pending removal animations.
    pub fn frame(&mut self, now: Duration) -> CameraPose {
        let (t, moving) = match &mut self.travel {
            Travel::Loop(travel) => (travel.param(now), true),
            Travel::Steps(steps) => {
                let t = steps.update(now);
                (t, steps.is_moving())
            }
        };

        let placement = place_on_curve(&sample_frame(&self.tube, t), self.config.camera_offset);
        if let Some(camera) = self.camera_mut() {
            camera.apply_placement(&placement);
        }
        if let Some(node) = self.graph.get_mut(self.camera_node) {
            node.transform = placement_transform(&placement);
        }

        let dt = self
            .last_frame
            .map(|last| now.saturating_sub(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        for removed in self.highlighter.update(&mut self.graph, dt) {
            debug!("removal finished for {:?}", removed);
        }

        CameraPose {
            t,
            position: placement.position,
            orientation: placement.orientation,
            forward: placement.forward(),
            up: placement.up(),
            moving,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(camera) = self.camera_mut() {
            camera.set_aspect(width, height);
        }
    }

    /// Object under a pixel, ignoring the tube itself.
    pub fn pick_at(&self, px: f64, py: f64) -> Option<Hit> {
        let camera = self.camera()?;
        let (x, y) = pointer_to_ndc(px, py, self.config.width, self.config.height);
        pick(&self.graph, &camera.ray_from_ndc(x, y), &[TUBE_NODE])
    }

    pub fn pointer_move(&mut self, px: f64, py: f64) -> Option<NodeId> {
        let hit = self.pick_at(px, py);
        self.highlighter.pointer_move(&mut self.graph, hit.as_ref());
        self.highlighter.highlighted()
    }

    /// Click: start removing the object under the pointer.
    pub fn pointer_down(&mut self, px: f64, py: f64) -> bool {
        let hit = self.pick_at(px, py);
        self.highlighter.pointer_down(&mut self.graph, hit.as_ref())
    }

    /// Release every scene node. The session is consumed.
    pub fn dispose(mut self) -> DisposeReport {
        let models_released = self.models().len();
        let nodes_released = self.graph.clear();
        info!(
            "session disposed: {} nodes, {} models",
            nodes_released, models_released
        );
        DisposeReport {
            nodes_released,
            models_released,
        }
    }
}

fn placement_transform(placement: &Placement) -> Transform {
    Transform::from_translation_rotation(placement.position, placement.orientation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurveConfig;
    use futures::executor::block_on;
    use std::sync::Arc;
    use tw_core::Tolerance;
    use tw_geometry::TriangleMesh;
    use tw_math::DVec3;
    use tw_scene::{AssetNode, MemorySource};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn crate_asset(name: &str) -> Asset {
        let mesh = TriangleMesh {
            positions: vec![
                Point3::new(-2.0, -1.0, -1.0),
                Point3::new(2.0, 1.0, 1.0),
                Point3::new(2.0, -1.0, 1.0),
            ],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        Asset {
            name: name.to_string(),
            root: AssetNode {
                name: "root".into(),
                transform: Transform::identity(),
                mesh: Some(Arc::new(mesh)),
                color: [0.5; 3],
                children: Vec::new(),
            },
        }
    }

    fn cube_asset(name: &str) -> Asset {
        // corner i has x, y, z taken from bits 0, 1, 2
        let positions = (0..8)
            .map(|i| {
                let side = |bit: u32| if i & (1 << bit) != 0 { 1.0 } else { -1.0 };
                Point3::new(side(0), side(1), side(2))
            })
            .collect();
        let quads: [[u32; 4]; 6] = [
            [0, 2, 6, 4],
            [1, 5, 7, 3],
            [0, 4, 5, 1],
            [2, 3, 7, 6],
            [0, 1, 3, 2],
            [4, 6, 7, 5],
        ];
        let mesh = TriangleMesh {
            positions,
            indices: quads
                .iter()
                .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
                .collect(),
            ..Default::default()
        };
        Asset {
            name: name.to_string(),
            root: AssetNode {
                name: "root".into(),
                transform: Transform::identity(),
                mesh: Some(Arc::new(mesh)),
                color: [0.5; 3],
                children: Vec::new(),
            },
        }
    }

    fn small_config() -> SessionConfig {
        SessionConfig {
            segments: 64,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_builds_scene() {
        let session = SceneSession::new(small_config()).unwrap();
        let graph = session.graph();
        // root, ambient, sun, tube, camera
        assert_eq!(graph.len(), 5);
        assert!(graph.find_by_name(TUBE_NODE).is_some());
        let camera = session.camera().unwrap();
        assert!((camera.fov_y - 84f64.to_radians()).abs() < 1e-12);
        assert!((camera.aspect - 1280.0 / 720.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            segments: 0,
            ..Default::default()
        };
        assert!(matches!(
            SceneSession::new(config),
            Err(TwError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initial_pose_sits_at_first_stop() {
        let mut session = SceneSession::new(small_config()).unwrap();
        let pose = session.frame(ms(0));
        assert_eq!(pose.t, 0.0);
        assert!(!pose.moving);

        let frame = sample_frame(session.tube(), 0.0);
        let expected = frame.position + frame.normal * 15.0;
        assert!((pose.position - expected).length() < 1e-9);
        assert!((pose.forward - frame.tangent).length() < 1e-9);
        assert!((pose.up - frame.normal).length() < 1e-9);

        let camera = session.camera().unwrap();
        assert!((camera.eye - pose.position).length() < 1e-12);
    }

    #[test]
    fn test_step_navigation() {
        let mut session = SceneSession::new(small_config()).unwrap();
        assert!(session.request_next(ms(0)));
        assert!(!session.request_next(ms(10)));

        let mid = session.frame(ms(1000));
        assert!(mid.moving);
        assert!((mid.t - 0.165).abs() < 1e-12);
        assert!(Tolerance::loose().linear_eq(mid.forward.length(), 1.0));

        let done = session.frame(ms(2000));
        assert!(!done.moving);
        assert_eq!(done.t, 0.33);
        assert!(session.request_next(ms(2500)));
    }

    #[test]
    fn test_loop_mode() {
        let config = SessionConfig {
            mode: CameraMode::Loop { loop_ms: 1000 },
            curve: CurveConfig::Circle { radius: 20.0 },
            ..small_config()
        };
        let mut session = SceneSession::new(config).unwrap();
        assert!(!session.request_next(ms(0)));
        let pose = session.frame(ms(1250));
        assert!((pose.t - 0.25).abs() < 1e-12);
        assert!(pose.moving);
    }

    #[test]
    fn test_load_models_places_and_skips_failures() {
        let mut config = small_config();
        config.models[2].url = "./models/missing.glb".into();
        let mut session = SceneSession::new(config).unwrap();

        let mut source = MemorySource::new();
        source.insert("./models/SCOOF.glb", crate_asset("scoof"));
        let report = block_on(session.load_models(&source));

        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, vec!["./models/missing.glb".to_string()]);

        let models = session.models();
        assert_eq!(models.len(), 2);
        for (&id, t) in models.iter().zip([0.0, 0.33]) {
            // 4 units wide, fitted to 2
            let node = session.graph().get(id).unwrap();
            assert!((node.transform.scale - DVec3::splat(0.5)).length() < 1e-12);

            let frame = sample_frame(session.tube(), t);
            let expected = frame.position + frame.normal * 10.0;
            assert!((node.transform.translation - expected).length() < 1e-9);

            for mesh_id in session.graph().mesh_ids_under(id) {
                let mesh = session.graph().get(mesh_id).unwrap().as_mesh().unwrap();
                assert!(mesh.cast_shadow && mesh.receive_shadow);
            }
        }
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut session = SceneSession::new(small_config()).unwrap();
        session.resize(800.0, 800.0);
        assert_eq!(session.camera().unwrap().aspect, 1.0);
        session.resize(0.0, 100.0);
        assert_eq!(session.camera().unwrap().aspect, 1.0);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut session = SceneSession::new(small_config()).unwrap();
        let mut source = MemorySource::new();
        source.insert("./models/SCOOF.glb", crate_asset("scoof"));
        block_on(session.load_models(&source));

        let report = session.dispose();
        assert_eq!(report.models_released, 3);
        // ambient, sun, tube, camera, three single-mesh models
        assert_eq!(report.nodes_released, 7);
    }

    #[test]
    fn test_click_at_screen_center_removes_model() {
        // camera on the centerline, inside the tube
        let config = SessionConfig {
            camera_offset: 0.0,
            models: vec![ModelPlacement::new("./models/box.glb", 0.5)],
            ..small_config()
        };
        let mut session = SceneSession::new(config).unwrap();
        let mut source = MemorySource::new();
        source.insert("./models/box.glb", cube_asset("box"));
        assert_eq!(block_on(session.load_models(&source)).loaded, 1);
        let model = session.models()[0];

        let pose = session.frame(ms(0));
        let (cx, cy) = (640.0, 360.0);

        // the view ray leaves through the tube wall, which is never picked
        let ray = session.camera().unwrap().ray_from_ndc(0.0, 0.0);
        let wall = pick(session.graph(), &ray, &[]).unwrap();
        assert_eq!(session.graph().get(wall.object).unwrap().name, TUBE_NODE);
        assert!(session.pick_at(cx, cy).is_none());

        // put the model straight ahead of the camera
        session.graph_mut().get_mut(model).unwrap().transform.translation =
            pose.position + pose.forward * 4.0;

        let hit = session.pick_at(cx, cy).unwrap();
        assert_eq!(hit.object, model);
        assert!(hit.distance <= 3.0 + 1e-9);
        assert!(hit.distance >= 4.0 - 3f64.sqrt() - 1e-9);
        assert!(session.pick_at(0.0, 0.0).is_none());

        assert_eq!(session.pointer_move(cx, cy), Some(model));
        assert!(session.pointer_down(cx, cy));
        assert!(!session.pointer_down(cx, cy));

        // default removal takes 0.1 s
        session.frame(ms(50));
        assert_eq!(session.models(), vec![model]);
        session.frame(ms(150));
        assert!(session.models().is_empty());
        assert!(!session.graph().contains(model));
        assert!(session.pick_at(cx, cy).is_none());
    }
}
