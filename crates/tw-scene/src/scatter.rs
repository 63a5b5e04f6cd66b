//! Random non-overlapping placement of asset copies around the origin.

use std::f64::consts::TAU;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tw_core::{Result, TwError, Validate};
use tw_math::{Aabb3, DQuat, DVec3, EulerRot, Transform};

use crate::graph::{NodeId, SceneGraph};
use crate::loader::Asset;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterOptions {
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    pub max_height: f64,
    /// Per-axis rotation limit in degrees; each copy turns within ± this.
    pub rotation_limits_deg: DVec3,
    pub scale_min: f64,
    pub scale_max: f64,
    pub max_attempts: usize,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            count: 20,
            min_radius: 0.0,
            max_radius: 10.0,
            max_height: 0.0,
            rotation_limits_deg: DVec3::ZERO,
            scale_min: 1.0,
            scale_max: 1.0,
            max_attempts: 50,
        }
    }
}

impl Validate for ScatterOptions {
    fn validate(&self) -> Result<()> {
        if !(self.min_radius >= 0.0 && self.min_radius <= self.max_radius) {
            return Err(TwError::InvalidConfig(format!(
                "scatter radius range [{}, {}] is invalid",
                self.min_radius, self.max_radius
            )));
        }
        if !(self.scale_min > 0.0 && self.scale_min <= self.scale_max) {
            return Err(TwError::InvalidConfig(format!(
                "scatter scale range [{}, {}] is invalid",
                self.scale_min, self.scale_max
            )));
        }
        if self.max_height < 0.0 {
            return Err(TwError::InvalidConfig("max_height must be >= 0".into()));
        }
        if self.rotation_limits_deg.min_element() < 0.0 {
            return Err(TwError::InvalidConfig(
                "rotation limits must be >= 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(TwError::InvalidConfig("max_attempts must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterReport {
    pub placed: Vec<NodeId>,
    pub skipped: usize,
}

/// Place `options.count` copies of `asset` under `parent`.
///
/// Each copy gets up to `max_attempts` random transforms; it is kept once its
/// world bounds overlap no copy placed before it. Copies without geometry
/// never collide.
pub fn scatter<R: Rng + ?Sized>(
    graph: &mut SceneGraph,
    parent: NodeId,
    asset: &Asset,
    options: &ScatterOptions,
    rng: &mut R,
) -> Result<ScatterReport> {
    options.validate()?;

    let mut report = ScatterReport::default();
    let mut occupied: Vec<Aabb3> = Vec::new();

    for index in 0..options.count {
        let copy = graph.instantiate(parent, asset)?;
        let mut accepted = None;

        for _ in 0..options.max_attempts {
            let transform = random_transform(options, rng);
            if let Some(node) = graph.get_mut(copy) {
                node.transform = transform;
            }
            match graph.world_bounds(copy) {
                Some(bounds) if occupied.iter().any(|b| b.intersects(&bounds)) => continue,
                bounds => {
                    accepted = Some(bounds);
                    break;
                }
            }
        }

        match accepted {
            Some(bounds) => {
                occupied.extend(bounds);
                report.placed.push(copy);
            }
            None => {
                graph.remove(copy)?;
                report.skipped += 1;
                warn!(
                    "No free spot for copy {} of '{}' after {} attempts",
                    index, asset.name, options.max_attempts
                );
            }
        }
    }

    debug!(
        "scattered '{}': {} placed, {} skipped",
        asset.name,
        report.placed.len(),
        report.skipped
    );
    Ok(report)
}

fn random_transform<R: Rng + ?Sized>(options: &ScatterOptions, rng: &mut R) -> Transform {
    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(options.min_radius..=options.max_radius);
    let height = rng.gen_range(0.0..=options.max_height);

    let limits = options.rotation_limits_deg;
    let mut turn = |limit: f64| rng.gen_range(-limit..=limit).to_radians();
    let (rx, ry, rz) = (turn(limits.x), turn(limits.y), turn(limits.z));

    let mut transform = Transform::from_translation_rotation(
        DVec3::new(angle.cos() * radius, height, angle.sin() * radius),
        DQuat::from_euler(EulerRot::XYZ, rx, ry, rz),
    );
    transform.set_uniform_scale(rng.gen_range(options.scale_min..=options.scale_max));
    transform
}
