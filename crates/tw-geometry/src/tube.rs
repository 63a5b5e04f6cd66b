//! Tubes: a closed curve discretized into rotation-minimizing frames.

use std::f64::consts::TAU;

use log::debug;
use tw_core::{Result, Tolerance, TwError, Validate};
use tw_math::{DQuat, Point2, Point3, Vector3};

use crate::arc_length::ArcLength;
use crate::mesh::TriangleMesh;

/// A closed curve sampled at `segments` evenly spaced arc-length positions,
/// each carrying a twist-free (tangent, normal, binormal) frame.
///
/// Sample `i` sits at `u = i / segments`; the closing sample at `u = 1`
/// coincides with sample 0 and is not stored.
#[derive(Debug)]
pub struct Tube {
    path: ArcLength,
    /// Uniform scale from curve units to scene units.
    pub scale: f64,
    /// Tube radius in curve units.
    pub radius: f64,
    segments: usize,
    tangents: Vec<Vector3>,
    normals: Vec<Vector3>,
    binormals: Vec<Vector3>,
}

impl Tube {
    /// Build a tube, computing rotation-minimizing frames along the path.
    pub fn new(path: ArcLength, segments: usize, radius: f64, scale: f64) -> Result<Self> {
        if segments == 0 {
            return Err(TwError::Geometry("Tube needs at least one segment".into()));
        }
        if !path.is_closed() {
            return Err(TwError::Geometry(
                "Tube sampling requires a closed curve".into(),
            ));
        }

        let (tangents, mut normals, mut binormals) = rotation_minimizing_frames(&path, segments);

        let twist = closure_twist(&tangents, &normals, segments);
        for i in 1..=segments {
            let rotation = DQuat::from_axis_angle(tangents[i], twist * i as f64);
            normals[i] = rotation * normals[i];
            binormals[i] = tangents[i].cross(normals[i]);
        }
        debug!(
            "tube: {} segments, closure twist {:.3e} rad per segment",
            segments, twist
        );

        let mut tube = Self {
            path,
            scale,
            radius,
            segments,
            tangents,
            normals,
            binormals,
        };
        tube.tangents.truncate(segments);
        tube.normals.truncate(segments);
        tube.binormals.truncate(segments);
        Ok(tube)
    }

    /// Build a tube from precomputed binormals (one per segment).
    ///
    /// Binormals are normalized. Tangents come from the path; normals are
    /// `normalize(B × T)`. A binormal that is zero or runs along its tangent,
    /// or that points away from its neighbour, is rejected: interpolating
    /// between such samples has no defined normal.
    pub fn from_binormals(path: ArcLength, binormals: Vec<Vector3>, scale: f64) -> Result<Self> {
        if binormals.is_empty() {
            return Err(TwError::Geometry("Tube needs at least one binormal".into()));
        }
        if !path.is_closed() {
            return Err(TwError::Geometry(
                "Tube sampling requires a closed curve".into(),
            ));
        }

        let segments = binormals.len();
        let tangents: Vec<Vector3> = (0..segments)
            .map(|i| path.tangent_at_u(i as f64 / segments as f64))
            .collect();
        let binormals = binormals
            .iter()
            .enumerate()
            .map(|(i, b)| {
                b.try_normalize()
                    .ok_or_else(|| TwError::Geometry(format!("Binormal {} is degenerate", i)))
            })
            .collect::<Result<Vec<_>>>()?;

        let tol = Tolerance::loose();
        let mut normals = Vec::with_capacity(segments);
        for (i, (b, t)) in binormals.iter().zip(&tangents).enumerate() {
            let n = b.cross(*t);
            if tol.is_zero(n.length()) {
                return Err(TwError::Geometry(format!(
                    "Binormal {} is parallel to the tangent",
                    i
                )));
            }
            normals.push(n.normalize());
        }
        if segments > 1 {
            for i in 0..segments {
                let next = (i + 1) % segments;
                if binormals[i].dot(binormals[next]) <= 0.0 {
                    return Err(TwError::Geometry(format!(
                        "Binormals {} and {} point apart",
                        i, next
                    )));
                }
            }
        }

        let tube = Self {
            path,
            scale,
            radius: 0.0,
            segments,
            tangents,
            normals,
            binormals,
        };
        tube.validate()?;
        Ok(tube)
    }

    pub fn path(&self) -> &ArcLength {
        &self.path
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn tangents(&self) -> &[Vector3] {
        &self.tangents
    }

    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    pub fn binormals(&self) -> &[Vector3] {
        &self.binormals
    }

    /// Radius in scene units.
    pub fn world_radius(&self) -> f64 {
        self.radius * self.scale
    }

    /// Triangulate the tube surface in scene units.
    ///
    /// Ring `i` is placed at sample `i`; the last ring repeats ring 0 so the
    /// seam has its own UVs.
    pub fn to_mesh(&self, radial_segments: usize) -> TriangleMesh {
        let radial = radial_segments.max(3);
        let ring = radial + 1;
        let mut mesh = TriangleMesh::default();
        mesh.positions.reserve((self.segments + 1) * ring);

        for i in 0..=self.segments {
            let k = i % self.segments;
            let center = self.path.point_at_u(k as f64 / self.segments as f64) * self.scale;
            let (n, b) = (self.normals[k], self.binormals[k]);

            for j in 0..=radial {
                let v = j as f64 / radial as f64 * TAU;
                let normal = (-v.cos() * n + v.sin() * b).normalize();
                mesh.positions.push(center + normal * self.world_radius());
                mesh.normals.push(normal);
                mesh.uvs.push(Point2::new(
                    i as f64 / self.segments as f64,
                    j as f64 / radial as f64,
                ));
            }
        }

        for i in 1..=self.segments {
            for j in 1..=radial {
                let a = (ring * (i - 1) + (j - 1)) as u32;
                let b = (ring * i + (j - 1)) as u32;
                let c = (ring * i + j) as u32;
                let d = (ring * (i - 1) + j) as u32;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        mesh
    }

    /// Centerline point of sample `i`, in scene units.
    pub fn sample_point(&self, i: usize) -> Point3 {
        let k = i % self.segments;
        self.path.point_at_u(k as f64 / self.segments as f64) * self.scale
    }
}

impl Validate for Tube {
    fn validate(&self) -> Result<()> {
        let n = self.segments;
        if self.tangents.len() != n || self.normals.len() != n || self.binormals.len() != n {
            return Err(TwError::Geometry(format!(
                "Frame arrays do not match {} segments",
                n
            )));
        }
        let tol = Tolerance::loose();
        for (i, b) in self.binormals.iter().enumerate() {
            if !tol.linear_eq(b.length(), 1.0) {
                return Err(TwError::Geometry(format!(
                    "Binormal {} is not unit length ({})",
                    i,
                    b.length()
                )));
            }
        }
        Ok(())
    }
}

/// Parallel-transport frames at `segments + 1` samples (the last one closes the loop).
fn rotation_minimizing_frames(
    path: &ArcLength,
    segments: usize,
) -> (Vec<Vector3>, Vec<Vector3>, Vec<Vector3>) {
    let tangents: Vec<Vector3> = (0..=segments)
        .map(|i| path.tangent_at_u(i as f64 / segments as f64))
        .collect();

    let t0 = tangents[0];
    let axis = smallest_axis(t0);
    let vec = t0.cross(axis).normalize();
    let n0 = t0.cross(vec);

    let mut normals = Vec::with_capacity(segments + 1);
    let mut binormals = Vec::with_capacity(segments + 1);
    normals.push(n0);
    binormals.push(t0.cross(n0));

    let eps = Tolerance::machine().linear;
    for i in 1..=segments {
        let mut normal = normals[i - 1];
        let turn = tangents[i - 1].cross(tangents[i]);
        if turn.length() > eps {
            let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
            normal = DQuat::from_axis_angle(turn.normalize(), theta) * normal;
        }
        normals.push(normal);
        binormals.push(tangents[i].cross(normal));
    }

    (tangents, normals, binormals)
}

/// Per-segment rotation that makes the last frame line up with the first.
fn closure_twist(tangents: &[Vector3], normals: &[Vector3], segments: usize) -> f64 {
    let first = normals[0];
    let last = normals[segments];
    let mut theta = first.dot(last).clamp(-1.0, 1.0).acos() / segments as f64;
    if tangents[0].dot(first.cross(last)) > 0.0 {
        theta = -theta;
    }
    theta
}

/// Unit axis along the tangent's smallest component (ties prefer Z, then Y).
fn smallest_axis(t: Vector3) -> Vector3 {
    let a = t.abs();
    let mut min = f64::MAX;
    let mut axis = Vector3::X;
    if a.x <= min {
        min = a.x;
        axis = Vector3::X;
    }
    if a.y <= min {
        min = a.y;
        axis = Vector3::Y;
    }
    if a.z <= min {
        axis = Vector3::Z;
    }
    axis
}
