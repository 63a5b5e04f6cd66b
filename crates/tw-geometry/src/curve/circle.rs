//! Circle curve.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tw_math::{DVec3, Point3, Vector3};

use super::Curve;

/// A circle in 3D space, parameterized over `[0, 2*PI]`.
///
/// The circle lies in the plane defined by `center` and `normal`,
/// with the reference direction for `t=0` computed from the normal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point3,
    pub normal: Vector3,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point3, normal: Vector3, radius: f64) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            radius,
        }
    }

    /// Compute an orthonormal frame (u_axis, v_axis) in the circle plane.
    fn local_frame(&self) -> (DVec3, DVec3) {
        let n = self.normal;
        let ref_vec = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let u = n.cross(ref_vec).normalize();
        let v = n.cross(u).normalize();
        (u, v)
    }
}

impl Curve for Circle {
    fn point_at(&self, t: f64) -> Point3 {
        let (u, v) = self.local_frame();
        self.center + self.radius * (t.cos() * u + t.sin() * v)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        let (u, v) = self.local_frame();
        self.radius * (-t.sin() * u + t.cos() * v)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 2.0 * PI)
    }

    fn is_closed(&self) -> bool {
        true
    }
}
