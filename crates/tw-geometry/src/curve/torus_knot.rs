//! Torus knot curve.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tw_math::Point3;

use super::Curve;

/// A (p, q) torus knot over `[0, 1]`:
/// `x = (2 + cos qθ) cos pθ`, `y = (2 + cos qθ) sin pθ`, `z = sin qθ`,
/// with `θ = 2πt`, scaled by `scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorusKnot {
    pub scale: f64,
    pub p: u32,
    pub q: u32,
}

impl TorusKnot {
    /// The classic (3, 4) knot.
    pub fn new(scale: f64) -> Self {
        Self { scale, p: 3, q: 4 }
    }

    pub fn with_winding(scale: f64, p: u32, q: u32) -> Self {
        Self { scale, p, q }
    }
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Curve for TorusKnot {
    fn point_at(&self, t: f64) -> Point3 {
        let theta = t * TAU;
        let (p, q) = (self.p as f64, self.q as f64);
        let ring = 2.0 + (q * theta).cos();
        Point3::new(
            ring * (p * theta).cos(),
            ring * (p * theta).sin(),
            (q * theta).sin(),
        ) * self.scale
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        true
    }
}
