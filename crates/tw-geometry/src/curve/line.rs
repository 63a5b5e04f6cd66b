//! Line segment curve.

use serde::{Deserialize, Serialize};
use tw_math::{Point3, Vector3};

use super::Curve;

/// A line segment from `start` to `end`, parameterized over `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3,
    pub end: Point3,
}

impl Line {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }
}

impl Curve for Line {
    fn point_at(&self, t: f64) -> Point3 {
        self.start + t * (self.end - self.start)
    }

    fn tangent_at(&self, _t: f64) -> Vector3 {
        self.end - self.start
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}
