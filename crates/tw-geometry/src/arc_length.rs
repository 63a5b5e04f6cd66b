//! Arc-length reparameterization of a curve.

use tw_core::{Result, TwError};
use tw_math::{Point3, Vector3};

use crate::curve::Curve;

/// Number of chords in the default arc-length table.
pub const DEFAULT_DIVISIONS: usize = 200;

/// A curve sampled by normalized arc length `u ∈ [0, 1]`.
///
/// A cumulative chord-length table maps `u` back to the curve's own
/// parameter, so equal steps in `u` travel (nearly) equal distances.
pub struct ArcLength {
    curve: Box<dyn Curve>,
    lengths: Vec<f64>,
}

impl ArcLength {
    pub fn new(curve: Box<dyn Curve>) -> Result<Self> {
        Self::with_divisions(curve, DEFAULT_DIVISIONS)
    }

    pub fn with_divisions(curve: Box<dyn Curve>, divisions: usize) -> Result<Self> {
        if divisions == 0 {
            return Err(TwError::Geometry(
                "Arc-length table needs at least one division".into(),
            ));
        }

        let (t_min, t_max) = curve.domain();
        let span = t_max - t_min;
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = curve.point_at(t_min);
        let mut sum = 0.0;
        lengths.push(0.0);
        for i in 1..=divisions {
            let p = curve.point_at(t_min + span * i as f64 / divisions as f64);
            sum += (p - last).length();
            lengths.push(sum);
            last = p;
        }

        if !(sum > 0.0) || !sum.is_finite() {
            return Err(TwError::Geometry(format!(
                "Curve has degenerate length {}",
                sum
            )));
        }

        Ok(Self { curve, lengths })
    }

    pub fn curve(&self) -> &dyn Curve {
        self.curve.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    /// Total (chord-approximated) length of the curve.
    pub fn length(&self) -> f64 {
        self.lengths[self.lengths.len() - 1]
    }

    /// Map normalized arc length `u` to the curve's parameter.
    pub fn u_to_t(&self, u: f64) -> f64 {
        let (t_min, t_max) = self.curve.domain();
        let n = self.lengths.len();
        let target = u.clamp(0.0, 1.0) * self.length();

        // first sample at or beyond the target length
        let idx = self.lengths.partition_point(|&l| l < target);
        let s = if idx == 0 {
            0.0
        } else if idx >= n {
            1.0
        } else if self.lengths[idx] == target {
            idx as f64 / (n - 1) as f64
        } else {
            let i = idx - 1;
            let before = self.lengths[i];
            let segment = self.lengths[idx] - before;
            let frac = (target - before) / segment;
            (i as f64 + frac) / (n - 1) as f64
        };

        t_min + s * (t_max - t_min)
    }

    pub fn point_at_u(&self, u: f64) -> Point3 {
        self.curve.point_at(self.u_to_t(u))
    }

    /// Unit tangent at normalized arc length `u`.
    pub fn tangent_at_u(&self, u: f64) -> Vector3 {
        self.curve.tangent_at(self.u_to_t(u)).normalize_or_zero()
    }
}

impl std::fmt::Debug for ArcLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcLength")
            .field("divisions", &(self.lengths.len() - 1))
            .field("length", &self.length())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Circle, Line, TorusKnot};
    use std::f64::consts::PI;
    use tw_math::DVec3;

    #[test]
    fn test_circle_length() {
        let arc = ArcLength::new(Box::new(Circle::new(DVec3::ZERO, DVec3::Z, 1.0))).unwrap();
        // 200 chords undershoot 2π slightly
        assert!((arc.length() - 2.0 * PI).abs() < 1e-3);
        assert!(arc.length() < 2.0 * PI);
    }

    #[test]
    fn test_uniform_curve_maps_linearly() {
        let arc = ArcLength::new(Box::new(Circle::new(DVec3::ZERO, DVec3::Y, 1.0))).unwrap();
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            let t = arc.u_to_t(u);
            assert!((t - u * 2.0 * PI).abs() < 1e-9, "u={} t={}", u, t);
        }
    }

    #[test]
    fn test_equal_u_steps_cover_equal_distance() {
        let arc = ArcLength::new(Box::new(TorusKnot::new(1.0))).unwrap();
        let steps = 100;
        let expected = arc.length() / steps as f64;
        for i in 0..steps {
            let a = arc.point_at_u(i as f64 / steps as f64);
            let b = arc.point_at_u((i + 1) as f64 / steps as f64);
            // chords are shorter than arcs, but never by much at this density
            let d = (b - a).length();
            assert!(d <= expected * 1.001 && d >= expected * 0.98, "step {} d={}", i, d);
        }
    }

    #[test]
    fn test_tangent_is_unit() {
        let arc = ArcLength::new(Box::new(TorusKnot::new(20.0))).unwrap();
        for i in 0..40 {
            let tan = arc.tangent_at_u(i as f64 / 40.0);
            assert!((tan.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_curve_rejected() {
        let point = Line::new(DVec3::ONE, DVec3::ONE);
        assert!(ArcLength::new(Box::new(point)).is_err());
        let line = Line::new(DVec3::ZERO, DVec3::X);
        assert!(ArcLength::with_divisions(Box::new(line), 0).is_err());
    }
}
