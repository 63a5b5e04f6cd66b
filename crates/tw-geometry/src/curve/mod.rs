//! Curve traits and implementations.

mod circle;
mod line;
mod torus_knot;

use tw_math::{Point3, Vector3};

pub use circle::Circle;
pub use line::Line;
pub use torus_knot::TorusKnot;

/// Relative step used by the default finite-difference tangent.
pub const TANGENT_DELTA: f64 = 1e-4;

/// Trait for parametric curves in 3D space.
pub trait Curve: Send + Sync {
    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point3;

    /// Evaluate the tangent vector at parameter `t`.
    ///
    /// The default is a central difference over a small slice of the domain.
    /// Closed curves are sampled across the seam, open ones are clamped to
    /// their domain.
    fn tangent_at(&self, t: f64) -> Vector3 {
        let (t_min, t_max) = self.domain();
        let delta = (t_max - t_min) * TANGENT_DELTA;
        let (a, b) = if self.is_closed() {
            (t - delta, t + delta)
        } else {
            ((t - delta).max(t_min), (t + delta).min(t_max))
        };
        if b <= a {
            return Vector3::ZERO;
        }
        (self.point_at(b) - self.point_at(a)) / (b - a)
    }

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Whether the curve is closed (start == end).
    fn is_closed(&self) -> bool {
        false
    }
}
