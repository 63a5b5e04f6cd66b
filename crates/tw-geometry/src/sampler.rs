//! Frames and placements along a tube.
//!
//! A [`Frame`] is recomputed for every query and never stored. Sampling is
//! a pure function of `(tube, t)`.

use serde::{Deserialize, Serialize};
use tw_core::Tolerance;
use tw_math::{look_at_rotation, wrap_unit, DQuat, Easing, Point3, Vector3};

use crate::tube::Tube;

/// Position and orthonormal basis at one parameter along a tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Point3,
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

impl Frame {
    /// Whether the three axes are unit length and pairwise perpendicular.
    pub fn is_orthonormal(&self, tol: Tolerance) -> bool {
        let (t, n, b) = (self.tangent, self.normal, self.binormal);
        tol.linear_eq(t.length(), 1.0)
            && tol.linear_eq(n.length(), 1.0)
            && tol.linear_eq(b.length(), 1.0)
            && tol.is_zero(t.dot(n))
            && tol.is_zero(t.dot(b))
            && tol.is_zero(n.dot(b))
    }
}

/// World position and orientation for a camera or object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point3,
    pub orientation: DQuat,
}

impl Placement {
    /// Direction the placed entity faces (local -Z).
    pub fn forward(&self) -> Vector3 {
        self.orientation * Vector3::NEG_Z
    }

    pub fn up(&self) -> Vector3 {
        self.orientation * Vector3::Y
    }
}

/// Sample the frame at path parameter `t` (wrapped into `[0, 1)`).
///
/// The binormal is linearly interpolated between the two neighbouring tube
/// samples. The normal is `normalize(B × T)` and the returned binormal is
/// re-derived as `T × N`, so the basis is orthonormal even though the
/// interpolated vector is not.
pub fn sample_frame(tube: &Tube, t: f64) -> Frame {
    let t = wrap_unit(t);
    let path = tube.path();

    let position = path.point_at_u(t) * tube.scale;
    let tangent = path.tangent_at_u(t);

    let segments = tube.segments();
    let binormals = tube.binormals();
    let pick = t * segments as f64;
    let i = (pick.floor() as usize).min(segments - 1);
    let i_next = (i + 1) % segments;
    let frac = pick - i as f64;

    let lerped = binormals[i].lerp(binormals[i_next], frac);
    let normal = lerped.cross(tangent).normalize_or_zero();
    let binormal = tangent.cross(normal);

    Frame {
        position,
        tangent,
        normal,
        binormal,
    }
}

/// Push a frame `lateral_offset` along its normal and face along the tangent.
///
/// The orientation looks from the new position towards `position + tangent`
/// with the frame's normal as up.
pub fn place_on_curve(frame: &Frame, lateral_offset: f64) -> Placement {
    let position = frame.position + frame.normal * lateral_offset;
    let target = position + frame.tangent;
    Placement {
        position,
        orientation: look_at_rotation(position, target, frame.normal),
    }
}

/// Path parameter for forward travel from `from_t` to `to_t`.
///
/// Travel always goes in the curve's positive direction, crossing the 0/1
/// seam when `to_t < from_t`. Progress is clamped to `[0, 1]`; the end
/// points are returned exactly rather than through the easing curve.
pub fn travel_param(from_t: f64, to_t: f64, progress: f64, ease: Easing) -> f64 {
    let from = wrap_unit(from_t);
    let to = wrap_unit(to_t);
    let progress = progress.clamp(0.0, 1.0);

    if progress <= 0.0 {
        return from;
    }
    if progress >= 1.0 {
        return to;
    }

    let delta = wrap_unit(to - from);
    wrap_unit(from + delta * ease.apply(progress))
}

/// Frame at `progress` of a forward move between two path parameters.
pub fn step_between(tube: &Tube, from_t: f64, to_t: f64, progress: f64, ease: Easing) -> Frame {
    sample_frame(tube, travel_param(from_t, to_t, progress, ease))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc_length::ArcLength;
    use crate::curve::{Circle, TorusKnot};
    use approx::assert_abs_diff_eq;
    use tw_math::DVec3;

    fn knot_tube() -> Tube {
        let path = ArcLength::new(Box::new(TorusKnot::new(20.0))).unwrap();
        Tube::new(path, 200, 2.0, 4.0).unwrap()
    }

    #[test]
    fn test_frame_orthonormal_across_parameter() {
        let tube = knot_tube();
        for i in 0..500 {
            let t = i as f64 / 500.0;
            let frame = sample_frame(&tube, t);
            assert!(frame.is_orthonormal(Tolerance::loose()), "t={} {:?}", t, frame);
        }
    }

    #[test]
    fn test_frame_at_sample_matches_tube() {
        let tube = knot_tube();
        let frame = sample_frame(&tube, 10.0 / 200.0);
        let b = tube.binormals()[10];
        assert!((frame.binormal - b).length() < 1e-6);
        assert!((frame.position - tube.sample_point(10)).length() < 1e-9);
    }

    #[test]
    fn test_wraps_out_of_range_parameter() {
        let tube = knot_tube();
        let a = sample_frame(&tube, 0.25);
        let b = sample_frame(&tube, 1.25);
        let c = sample_frame(&tube, -0.75);
        assert!((a.position - b.position).length() < 1e-9);
        assert!((a.position - c.position).length() < 1e-9);
        let at_one = sample_frame(&tube, 1.0);
        assert!((at_one.position - sample_frame(&tube, 0.0).position).length() < 1e-9);
    }

    #[test]
    fn test_place_with_offset_moves_along_normal() {
        let tube = knot_tube();
        let frame = sample_frame(&tube, 0.4);
        let placement = place_on_curve(&frame, 15.0);
        assert_abs_diff_eq!((placement.position - frame.position).length(), 15.0, epsilon = 1e-9);
        assert!((placement.position - frame.position).normalize().dot(frame.normal) > 1.0 - 1e-9);
        assert!((placement.forward() - frame.tangent).length() < 1e-9);
        assert!((placement.up() - frame.normal).length() < 1e-9);
    }

    #[test]
    fn test_place_with_zero_offset_keeps_position() {
        let tube = knot_tube();
        for i in 0..20 {
            let frame = sample_frame(&tube, i as f64 / 20.0);
            assert_eq!(place_on_curve(&frame, 0.0).position, frame.position);
        }
    }

    #[test]
    fn test_travel_param_crosses_seam() {
        let mid = travel_param(0.9, 0.1, 0.5, Easing::Linear);
        // lands on the seam itself, either side of it
        assert!(mid.min(1.0 - mid) < 1e-12, "mid={}", mid);
        let late = travel_param(0.9, 0.1, 0.75, Easing::Linear);
        assert_abs_diff_eq!(late, 0.05, epsilon = 1e-12);
        let quarter = travel_param(0.9, 0.1, 0.25, Easing::Linear);
        assert_abs_diff_eq!(quarter, 0.95, epsilon = 1e-12);
    }

    #[test]
    fn test_travel_param_clamps_progress() {
        assert_eq!(travel_param(0.3, 0.6, -2.0, Easing::CubicInOut), 0.3);
        assert_eq!(travel_param(0.3, 0.6, 7.0, Easing::CubicInOut), 0.6);
    }

    #[test]
    fn test_golden_circle_frame() {
        let path = ArcLength::new(Box::new(Circle::new(DVec3::ZERO, DVec3::Y, 1.0))).unwrap();
        let tube = Tube::from_binormals(path, vec![DVec3::Y; 4], 3.0).unwrap();
        let frame = sample_frame(&tube, 0.5);
        assert!((frame.position - DVec3::new(0.0, 0.0, 3.0)).length() < 1e-9);
        assert!((frame.tangent - DVec3::X).length() < 1e-9);
        assert!((frame.normal - DVec3::NEG_Z).length() < 1e-9);
        assert!((frame.binormal - DVec3::Y).length() < 1e-9);
    }
}
