use crate::{Aabb3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at parameter t.
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Slab test against a box. Returns the entry distance, or 0 when the
    /// origin is inside the box.
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<f64> {
        let inv = self.direction.recip();
        let t0 = (aabb.min - self.origin) * inv;
        let t1 = (aabb.max - self.origin) * inv;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        if t_far < 0.0 || t_near > t_far || t_near.is_nan() || t_far.is_nan() {
            return None;
        }
        Some(t_near.max(0.0))
    }

    /// Möller-Trumbore test against a triangle, either side facing.
    /// Returns the distance along the ray to the hit.
    pub fn intersect_triangle(&self, v0: Point3, v1: Point3, v2: Point3) -> Option<f64> {
        const EPSILON: f64 = 1e-12;
        // slack on the barycentric bounds so a ray along a shared edge hits one side
        const EDGE_SLACK: f64 = 1e-9;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        // parallel to the triangle plane
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if u < -EDGE_SLACK || u > 1.0 + EDGE_SLACK {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < -EDGE_SLACK || u + v > 1.0 + EDGE_SLACK {
            return None;
        }

        let t = f * edge2.dot(q);
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_at() {
        let ray = Ray::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p - dvec3(5.0, 0.0, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_intersect_aabb_hit_and_miss() {
        let aabb = Aabb3::new(dvec3(-1.0, -1.0, -6.0), dvec3(1.0, 1.0, -4.0));
        let ray = Ray::new(Point3::ZERO, dvec3(0.0, 0.0, -1.0));
        let t = ray.intersect_aabb(&aabb).unwrap();
        assert!((t - 4.0).abs() < 1e-10);

        let away = Ray::new(Point3::ZERO, dvec3(0.0, 0.0, 1.0));
        assert!(away.intersect_aabb(&aabb).is_none());

        let beside = Ray::new(dvec3(3.0, 0.0, 0.0), dvec3(0.0, 0.0, -1.0));
        assert!(beside.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn test_intersect_aabb_from_inside() {
        let aabb = Aabb3::new(dvec3(-1.0, -1.0, -1.0), dvec3(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::ZERO, dvec3(1.0, 1.0, 0.0));
        assert_eq!(ray.intersect_aabb(&aabb), Some(0.0));
    }

    #[test]
    fn test_intersect_triangle_inside_and_outside() {
        let (a, b, c) = (
            dvec3(0.0, 0.0, -5.0),
            dvec3(4.0, 0.0, -5.0),
            dvec3(0.0, 4.0, -5.0),
        );
        let inside = Ray::new(dvec3(1.0, 1.0, 0.0), dvec3(0.0, 0.0, -1.0));
        let t = inside.intersect_triangle(a, b, c).unwrap();
        assert!((t - 5.0).abs() < 1e-12);
        // winding does not matter
        assert!(inside.intersect_triangle(a, c, b).is_some());

        // inside the bounding box, outside the hypotenuse
        let corner = Ray::new(dvec3(3.5, 3.5, 0.0), dvec3(0.0, 0.0, -1.0));
        let bounds = Aabb3::from_points(&[a, b, c]).unwrap();
        assert!(corner.intersect_aabb(&bounds).is_some());
        assert!(corner.intersect_triangle(a, b, c).is_none());

        let behind = Ray::new(dvec3(1.0, 1.0, -10.0), dvec3(0.0, 0.0, -1.0));
        assert!(behind.intersect_triangle(a, b, c).is_none());

        let parallel = Ray::new(dvec3(1.0, 1.0, -5.0), dvec3(1.0, 0.0, 0.0));
        assert!(parallel.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn test_intersect_triangle_on_shared_edge() {
        let (a, b, c, d) = (
            dvec3(-1.0, -1.0, -2.0),
            dvec3(1.0, -1.0, -2.0),
            dvec3(1.0, 1.0, -2.0),
            dvec3(-1.0, 1.0, -2.0),
        );
        // the diagonal a-c splits the quad; the center lies on it
        let ray = Ray::new(Point3::ZERO, dvec3(0.0, 0.0, -1.0));
        let hits = [ray.intersect_triangle(a, b, c), ray.intersect_triangle(a, c, d)];
        assert!(hits.iter().flatten().any(|t| (t - 2.0).abs() < 1e-12));
    }
}
