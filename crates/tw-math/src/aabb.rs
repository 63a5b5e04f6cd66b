use crate::{DMat4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut min = first;
        let mut max = first;
        for &p in rest {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Largest side length.
    pub fn max_dimension(&self) -> f64 {
        self.extents().max_element()
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform (all eight corners).
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        let mut min = corners[0];
        let mut max = corners[0];
        for &c in &corners[1..] {
            min = min.min(c);
            max = max.max(c);
        }
        Self { min, max }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{dvec3, DQuat};

    #[test]
    fn test_from_points() {
        let pts = vec![dvec3(1.0, 2.0, 3.0), dvec3(-1.0, 5.0, 0.0), dvec3(3.0, -1.0, 2.0)];
        let aabb = Aabb3::from_points(&pts).unwrap();
        assert_eq!(aabb.min, dvec3(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, dvec3(3.0, 5.0, 3.0));
        assert!(Aabb3::from_points(&[]).is_none());
    }

    #[test]
    fn test_intersects() {
        let a = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(2.0, 2.0, 2.0));
        let b = Aabb3::new(dvec3(1.0, 1.0, 1.0), dvec3(3.0, 3.0, 3.0));
        let c = Aabb3::new(dvec3(5.0, 5.0, 5.0), dvec3(6.0, 6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_max_dimension() {
        let aabb = Aabb3::new(dvec3(-1.0, 0.0, 0.0), dvec3(1.0, 4.0, 0.5));
        assert_eq!(aabb.max_dimension(), 4.0);
    }

    #[test]
    fn test_transformed_rotation_grows_box() {
        let unit = Aabb3::new(dvec3(-1.0, -1.0, -1.0), dvec3(1.0, 1.0, 1.0));
        let m = DMat4::from_quat(DQuat::from_rotation_y(std::f64::consts::FRAC_PI_4));
        let rotated = unit.transformed(&m);
        let half = 2f64.sqrt();
        assert!((rotated.max.x - half).abs() < 1e-10);
        assert!((rotated.max.y - 1.0).abs() < 1e-10);
    }
}
