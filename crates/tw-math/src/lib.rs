pub mod aabb;
pub mod easing;
pub mod ray;
pub mod transform;

pub use glam::{DAffine3, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, EulerRot};
pub use aabb::Aabb3;
pub use easing::{wrap_unit, Easing};
pub use ray::Ray;
pub use transform::{look_at_rotation, Transform};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
