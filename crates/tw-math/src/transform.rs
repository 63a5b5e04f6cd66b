use crate::{DMat3, DMat4, DQuat, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Local transform of a scene node: translation, rotation, per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: DQuat,
    pub scale: Vector3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vector3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: Vector3::ONE,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self {
            translation: t,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(t: Vector3, rotation: DQuat) -> Self {
        Self {
            translation: t,
            rotation,
            scale: Vector3::ONE,
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Multiply the current scale uniformly.
    pub fn scale_by(&mut self, factor: f64) {
        self.scale *= factor;
    }

    pub fn set_uniform_scale(&mut self, s: f64) {
        self.scale = Vector3::splat(s);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation whose basis looks from `eye` towards `target` with the given `up`.
///
/// Right-handed, looking down local -Z: the columns are
/// `x = up × z`, `y = z × x`, `z = normalize(eye - target)`. Degenerate
/// inputs are nudged the same way a standard look-at matrix does it, so the
/// result is always a valid unit quaternion.
pub fn look_at_rotation(eye: Point3, target: Point3, up: Vector3) -> DQuat {
    let mut z = eye - target;
    if z.length_squared() == 0.0 {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        if up.z.abs() == 1.0 {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize()
}
