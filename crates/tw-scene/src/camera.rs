use tw_geometry::Placement;
use tw_math::{look_at_rotation, DMat4, DQuat, DVec3, Point3, Ray, Vector3};

/// A perspective camera aimed by eye, target and up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3,       // camera position
    pub target: Point3,    // look-at target
    pub up: Vector3,       // up vector
    pub fov_y: f64,        // vertical FOV in radians
    pub aspect: f64,       // width/height
    pub near: f64,         // near clip plane
    pub far: f64,          // far clip plane
}

impl Camera {
    /// Perspective camera at the origin looking down -Z.
    pub fn perspective(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            eye: Point3::ZERO,
            target: Point3::NEG_Z,
            up: Vector3::Y,
            fov_y: fov_y_deg.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// World-to-camera matrix (right-handed, looking down -Z).
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Perspective projection with OpenGL-style NDC (-1 to 1 for Z).
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Compute combined view-projection matrix.
    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Rotation of the camera body (looking down local -Z).
    pub fn orientation(&self) -> DQuat {
        look_at_rotation(self.eye, self.target, self.up)
    }

    /// Move the camera onto a placement: eye at its position, looking along
    /// its forward axis with its up axis.
    pub fn apply_placement(&mut self, placement: &Placement) {
        self.eye = placement.position;
        self.target = placement.position + placement.forward();
        self.up = placement.up();
    }

    /// World ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, x: f64, y: f64) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(DVec3::new(x, y, 0.5));
        Ray::new(self.eye, through - self.eye)
    }
}

impl Default for Camera {
    /// Eye at (0, 0, 5), looking at origin, 45° FOV, 16:9 aspect.
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 5.0),
            target: Point3::ZERO,
            up: Vector3::Y,
            fov_y: std::f64::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
