use glam::{Mat4, Vec2, Vec3};

use crate::camera::core::Camera;

/// Convert a surface pixel position to normalized device coordinates.
///
/// `x` maps `[0, width]` to `[-1, 1]` and `y` maps `[0, height]` to
/// `[1, -1]` (screen y grows downward, NDC y grows upward).
#[must_use]
pub fn ndc(pixel: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(
        (pixel.x / size.x) * 2.0 - 1.0,
        -(pixel.y / size.y) * 2.0 + 1.0,
    )
}

/// A half-line in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Direction. Unit length from [`Ray::from_camera`]; a
    /// [`transformed`](Ray::transformed) ray keeps the transform's scale.
    pub dir: Vec3,
}

impl Ray {
    /// Ray from the camera through the NDC point `ndc`, starting on the
    /// near plane.
    #[must_use]
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Self {
        let inv = camera.build_matrix().inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Self {
            origin: near,
            dir: (far - near).normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Transform into another space. The direction keeps the transform's
    /// scale, so parameters stay comparable with the untransformed ray.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            dir: matrix.transform_vector3(self.dir),
        }
    }
}
