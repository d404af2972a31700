use glam::{Mat4, Quat, Vec3};

/// Local transform of a scene node: translation, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset from the parent's origin.
    pub translation: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Transform with the given translation and per-axis scale.
    #[must_use]
    pub fn from_translation_scale(translation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    /// Decompose a column-major 4x4 matrix (as stored in glTF).
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) =
            matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_round_trip_preserves_components() {
        let t = Transform {
            translation: Vec3::new(-1.0, -4.0, -1.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(0.2),
        };
        let back = Transform::from_matrix(t.to_matrix());
        assert!(back.translation.abs_diff_eq(t.translation, 1e-5));
        assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = Transform::from_translation_scale(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::splat(0.5),
        );
        let p = t.to_matrix().transform_point3(Vec3::new(2.0, 2.0, 2.0));
        assert!(p.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-6));
    }
}
