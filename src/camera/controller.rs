use glam::{Quat, Vec2, Vec3};

use crate::camera::core::Camera;
use crate::options::CameraOptions;

/// Polar angle margin that keeps the eye off the up axis.
const POLE_EPSILON: f32 = 1e-3;

/// Orbit controller: rotates the eye around the target, pans both in the
/// view plane, and dollies along the view direction.
///
/// Direct eye translation (keyboard steps) leaves the target alone, so the
/// next orbit gesture pivots around the original target from the moved
/// eye.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Camera state read by picking and rendering.
    pub camera: Camera,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    viewport_height: f32,
}

impl CameraController {
    /// Build a controller at the configured eye/target for a viewport of
    /// `width` x `height` pixels.
    #[must_use]
    pub fn new(options: &CameraOptions, width: u32, height: u32) -> Self {
        let camera = Camera {
            eye: Vec3::from_array(options.position),
            target: Vec3::from_array(options.target),
            up: Vec3::Y,
            aspect: aspect_ratio(width, height),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };
        Self {
            camera,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            min_distance: options.min_distance,
            max_distance: options.max_distance,
            viewport_height: height.max(1) as f32,
        }
    }

    /// Re-apply speed and projection options without moving the camera.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.rotate_speed = options.rotate_speed;
        self.pan_speed = options.pan_speed;
        self.zoom_speed = options.zoom_speed;
        self.min_distance = options.min_distance;
        self.max_distance = options.max_distance;
    }

    /// Track a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect_ratio(width, height);
        self.viewport_height = height.max(1) as f32;
    }

    /// Distance from eye to target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.camera.eye - self.camera.target).length()
    }

    /// Orbit by a pixel drag delta: horizontal drags turn around world up,
    /// vertical drags tilt, clamped short of the poles.
    pub fn rotate(&mut self, delta: Vec2) {
        let offset = self.camera.eye - self.camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let yaw = Quat::from_axis_angle(Vec3::Y, -delta.x * self.rotate_speed);
        let offset = yaw * offset;

        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let new_polar = (polar - delta.y * self.rotate_speed)
            .clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);
        let azimuth = offset.x.atan2(offset.z);

        let sin_polar = new_polar.sin();
        let offset = Vec3::new(
            radius * sin_polar * azimuth.sin(),
            radius * new_polar.cos(),
            radius * sin_polar * azimuth.cos(),
        );
        self.camera.eye = self.camera.target + offset;
    }

    /// Pan eye and target together by a pixel drag delta so the point under
    /// the cursor follows it.
    pub fn pan(&mut self, delta: Vec2) {
        let forward = (self.camera.target - self.camera.eye).normalize_or_zero();
        let right = forward.cross(self.camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let half_fov = (self.camera.fovy.to_radians() * 0.5).tan();
        let units_per_pixel =
            2.0 * self.distance() * half_fov / self.viewport_height;
        let translation = (right * -delta.x + up * delta.y)
            * units_per_pixel
            * self.pan_speed;

        self.camera.eye += translation;
        self.camera.target += translation;
    }

    /// Dolly toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.camera.eye - self.camera.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let new_distance = (distance * (1.0 - delta * self.zoom_speed))
            .clamp(self.min_distance, self.max_distance);
        self.camera.eye = self.camera.target + offset * (new_distance / distance);
    }

    /// Move the eye by a world-space offset, leaving the target in place.
    pub fn translate_eye(&mut self, offset: Vec3) {
        self.camera.eye += offset;
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(&CameraOptions::default(), 800, 600)
    }

    #[test]
    fn starts_at_configured_placement() {
        let c = controller();
        assert_eq!(c.camera.eye, Vec3::new(80.0, 30.0, 60.0));
        assert_eq!(c.camera.target, Vec3::ZERO);
        assert_eq!(c.camera.fovy, 4.0);
        assert!((c.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_preserves_distance_and_target() {
        let mut c = controller();
        let before = c.distance();
        c.rotate(Vec2::new(40.0, -25.0));
        assert!((c.distance() - before).abs() < 1e-3);
        assert_eq!(c.camera.target, Vec3::ZERO);
        assert_ne!(c.camera.eye, Vec3::new(80.0, 30.0, 60.0));
    }

    #[test]
    fn rotate_never_crosses_the_pole() {
        let mut c = controller();
        c.rotate(Vec2::new(0.0, 10_000.0));
        assert!(c.camera.eye.x.abs() + c.camera.eye.z.abs() > 0.0);
        assert!(c.camera.eye.y < c.distance());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..500 {
            c.zoom(1.0);
        }
        assert!((c.distance() - 1.0).abs() < 1e-3);
        for _ in 0..500 {
            c.zoom(-1.0);
        }
        assert!((c.distance() - 900.0).abs() < 1e-2);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut c = controller();
        let offset = c.camera.eye - c.camera.target;
        c.pan(Vec2::new(30.0, 0.0));
        assert_ne!(c.camera.target, Vec3::ZERO);
        assert!((c.camera.eye - c.camera.target).abs_diff_eq(offset, 1e-3));
    }

    #[test]
    fn translate_eye_keeps_target() {
        let mut c = controller();
        c.translate_eye(Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(c.camera.eye, Vec3::new(80.0, 30.0, 58.0));
        assert_eq!(c.camera.target, Vec3::ZERO);
    }

    #[test]
    fn zero_sized_viewport_does_not_divide_by_zero() {
        let mut c = controller();
        c.resize(0, 0);
        assert!(c.camera.aspect.is_finite());
    }
}
