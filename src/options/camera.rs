use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera placement, projection, and control parameters.
pub struct CameraOptions {
    /// Initial eye position in world space.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Orbit target the camera looks at.
    #[schemars(skip)]
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 1.0, max = 90.0), extend("step" = 0.5))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Orbit rotation in radians per dragged pixel.
    #[schemars(title = "Rotate Speed", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub rotate_speed: f32,
    /// Pan sensitivity multiplier (1.0 keeps the point under the cursor).
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub pan_speed: f32,
    /// Fractional distance change per scroll step.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
    /// Closest allowed orbit distance.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    #[schemars(skip)]
    pub max_distance: f32,
    /// World units moved per movement keypress.
    #[schemars(title = "Key Step", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub key_step: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: [80.0, 30.0, 60.0],
            target: [0.0, 0.0, 0.0],
            fovy: 4.0,
            znear: 0.1,
            zfar: 1000.0,
            rotate_speed: 0.005,
            pan_speed: 1.0,
            zoom_speed: 0.05,
            min_distance: 1.0,
            max_distance: 900.0,
            key_step: 2.0,
        }
    }
}
