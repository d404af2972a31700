use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Scene lighting: one ambient term plus one point light.
pub struct LightingOptions {
    /// Ambient light intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub ambient_intensity: f32,
    /// Ambient light color (linear RGB).
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    /// Point light position in world space.
    #[schemars(skip)]
    pub point_position: [f32; 3],
    /// Point light intensity.
    #[schemars(title = "Point Light", range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub point_intensity: f32,
    /// Point light color (linear RGB).
    #[schemars(skip)]
    pub point_color: [f32; 3],
    /// Clear color behind the model (linear RGB).
    #[schemars(skip)]
    pub background: [f32; 3],
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient_intensity: 2.0,
            ambient_color: [1.0, 1.0, 1.0],
            point_position: [100.0, 50.0, 50.0],
            point_intensity: 1.0,
            point_color: [1.0, 1.0, 1.0],
            background: [1.0, 1.0, 1.0],
        }
    }
}
