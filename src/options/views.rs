use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which model asset is loaded, where it is placed, and how it is scaled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
pub struct ViewConfig {
    /// Path (native) or URL (browser) of the `.glb`/`.gltf` asset.
    pub asset_path: String,
    /// World-space offset of the model root.
    pub position: [f32; 3],
    /// Per-axis scale of the model root.
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Views", inline)]
#[serde(default)]
/// Model configuration for the outside and inside views.
pub struct ViewOptions {
    /// Storefront exterior, shown initially.
    pub outside: ViewConfig,
    /// Store interior, shown after "Enter Market".
    pub inside: ViewConfig,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            outside: ViewConfig {
                asset_path: "assets/models/lowpoly_supermarket.glb".into(),
                position: [0.0, 0.0, 0.0],
                scale: [0.5, 0.5, 0.5],
            },
            inside: ViewConfig {
                asset_path: "assets/models/multi_supermarket.glb".into(),
                position: [-1.0, -4.0, -1.0],
                scale: [0.2, 0.2, 0.2],
            },
        }
    }
}
