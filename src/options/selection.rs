use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Selection", inline)]
#[serde(default)]
/// Selection pulse, hover oscillation, and popup timing.
pub struct SelectionOptions {
    /// Uniform scale applied to a freshly selected mesh.
    #[schemars(title = "Pulse Scale", range(min = 1.0, max = 2.0), extend("step" = 0.05))]
    pub pulse_scale: f32,
    /// Delay before the selected mesh is reset and the popup cleared.
    #[schemars(title = "Reset Delay (ms)", range(min = 100, max = 10000))]
    pub reset_delay_ms: u32,
    /// Angular frequency of the hover oscillation, per millisecond.
    #[schemars(skip)]
    pub oscillation_frequency: f64,
    /// Per-frame additive displacement amplitude of the hover oscillation.
    #[schemars(title = "Oscillation", range(min = 0.0, max = 0.1), extend("step" = 0.005))]
    pub oscillation_amplitude: f32,
    /// Stop oscillating the last selection once its reset fires.
    ///
    /// `false` keeps the oscillation running on the last selected mesh
    /// until another mesh is selected, so its position keeps drifting.
    #[schemars(title = "Stop Hover On Reset")]
    pub clear_hover_on_reset: bool,
    /// Restore the previous mesh's scale when a new selection supersedes
    /// it before its reset fired.
    #[schemars(title = "Restore On Supersede")]
    pub restore_on_supersede: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            pulse_scale: 1.2,
            reset_delay_ms: 3000,
            oscillation_frequency: 0.005,
            oscillation_amplitude: 0.02,
            clear_hover_on_reset: true,
            restore_on_supersede: false,
        }
    }
}
