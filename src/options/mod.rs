//! Centralized viewer options with TOML preset support.
//!
//! Every tweakable constant (camera placement and speeds, lighting, the
//! selection pulse, the two view configurations, key bindings) lives here.
//! Options serialize to/from TOML; all sections use `#[serde(default)]`
//! so a file overriding only `[selection]` works.

mod camera;
mod keybindings;
mod lighting;
mod selection;
mod views;

use std::path::Path;

pub use camera::CameraOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
use schemars::JsonSchema;
pub use selection::SelectionOptions;
use serde::{Deserialize, Serialize};
pub use views::{ViewConfig, ViewOptions};

use crate::error::StorefrontError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera placement, projection, and control parameters.
    pub camera: CameraOptions,
    /// Ambient and point light parameters.
    pub lighting: LightingOptions,
    /// Selection pulse and popup timing.
    pub selection: SelectionOptions,
    /// Outside/inside model configuration.
    #[schemars(skip)]
    pub views: ViewOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::OptionsParse`] on malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, StorefrontError> {
        toml::from_str(content)
            .map_err(|e| StorefrontError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Io`] if the file cannot be read and
    /// [`StorefrontError::OptionsParse`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, StorefrontError> {
        let content =
            std::fs::read_to_string(path).map_err(StorefrontError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed), creating parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StorefrontError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StorefrontError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StorefrontError::Io)?;
        }
        std::fs::write(path, content).map_err(StorefrontError::Io)
    }

    /// Options named on the command line: a TOML file path, or the name of
    /// a preset in `preset_dir` (`night` for `preset_dir/night.toml`).
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::OptionsParse`] naming the available
    /// presets when `arg` is neither, and any error from loading the file.
    pub fn resolve(arg: &str, preset_dir: &Path) -> Result<Self, StorefrontError> {
        let path = Path::new(arg);
        if path.is_file() {
            return Self::load(path);
        }
        let presets = Self::list_presets(preset_dir);
        if presets.iter().any(|name| name == arg) {
            return Self::load(&preset_dir.join(format!("{arg}.toml")));
        }
        Err(StorefrontError::OptionsParse(format!(
            "no options file or preset named {arg} (presets: {})",
            if presets.is_empty() {
                "none".to_owned()
            } else {
                presets.join(", ")
            }
        )))
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[selection]
reset_delay_ms = 1500
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.selection.reset_delay_ms, 1500);
        assert_eq!(opts.selection.pulse_scale, 1.2);
        assert_eq!(opts.camera.position, [80.0, 30.0, 60.0]);
        assert_eq!(opts.camera.fovy, 4.0);
        assert_eq!(opts.views.inside.scale, [0.2, 0.2, 0.2]);
    }

    #[test]
    fn keybinding_lookup() {
        use crate::input::KeyAction;
        let opts = Options::default();
        assert_eq!(opts.keybindings.lookup("w"), Some(KeyAction::MoveForward));
        assert_eq!(opts.keybindings.lookup("d"), Some(KeyAction::MoveRight));
        assert_eq!(opts.keybindings.lookup("W"), None);
        assert_eq!(opts.keybindings.lookup("q"), None);
    }

    #[test]
    fn keybindings_rebuild_after_parse() {
        use crate::input::KeyAction;
        let toml_str = r#"
[keybindings.bindings]
move_forward = "ArrowUp"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(
            opts.keybindings.lookup("ArrowUp"),
            Some(KeyAction::MoveForward)
        );
        assert_eq!(opts.keybindings.lookup("w"), None);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[camera\nfovy = 4").unwrap_err();
        assert!(matches!(err, StorefrontError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load_and_list_presets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets").join("bright.toml");
        let mut opts = Options::default();
        opts.lighting.ambient_intensity = 3.0;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.lighting.ambient_intensity, 3.0);
        assert_eq!(
            Options::list_presets(&dir.path().join("presets")),
            vec!["bright".to_owned()]
        );
    }

    #[test]
    fn resolve_accepts_paths_and_preset_names() {
        let dir = tempfile::tempdir().unwrap();
        let presets = dir.path().join("presets");
        let mut opts = Options::default();
        opts.selection.reset_delay_ms = 500;
        opts.save(&presets.join("quick.toml")).unwrap();

        let by_name = Options::resolve("quick", &presets).unwrap();
        assert_eq!(by_name.selection.reset_delay_ms, 500);

        let path = presets.join("quick.toml");
        let by_path = Options::resolve(path.to_str().unwrap(), &presets).unwrap();
        assert_eq!(by_path, by_name);

        let err = Options::resolve("missing", &presets).unwrap_err();
        assert!(err.to_string().contains("quick"));
    }

    #[test]
    fn shipped_presets_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("presets");
        assert!(Options::list_presets(&dir).contains(&"quick".to_owned()));
        let quick = Options::resolve("quick", &dir).unwrap();
        assert_eq!(quick.selection.reset_delay_ms, 1500);
        assert_eq!(quick.camera, CameraOptions::default());
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("selection"));
        assert!(!props.contains_key("views"));
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("position").is_none());
    }
}
