use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::StorefrontError;

/// Mesh shader source.
pub const MESH_SHADER: ShaderSource = ShaderSource {
    source: include_str!("../../assets/shaders/raster/mesh.wgsl"),
    file_path: "raster/mesh.wgsl",
};

/// Overlay quad shader source.
pub const OVERLAY_SHADER: ShaderSource = ShaderSource {
    source: include_str!("../../assets/shaders/screen/overlay.wgsl"),
    file_path: "screen/overlay.wgsl",
};

/// A WGSL source file embedded at compile time.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    /// WGSL text, possibly containing `#import` directives.
    pub source: &'static str,
    /// Path used in composer diagnostics.
    pub file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ShaderSource] = &[
    ShaderSource {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ShaderSource {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
];

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Consuming shaders use `#import storefront::camera::CameraUniform` and
/// friends. The composer produces `naga::Module` IR directly, skipping a
/// WGSL re-parse inside wgpu.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Register every shared module.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, StorefrontError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    StorefrontError::Shader(format!(
                        "failed to register '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        shader: ShaderSource,
    ) -> Result<wgpu::ShaderModule, StorefrontError> {
        let module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        }))
    }

    /// Compose `shader` into naga IR without touching a device.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: ShaderSource,
    ) -> Result<naga::Module, StorefrontError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source,
                file_path: shader.file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                StorefrontError::Shader(format!(
                    "failed to compose '{}': {}",
                    shader.file_path,
                    e.emit_to_string(&self.composer)
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in [MESH_SHADER, OVERLAY_SHADER] {
            let module = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{e}"));
            let entry_points: Vec<_> =
                module.entry_points.iter().map(|e| e.name.as_str()).collect();
            assert!(entry_points.contains(&"vs_main"), "{}", shader.file_path);
            assert!(entry_points.contains(&"fs_main"), "{}", shader.file_path);
        }
    }

    #[test]
    fn broken_source_is_a_shader_error() {
        let mut composer = ShaderComposer::new().unwrap();
        let err = composer
            .compose_naga(ShaderSource {
                source: "#import storefront::missing::Thing\nfn f() {}",
                file_path: "broken.wgsl",
            })
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Shader(_)));
        assert!(err.to_string().contains("broken.wgsl"));
    }
}
