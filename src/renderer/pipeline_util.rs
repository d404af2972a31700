use crate::gpu::texture::DEPTH_FORMAT;

/// Single color target writing the surface format.
pub(crate) fn surface_target(
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

/// Depth-stencil state for depth-tested pipelines.
pub(crate) fn depth_stencil_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: if write {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Convert an sRGB-encoded color to linear for sRGB surfaces.
pub(crate) fn surface_color(color: [f32; 4], format: wgpu::TextureFormat) -> [f32; 4] {
    if !format.is_srgb() {
        return color;
    }
    let decode = |c: f32| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [decode(color[0]), decode(color[1]), decode(color[2]), color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_surfaces_get_linearized_colors() {
        let c = [0.5, 0.0, 1.0, 0.8];
        assert_eq!(surface_color(c, wgpu::TextureFormat::Bgra8Unorm), c);
        let lin = surface_color(c, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!((lin[0] - 0.214).abs() < 1e-3);
        assert_eq!(lin[1], 0.0);
        assert!((lin[2] - 1.0).abs() < 1e-6);
        assert_eq!(lin[3], 0.8);
    }
}
