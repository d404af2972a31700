use wgpu::util::DeviceExt;

use crate::options::LightingOptions;

/// Lighting shared by the mesh shader.
/// NOTE: Must match the WGSL `LightingUniform` layout exactly (48 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Ambient color (linear RGB).
    pub ambient_color: [f32; 3],
    /// Ambient intensity.
    pub ambient_intensity: f32,
    /// Point light position in world space.
    pub point_position: [f32; 3],
    /// Point light intensity.
    pub point_intensity: f32,
    /// Point light color (linear RGB).
    pub point_color: [f32; 3],
    /// Padding to a 16-byte multiple.
    pub _pad: f32,
}

impl From<&LightingOptions> for LightingUniform {
    fn from(options: &LightingOptions) -> Self {
        Self {
            ambient_color: options.ambient_color,
            ambient_intensity: options.ambient_intensity,
            point_position: options.point_position,
            point_intensity: options.point_intensity,
            point_color: options.point_color,
            _pad: 0.0,
        }
    }
}

/// GPU side of the lights: uniform buffer, layout, and bind group.
pub struct Lighting {
    /// CPU copy of the uniform.
    pub uniform: LightingUniform,
    /// Uniform buffer.
    pub buffer: wgpu::Buffer,
    /// Bind group layout (group 1 of the mesh pipeline).
    pub layout: wgpu::BindGroupLayout,
    /// Bind group over [`buffer`](Self::buffer).
    pub bind_group: wgpu::BindGroup,
}

impl Lighting {
    /// Allocate the lighting uniform for `options`.
    #[must_use]
    pub fn new(device: &wgpu::Device, options: &LightingOptions) -> Self {
        let uniform = LightingUniform::from(options);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lighting Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Lighting Bind Group"),
        });

        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Apply new options, uploading only when something changed.
    pub fn set_options(&mut self, queue: &wgpu::Queue, options: &LightingOptions) {
        let uniform = LightingUniform::from(options);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(
                &self.buffer,
                0,
                bytemuck::cast_slice(&[self.uniform]),
            );
        }
    }
}
