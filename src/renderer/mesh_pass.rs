//! Lit mesh draw pass.
//!
//! Every visible mesh node gets one slot in a dynamic-offset uniform buffer
//! (model matrix, normal matrix, color). Geometry is uploaded once per
//! distinct `Arc<MeshData>`, so repeated instances of a template share
//! vertex and index buffers.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};
use wgpu::util::DeviceExt;

use crate::camera::binding::CameraBinding;
use crate::error::StorefrontError;
use crate::gpu::dynamic_buffer::{aligned_stride, DynamicBuffer};
use crate::gpu::lighting::Lighting;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, MESH_SHADER};
use crate::renderer::pipeline_util;
use crate::scene::{MeshData, SceneGraph};

/// Interleaved vertex: position then normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Local-space position.
    pub position: [f32; 3],
    /// Local-space normal.
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-node uniform.
/// NOTE: Must match the WGSL `NodeUniform` layout exactly (144 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    /// Local-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model` for normals.
    pub normal_matrix: [[f32; 4]; 4],
    /// Base color (linear RGBA).
    pub color: [f32; 4],
}

impl NodeUniform {
    /// Uniform for a node with world matrix `world`.
    #[must_use]
    pub fn new(world: Mat4, color: [f32; 4]) -> Self {
        let inverse = world.inverse();
        let normal = if inverse.is_finite() {
            inverse.transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: normal.to_cols_array_2d(),
            color,
        }
    }
}

/// Geometry of one `MeshData` on the GPU.
struct GpuMesh {
    // Held so the pointer key cannot be reused while cached.
    _source: Arc<MeshData>,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &Arc<MeshData>) -> Self {
        let vertices: Vec<MeshVertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| MeshVertex { position, normal })
            .collect();
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            _source: Arc::clone(mesh),
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

fn mesh_key(mesh: &Arc<MeshData>) -> usize {
    Arc::as_ptr(mesh) as usize
}

/// One draw: which geometry and which uniform slot.
#[derive(Debug, Clone, Copy)]
struct Draw {
    mesh: usize,
    offset: u32,
}

/// Draws every visible mesh node of a [`SceneGraph`].
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    node_layout: wgpu::BindGroupLayout,
    node_buffer: DynamicBuffer,
    node_bind_group: wgpu::BindGroup,
    stride: u64,
    meshes: FxHashMap<usize, GpuMesh>,
    draws: Vec<Draw>,
    staging: Vec<u8>,
}

impl MeshRenderer {
    /// Build the mesh pipeline against the camera and lighting layouts.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Shader`] if the mesh shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        camera: &CameraBinding,
        lighting: &Lighting,
    ) -> Result<Self, StorefrontError> {
        let device = &context.device;
        let stride = aligned_stride(
            size_of::<NodeUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment,
        );

        let node_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Node Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX
                        | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            size_of::<NodeUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });
        let node_buffer = DynamicBuffer::new(
            device,
            "Node Uniforms",
            stride * 64,
            wgpu::BufferUsages::UNIFORM,
        );
        let node_bind_group =
            Self::create_node_bind_group(device, &node_layout, &node_buffer);

        let shader = composer.compose(device, "Mesh Shader", MESH_SHADER)?;
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[
                    &camera.layout,
                    &lighting.layout,
                    &node_layout,
                ],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Mesh Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &pipeline_util::surface_target(
                        context.format(),
                        Some(wgpu::BlendState::ALPHA_BLENDING),
                    ),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // glTF picking is double-sided, so drawing is too
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_util::depth_stencil_state(true)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            node_layout,
            node_buffer,
            node_bind_group,
            stride,
            meshes: FxHashMap::default(),
            draws: Vec::new(),
            staging: Vec::new(),
        })
    }

    fn create_node_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Node Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<NodeUniform>() as u64),
                }),
            }],
        })
    }

    /// Collect the visible meshes, upload new geometry, drop geometry no
    /// longer referenced, and write every node's uniform.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
    ) {
        self.draws.clear();
        self.staging.clear();
        let mut live = FxHashSet::default();

        for id in scene.visible_meshes(scene.root()) {
            let Some(mesh) = scene.node(id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            if mesh.indices.is_empty() {
                continue;
            }
            let key = mesh_key(mesh);
            let _ = live.insert(key);
            let _ = self
                .meshes
                .entry(key)
                .or_insert_with(|| GpuMesh::upload(device, mesh));

            let offset = self.staging.len();
            let uniform = NodeUniform::new(scene.world_matrix(id), mesh.color);
            self.staging.extend_from_slice(bytemuck::bytes_of(&uniform));
            self.staging.resize(offset + self.stride as usize, 0);
            self.draws.push(Draw {
                mesh: key,
                offset: offset as u32,
            });
        }

        if scene.is_dirty() {
            let before = self.meshes.len();
            self.meshes.retain(|key, _| live.contains(key));
            if self.meshes.len() != before {
                log::debug!(
                    "released {} mesh buffers",
                    before - self.meshes.len()
                );
            }
        }

        if self
            .node_buffer
            .write_bytes(device, queue, &self.staging)
        {
            self.node_bind_group = Self::create_node_bind_group(
                device,
                &self.node_layout,
                &self.node_buffer,
            );
        }
    }

    /// Number of draws recorded by the last [`prepare`](Self::prepare).
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Record the draws. Camera and lighting bind groups are set here.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        camera: &'a CameraBinding,
        lighting: &'a Lighting,
    ) {
        if self.draws.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &camera.bind_group, &[]);
        pass.set_bind_group(1, &lighting.bind_group, &[]);
        for draw in &self.draws {
            let Some(mesh) = self.meshes.get(&draw.mesh) else {
                continue;
            };
            pass.set_bind_group(2, &self.node_bind_group, &[draw.offset]);
            pass.set_vertex_buffer(0, mesh.vertices.slice(..));
            pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
