// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The wgpu graphics device: object tables for host-created resources
//! and key-cached pipeline creation for the renderer.

use super::conversions::IntoWgpu;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tessella_core::command::CommandBufferId;
use tessella_core::delegate::GraphicsDevice;
use tessella_core::error::ResourceError;
use tessella_core::handle::{BufferId, ShaderModuleId, TextureId, TextureViewId};
use tessella_core::pipeline::{RenderPipelineDescriptor, RenderPipelineId};
use tessella_core::strategy::{PipelineKey, VertexLayoutKind};
use tessella_core::uniforms::SurfaceUniforms;
use wgpu::util::DeviceExt;

const REFINED_VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const CONTROL_POINT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

struct WgpuDeviceInternal {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    shader_modules: Mutex<HashMap<ShaderModuleId, Arc<wgpu::ShaderModule>>>,
    buffers: Mutex<HashMap<BufferId, Arc<wgpu::Buffer>>>,
    sampled_textures: Mutex<HashMap<TextureId, Arc<wgpu::TextureView>>>,
    texture_views: Mutex<HashMap<TextureViewId, Arc<wgpu::TextureView>>>,
    pipelines: Mutex<HashMap<RenderPipelineId, Arc<wgpu::RenderPipeline>>>,
    /// Compiled pipelines cached by their strategy key: an identical key
    /// always maps to the same pipeline object.
    pipeline_cache: Mutex<HashMap<PipelineKey, RenderPipelineId>>,
    /// Command buffers finished but not yet submitted.
    pending_command_buffers: Mutex<HashMap<CommandBufferId, wgpu::CommandBuffer>>,

    next_shader_id: AtomicU64,
    next_buffer_id: AtomicU64,
    next_texture_id: AtomicU64,
    next_view_id: AtomicU64,
    next_pipeline_id: AtomicUsize,
    next_command_buffer_id: AtomicU64,

    uniform_buffer: wgpu::Buffer,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    ptex_layout: wgpu::BindGroupLayout,
    ptex_sampler: wgpu::Sampler,
    dummy_view: Arc<wgpu::TextureView>,
}

impl std::fmt::Debug for WgpuDeviceInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuDeviceInternal")
            .field("surface_format", &self.surface_format)
            .finish()
    }
}

/// A clonable, thread-safe handle to the wgpu graphics device state.
#[derive(Clone, Debug)]
pub struct WgpuSurfaceDevice {
    internal: Arc<WgpuDeviceInternal>,
}

impl WgpuSurfaceDevice {
    /// Wraps a logical device and queue, creating the shared uniform and
    /// texture binding resources every surface pipeline uses.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessella.surface-uniforms"),
            size: std::mem::size_of::<SurfaceUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessella.uniform-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessella.uniform-bind-group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // One layout for all four per-face texture slots plus the shared
        // sampler; unbound slots read the dummy texture.
        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let ptex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessella.ptex-layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let ptex_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessella.ptex-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let dummy_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessella.dummy-texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &dummy_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let dummy_view = Arc::new(dummy_texture.create_view(&wgpu::TextureViewDescriptor::default()));

        Self {
            internal: Arc::new(WgpuDeviceInternal {
                device,
                queue,
                surface_format,
                shader_modules: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                sampled_textures: Mutex::new(HashMap::new()),
                texture_views: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                pipeline_cache: Mutex::new(HashMap::new()),
                pending_command_buffers: Mutex::new(HashMap::new()),
                next_shader_id: AtomicU64::new(0),
                next_buffer_id: AtomicU64::new(0),
                next_texture_id: AtomicU64::new(0),
                next_view_id: AtomicU64::new(0),
                next_pipeline_id: AtomicUsize::new(0),
                next_command_buffer_id: AtomicU64::new(0),
                uniform_buffer,
                uniform_layout,
                uniform_bind_group,
                ptex_layout,
                ptex_sampler,
                dummy_view,
            }),
        }
    }

    // --- Host-side registration (model upload, shader compilation) ---

    /// Compiles a WGSL module and registers it for pipeline hooks.
    pub fn register_shader_module(&self, label: &str, source: &str) -> ShaderModuleId {
        let module = self
            .internal
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let id = ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .shader_modules
            .lock()
            .unwrap()
            .insert(id, Arc::new(module));
        id
    }

    /// Creates a vertex buffer initialized with `data`.
    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> BufferId {
        self.create_buffer_with_usage(label, data, wgpu::BufferUsages::VERTEX)
    }

    /// Creates an index buffer initialized with `data`.
    pub fn create_index_buffer(&self, label: &str, data: &[u8]) -> BufferId {
        self.create_buffer_with_usage(label, data, wgpu::BufferUsages::INDEX)
    }

    fn create_buffer_with_usage(
        &self,
        label: &str,
        data: &[u8],
        usage: wgpu::BufferUsages,
    ) -> BufferId {
        let buffer = self
            .internal
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            });
        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .buffers
            .lock()
            .unwrap()
            .insert(id, Arc::new(buffer));
        id
    }

    /// Uploads an RGBA8 image as a sampled texture.
    pub fn create_sampled_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> TextureId {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.internal.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.internal.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: None,
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .sampled_textures
            .lock()
            .unwrap()
            .insert(id, Arc::new(view));
        id
    }

    /// Registers a texture view (surface frame, depth attachment) for use
    /// in pass descriptors.
    pub fn register_texture_view(&self, view: wgpu::TextureView) -> TextureViewId {
        let id = TextureViewId(self.internal.next_view_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .texture_views
            .lock()
            .unwrap()
            .insert(id, Arc::new(view));
        id
    }

    /// Drops a registered texture view, typically after presenting the
    /// frame it belonged to.
    pub fn unregister_texture_view(&self, id: TextureViewId) {
        self.internal.texture_views.lock().unwrap().remove(&id);
    }

    // --- Accessors for the encoder and queue ---

    pub(crate) fn wgpu_device(&self) -> &wgpu::Device {
        &self.internal.device
    }

    pub(crate) fn wgpu_queue(&self) -> &wgpu::Queue {
        &self.internal.queue
    }

    pub(crate) fn wgpu_pipeline(&self, id: RenderPipelineId) -> Option<Arc<wgpu::RenderPipeline>> {
        self.internal.pipelines.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn wgpu_buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        self.internal.buffers.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn wgpu_sampled_view(&self, id: TextureId) -> Option<Arc<wgpu::TextureView>> {
        self.internal
            .sampled_textures
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
    }

    pub(crate) fn wgpu_view(&self, id: TextureViewId) -> Option<Arc<wgpu::TextureView>> {
        self.internal.texture_views.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.internal.uniform_buffer
    }

    pub(crate) fn uniform_bind_group(&self) -> &wgpu::BindGroup {
        &self.internal.uniform_bind_group
    }

    pub(crate) fn ptex_layout(&self) -> &wgpu::BindGroupLayout {
        &self.internal.ptex_layout
    }

    pub(crate) fn ptex_sampler(&self) -> &wgpu::Sampler {
        &self.internal.ptex_sampler
    }

    pub(crate) fn dummy_view(&self) -> Arc<wgpu::TextureView> {
        self.internal.dummy_view.clone()
    }

    pub(crate) fn store_command_buffer(&self, buffer: wgpu::CommandBuffer) -> CommandBufferId {
        let id = CommandBufferId(
            self.internal
                .next_command_buffer_id
                .fetch_add(1, Ordering::Relaxed),
        );
        self.internal
            .pending_command_buffers
            .lock()
            .unwrap()
            .insert(id, buffer);
        id
    }

    pub(crate) fn take_command_buffer(&self, id: CommandBufferId) -> Option<wgpu::CommandBuffer> {
        self.internal
            .pending_command_buffers
            .lock()
            .unwrap()
            .remove(&id)
    }

    fn vertex_layouts(kind: VertexLayoutKind) -> Vec<wgpu::VertexBufferLayout<'static>> {
        match kind {
            VertexLayoutKind::RefinedPositionNormal => vec![wgpu::VertexBufferLayout {
                array_stride: 24,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &REFINED_VERTEX_ATTRS,
            }],
            VertexLayoutKind::PatchControlPoints => vec![wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &CONTROL_POINT_ATTRS,
            }],
            // Stage-in consumes data from the prior stage; no buffers.
            VertexLayoutKind::StageIn => Vec::new(),
        }
    }
}

impl GraphicsDevice for WgpuSurfaceDevice {
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        if let Some(id) = self
            .internal
            .pipeline_cache
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (cache): {e}")))?
            .get(&descriptor.key)
        {
            return Ok(*id);
        }

        let Some(topology) = descriptor.topology.into_wgpu() else {
            return Err(ResourceError::UnsupportedTopology(format!(
                "{:?} has no wgpu equivalent",
                descriptor.topology
            )));
        };

        let (Some(vs_id), Some(fs_id)) = (descriptor.vertex_shader, descriptor.fragment_shader)
        else {
            return Err(ResourceError::MissingShaderModules);
        };
        let modules = self
            .internal
            .shader_modules
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (shaders): {e}")))?;
        let vs_module = modules.get(&vs_id).ok_or(ResourceError::InvalidHandle)?.clone();
        let fs_module = modules.get(&fs_id).ok_or(ResourceError::InvalidHandle)?.clone();
        drop(modules);

        log::debug!(
            "WgpuSurfaceDevice: compiling pipeline {:?} for key {:?}",
            descriptor.label,
            descriptor.key
        );

        let layout = self
            .internal
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: descriptor.label.as_deref(),
                bind_group_layouts: &[
                    Some(&self.internal.uniform_layout),
                    Some(&self.internal.ptex_layout),
                ],
                immediate_size: 0,
            });

        let vertex_buffers = Self::vertex_layouts(descriptor.vertex_layout);
        let depth_stencil = descriptor
            .depth_stencil
            .map(|ds| wgpu::DepthStencilState {
                format: ds.format.into_wgpu(),
                depth_write_enabled: Some(ds.depth_write_enabled),
                depth_compare: Some(ds.depth_compare.into_wgpu()),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            });

        let pipeline = self
            .internal
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: descriptor.label.as_deref(),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &vertex_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.internal.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: descriptor.cull_mode.into_wgpu(),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: descriptor.sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview_mask: None,
                cache: None,
            });

        let id = RenderPipelineId(self.internal.next_pipeline_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .pipelines
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (pipelines): {e}")))?
            .insert(id, Arc::new(pipeline));
        self.internal
            .pipeline_cache
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (cache): {e}")))?
            .insert(descriptor.key, id);
        Ok(id)
    }

    fn write_buffer(
        &self,
        buffer: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let Some(buffer) = self.wgpu_buffer(buffer) else {
            return Err(ResourceError::InvalidHandle);
        };
        self.internal.queue.write_buffer(&buffer, offset, data);
        Ok(())
    }
}
