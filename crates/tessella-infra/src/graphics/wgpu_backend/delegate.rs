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

//! The windowed render delegate: the concrete capability provider a
//! viewer application hands to the renderer.

use super::device::WgpuSurfaceDevice;
use super::queue::WgpuSubmissionQueue;
use anyhow::{anyhow, Context, Result};
use std::sync::{Arc, Mutex};
use tessella_core::capability::CapabilitySet;
use tessella_core::color::LinearRgba;
use tessella_core::command::{
    ColorAttachmentDesc, CommandQueue, DepthAttachmentDesc, LoadOp, Operations, StoreOp,
    SurfacePassDescriptor,
};
use tessella_core::delegate::{GraphicsDevice, RenderDelegate};
use tessella_core::error::FrameError;
use tessella_core::handle::{ShaderModuleId, TextureViewId};
use tessella_core::pipeline::{
    DepthFormat, DepthStencilStateDescriptor, RenderPipelineDescriptor,
};

/// The deepest subdivision tables the viewer builds for its models.
const MAX_REFINEMENT_LEVEL: u32 = 6;

/// A nominal maximum tessellation factor. There is no device stage on
/// this backend, but the host refinement density is still bounded by it.
const MAX_TESSELLATION_LEVEL: f32 = 64.0;

struct FrameState {
    surface_texture: wgpu::SurfaceTexture,
    view: TextureViewId,
}

/// Implements [`RenderDelegate`] over a winit window and a wgpu surface.
///
/// Owns the swapchain configuration and the depth buffer; produces one
/// pass descriptor per frame and presents the acquired frame after the
/// host submits.
pub struct WindowedDelegate {
    // The surface borrows the instance internally; keep it alive.
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    device: WgpuSurfaceDevice,
    queue: Arc<WgpuSubmissionQueue>,
    config: Mutex<wgpu::SurfaceConfiguration>,
    depth_view: Mutex<TextureViewId>,
    current_frame: Mutex<Option<FrameState>>,
    surface_shaders: Mutex<Option<(ShaderModuleId, ShaderModuleId)>>,
}

impl WindowedDelegate {
    /// Initializes wgpu against the given window and configures the
    /// surface at its current size.
    pub fn new(window: Arc<winit::window::Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance =
            wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| anyhow!("Failed to find a suitable adapter: {e}"))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Tessella Logical Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .map_err(|e| anyhow!("Failed to create logical device: {e}"))?;

        device.on_uncaptured_error(Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo), // Fifo is guaranteed to be supported
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let surface_device = WgpuSurfaceDevice::new(device, queue, surface_format);
        let depth_view = Self::create_depth_view(&surface_device, config.width, config.height);
        let submission_queue = Arc::new(WgpuSubmissionQueue::new(&surface_device));

        Ok(Self {
            _instance: instance,
            surface,
            device: surface_device,
            queue: submission_queue,
            config: Mutex::new(config),
            depth_view: Mutex::new(depth_view),
            current_frame: Mutex::new(None),
            surface_shaders: Mutex::new(None),
        })
    }

    fn create_depth_view(device: &WgpuSurfaceDevice, width: u32, height: u32) -> TextureViewId {
        let texture = device.wgpu_device().create_texture(&wgpu::TextureDescriptor {
            label: Some("tessella.depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        device.register_texture_view(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    /// The underlying device, for model upload and shader registration.
    pub fn surface_device(&self) -> &WgpuSurfaceDevice {
        &self.device
    }

    /// Sets the shader modules injected into every surface pipeline.
    pub fn set_surface_shaders(&self, vertex: ShaderModuleId, fragment: ShaderModuleId) {
        *self.surface_shaders.lock().unwrap() = Some((vertex, fragment));
    }

    /// Reconfigures the swapchain and depth buffer after a resize.
    pub fn resize(&self, width: u32, height: u32) {
        let mut config = self.config.lock().unwrap();
        config.width = width.max(1);
        config.height = height.max(1);
        self.surface.configure(self.device.wgpu_device(), &config);

        let mut depth = self.depth_view.lock().unwrap();
        self.device.unregister_texture_view(*depth);
        *depth = Self::create_depth_view(&self.device, config.width, config.height);
        log::debug!("Surface reconfigured to {}x{}", config.width, config.height);
    }

    /// Presents the frame acquired for the current pass descriptor, if
    /// any. Call after submitting the frame's command buffer.
    pub fn present(&self) {
        if let Some(frame) = self.current_frame.lock().unwrap().take() {
            self.device.unregister_texture_view(frame.view);
            frame.surface_texture.present();
        }
    }
}

impl RenderDelegate for WindowedDelegate {
    fn device(&self) -> Arc<dyn GraphicsDevice> {
        Arc::new(self.device.clone())
    }

    fn command_queue(&self) -> Arc<dyn CommandQueue> {
        self.queue.clone()
    }

    fn capabilities(&self) -> CapabilitySet {
        // wgpu exposes no tessellation stage on any backend, so the
        // honest report is the host-only feature set with this viewer's
        // refinement bounds.
        CapabilitySet {
            tessellation_stage: false,
            stage_in: false,
            indexed_patch_draw: false,
            max_tessellation_level: MAX_TESSELLATION_LEVEL,
            max_refinement_level: MAX_REFINEMENT_LEVEL,
        }
    }

    fn render_pass_descriptor(&self) -> Result<SurfacePassDescriptor, FrameError> {
        let mut current = self.current_frame.lock().unwrap();
        if current.is_none() {
            let surface_texture = match self.surface.get_current_texture() {
                wgpu::CurrentSurfaceTexture::Success(texture)
                | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
                other => {
                    return Err(FrameError::PassUnavailable(format!("{other:?}")))
                }
            };
            let view = self.device.register_texture_view(
                surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default()),
            );
            *current = Some(FrameState {
                surface_texture,
                view,
            });
        }
        let frame = current.as_ref().ok_or_else(|| {
            FrameError::PassUnavailable("frame state lost during acquisition".to_string())
        })?;

        Ok(SurfacePassDescriptor {
            label: Some("tessella.surface-pass".to_string()),
            color: ColorAttachmentDesc {
                view: frame.view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(LinearRgba::CHARCOAL),
                    store: StoreOp::Store,
                },
            },
            depth_stencil: Some(DepthAttachmentDesc {
                view: *self.depth_view.lock().unwrap(),
                depth_ops: Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Discard,
                },
            }),
        })
    }

    fn customize_depth_stencil(&self, descriptor: &mut DepthStencilStateDescriptor) {
        // The delegate owns the depth buffer, so it pins the format the
        // pipelines must match.
        descriptor.format = DepthFormat::Depth32Float;
    }

    fn customize_pipeline(&self, descriptor: &mut RenderPipelineDescriptor) {
        if let Some((vertex, fragment)) = *self.surface_shaders.lock().unwrap() {
            descriptor.vertex_shader = Some(vertex);
            descriptor.fragment_shader = Some(fragment);
        } else {
            log::warn!("No surface shaders registered; pipeline creation will fail");
        }
    }
}
