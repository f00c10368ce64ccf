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

//! The wgpu command encoder and render pass behind the core recording
//! traits.

use super::conversions::IntoWgpu;
use super::device::WgpuSurfaceDevice;
use std::any::Any;
use std::ops::Range;
use tessella_core::command::{
    CommandBufferId, CommandEncoder, RenderPass, SurfacePassDescriptor, TextureSlot,
};
use tessella_core::handle::{BufferId, TextureId};
use tessella_core::pipeline::{IndexFormat, RenderPipelineId};
use tessella_core::uniforms::SurfaceUniforms;

const PTEX_SLOT_COUNT: usize = 4;

const fn slot_index(slot: TextureSlot) -> usize {
    match slot {
        TextureSlot::Color => 0,
        TextureSlot::Displacement => 1,
        TextureSlot::Occlusion => 2,
        TextureSlot::Specular => 3,
    }
}

/// One frame's recording pass over a `wgpu::RenderPass`.
///
/// Texture binds accumulate and are flushed into one bind group at the
/// next draw, so partially-bound slots fall back to the device's dummy
/// texture instead of tripping wgpu validation.
pub struct WgpuFramePass<'a> {
    pass: wgpu::RenderPass<'a>,
    device: WgpuSurfaceDevice,
    bound_textures: [Option<TextureId>; PTEX_SLOT_COUNT],
    textures_dirty: bool,
}

impl WgpuFramePass<'_> {
    fn flush_textures(&mut self) {
        if !self.textures_dirty {
            return;
        }
        let views: Vec<_> = self
            .bound_textures
            .iter()
            .map(|id| {
                id.and_then(|id| self.device.wgpu_sampled_view(id))
                    .unwrap_or_else(|| self.device.dummy_view())
            })
            .collect();
        let entries: Vec<wgpu::BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .chain(std::iter::once(wgpu::BindGroupEntry {
                binding: PTEX_SLOT_COUNT as u32,
                resource: wgpu::BindingResource::Sampler(self.device.ptex_sampler()),
            }))
            .collect();
        let bind_group = self
            .device
            .wgpu_device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tessella.ptex-bind-group"),
                layout: self.device.ptex_layout(),
                entries: &entries,
            });
        self.pass.set_bind_group(1, &bind_group, &[]);
        self.textures_dirty = false;
    }
}

impl<'pass> RenderPass<'pass> for WgpuFramePass<'pass> {
    fn set_pipeline(&mut self, pipeline_id: RenderPipelineId) {
        if let Some(pipeline) = self.device.wgpu_pipeline(pipeline_id) {
            self.pass.set_pipeline(&pipeline);
        } else {
            log::warn!("WgpuFramePass: RenderPipelineId {pipeline_id:?} not found.");
        }
    }

    fn set_uniforms(&mut self, uniforms: &SurfaceUniforms) {
        self.device
            .wgpu_queue()
            .write_buffer(self.device.uniform_buffer(), 0, bytemuck::bytes_of(uniforms));
        self.pass
            .set_bind_group(0, self.device.uniform_bind_group(), &[]);
    }

    fn bind_texture(&mut self, slot: TextureSlot, texture: TextureId) {
        self.bound_textures[slot_index(slot)] = Some(texture);
        self.textures_dirty = true;
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer_id: BufferId, offset: u64) {
        if let Some(buffer) = self.device.wgpu_buffer(buffer_id) {
            self.pass.set_vertex_buffer(slot, buffer.slice(offset..));
        } else {
            log::warn!("WgpuFramePass: Vertex BufferId {buffer_id:?} not found.");
        }
    }

    fn set_index_buffer(&mut self, buffer_id: BufferId, offset: u64, index_format: IndexFormat) {
        if let Some(buffer) = self.device.wgpu_buffer(buffer_id) {
            self.pass
                .set_index_buffer(buffer.slice(offset..), index_format.into_wgpu());
        } else {
            log::warn!("WgpuFramePass: Index BufferId {buffer_id:?} not found.");
        }
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.flush_textures();
        self.pass.draw(vertices, instances);
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.flush_textures();
        self.pass.draw_indexed(indices, base_vertex, instances);
    }

    fn draw_patches(&mut self, patch_count: u32, control_points: u32) {
        // Unreachable in practice: this backend reports no tessellation
        // stage, so resolution never selects a patch pipeline.
        log::error!(
            "WgpuFramePass: patch draw ({patch_count} x {control_points}) requested on a \
             backend without a tessellation stage"
        );
    }
}

/// Records one frame's commands into a `wgpu::CommandEncoder`.
pub struct WgpuCommandEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    device: WgpuSurfaceDevice,
}

impl WgpuCommandEncoder {
    /// Creates an encoder on the given device.
    pub fn new(device: &WgpuSurfaceDevice, label: Option<&str>) -> Self {
        let encoder = device
            .wgpu_device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label });
        Self {
            encoder: Some(encoder),
            device: device.clone(),
        }
    }
}

impl CommandEncoder for WgpuCommandEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &SurfacePassDescriptor,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder> {
        let color_view = self
            .device
            .wgpu_view(descriptor.color.view)
            .unwrap_or_else(|| {
                log::error!(
                    "WgpuCommandEncoder: color view {:?} not registered; using dummy",
                    descriptor.color.view
                );
                self.device.dummy_view()
            });
        let resolve_view = descriptor
            .color
            .resolve_target
            .and_then(|id| self.device.wgpu_view(id));

        let depth_view = descriptor
            .depth_stencil
            .as_ref()
            .and_then(|ds| self.device.wgpu_view(ds.view));
        let depth_stencil_attachment = match (&descriptor.depth_stencil, &depth_view) {
            (Some(ds), Some(view)) => Some(wgpu::RenderPassDepthStencilAttachment {
                view: view.as_ref(),
                depth_ops: Some(wgpu::Operations {
                    load: ds.depth_ops.load.into_wgpu(),
                    store: ds.depth_ops.store.into_wgpu(),
                }),
                stencil_ops: None,
            }),
            _ => None,
        };

        let color_attachments = [Some(wgpu::RenderPassColorAttachment {
            view: &color_view,
            resolve_target: resolve_view.as_deref(),
            ops: wgpu::Operations {
                load: descriptor.color.ops.load.into_wgpu(),
                store: descriptor.color.ops.store.into_wgpu(),
            },
            depth_slice: None,
        })];

        let pass = self
            .encoder
            .as_mut()
            .expect("encoder already finished")
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: descriptor.label.as_deref(),
                color_attachments: &color_attachments,
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

        Box::new(WgpuFramePass {
            pass,
            device: self.device.clone(),
            bound_textures: [None; PTEX_SLOT_COUNT],
            textures_dirty: false,
        })
    }

    fn finish(mut self: Box<Self>) -> CommandBufferId {
        let encoder = self.encoder.take().expect("encoder already finished");
        self.device.store_command_buffer(encoder.finish())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
