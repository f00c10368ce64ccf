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

//! Command recording traits and render-pass descriptors.
//!
//! The renderer records one frame's draw sequence through these traits
//! without knowing the backend. The host creates the encoder, hands it to
//! `draw_frame`, and submits the finished buffer itself — the renderer
//! never submits, so a failed frame can be dropped without touching the
//! queue.

use crate::color::LinearRgba;
use crate::handle::{BufferId, TextureId, TextureViewId};
use crate::pipeline::{IndexFormat, RenderPipelineId};
use crate::uniforms::SurfaceUniforms;
use std::any::Any;
use std::ops::Range;

/// An opaque handle to a finished, submittable command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBufferId(pub u64);

/// Describes the operation to perform on an attachment at the start of a
/// render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp<V> {
    /// The existing contents of the attachment are loaded into the pass.
    Load,
    /// The attachment is cleared to the given value before the pass.
    Clear(V),
}

/// Describes the operation to perform on an attachment at the end of a
/// render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Results are stored to the attachment's memory.
    Store,
    /// Results are discarded, leaving the attachment undefined.
    Discard,
}

/// The load and store operations for a single attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operations<V> {
    /// The operation at the beginning of the pass.
    pub load: LoadOp<V>,
    /// The operation at the end of the pass.
    pub store: StoreOp,
}

/// A color attachment for the frame's render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachmentDesc {
    /// The texture view rendered to.
    pub view: TextureViewId,
    /// The resolve target when `view` is multisampled.
    pub resolve_target: Option<TextureViewId>,
    /// Load/store operations for this attachment.
    pub ops: Operations<LinearRgba>,
}

/// A depth attachment for the frame's render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAttachmentDesc {
    /// The depth texture view.
    pub view: TextureViewId,
    /// Load/store operations for the depth aspect.
    pub depth_ops: Operations<f32>,
}

/// The render-pass description the delegate supplies each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePassDescriptor {
    /// An optional debug label for the pass.
    pub label: Option<String>,
    /// The single color attachment the viewers render to.
    pub color: ColorAttachmentDesc,
    /// The depth attachment, if the host configured one.
    pub depth_stencil: Option<DepthAttachmentDesc>,
}

/// A texture binding point in the surface shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// The per-face color texture.
    Color,
    /// The per-face displacement texture.
    Displacement,
    /// The per-face ambient-occlusion texture.
    Occlusion,
    /// The per-face specular texture.
    Specular,
}

/// An active render pass, used for recording drawing commands.
///
/// Obtained from a [`CommandEncoder`]; the `'pass` lifetime ties it to
/// its encoder so only one pass records at a time. Dropping the pass ends
/// it.
pub trait RenderPass<'pass> {
    /// Sets the active render pipeline for subsequent draw calls.
    fn set_pipeline(&mut self, pipeline: RenderPipelineId);

    /// Binds the per-frame surface uniforms (camera transforms and
    /// tuning values).
    fn set_uniforms(&mut self, uniforms: &SurfaceUniforms);

    /// Binds a texture to one of the surface shader slots.
    fn bind_texture(&mut self, slot: TextureSlot, texture: TextureId);

    /// Binds a vertex buffer to a specific slot.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId, offset: u64);

    /// Binds an index buffer for indexed drawing.
    fn set_index_buffer(&mut self, buffer: BufferId, offset: u64, index_format: IndexFormat);

    /// Records a non-indexed draw call.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Records an indexed draw call.
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);

    /// Records a tessellation-stage patch draw, letting the device
    /// generate geometry for `patch_count` patches of
    /// `control_points` control points each.
    fn draw_patches(&mut self, patch_count: u32, control_points: u32);
}

/// Records a sequence of GPU commands into a backend command buffer.
///
/// One frame maps to one encoder. The host finishes and submits; the
/// renderer only records.
pub trait CommandEncoder {
    /// Begins a render pass, returning the recording object.
    ///
    /// The returned pass borrows the encoder mutably, so only one pass
    /// can be active at a time.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &SurfacePassDescriptor,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder>;

    /// Finalizes recording and returns the submittable buffer handle.
    ///
    /// Consumes the encoder; called by the host after `draw_frame`
    /// returns successfully.
    fn finish(self: Box<Self>) -> CommandBufferId;

    /// Returns the underlying object as `Any` for backend-specific
    /// access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The device queue finished command buffers are submitted to.
///
/// Submission is fire-and-forget: nothing in the renderer blocks on GPU
/// completion. Frame pacing is the host's responsibility.
pub trait CommandQueue: Send + Sync {
    /// Submits a finished command buffer for execution.
    fn submit(&self, buffer: CommandBufferId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_descriptor_compares_by_value() {
        let descriptor = SurfacePassDescriptor {
            label: Some("frame".to_string()),
            color: ColorAttachmentDesc {
                view: TextureViewId(1),
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(LinearRgba::CHARCOAL),
                    store: StoreOp::Store,
                },
            },
            depth_stencil: Some(DepthAttachmentDesc {
                view: TextureViewId(2),
                depth_ops: Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Discard,
                },
            }),
        };
        assert_eq!(descriptor, descriptor.clone());
    }
}
