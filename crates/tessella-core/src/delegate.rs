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

//! The seams between the renderer and the host application.
//!
//! The host owns the window, the GPU device, shader compilation, and the
//! swapchain; the renderer consumes them through [`RenderDelegate`]. One
//! concrete adapter exists per graphics backend (`tessella-infra`
//! provides the wgpu one).

use crate::capability::CapabilitySet;
use crate::command::{CommandQueue, SurfacePassDescriptor};
use crate::error::{FrameError, ResourceError};
use crate::handle::BufferId;
use crate::pipeline::{
    DepthStencilStateDescriptor, RenderPipelineDescriptor, RenderPipelineId,
};
use std::fmt::Debug;
use std::sync::Arc;

/// The slice of a graphics device the renderer needs.
///
/// Shader-module registration, buffer/texture creation, and everything
/// else stays on the host side; the renderer only asks for pipeline
/// objects and writes uniform data.
pub trait GraphicsDevice: Send + Sync + Debug {
    /// Produces the pipeline state object for a descriptor.
    ///
    /// Implementations are expected to cache by `descriptor.key` and
    /// return the same [`RenderPipelineId`] for an identical key — the
    /// resolver guarantees equal keys mean an identical pipeline.
    ///
    /// # Errors
    ///
    /// [`ResourceError`] when the backend cannot express the descriptor
    /// (missing shader modules, unsupported topology) or compilation
    /// fails.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError>;

    /// Writes data into a GPU buffer at the given offset.
    ///
    /// # Errors
    ///
    /// [`ResourceError`] when the handle is stale or the write is out of
    /// bounds.
    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8])
        -> Result<(), ResourceError>;
}

/// The capability provider the host implements.
///
/// Mirrors the delegate protocol of the original viewers: the host
/// supplies the device, the queue, and the frame's pass description, and
/// gets two customization hooks before descriptors are finalized. The
/// renderer queries capabilities once per relevant event (construction,
/// device change), not per frame.
pub trait RenderDelegate: Send + Sync {
    /// The graphics device resources are created on.
    fn device(&self) -> Arc<dyn GraphicsDevice>;

    /// The queue finished command buffers are submitted to (by the host).
    fn command_queue(&self) -> Arc<dyn CommandQueue>;

    /// A snapshot of device features and limits for the resolver.
    fn capabilities(&self) -> CapabilitySet;

    /// The render-pass description for the current frame.
    ///
    /// # Errors
    ///
    /// [`FrameError::PassUnavailable`] when the target surface cannot be
    /// acquired this frame; the renderer abandons the frame cleanly and
    /// the host retries on the next one.
    fn render_pass_descriptor(&self) -> Result<SurfacePassDescriptor, FrameError>;

    /// Hook to adjust the depth-stencil state before it is finalized.
    fn customize_depth_stencil(&self, descriptor: &mut DepthStencilStateDescriptor);

    /// Hook to adjust the pipeline descriptor before it is finalized.
    /// This is where the host injects its compiled shader modules.
    fn customize_pipeline(&self, descriptor: &mut RenderPipelineDescriptor);
}
