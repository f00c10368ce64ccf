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

//! Backend-agnostic pipeline and depth-stencil descriptors.
//!
//! The renderer builds these from a [`ResolvedStrategy`], passes them
//! through the delegate's customization hooks, and hands them to the
//! device. The descriptor deliberately carries its [`PipelineKey`] so
//! backends can cache compiled objects and return the same
//! [`RenderPipelineId`] for an identical key.

use crate::handle::ShaderModuleId;
use crate::strategy::{CullStages, OverlayKind, ResolvedStrategy, VertexLayoutKind};
pub use crate::strategy::PipelineKey;

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

/// The primitive topology a pipeline rasterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// A list of independent triangles.
    TriangleList,
    /// A list of independent line segments.
    LineList,
    /// A list of tessellation patches with the given number of control
    /// points. Requires a device tessellation stage.
    PatchList {
        /// Control points per patch.
        control_points: u32,
    },
}

/// A comparison function for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Comparison never passes.
    Never,
    /// Passes when the new value is less than the stored value.
    Less,
    /// Passes when the values are equal.
    Equal,
    /// Passes when the new value is less than or equal.
    LessEqual,
    /// Passes when the new value is greater.
    Greater,
    /// Passes when the values differ.
    NotEqual,
    /// Passes when the new value is greater than or equal.
    GreaterEqual,
    /// Comparison always passes.
    Always,
}

/// Which faces the rasterizer culls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No face culling.
    None,
    /// Cull front-facing primitives.
    Front,
    /// Cull back-facing primitives.
    Back,
}

/// The memory format of a depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFormat {
    /// A 32-bit float depth format.
    #[default]
    Depth32Float,
    /// A 24-bit unsigned normalized depth format.
    Depth24Plus,
    /// A 24-bit depth format with an 8-bit stencil component.
    Depth24PlusStencil8,
}

/// The state for depth and stencil testing, finalized through the
/// delegate's customization hook before pipeline creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilStateDescriptor {
    /// The depth attachment format.
    pub format: DepthFormat,
    /// Whether the pass writes depth.
    pub depth_write_enabled: bool,
    /// The depth comparison function.
    pub depth_compare: CompareFunction,
}

impl DepthStencilStateDescriptor {
    /// The baseline state for the surface fill: write depth, standard
    /// less-than test.
    pub const fn surface_fill() -> Self {
        Self {
            format: DepthFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
        }
    }

    /// The baseline state for overlays: test against the fill's depth but
    /// never write, so line work layers over the surface without
    /// occluding later overlays.
    pub const fn overlay() -> Self {
        Self {
            format: DepthFormat::Depth32Float,
            depth_write_enabled: false,
            depth_compare: CompareFunction::LessEqual,
        }
    }
}

impl Default for DepthStencilStateDescriptor {
    fn default() -> Self {
        Self::surface_fill()
    }
}

/// An opaque handle to a compiled render pipeline state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPipelineId(pub usize);

/// A complete descriptor for a render pipeline.
///
/// The renderer fills in everything derived from the strategy; the
/// delegate's customization hook supplies the host-owned pieces (shader
/// modules, sample count adjustments) before the device compiles or
/// fetches the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipelineDescriptor {
    /// An optional debug label.
    pub label: Option<String>,
    /// The cache key this descriptor was derived from.
    pub key: PipelineKey,
    /// The primitive topology.
    pub topology: PrimitiveTopology,
    /// Rasterizer face culling.
    pub cull_mode: CullMode,
    /// Depth/stencil state. `None` disables the tests.
    pub depth_stencil: Option<DepthStencilStateDescriptor>,
    /// The vertex input layout the pipeline consumes.
    pub vertex_layout: VertexLayoutKind,
    /// Samples per pixel.
    pub sample_count: u32,
    /// The compiled vertex shader module, supplied by the host hook.
    pub vertex_shader: Option<ShaderModuleId>,
    /// The compiled fragment shader module, supplied by the host hook.
    pub fragment_shader: Option<ShaderModuleId>,
}

/// Control points per patch for the regular B-spline patch draw.
const REGULAR_PATCH_CONTROL_POINTS: u32 = 16;

impl RenderPipelineDescriptor {
    /// Builds the surface-fill descriptor for a resolved strategy.
    pub fn surface_fill(
        strategy: &ResolvedStrategy,
        depth_stencil: DepthStencilStateDescriptor,
    ) -> Self {
        let topology = match strategy.vertex_layout {
            VertexLayoutKind::PatchControlPoints | VertexLayoutKind::StageIn => {
                PrimitiveTopology::PatchList {
                    control_points: REGULAR_PATCH_CONTROL_POINTS,
                }
            }
            VertexLayoutKind::RefinedPositionNormal => PrimitiveTopology::TriangleList,
        };
        Self {
            label: Some("tessella/surface-fill".to_string()),
            key: strategy.pipeline_key,
            topology,
            cull_mode: cull_mode_for(strategy.cull_stages),
            depth_stencil: Some(depth_stencil),
            vertex_layout: strategy.vertex_layout,
            sample_count: 1,
            vertex_shader: None,
            fragment_shader: None,
        }
    }

    /// Builds the descriptor for an overlay pass layered over the fill.
    pub fn overlay(
        strategy: &ResolvedStrategy,
        overlay: OverlayKind,
        depth_stencil: DepthStencilStateDescriptor,
    ) -> Self {
        Self {
            label: Some(format!("tessella/overlay-{overlay:?}").to_lowercase()),
            key: strategy.pipeline_key.for_overlay(overlay),
            topology: PrimitiveTopology::LineList,
            // Line work is drawn double-sided.
            cull_mode: CullMode::None,
            depth_stencil: Some(depth_stencil),
            vertex_layout: VertexLayoutKind::RefinedPositionNormal,
            sample_count: 1,
            vertex_shader: None,
            fragment_shader: None,
        }
    }
}

fn cull_mode_for(stages: CullStages) -> CullMode {
    if stages.contains(CullStages::PRIMITIVE_BACKFACE) {
        CullMode::Back
    } else {
        CullMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;
    use crate::options::{RenderOptions, TessellationMode};
    use crate::strategy::resolve;

    #[test]
    fn host_strategy_fills_with_triangles() {
        let strategy = resolve(&RenderOptions::default(), &CapabilitySet::host_only()).unwrap();
        let descriptor =
            RenderPipelineDescriptor::surface_fill(&strategy, DepthStencilStateDescriptor::default());
        assert_eq!(descriptor.topology, PrimitiveTopology::TriangleList);
        assert_eq!(descriptor.key, strategy.pipeline_key);
    }

    #[test]
    fn device_strategy_fills_with_patches() {
        let options = RenderOptions {
            tessellation_mode: TessellationMode::Device,
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &CapabilitySet::full()).unwrap();
        let descriptor =
            RenderPipelineDescriptor::surface_fill(&strategy, DepthStencilStateDescriptor::default());
        assert_eq!(
            descriptor.topology,
            PrimitiveTopology::PatchList { control_points: 16 }
        );
    }

    #[test]
    fn primitive_backface_toggle_selects_back_culling() {
        let options = RenderOptions {
            primitive_backface_culling: true,
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &CapabilitySet::host_only()).unwrap();
        let descriptor =
            RenderPipelineDescriptor::surface_fill(&strategy, DepthStencilStateDescriptor::default());
        assert_eq!(descriptor.cull_mode, CullMode::Back);
    }

    #[test]
    fn overlay_descriptor_rasterizes_lines_without_depth_writes() {
        let strategy = resolve(&RenderOptions::default(), &CapabilitySet::host_only()).unwrap();
        let descriptor = RenderPipelineDescriptor::overlay(
            &strategy,
            OverlayKind::Wireframe,
            DepthStencilStateDescriptor::overlay(),
        );
        assert_eq!(descriptor.topology, PrimitiveTopology::LineList);
        let depth = descriptor.depth_stencil.unwrap();
        assert!(!depth.depth_write_enabled);
        assert_eq!(descriptor.key.overlay, Some(OverlayKind::Wireframe));
    }
}
