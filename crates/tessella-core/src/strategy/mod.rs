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

//! The resolved rendering strategy: the concrete, internally-consistent
//! pipeline choice derived from the option surface for one frame.

mod resolve;

pub use resolve::resolve;

use crate::options::{
    ColorMode, DisplacementMode, EndCapMode, NormalMode, TessellationMode,
};

/// Flags for the culling stages a strategy enables.
///
/// Multiple stages can be combined using bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CullStages {
    bits: u32,
}

impl CullStages {
    /// No culling stages.
    pub const NONE: Self = Self { bits: 0 };
    /// Back-facing patches are culled before tessellation.
    pub const PATCH_BACKFACE: Self = Self { bits: 1 << 0 };
    /// Patches fully outside clip space are culled before tessellation.
    pub const PATCH_CLIP: Self = Self { bits: 1 << 1 };
    /// Back-facing primitives are culled during rasterization.
    pub const PRIMITIVE_BACKFACE: Self = Self { bits: 1 << 2 };

    /// Creates a set of culling stages from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Combines two sets of stages.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Checks whether every stage in `other` is enabled.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks whether no stage is enabled.
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl std::ops::BitOr for CullStages {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for CullStages {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// The shading code path a strategy activates in the fragment stage.
///
/// This mirrors [`ColorMode`] after resolution has checked the mode's
/// resource requirements, so downstream code never has to re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingPath {
    /// Plain material shading.
    Material,
    /// Per-face texture, nearest-neighbor filtered.
    PtexNearest,
    /// Per-face texture, shader-side bilinear filtering.
    PtexBilinear,
    /// Per-face texture, hardware bilinear filtering.
    PtexHardwareBilinear,
    /// Per-face texture, bi-quadratic filtering.
    PtexBiQuadratic,
    /// Patch-type debug visualization.
    PatchTypeDebug,
    /// Patch-coordinate debug visualization.
    PatchCoordDebug,
    /// Normal debug visualization.
    NormalDebug,
    /// No shading.
    Unshaded,
}

impl ShadingPath {
    /// Whether this path samples the per-face color texture.
    pub const fn samples_color_texture(&self) -> bool {
        matches!(
            self,
            ShadingPath::PtexNearest
                | ShadingPath::PtexBilinear
                | ShadingPath::PtexHardwareBilinear
                | ShadingPath::PtexBiQuadratic
        )
    }
}

impl From<ColorMode> for ShadingPath {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Material => ShadingPath::Material,
            ColorMode::TextureNearest => ShadingPath::PtexNearest,
            ColorMode::TextureBilinear => ShadingPath::PtexBilinear,
            ColorMode::TextureHardwareBilinear => ShadingPath::PtexHardwareBilinear,
            ColorMode::TextureBiQuadratic => ShadingPath::PtexBiQuadratic,
            ColorMode::PatchType => ShadingPath::PatchTypeDebug,
            ColorMode::PatchCoord => ShadingPath::PatchCoordDebug,
            ColorMode::Normal => ShadingPath::NormalDebug,
            ColorMode::None => ShadingPath::Unshaded,
        }
    }
}

/// The vertex input layout a pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayoutKind {
    /// Raw patch control points fed to the tessellation stages.
    PatchControlPoints,
    /// Interleaved position/normal vertices produced by host refinement.
    RefinedPositionNormal,
    /// Tessellated vertex data consumed directly from the prior stage.
    StageIn,
}

/// An overlay draw layered on top of the filled surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// The tessellated wireframe.
    Wireframe,
    /// The control cage edges.
    ControlEdges,
    /// The Bezier patch edges.
    BezierEdges,
}

/// A substitution the resolver made to keep an interactive session
/// usable instead of failing the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Downgrade {
    /// The normal mode was incompatible with hardware displacement and
    /// was replaced.
    NormalMode {
        /// The requested mode.
        from: NormalMode,
        /// The mode actually used.
        to: NormalMode,
    },
    /// The tessellation level exceeded the device maximum and was clamped.
    TessellationLevelClamped {
        /// The requested level.
        requested: f32,
        /// The device maximum it was clamped to.
        max: f32,
    },
    /// The refinement level exceeded the device maximum and was clamped.
    RefinementLevelClamped {
        /// The requested level.
        requested: u32,
        /// The device maximum it was clamped to.
        max: u32,
    },
}

/// The deterministic cache key selecting one pipeline state object.
///
/// Two equal keys always denote the same pipeline; backends are free to
/// cache compiled objects by this value. Frame-varying quantities (the
/// tessellation factor, camera transforms, texture bias) are uniforms and
/// deliberately not part of the key. Overlay passes derive their own key
/// via [`PipelineKey::for_overlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Where tessellation runs.
    pub tessellation: TessellationMode,
    /// The displacement variant compiled into the shaders.
    pub displacement: DisplacementMode,
    /// The normal variant compiled into the shaders (post-downgrade).
    pub normal: NormalMode,
    /// The fragment shading path.
    pub shading: ShadingPath,
    /// The end-cap construction for extraordinary regions.
    pub end_cap: EndCapMode,
    /// Whether the single-crease patch variant is compiled in. Only ever
    /// set under device tessellation.
    pub single_crease: bool,
    /// Whether tessellation factors adapt to screen-space patch size.
    /// Only ever set under device tessellation.
    pub screenspace_tessellation: bool,
    /// Whether the vertex stage consumes stage-in data. Only ever set
    /// under device tessellation.
    pub stage_in: bool,
    /// Whether patches are drawn through a patch index buffer. Only ever
    /// set under device tessellation.
    pub patch_index_buffer: bool,
    /// Whether seamless mipmap blending is compiled into the texturing
    /// path. Only ever set when the shading path samples a texture.
    pub seamless_mipmap: bool,
    /// Whether the minimal no-extraordinary-patch fast path is active.
    pub fast_path: bool,
    /// The culling stages compiled into the pipeline.
    pub cull_stages: CullStages,
    /// The overlay this key selects, or `None` for the surface fill.
    pub overlay: Option<OverlayKind>,
}

impl PipelineKey {
    /// Derives the key for an overlay pass layered over this fill key.
    ///
    /// Overlays rasterize lines and never displace or texture, so the
    /// derived key collapses those dimensions; distinct fill keys that
    /// only differ in shading share overlay pipelines.
    pub fn for_overlay(&self, overlay: OverlayKind) -> Self {
        Self {
            displacement: DisplacementMode::None,
            shading: ShadingPath::Unshaded,
            seamless_mipmap: false,
            overlay: Some(overlay),
            ..*self
        }
    }
}

/// The concrete rendering strategy for one frame.
///
/// Produced by [`resolve`](crate::strategy::resolve) and consumed within a
/// single frame; the renderer may reuse the previous value as long as the
/// options and capability set it was resolved from are unchanged. Never
/// partially applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStrategy {
    /// The pipeline cache key for the surface fill.
    pub pipeline_key: PipelineKey,
    /// The vertex input layout the fill pipeline consumes.
    pub vertex_layout: VertexLayoutKind,
    /// The culling stages that run this frame.
    pub cull_stages: CullStages,
    /// The active fragment shading path.
    pub shading: ShadingPath,
    /// The refinement level actually used (clamped to device maxima).
    pub refinement_level: u32,
    /// The tessellation factor actually used (clamped to device maxima).
    pub tessellation_level: f32,
    /// The substitutions resolution made, in the order they were applied.
    /// Empty when the requested configuration was honored exactly.
    pub downgrades: Vec<Downgrade>,
}

impl ResolvedStrategy {
    /// Whether any requested setting was substituted during resolution.
    pub fn was_downgraded(&self) -> bool {
        !self.downgrades.is_empty()
    }
}
