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

//! The renderer's full option surface.
//!
//! [`RenderOptions`] is a plain value the host replaces wholesale; the
//! renderer detects staleness by comparing the new value against the one
//! the last strategy was resolved from. Assigning options never fails —
//! all validation (device limits, mode/resource pairings) happens at
//! resolution time, so an interactive UI can flip toggles freely and only
//! the frame reports problems.

/// Where patch tessellation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TessellationMode {
    /// Patches are refined on the host CPU and drawn as plain triangles.
    #[default]
    Host,
    /// Patches are expanded by the device's tessellation stage.
    Device,
}

/// How surface displacement is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplacementMode {
    /// Bilinear displacement sampled by dedicated hardware filtering.
    HardwareBilinear,
    /// Bilinear displacement sampled in shader code.
    Bilinear,
    /// Bi-quadratic displacement reconstruction.
    BiQuadratic,
    /// No displacement.
    #[default]
    None,
}

impl DisplacementMode {
    /// Whether this mode samples the displacement texture.
    pub const fn requires_texture(&self) -> bool {
        !matches!(self, DisplacementMode::None)
    }
}

/// How shading normals are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NormalMode {
    /// Screen-space derivatives computed by dedicated hardware.
    HardwareScreenspace,
    /// Screen-space derivatives computed in shader code.
    #[default]
    Screenspace,
    /// Bi-quadratic normal reconstruction.
    BiQuadratic,
    /// Bi-quadratic reconstruction with analytic gradients.
    BiQuadraticWithGradient,
    /// Normals evaluated from the limit surface.
    Surface,
}

impl NormalMode {
    /// Whether this mode can pair with [`DisplacementMode::HardwareBilinear`].
    ///
    /// Hardware displacement filtering only feeds the screen-space and
    /// bi-quadratic reconstruction paths; limit-surface normals would read
    /// the un-displaced surface and shade incorrectly.
    pub const fn compatible_with_hardware_displacement(&self) -> bool {
        matches!(
            self,
            NormalMode::HardwareScreenspace
                | NormalMode::Screenspace
                | NormalMode::BiQuadratic
                | NormalMode::BiQuadraticWithGradient
        )
    }
}

/// How fragments are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// A plain material shading without any texture.
    #[default]
    Material,
    /// Per-face texture, nearest-neighbor filtered.
    TextureNearest,
    /// Per-face texture, bilinear filtered in shader code.
    TextureBilinear,
    /// Per-face texture, bilinear filtered by dedicated hardware.
    TextureHardwareBilinear,
    /// Per-face texture, bi-quadratic filtered.
    TextureBiQuadratic,
    /// Debug visualization of the patch type.
    PatchType,
    /// Debug visualization of the patch parametric coordinate.
    PatchCoord,
    /// Debug visualization of the shading normal.
    Normal,
    /// No shading at all.
    None,
}

impl ColorMode {
    /// Whether this mode samples the per-face color texture.
    pub const fn requires_texture(&self) -> bool {
        matches!(
            self,
            ColorMode::TextureNearest
                | ColorMode::TextureBilinear
                | ColorMode::TextureHardwareBilinear
                | ColorMode::TextureBiQuadratic
        )
    }
}

/// How extraordinary (irregular) regions of the surface are closed into
/// renderable patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndCapMode {
    /// No end-cap handling; irregular regions stay at their refined level.
    None,
    /// B-spline basis end caps.
    #[default]
    BSplineBasis,
    /// The legacy Gregory patch construction.
    LegacyGregory,
    /// Gregory basis end caps.
    GregoryBasis,
}

/// The full set of tunables affecting pipeline selection and the frame's
/// draw sequence.
///
/// Replaced wholesale on each change; `PartialEq` is what the renderer
/// uses to decide whether the cached strategy is still valid.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Where patch tessellation runs.
    pub tessellation_mode: TessellationMode,
    /// How surface displacement is sampled.
    pub displacement_mode: DisplacementMode,
    /// How shading normals are derived.
    pub normal_mode: NormalMode,
    /// How fragments are colored.
    pub color_mode: ColorMode,
    /// How extraordinary regions are closed into patches.
    pub end_cap_mode: EndCapMode,

    /// Adapt tessellation factors to the projected screen-space patch size.
    /// Only meaningful under device tessellation.
    pub screenspace_tessellation: bool,
    /// Draw patches through a patch index buffer. Only meaningful under
    /// device tessellation.
    pub patch_index_buffer: bool,
    /// Cull back-facing patches before tessellation.
    pub patch_backface_culling: bool,
    /// Cull patches fully outside clip space before tessellation.
    pub patch_clip_culling: bool,
    /// Use the optimized single-crease patch representation for surfaces
    /// with one sharp feature line.
    pub single_crease: bool,
    /// Consume tessellated vertex data directly from the prior stage.
    /// Only meaningful under device tessellation.
    pub stage_in: bool,
    /// Cull back-facing primitives during rasterization.
    pub primitive_backface_culling: bool,
    /// Blend across per-face texture mip levels to hide face seams.
    pub seamless_mipmap: bool,

    /// Overlay the tessellated wireframe on top of the filled surface.
    pub wireframe: bool,
    /// Overlay the control cage edges.
    pub control_edges: bool,
    /// Overlay the Bezier patch edges.
    pub bezier_edges: bool,

    /// Uniform subdivision depth applied before patch generation.
    pub refinement_level: u32,
    /// Target tessellation factor for the device stage (or the host
    /// refinement density). Must stay positive; clamped against the
    /// device maximum at resolution time.
    pub tessellation_level: f32,
    /// Bias added to mipmap level selection when sampling per-face
    /// textures.
    pub mipmap_bias: f32,
    /// Scale applied to sampled displacement values.
    pub displacement_scale: f32,

    /// Path of the per-face color texture. Empty means "not provided";
    /// opaque to the renderer, handed to external loaders.
    pub color_texture: String,
    /// Path of the per-face displacement texture.
    pub displacement_texture: String,
    /// Path of the per-face ambient-occlusion texture (optional extra).
    pub occlusion_texture: String,
    /// Path of the per-face specular texture (optional extra).
    pub specular_texture: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tessellation_mode: TessellationMode::Host,
            displacement_mode: DisplacementMode::None,
            normal_mode: NormalMode::Screenspace,
            color_mode: ColorMode::Material,
            end_cap_mode: EndCapMode::BSplineBasis,
            screenspace_tessellation: false,
            patch_index_buffer: false,
            patch_backface_culling: false,
            patch_clip_culling: false,
            single_crease: false,
            stage_in: false,
            primitive_backface_culling: false,
            seamless_mipmap: false,
            wireframe: false,
            control_edges: false,
            bezier_edges: false,
            refinement_level: 2,
            tessellation_level: 4.0,
            mipmap_bias: 0.0,
            displacement_scale: 1.0,
            color_texture: String::new(),
            displacement_texture: String::new(),
            occlusion_texture: String::new(),
            specular_texture: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_requirements_follow_the_mode() {
        assert!(ColorMode::TextureNearest.requires_texture());
        assert!(ColorMode::TextureBiQuadratic.requires_texture());
        assert!(!ColorMode::Material.requires_texture());
        assert!(!ColorMode::PatchType.requires_texture());
        assert!(!ColorMode::None.requires_texture());

        assert!(DisplacementMode::HardwareBilinear.requires_texture());
        assert!(DisplacementMode::BiQuadratic.requires_texture());
        assert!(!DisplacementMode::None.requires_texture());
    }

    #[test]
    fn surface_normals_reject_hardware_displacement() {
        assert!(!NormalMode::Surface.compatible_with_hardware_displacement());
        assert!(NormalMode::Screenspace.compatible_with_hardware_displacement());
        assert!(NormalMode::HardwareScreenspace.compatible_with_hardware_displacement());
        assert!(NormalMode::BiQuadratic.compatible_with_hardware_displacement());
        assert!(NormalMode::BiQuadraticWithGradient.compatible_with_hardware_displacement());
    }

    #[test]
    fn defaults_are_a_valid_interactive_baseline() {
        let options = RenderOptions::default();
        assert_eq!(options.tessellation_mode, TessellationMode::Host);
        assert!(options.tessellation_level > 0.0);
        assert!(options.color_texture.is_empty());
    }

    #[test]
    fn wholesale_replacement_compares_equal_for_identical_values() {
        let a = RenderOptions::default();
        let b = a.clone();
        assert_eq!(a, b);
        let mut c = a.clone();
        c.wireframe = true;
        assert_ne!(a, c);
    }
}
