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

//! Maps the option surface onto a concrete rendering strategy.
//!
//! Resolution is a pure function of `(options, capabilities)`: it never
//! mutates its inputs, takes no locks, and equal inputs always produce an
//! equal [`ResolvedStrategy`] — that determinism is what makes pipeline
//! caching by key safe.
//!
//! The option space is combinatorial and many combinations are mutually
//! exclusive. The rules here fall into three families:
//!
//! * combinations the device cannot express fail with
//!   [`ResolveError::UnsupportedConfiguration`] naming the missing
//!   feature;
//! * combinations with a safe nearby alternative are substituted and a
//!   [`Downgrade`] is recorded, keeping interactive sessions usable;
//! * toggles that are meaningless for the selected tessellation path are
//!   ignored outright so they cannot perturb the pipeline key.

use super::{
    CullStages, Downgrade, PipelineKey, ResolvedStrategy, ShadingPath, VertexLayoutKind,
};
use crate::capability::{CapabilitySet, GpuFeature};
use crate::error::{ResolveError, ResourceKind};
use crate::options::{DisplacementMode, EndCapMode, NormalMode, RenderOptions, TessellationMode};

fn require(present: bool, feature: GpuFeature) -> Result<(), ResolveError> {
    if present {
        Ok(())
    } else {
        Err(ResolveError::UnsupportedConfiguration { feature })
    }
}

/// Resolves `options` against `caps` into the strategy for one frame.
///
/// # Errors
///
/// [`ResolveError::UnsupportedConfiguration`] when a selected method needs
/// a device feature the capability set does not report, and
/// [`ResolveError::MissingResource`] when a texturing mode is active but
/// its file reference is empty. The hardware-displacement/normal pairing
/// never errors; it downgrades (see [`Downgrade::NormalMode`]).
pub fn resolve(
    options: &RenderOptions,
    caps: &CapabilitySet,
) -> Result<ResolvedStrategy, ResolveError> {
    let device_tess = options.tessellation_mode == TessellationMode::Device;

    // Feature gates. Device-only toggles are real requirements under
    // device tessellation and inert under host tessellation.
    if device_tess {
        require(caps.tessellation_stage, GpuFeature::TessellationStage)?;
        if options.stage_in {
            require(caps.stage_in, GpuFeature::StageIn)?;
        }
        if options.patch_index_buffer {
            require(caps.indexed_patch_draw, GpuFeature::IndexedPatchDraw)?;
        }
    }

    // Mode-mandated resources. An empty reference under an active mode is
    // a host programming error, surfaced rather than skipped.
    if options.color_mode.requires_texture() && options.color_texture.is_empty() {
        return Err(ResolveError::MissingResource {
            resource: ResourceKind::ColorTexture,
        });
    }
    if options.displacement_mode.requires_texture() && options.displacement_texture.is_empty() {
        return Err(ResolveError::MissingResource {
            resource: ResourceKind::DisplacementTexture,
        });
    }

    let mut downgrades = Vec::new();

    // Hardware displacement filtering cannot feed limit-surface normals;
    // substitute the nearest supported reconstruction instead of failing.
    let mut normal = options.normal_mode;
    if options.displacement_mode == DisplacementMode::HardwareBilinear
        && !normal.compatible_with_hardware_displacement()
    {
        let to = NormalMode::Screenspace;
        log::warn!(
            "Normal mode {normal:?} is incompatible with hardware bilinear displacement; \
             downgrading to {to:?}"
        );
        downgrades.push(Downgrade::NormalMode { from: normal, to });
        normal = to;
    }

    // Device-reported maxima bound the subdivision factors. Assignment
    // never fails, so the clamp happens here.
    let mut refinement_level = options.refinement_level;
    if refinement_level > caps.max_refinement_level {
        downgrades.push(Downgrade::RefinementLevelClamped {
            requested: refinement_level,
            max: caps.max_refinement_level,
        });
        refinement_level = caps.max_refinement_level;
    }
    let mut tessellation_level = options.tessellation_level;
    if tessellation_level > caps.max_tessellation_level {
        downgrades.push(Downgrade::TessellationLevelClamped {
            requested: tessellation_level,
            max: caps.max_tessellation_level,
        });
        tessellation_level = caps.max_tessellation_level;
    }

    // A "none" end cap at refinement level 0 means no extraordinary-patch
    // handling exists at all: the minimal pipeline.
    let fast_path = options.end_cap_mode == EndCapMode::None && refinement_level == 0;

    let mut cull_stages = CullStages::NONE;
    if options.patch_backface_culling {
        cull_stages |= CullStages::PATCH_BACKFACE;
    }
    if options.patch_clip_culling {
        cull_stages |= CullStages::PATCH_CLIP;
    }
    if options.primitive_backface_culling {
        cull_stages |= CullStages::PRIMITIVE_BACKFACE;
    }

    let shading = ShadingPath::from(options.color_mode);

    let pipeline_key = PipelineKey {
        tessellation: options.tessellation_mode,
        displacement: options.displacement_mode,
        normal,
        shading,
        end_cap: options.end_cap_mode,
        // Single-crease is a device-path patch variant; the host path
        // pre-resolves creases during refinement, so the toggle never
        // reaches the key there.
        single_crease: device_tess && options.single_crease,
        screenspace_tessellation: device_tess && options.screenspace_tessellation,
        stage_in: device_tess && options.stage_in,
        patch_index_buffer: device_tess && options.patch_index_buffer,
        seamless_mipmap: options.seamless_mipmap && shading.samples_color_texture(),
        fast_path,
        cull_stages,
        overlay: None,
    };

    let vertex_layout = if device_tess {
        if pipeline_key.stage_in {
            VertexLayoutKind::StageIn
        } else {
            VertexLayoutKind::PatchControlPoints
        }
    } else {
        VertexLayoutKind::RefinedPositionNormal
    };

    Ok(ResolvedStrategy {
        pipeline_key,
        vertex_layout,
        cull_stages,
        shading,
        refinement_level,
        tessellation_level,
        downgrades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ColorMode;

    fn device_options() -> RenderOptions {
        RenderOptions {
            tessellation_mode: TessellationMode::Device,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let options = RenderOptions {
            tessellation_mode: TessellationMode::Device,
            screenspace_tessellation: true,
            single_crease: true,
            patch_backface_culling: true,
            refinement_level: 3,
            ..RenderOptions::default()
        };
        let caps = CapabilitySet::full();
        let first = resolve(&options, &caps).unwrap();
        let second = resolve(&options, &caps).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.pipeline_key, second.pipeline_key);
    }

    #[test]
    fn host_mode_ignores_device_only_toggles() {
        let caps = CapabilitySet::host_only();
        let plain = RenderOptions::default();
        let noisy = RenderOptions {
            screenspace_tessellation: true,
            stage_in: true,
            patch_index_buffer: true,
            ..RenderOptions::default()
        };
        let a = resolve(&plain, &caps).unwrap();
        let b = resolve(&noisy, &caps).unwrap();
        assert_eq!(a.pipeline_key, b.pipeline_key);
    }

    #[test]
    fn device_mode_without_tessellation_stage_names_the_feature() {
        let err = resolve(&device_options(), &CapabilitySet::host_only()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedConfiguration {
                feature: GpuFeature::TessellationStage
            }
        );
        assert!(format!("{err}").contains("tessellation-stage"));
    }

    #[test]
    fn device_mode_gates_stage_in_and_indexed_draw() {
        let mut caps = CapabilitySet::full();
        caps.stage_in = false;

        let mut options = device_options();
        options.stage_in = true;
        assert_eq!(
            resolve(&options, &caps).unwrap_err(),
            ResolveError::UnsupportedConfiguration {
                feature: GpuFeature::StageIn
            }
        );

        let mut caps = CapabilitySet::full();
        caps.indexed_patch_draw = false;
        let mut options = device_options();
        options.patch_index_buffer = true;
        assert_eq!(
            resolve(&options, &caps).unwrap_err(),
            ResolveError::UnsupportedConfiguration {
                feature: GpuFeature::IndexedPatchDraw
            }
        );
    }

    #[test]
    fn hardware_displacement_downgrades_surface_normals() {
        let options = RenderOptions {
            displacement_mode: DisplacementMode::HardwareBilinear,
            normal_mode: NormalMode::Surface,
            displacement_texture: "assets/face.pdx".to_string(),
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &CapabilitySet::host_only()).unwrap();
        assert_eq!(strategy.pipeline_key.normal, NormalMode::Screenspace);
        assert!(strategy.was_downgraded());
        assert_eq!(
            strategy.downgrades,
            vec![Downgrade::NormalMode {
                from: NormalMode::Surface,
                to: NormalMode::Screenspace,
            }]
        );
    }

    #[test]
    fn hardware_displacement_keeps_compatible_normals() {
        for normal_mode in [
            NormalMode::HardwareScreenspace,
            NormalMode::Screenspace,
            NormalMode::BiQuadratic,
            NormalMode::BiQuadraticWithGradient,
        ] {
            let options = RenderOptions {
                displacement_mode: DisplacementMode::HardwareBilinear,
                normal_mode,
                displacement_texture: "assets/face.pdx".to_string(),
                ..RenderOptions::default()
            };
            let strategy = resolve(&options, &CapabilitySet::host_only()).unwrap();
            assert_eq!(strategy.pipeline_key.normal, normal_mode);
            assert!(!strategy.was_downgraded());
        }
    }

    #[test]
    fn texturing_color_mode_with_empty_reference_is_missing_resource() {
        let options = RenderOptions {
            color_mode: ColorMode::TextureBilinear,
            color_texture: String::new(),
            ..RenderOptions::default()
        };
        let err = resolve(&options, &CapabilitySet::host_only()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingResource {
                resource: ResourceKind::ColorTexture
            }
        );
        assert!(format!("{err}").contains("color texture"));
    }

    #[test]
    fn displacing_mode_with_empty_reference_is_missing_resource() {
        let options = RenderOptions {
            displacement_mode: DisplacementMode::Bilinear,
            displacement_texture: String::new(),
            ..RenderOptions::default()
        };
        let err = resolve(&options, &CapabilitySet::host_only()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingResource {
                resource: ResourceKind::DisplacementTexture
            }
        );
    }

    #[test]
    fn occlusion_and_specular_references_are_optional() {
        let options = RenderOptions {
            color_mode: ColorMode::TextureNearest,
            color_texture: "assets/face.ptx".to_string(),
            occlusion_texture: String::new(),
            specular_texture: String::new(),
            ..RenderOptions::default()
        };
        assert!(resolve(&options, &CapabilitySet::host_only()).is_ok());
    }

    #[test]
    fn none_end_cap_at_refinement_zero_selects_the_fast_path() {
        let options = RenderOptions {
            end_cap_mode: EndCapMode::None,
            refinement_level: 0,
            tessellation_mode: TessellationMode::Host,
            color_mode: ColorMode::None,
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &CapabilitySet::host_only()).unwrap();
        assert!(strategy.pipeline_key.fast_path);
        assert_eq!(strategy.pipeline_key.end_cap, EndCapMode::None);
        assert_eq!(strategy.shading, ShadingPath::Unshaded);
        assert!(strategy.cull_stages.is_empty());
        assert!(!strategy.was_downgraded());

        // Raising either knob leaves the fast path.
        let refined = RenderOptions {
            refinement_level: 1,
            ..options.clone()
        };
        assert!(!resolve(&refined, &CapabilitySet::host_only())
            .unwrap()
            .pipeline_key
            .fast_path);
        let capped = RenderOptions {
            end_cap_mode: EndCapMode::BSplineBasis,
            ..options
        };
        assert!(!resolve(&capped, &CapabilitySet::host_only())
            .unwrap()
            .pipeline_key
            .fast_path);
    }

    #[test]
    fn levels_clamp_to_device_maxima_with_a_record() {
        let caps = CapabilitySet {
            max_refinement_level: 4,
            max_tessellation_level: 16.0,
            ..CapabilitySet::host_only()
        };
        let options = RenderOptions {
            refinement_level: 9,
            tessellation_level: 48.0,
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &caps).unwrap();
        assert_eq!(strategy.refinement_level, 4);
        assert_eq!(strategy.tessellation_level, 16.0);
        assert_eq!(strategy.downgrades.len(), 2);
        assert!(strategy.downgrades.contains(&Downgrade::RefinementLevelClamped {
            requested: 9,
            max: 4
        }));
        assert!(strategy
            .downgrades
            .contains(&Downgrade::TessellationLevelClamped {
                requested: 48.0,
                max: 16.0
            }));
    }

    #[test]
    fn single_crease_enters_the_key_only_under_device_tessellation() {
        let caps = CapabilitySet::full();

        let host = RenderOptions {
            single_crease: true,
            tessellation_mode: TessellationMode::Host,
            ..RenderOptions::default()
        };
        assert!(!resolve(&host, &caps).unwrap().pipeline_key.single_crease);

        let device = RenderOptions {
            single_crease: true,
            tessellation_mode: TessellationMode::Device,
            ..RenderOptions::default()
        };
        assert!(resolve(&device, &caps).unwrap().pipeline_key.single_crease);
    }

    #[test]
    fn seamless_mipmap_only_keys_textured_paths() {
        let untextured = RenderOptions {
            seamless_mipmap: true,
            color_mode: ColorMode::Material,
            ..RenderOptions::default()
        };
        let strategy = resolve(&untextured, &CapabilitySet::host_only()).unwrap();
        assert!(!strategy.pipeline_key.seamless_mipmap);

        let textured = RenderOptions {
            seamless_mipmap: true,
            color_mode: ColorMode::TextureNearest,
            color_texture: "assets/face.ptx".to_string(),
            ..RenderOptions::default()
        };
        let strategy = resolve(&textured, &CapabilitySet::host_only()).unwrap();
        assert!(strategy.pipeline_key.seamless_mipmap);
    }

    #[test]
    fn cull_toggles_map_onto_stages() {
        let options = RenderOptions {
            patch_backface_culling: true,
            patch_clip_culling: true,
            primitive_backface_culling: true,
            ..RenderOptions::default()
        };
        let strategy = resolve(&options, &CapabilitySet::host_only()).unwrap();
        assert!(strategy.cull_stages.contains(CullStages::PATCH_BACKFACE));
        assert!(strategy.cull_stages.contains(CullStages::PATCH_CLIP));
        assert!(strategy
            .cull_stages
            .contains(CullStages::PRIMITIVE_BACKFACE));
    }

    #[test]
    fn vertex_layout_follows_the_tessellation_path() {
        let caps = CapabilitySet::full();
        assert_eq!(
            resolve(&RenderOptions::default(), &caps).unwrap().vertex_layout,
            VertexLayoutKind::RefinedPositionNormal
        );
        assert_eq!(
            resolve(&device_options(), &caps).unwrap().vertex_layout,
            VertexLayoutKind::PatchControlPoints
        );
        let stage_in = RenderOptions {
            stage_in: true,
            ..device_options()
        };
        assert_eq!(
            resolve(&stage_in, &caps).unwrap().vertex_layout,
            VertexLayoutKind::StageIn
        );
    }

    #[test]
    fn resolution_does_not_mutate_options() {
        let options = RenderOptions {
            displacement_mode: DisplacementMode::HardwareBilinear,
            normal_mode: NormalMode::Surface,
            displacement_texture: "assets/face.pdx".to_string(),
            ..RenderOptions::default()
        };
        let snapshot = options.clone();
        let _ = resolve(&options, &CapabilitySet::host_only()).unwrap();
        assert_eq!(options, snapshot);
    }
}
