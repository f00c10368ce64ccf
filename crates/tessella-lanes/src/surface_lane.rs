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

//! Encodes the surface fill: the one filled draw (or patch batch
//! sequence) every frame starts with.

use crate::host_tess::HostRefinement;
use glam::Mat4;
use tessella_core::camera::Camera;
use tessella_core::command::{RenderPass, TextureSlot};
use tessella_core::error::FrameError;
use tessella_core::model::{GpuModel, PatchKind, PtexBindings};
use tessella_core::options::{EndCapMode, RenderOptions};
use tessella_core::strategy::{ResolvedStrategy, VertexLayoutKind};
use tessella_core::uniforms::SurfaceUniforms;

/// Draw counters produced while encoding the fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FillCounts {
    pub draw_calls: u32,
    pub patches: u32,
}

/// Builds the per-frame uniforms from the camera and the resolved
/// tuning values.
pub(crate) fn surface_uniforms(
    camera: &Camera,
    strategy: &ResolvedStrategy,
    options: &RenderOptions,
) -> SurfaceUniforms {
    SurfaceUniforms {
        view_projection: camera.view_projection().to_cols_array_2d(),
        model: Mat4::IDENTITY.to_cols_array_2d(),
        displacement_scale: options.displacement_scale,
        mipmap_bias: options.mipmap_bias,
        tessellation_level: strategy.tessellation_level,
        _padding: 0.0,
    }
}

/// Binds the textures the strategy actually samples.
///
/// The resolver has already rejected configurations whose mandatory
/// references are missing, so an absent binding here means the host has
/// not finished loading; the fill still draws, un-textured slots read
/// as unbound on the backend.
pub(crate) fn bind_surface_textures<'p>(
    pass: &mut (dyn RenderPass<'p> + 'p),
    strategy: &ResolvedStrategy,
    ptex: &PtexBindings,
) {
    let samples_color = strategy.shading.samples_color_texture();
    if samples_color {
        if let Some(texture) = ptex.color {
            pass.bind_texture(TextureSlot::Color, texture);
        } else {
            log::warn!("Color texturing active but the store carries no color texture yet");
        }
        // The optional extras ride along with the texturing path only.
        if let Some(texture) = ptex.occlusion {
            pass.bind_texture(TextureSlot::Occlusion, texture);
        }
        if let Some(texture) = ptex.specular {
            pass.bind_texture(TextureSlot::Specular, texture);
        }
    }
    if strategy.pipeline_key.displacement.requires_texture() {
        if let Some(texture) = ptex.displacement {
            pass.bind_texture(TextureSlot::Displacement, texture);
        } else {
            log::warn!("Displacement active but the store carries no displacement texture yet");
        }
    }
}

/// Encodes the filled surface draw for the active model.
pub(crate) fn encode_fill<'p>(
    pass: &mut (dyn RenderPass<'p> + 'p),
    strategy: &ResolvedStrategy,
    model: &GpuModel,
    plan: HostRefinement,
) -> Result<FillCounts, FrameError> {
    let mut counts = FillCounts::default();
    match strategy.vertex_layout {
        VertexLayoutKind::RefinedPositionNormal => {
            let Some(refined) = model.refined_at(plan.level) else {
                return Err(FrameError::GeometryUnavailable {
                    name: model.name.clone(),
                });
            };
            pass.set_vertex_buffer(0, refined.vertex_buffer, 0);
            pass.set_index_buffer(refined.index_buffer, 0, refined.index_format);
            pass.draw_indexed(0..refined.index_count, 0, 0..1);
            counts.draw_calls += 1;
        }
        VertexLayoutKind::PatchControlPoints | VertexLayoutKind::StageIn => {
            pass.set_vertex_buffer(0, model.control_vertex_buffer, 0);
            for batch in &model.patch_batches {
                // Which batches exist is the store's business (it built
                // the patch tables); the strategy only decides whether
                // end-cap handling runs at all.
                if batch.kind == PatchKind::EndCap
                    && strategy.pipeline_key.end_cap == EndCapMode::None
                {
                    continue;
                }
                if strategy.pipeline_key.patch_index_buffer {
                    pass.set_index_buffer(
                        batch.index_buffer,
                        0,
                        tessella_core::pipeline::IndexFormat::Uint32,
                    );
                }
                pass.draw_patches(batch.patch_count, batch.control_points_per_patch);
                counts.draw_calls += 1;
                counts.patches += batch.patch_count;
            }
        }
    }
    Ok(counts)
}
