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

//! Encodes the line-work overlays layered over the filled surface.
//!
//! Overlays come strictly after the fill in the command stream — the
//! fill must never occlude line work drawn in the same pass — and always
//! in the same fixed order, so identical inputs replay identical command
//! sequences.

use tessella_core::command::RenderPass;
use tessella_core::model::{GpuModel, LineMesh};
use tessella_core::options::RenderOptions;
use tessella_core::pipeline::RenderPipelineId;
use tessella_core::strategy::OverlayKind;

/// The fixed encode order for overlays.
const OVERLAY_ORDER: [OverlayKind; 3] = [
    OverlayKind::Wireframe,
    OverlayKind::ControlEdges,
    OverlayKind::BezierEdges,
];

/// The overlays the options enable, in encode order.
pub(crate) fn enabled_overlays(options: &RenderOptions) -> Vec<OverlayKind> {
    OVERLAY_ORDER
        .into_iter()
        .filter(|kind| match kind {
            OverlayKind::Wireframe => options.wireframe,
            OverlayKind::ControlEdges => options.control_edges,
            OverlayKind::BezierEdges => options.bezier_edges,
        })
        .collect()
}

fn overlay_mesh(model: &GpuModel, kind: OverlayKind) -> Option<&LineMesh> {
    match kind {
        OverlayKind::Wireframe => model.wireframe_edges.as_ref(),
        OverlayKind::ControlEdges => model.control_edges.as_ref(),
        OverlayKind::BezierEdges => model.bezier_edges.as_ref(),
    }
}

/// Encodes the enabled overlay draws. Returns the number of draw calls
/// recorded.
pub(crate) fn encode_overlays<'p>(
    pass: &mut (dyn RenderPass<'p> + 'p),
    pipelines: &[(OverlayKind, RenderPipelineId)],
    model: &GpuModel,
) -> u32 {
    let mut draw_calls = 0;
    for (kind, pipeline) in pipelines {
        let Some(mesh) = overlay_mesh(model, *kind) else {
            log::warn!("Overlay {kind:?} enabled but '{}' carries no edge geometry", model.name);
            continue;
        };
        pass.set_pipeline(*pipeline);
        pass.set_vertex_buffer(0, mesh.vertex_buffer, 0);
        pass.set_index_buffer(mesh.index_buffer, 0, mesh.index_format);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        draw_calls += 1;
    }
    draw_calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_options_enable_nothing() {
        assert!(enabled_overlays(&RenderOptions::default()).is_empty());
    }

    #[test]
    fn overlays_keep_a_fixed_order_regardless_of_toggle_order() {
        let options = RenderOptions {
            bezier_edges: true,
            wireframe: true,
            control_edges: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            enabled_overlays(&options),
            vec![
                OverlayKind::Wireframe,
                OverlayKind::ControlEdges,
                OverlayKind::BezierEdges
            ]
        );
    }

    #[test]
    fn single_toggle_enables_only_its_overlay() {
        let options = RenderOptions {
            control_edges: true,
            ..RenderOptions::default()
        };
        assert_eq!(enabled_overlays(&options), vec![OverlayKind::ControlEdges]);
    }
}
