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

//! The external backing store for surface models.
//!
//! Mesh parsing, subdivision table construction, and texture loading all
//! happen outside the renderer; what arrives here are opaque GPU handles
//! grouped per model. The renderer looks the active model up by the
//! registry's name each frame and threads the handles into draw commands.

use crate::handle::{BufferId, TextureId};
use crate::pipeline::IndexFormat;

/// The patch family a draw batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    /// Regular B-spline patches.
    Regular,
    /// Single-crease patches around one sharp feature line.
    SingleCrease,
    /// End-cap patches closing extraordinary regions.
    EndCap,
}

/// One device-tessellated draw batch: all patches of one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchBatch {
    /// The patch family.
    pub kind: PatchKind,
    /// Index buffer with per-patch control point indices.
    pub index_buffer: BufferId,
    /// Number of patches in the batch.
    pub patch_count: u32,
    /// Control points per patch.
    pub control_points_per_patch: u32,
}

/// A host-refined triangle mesh at one refinement level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedMesh {
    /// Interleaved position/normal vertex buffer.
    pub vertex_buffer: BufferId,
    /// Triangle index buffer.
    pub index_buffer: BufferId,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Index data type.
    pub index_format: IndexFormat,
}

/// Line geometry for one overlay kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMesh {
    /// Vertex buffer for the line endpoints.
    pub vertex_buffer: BufferId,
    /// Line-list index buffer.
    pub index_buffer: BufferId,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Index data type.
    pub index_format: IndexFormat,
}

/// Per-face texture bindings loaded for a model.
///
/// Only the textures the active strategy samples get bound; entries are
/// `None` when the host never loaded that map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PtexBindings {
    /// Color texture.
    pub color: Option<TextureId>,
    /// Displacement texture.
    pub displacement: Option<TextureId>,
    /// Ambient-occlusion texture.
    pub occlusion: Option<TextureId>,
    /// Specular texture.
    pub specular: Option<TextureId>,
}

/// The GPU-resident resources for one surface model.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuModel {
    /// The registry name this model answers to.
    pub name: String,
    /// Control-point vertex buffer consumed by the patch stages.
    pub control_vertex_buffer: BufferId,
    /// Device-tessellated draw batches, one per patch family present.
    pub patch_batches: Vec<PatchBatch>,
    /// Host-refined meshes indexed by refinement level. Level 0 is the
    /// control cage itself; the store may carry fewer levels than the
    /// device maximum, in which case the renderer uses the deepest
    /// available.
    pub refined: Vec<RefinedMesh>,
    /// Wireframe overlay geometry.
    pub wireframe_edges: Option<LineMesh>,
    /// Control cage overlay geometry.
    pub control_edges: Option<LineMesh>,
    /// Bezier edge overlay geometry.
    pub bezier_edges: Option<LineMesh>,
    /// Per-face texture bindings.
    pub ptex: PtexBindings,
}

impl GpuModel {
    /// The refined mesh closest to the requested level: exact when the
    /// store carries it, otherwise the deepest level available.
    pub fn refined_at(&self, level: u32) -> Option<&RefinedMesh> {
        if self.refined.is_empty() {
            return None;
        }
        let index = (level as usize).min(self.refined.len() - 1);
        self.refined.get(index)
    }
}

/// Read access to the model backing store.
///
/// Implemented by the host; the renderer never mutates the store.
pub trait ModelStore: Send + Sync {
    /// Looks up a model by registry name.
    fn model(&self, name: &str) -> Option<&GpuModel>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refined(level: u64) -> RefinedMesh {
        RefinedMesh {
            vertex_buffer: BufferId(level * 2),
            index_buffer: BufferId(level * 2 + 1),
            index_count: 36,
            index_format: IndexFormat::Uint32,
        }
    }

    fn model_with_levels(levels: u64) -> GpuModel {
        GpuModel {
            name: "cube".to_string(),
            control_vertex_buffer: BufferId(100),
            patch_batches: Vec::new(),
            refined: (0..levels).map(refined).collect(),
            wireframe_edges: None,
            control_edges: None,
            bezier_edges: None,
            ptex: PtexBindings::default(),
        }
    }

    #[test]
    fn refined_at_returns_the_exact_level_when_present() {
        let model = model_with_levels(4);
        assert_eq!(model.refined_at(2), Some(&refined(2)));
    }

    #[test]
    fn refined_at_saturates_to_the_deepest_available() {
        let model = model_with_levels(3);
        assert_eq!(model.refined_at(9), Some(&refined(2)));
    }

    #[test]
    fn refined_at_is_none_for_an_empty_store() {
        let model = model_with_levels(0);
        assert_eq!(model.refined_at(0), None);
    }
}
