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

//! Device capability description consumed by the strategy resolver.
//!
//! The delegate probes the GPU once per relevant event (device creation,
//! device loss) and hands the renderer a plain snapshot. Resolution never
//! talks to the device directly; it only reads this value, which keeps the
//! resolver a pure function.

/// A device feature the strategy resolver may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuFeature {
    /// A hardware tessellation stage that expands patches on the device.
    TessellationStage,
    /// Input assembly that consumes tessellated vertex data directly from
    /// a prior stage without an intermediate buffer round-trip.
    StageIn,
    /// Indexed (indirect) patch drawing from a patch index buffer.
    IndexedPatchDraw,
}

impl GpuFeature {
    /// The stable name used in diagnostics and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            GpuFeature::TessellationStage => "tessellation-stage",
            GpuFeature::StageIn => "stage-in",
            GpuFeature::IndexedPatchDraw => "indexed-patch-draw",
        }
    }
}

/// A snapshot of the device features and limits relevant to strategy
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilitySet {
    /// Whether the device exposes a tessellation stage.
    pub tessellation_stage: bool,
    /// Whether the device supports stage-in input assembly.
    pub stage_in: bool,
    /// Whether the device supports indexed patch draws.
    pub indexed_patch_draw: bool,
    /// The device's maximum tessellation factor.
    pub max_tessellation_level: f32,
    /// The maximum subdivision refinement depth the backing tables support.
    pub max_refinement_level: u32,
}

impl CapabilitySet {
    /// A capability set with every feature present. Useful for tests and
    /// for backends with a full tessellation pipeline.
    pub const fn full() -> Self {
        Self {
            tessellation_stage: true,
            stage_in: true,
            indexed_patch_draw: true,
            max_tessellation_level: 64.0,
            max_refinement_level: 6,
        }
    }

    /// A capability set for devices without any tessellation hardware.
    /// Host-side refinement is the only available path.
    pub const fn host_only() -> Self {
        Self {
            tessellation_stage: false,
            stage_in: false,
            indexed_patch_draw: false,
            max_tessellation_level: 64.0,
            max_refinement_level: 6,
        }
    }

    /// Whether this set reports the given feature.
    pub const fn supports(&self, feature: GpuFeature) -> bool {
        match feature {
            GpuFeature::TessellationStage => self.tessellation_stage,
            GpuFeature::StageIn => self.stage_in,
            GpuFeature::IndexedPatchDraw => self.indexed_patch_draw,
        }
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::host_only()
    }
}
