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

//! GPU-friendly per-frame uniform data.

use bytemuck::{Pod, Zeroable};

/// The per-frame uniforms bound before the fill draw.
///
/// Uploaded once per frame; everything that varies per frame without
/// changing the pipeline object lives here, so flipping tuning sliders
/// never recompiles a pipeline.
///
/// # Memory Layout
///
/// Total size: 144 bytes (two column-major 4x4 matrices plus one 16-byte
/// tuning row), 16-byte aligned for uniform-buffer rules.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SurfaceUniforms {
    /// Combined view-projection matrix, column-major.
    pub view_projection: [[f32; 4]; 4],
    /// Model transform, column-major.
    pub model: [[f32; 4]; 4],
    /// Scale applied to sampled displacement values.
    pub displacement_scale: f32,
    /// Bias added to mipmap level selection.
    pub mipmap_bias: f32,
    /// Target tessellation factor for the device stage.
    pub tessellation_level: f32,
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl Default for SurfaceUniforms {
    fn default() -> Self {
        Self {
            view_projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            displacement_scale: 1.0,
            mipmap_bias: 0.0,
            tessellation_level: 1.0,
            _padding: 0.0,
        }
    }
}
