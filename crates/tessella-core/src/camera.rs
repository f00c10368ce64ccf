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

//! Orbit camera state read by the renderer each frame.

use glam::Mat4;

/// Distance to the near clipping plane. The dolly distance never goes
/// below this, so the model cannot be pushed through the near plane.
pub const Z_NEAR: f32 = 0.1;

/// Distance to the far clipping plane.
pub const Z_FAR: f32 = 500.0;

/// Vertical field of view in degrees.
const FOV_Y_DEGREES: f32 = 45.0;

/// Viewpoint for one frame: an orbit around the model origin.
///
/// Owned exclusively by the renderer. The host reads it through a stable
/// reference (`Renderer::camera`) and mutates it through
/// `Renderer::camera_mut`; the identity of the value does not change
/// across calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    rotation_x: f32,
    rotation_y: f32,
    dolly_distance: f32,
    aspect_ratio: f32,
}

impl Camera {
    /// Creates a camera at the default viewing distance.
    pub fn new() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            dolly_distance: 5.0,
            aspect_ratio: 1.0,
        }
    }

    /// Rotation around the horizontal axis, in degrees.
    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    /// Rotation around the vertical axis, in degrees.
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Distance from the orbit center to the eye.
    pub fn dolly_distance(&self) -> f32 {
        self.dolly_distance
    }

    /// Viewport aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Sets the orbit angles, in degrees. Unrestricted; angles accumulate
    /// across mouse drags and wrap naturally in the trigonometry.
    pub fn set_rotation(&mut self, rotation_x: f32, rotation_y: f32) {
        self.rotation_x = rotation_x;
        self.rotation_y = rotation_y;
    }

    /// Sets the dolly distance, clamped so the eye stays at or beyond the
    /// near plane.
    pub fn set_dolly_distance(&mut self, distance: f32) {
        self.dolly_distance = distance.max(Z_NEAR);
    }

    /// Sets the aspect ratio. Non-positive values are rejected and the
    /// previous ratio is kept.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    /// Updates the aspect ratio from surface dimensions, typically on
    /// resize. A zero height leaves the ratio unchanged.
    pub fn set_aspect_from_surface(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// The view matrix: dolly back along +Z, then orbit.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -self.dolly_distance))
            * Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }

    /// The perspective projection matrix for the current aspect ratio.
    /// Right-handed, zero-to-one depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            FOV_Y_DEGREES.to_radians(),
            self.aspect_ratio,
            Z_NEAR,
            Z_FAR,
        )
    }

    /// The combined view-projection transform bound each frame.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
