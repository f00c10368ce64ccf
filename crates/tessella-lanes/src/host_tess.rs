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

//! Host-side refinement planning.
//!
//! Under host tessellation the refined meshes themselves come pre-built
//! from the model store; what happens per frame is picking *which* level
//! to draw. The plan adapts to the camera: a model far from the eye
//! drops refinement levels it cannot show, which is what keeps the CPU
//! path interactive on dense models.

use tessella_core::camera::Camera;
use tessella_core::strategy::ResolvedStrategy;

/// Distance within which the full requested refinement level is used.
const FULL_DETAIL_DISTANCE: f32 = 8.0;

/// The host refinement chosen for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRefinement {
    /// The refinement level to draw.
    pub level: u32,
}

/// Plans the host refinement for this frame.
///
/// Starts from the strategy's (already device-clamped) refinement level,
/// drops one level per doubling of dolly distance beyond
/// `FULL_DETAIL_DISTANCE`, and finally clamps to the deepest level the
/// store actually carries.
pub fn plan_host_refinement(
    strategy: &ResolvedStrategy,
    camera: &Camera,
    available_levels: u32,
) -> HostRefinement {
    let mut level = strategy.refinement_level;

    let distance = camera.dolly_distance();
    if distance > FULL_DETAIL_DISTANCE {
        let drop = (distance / FULL_DETAIL_DISTANCE).log2().floor() as u32;
        level = level.saturating_sub(drop);
    }

    if available_levels > 0 {
        level = level.min(available_levels - 1);
    }

    HostRefinement { level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessella_core::capability::CapabilitySet;
    use tessella_core::options::RenderOptions;
    use tessella_core::strategy::resolve;

    fn strategy_with_level(refinement_level: u32) -> ResolvedStrategy {
        let options = RenderOptions {
            refinement_level,
            ..RenderOptions::default()
        };
        resolve(&options, &CapabilitySet::host_only()).unwrap()
    }

    #[test]
    fn close_camera_uses_the_requested_level() {
        let strategy = strategy_with_level(3);
        let mut camera = Camera::new();
        camera.set_dolly_distance(5.0);
        assert_eq!(plan_host_refinement(&strategy, &camera, 8).level, 3);
    }

    #[test]
    fn distance_drops_one_level_per_doubling() {
        let strategy = strategy_with_level(3);
        let mut camera = Camera::new();
        camera.set_dolly_distance(16.0); // one doubling past full detail
        assert_eq!(plan_host_refinement(&strategy, &camera, 8).level, 2);
        camera.set_dolly_distance(32.0); // two doublings
        assert_eq!(plan_host_refinement(&strategy, &camera, 8).level, 1);
        camera.set_dolly_distance(256.0); // far past everything
        assert_eq!(plan_host_refinement(&strategy, &camera, 8).level, 0);
    }

    #[test]
    fn plan_clamps_to_the_store_depth() {
        let strategy = strategy_with_level(5);
        let mut camera = Camera::new();
        camera.set_dolly_distance(2.0);
        assert_eq!(plan_host_refinement(&strategy, &camera, 3).level, 2);
    }

    #[test]
    fn plan_is_deterministic_for_fixed_inputs() {
        let strategy = strategy_with_level(4);
        let mut camera = Camera::new();
        camera.set_dolly_distance(20.0);
        let a = plan_host_refinement(&strategy, &camera, 8);
        let b = plan_host_refinement(&strategy, &camera, 8);
        assert_eq!(a, b);
    }
}
