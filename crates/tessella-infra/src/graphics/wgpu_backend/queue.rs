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

//! Fire-and-forget submission of finished command buffers.

use super::device::WgpuSurfaceDevice;
use tessella_core::command::{CommandBufferId, CommandQueue};

/// Submits finished command buffers to the wgpu queue.
pub struct WgpuSubmissionQueue {
    device: WgpuSurfaceDevice,
}

impl WgpuSubmissionQueue {
    /// Creates a submission queue over the device's wgpu queue.
    pub fn new(device: &WgpuSurfaceDevice) -> Self {
        Self {
            device: device.clone(),
        }
    }
}

impl CommandQueue for WgpuSubmissionQueue {
    fn submit(&self, buffer: CommandBufferId) {
        if let Some(command_buffer) = self.device.take_command_buffer(buffer) {
            self.device.wgpu_queue().submit(Some(command_buffer));
        } else {
            log::warn!("WgpuSubmissionQueue: CommandBufferId {buffer:?} not found or already submitted.");
        }
    }
}
