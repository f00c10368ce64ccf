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

//! Performance statistics for one encoded frame.

/// Counters describing one `draw_frame` call.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// A sequential counter for encoded frames.
    pub frame_number: u64,
    /// The number of draw calls recorded.
    pub draw_calls: u32,
    /// The number of patches submitted through the device path; zero for
    /// host-refined frames.
    pub patches_drawn: u32,
    /// CPU time spent resolving and encoding, in milliseconds.
    pub cpu_encode_time_ms: f32,
    /// Whether the cached strategy was reused instead of re-resolving.
    pub strategy_reused: bool,
    /// Whether resolution substituted any requested setting this frame.
    pub downgraded: bool,
}
