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

//! # Tessella Infra
//!
//! Concrete implementations of the renderer's external seams: the wgpu
//! graphics device, command encoder, and the windowed render delegate a
//! viewer application plugs into `tessella_lanes::Renderer`.

pub mod graphics;

pub use graphics::wgpu_backend::command::WgpuCommandEncoder;
pub use graphics::wgpu_backend::delegate::WindowedDelegate;
pub use graphics::wgpu_backend::device::WgpuSurfaceDevice;
pub use graphics::wgpu_backend::queue::WgpuSubmissionQueue;
