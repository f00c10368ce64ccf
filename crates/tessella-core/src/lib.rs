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

//! # Tessella Core
//!
//! Foundational crate for the Tessella subdivision-surface renderer:
//! the rendering option surface, the configuration-to-strategy resolver,
//! backend-agnostic descriptor types, and the traits a host application
//! implements to supply GPU resources.
//!
//! Nothing in this crate talks to a GPU. The `tessella-infra` crate
//! provides the concrete wgpu backend; `tessella-lanes` drives one frame's
//! draw sequence through the traits defined here.

#![warn(missing_docs)]

pub mod camera;
pub mod capability;
pub mod color;
pub mod command;
pub mod delegate;
pub mod error;
pub mod handle;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod stats;
pub mod strategy;
pub mod uniforms;

pub use camera::Camera;
pub use capability::{CapabilitySet, GpuFeature};
pub use color::LinearRgba;
pub use command::{CommandBufferId, CommandEncoder, CommandQueue, RenderPass};
pub use delegate::{GraphicsDevice, RenderDelegate};
pub use error::{FrameError, RegistryError, ResolveError, ResourceError};
pub use handle::{BufferId, ShaderModuleId, TextureId, TextureViewId};
pub use model::{GpuModel, ModelStore};
pub use options::RenderOptions;
pub use pipeline::{RenderPipelineDescriptor, RenderPipelineId};
pub use registry::ModelRegistry;
pub use stats::FrameStats;
pub use strategy::{resolve, PipelineKey, ResolvedStrategy};
