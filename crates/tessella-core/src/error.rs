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

//! Defines the hierarchy of error types for the renderer.
//!
//! Every error here is recoverable at frame granularity: the viewer skips
//! the frame and carries on. Nothing in this crate panics on a bad
//! configuration or a missing resource.

use crate::capability::GpuFeature;
use std::fmt;

/// A resource that a rendering mode requires but the configuration did not
/// provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The per-face color texture referenced by a texturing color mode.
    ColorTexture,
    /// The per-face displacement texture referenced by a displacing mode.
    DisplacementTexture,
}

impl ResourceKind {
    /// Human-readable name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            ResourceKind::ColorTexture => "color texture",
            ResourceKind::DisplacementTexture => "displacement texture",
        }
    }
}

/// An error produced while resolving the option surface into a concrete
/// rendering strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested mode combination needs a device feature the capability
    /// set does not report.
    UnsupportedConfiguration {
        /// The device feature that is missing.
        feature: GpuFeature,
    },
    /// A mode that consumes an external resource is active but its
    /// reference is empty. This indicates a host programming error and is
    /// never silently skipped.
    MissingResource {
        /// The resource whose reference was empty.
        resource: ResourceKind,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnsupportedConfiguration { feature } => {
                write!(
                    f,
                    "Unsupported configuration: device lacks {}",
                    feature.name()
                )
            }
            ResolveError::MissingResource { resource } => {
                write!(
                    f,
                    "Missing resource: {} reference is empty while its mode is active",
                    resource.name()
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// An error produced by the model registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested model name is not a member of the loaded set. The
    /// previous selection is left intact.
    ModelNotFound {
        /// The name that was requested.
        name: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ModelNotFound { name } => {
                write!(f, "Model '{name}' is not in the loaded set")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// An error produced by a graphics backend while creating or writing a
/// GPU resource on the renderer's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The backend failed to produce a pipeline state object.
    PipelineCreationFailed {
        /// A descriptive label for the pipeline, if available.
        label: Option<String>,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// The pipeline descriptor references no shader modules; the host's
    /// customization hook must supply them.
    MissingShaderModules,
    /// The requested primitive topology is not expressible on this backend.
    UnsupportedTopology(String),
    /// A buffer or texture write failed.
    WriteFailed(String),
    /// The handle used to reference a resource is not valid on this device.
    InvalidHandle,
    /// An error originating from the specific graphics backend.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::PipelineCreationFailed { label, details } => {
                write!(
                    f,
                    "Pipeline compilation failed for '{}': {}",
                    label.as_deref().unwrap_or("Unknown"),
                    details
                )
            }
            ResourceError::MissingShaderModules => {
                write!(f, "Pipeline descriptor carries no shader modules")
            }
            ResourceError::UnsupportedTopology(msg) => {
                write!(f, "Unsupported primitive topology: {msg}")
            }
            ResourceError::WriteFailed(msg) => write!(f, "Resource write failed: {msg}"),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error aborting one frame's draw sequence.
///
/// A frame abort never leaves a half-built command buffer behind: no draw
/// is emitted until every descriptor and pipeline dependency has been
/// produced. Prior frames' state is untouched and the host may retry on
/// the next frame.
#[derive(Debug)]
pub enum FrameError {
    /// The option surface could not be resolved into a strategy.
    Resolve(ResolveError),
    /// No model is currently selected.
    NoModelSelected,
    /// The selected model has no backing GPU resources in the store.
    ModelNotLoaded {
        /// The selected model name.
        name: String,
    },
    /// The selected model's store entry lacks the geometry the active
    /// strategy draws (e.g. no host-refined meshes under host
    /// tessellation).
    GeometryUnavailable {
        /// The selected model name.
        name: String,
    },
    /// The delegate could not supply a render-pass descriptor for this
    /// frame (e.g. the surface is temporarily unavailable).
    PassUnavailable(String),
    /// The device could not supply a pipeline state object.
    Pipeline(ResourceError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Resolve(err) => write!(f, "Strategy resolution failed: {err}"),
            FrameError::NoModelSelected => write!(f, "No model is selected."),
            FrameError::ModelNotLoaded { name } => {
                write!(f, "Model '{name}' has no GPU resources loaded")
            }
            FrameError::GeometryUnavailable { name } => {
                write!(
                    f,
                    "Model '{name}' lacks the geometry the active strategy draws"
                )
            }
            FrameError::PassUnavailable(msg) => {
                write!(f, "Render-pass descriptor unavailable: {msg}")
            }
            FrameError::Pipeline(err) => write!(f, "Pipeline acquisition failed: {err}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Resolve(err) => Some(err),
            FrameError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for FrameError {
    fn from(err: ResolveError) -> Self {
        FrameError::Resolve(err)
    }
}

impl From<ResourceError> for FrameError {
    fn from(err: ResourceError) -> Self {
        FrameError::Pipeline(err)
    }
}
