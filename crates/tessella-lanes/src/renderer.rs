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

//! The renderer: option resolution plus one frame's draw orchestration.

use crate::host_tess::plan_host_refinement;
use crate::overlay_lane::{enabled_overlays, encode_overlays};
use crate::surface_lane::{bind_surface_textures, encode_fill, surface_uniforms};
use std::sync::Arc;
use std::time::Instant;
use tessella_core::camera::Camera;
use tessella_core::capability::CapabilitySet;
use tessella_core::command::CommandEncoder;
use tessella_core::delegate::RenderDelegate;
use tessella_core::error::{FrameError, RegistryError, ResolveError};
use tessella_core::model::ModelStore;
use tessella_core::options::{RenderOptions, TessellationMode};
use tessella_core::pipeline::{DepthStencilStateDescriptor, RenderPipelineDescriptor, RenderPipelineId};
use tessella_core::registry::ModelRegistry;
use tessella_core::stats::FrameStats;
use tessella_core::strategy::{resolve, OverlayKind, ResolvedStrategy};

struct CachedStrategy {
    options: RenderOptions,
    capabilities: CapabilitySet,
    strategy: ResolvedStrategy,
}

/// The real-time adaptive subdivision-surface renderer.
///
/// Owns the camera, the model registry, and the option surface; consumes
/// GPU resources through the [`RenderDelegate`] and [`ModelStore`] seams
/// it was constructed with. Single-threaded cooperative: the host calls
/// [`draw_frame`](Renderer::draw_frame) once per frame from its render
/// loop and submits the finished command buffer itself.
pub struct Renderer {
    delegate: Arc<dyn RenderDelegate>,
    store: Arc<dyn ModelStore>,
    camera: Camera,
    registry: ModelRegistry,
    options: RenderOptions,
    capabilities: CapabilitySet,
    cached: Option<CachedStrategy>,
    frame_count: u64,
    last_stats: FrameStats,
}

impl Renderer {
    /// Creates a renderer bound to a delegate and a model backing store.
    ///
    /// The device capability set is probed here, once; call
    /// [`refresh_capabilities`](Renderer::refresh_capabilities) after a
    /// device change.
    pub fn new(delegate: Arc<dyn RenderDelegate>, store: Arc<dyn ModelStore>) -> Self {
        let capabilities = delegate.capabilities();
        log::info!("Renderer created with capabilities {capabilities:?}");
        Self {
            delegate,
            store,
            camera: Camera::new(),
            registry: ModelRegistry::new(),
            options: RenderOptions::default(),
            capabilities,
            cached: None,
            frame_count: 0,
            last_stats: FrameStats::default(),
        }
    }

    /// Read access to the camera. The reference identity is stable across
    /// calls; the host can poll without reallocation.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera for input handling.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The loadable model names, in registration order.
    pub fn models(&self) -> &[String] {
        self.registry.models()
    }

    /// Registers a loadable model name. Returns `true` if newly added.
    pub fn register_model(&mut self, name: impl Into<String>) -> bool {
        self.registry.register(name)
    }

    /// The currently selected model, if any.
    pub fn current_model(&self) -> Option<&str> {
        self.registry.current()
    }

    /// Selects the active model. Atomic replace-or-reject: an unknown
    /// name fails and keeps the previous selection.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ModelNotFound`] when the name is not registered.
    pub fn set_current_model(&mut self, name: &str) -> Result<(), RegistryError> {
        self.registry.set_current(name)
    }

    /// The current option surface.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Replaces the option surface wholesale.
    ///
    /// Never fails; all validation happens when the next frame resolves.
    /// The cached strategy is invalidated by value comparison, so setting
    /// an identical value keeps the cache warm.
    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// The capability snapshot the resolver currently uses.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Re-probes the delegate's capabilities, e.g. after device loss.
    pub fn refresh_capabilities(&mut self) {
        self.capabilities = self.delegate.capabilities();
        self.cached = None;
        log::info!("Capabilities refreshed: {:?}", self.capabilities);
    }

    /// Statistics for the last successfully encoded frame.
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Resolves the current options into a strategy, reusing the cached
    /// resolution when neither options nor capabilities changed.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve_strategy(&mut self) -> Result<ResolvedStrategy, ResolveError> {
        Ok(self.resolve_cached()?.0)
    }

    fn resolve_cached(&mut self) -> Result<(ResolvedStrategy, bool), ResolveError> {
        if let Some(cached) = &self.cached {
            if cached.options == self.options && cached.capabilities == self.capabilities {
                return Ok((cached.strategy.clone(), true));
            }
        }
        let strategy = resolve(&self.options, &self.capabilities)?;
        log::debug!("Resolved strategy: {:?}", strategy.pipeline_key);
        for downgrade in &strategy.downgrades {
            log::warn!("Resolution downgrade: {downgrade:?}");
        }
        self.cached = Some(CachedStrategy {
            options: self.options.clone(),
            capabilities: self.capabilities,
            strategy: strategy.clone(),
        });
        Ok((strategy, false))
    }

    /// Encodes one frame into the supplied command encoder.
    ///
    /// The sequence is: resolve (or reuse) the strategy; acquire the pass
    /// descriptor and every pipeline object; bind camera uniforms; encode
    /// the surface fill; encode enabled overlays strictly after the fill.
    /// Nothing is recorded until every dependency has been produced, so a
    /// failed frame leaves the encoder untouched and the host can drop it
    /// and retry next frame.
    ///
    /// # Errors
    ///
    /// [`FrameError`] for unresolvable options, a missing model, or a
    /// delegate/device that could not supply a descriptor or pipeline.
    pub fn draw_frame(&mut self, encoder: &mut dyn CommandEncoder) -> Result<FrameStats, FrameError> {
        let started = Instant::now();

        let (strategy, strategy_reused) = self.resolve_cached()?;

        let model_name = self
            .registry
            .current()
            .ok_or(FrameError::NoModelSelected)?
            .to_string();
        let store = Arc::clone(&self.store);
        let Some(model) = store.model(&model_name) else {
            return Err(FrameError::ModelNotLoaded { name: model_name });
        };

        // Acquisition phase: pass descriptor, depth-stencil state, and
        // every pipeline object this frame will bind. Any failure here
        // aborts before a single command is recorded.
        let pass_descriptor = self.delegate.render_pass_descriptor()?;

        let mut fill_depth = DepthStencilStateDescriptor::surface_fill();
        self.delegate.customize_depth_stencil(&mut fill_depth);
        let mut fill_descriptor = RenderPipelineDescriptor::surface_fill(&strategy, fill_depth);
        self.delegate.customize_pipeline(&mut fill_descriptor);
        let device = self.delegate.device();
        let fill_pipeline = device.create_render_pipeline(&fill_descriptor)?;

        let mut overlay_pipelines: Vec<(OverlayKind, RenderPipelineId)> = Vec::new();
        for kind in enabled_overlays(&self.options) {
            let mut overlay_depth = DepthStencilStateDescriptor::overlay();
            self.delegate.customize_depth_stencil(&mut overlay_depth);
            let mut descriptor = RenderPipelineDescriptor::overlay(&strategy, kind, overlay_depth);
            self.delegate.customize_pipeline(&mut descriptor);
            overlay_pipelines.push((kind, device.create_render_pipeline(&descriptor)?));
        }

        let uniforms = surface_uniforms(&self.camera, &strategy, &self.options);
        let refinement = plan_host_refinement(&strategy, &self.camera, model.refined.len() as u32);

        // Host-path geometry is a frame dependency like any pipeline:
        // verify it exists before anything is recorded.
        if strategy.vertex_layout == tessella_core::strategy::VertexLayoutKind::RefinedPositionNormal
            && model.refined_at(refinement.level).is_none()
        {
            return Err(FrameError::GeometryUnavailable { name: model_name });
        }

        // Encode phase. The fill always comes first; overlays layer
        // strictly after it.
        let mut draw_calls = 0;
        let mut patches_drawn = 0;
        {
            let mut pass = encoder.begin_render_pass(&pass_descriptor);
            pass.set_pipeline(fill_pipeline);
            pass.set_uniforms(&uniforms);
            bind_surface_textures(pass.as_mut(), &strategy, &model.ptex);
            let counts = encode_fill(pass.as_mut(), &strategy, model, refinement)?;
            draw_calls += counts.draw_calls;
            patches_drawn += counts.patches;
            draw_calls += encode_overlays(pass.as_mut(), &overlay_pipelines, model);
        }

        self.frame_count += 1;
        let stats = FrameStats {
            frame_number: self.frame_count,
            draw_calls,
            patches_drawn,
            cpu_encode_time_ms: started.elapsed().as_secs_f32() * 1000.0,
            strategy_reused,
            downgraded: strategy.was_downgraded(),
        };
        if strategy.pipeline_key.tessellation == TessellationMode::Device {
            log::trace!(
                "Frame {}: {patches_drawn} patches through the device path",
                self.frame_count
            );
        }
        self.last_stats = stats.clone();
        Ok(stats)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("camera", &self.camera)
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("capabilities", &self.capabilities)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}
