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

//! End-to-end tests for one frame's command sequence, driven through a
//! recording encoder and stub delegate/store implementations.

use std::any::Any;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tessella_core::capability::{CapabilitySet, GpuFeature};
use tessella_core::color::LinearRgba;
use tessella_core::command::{
    ColorAttachmentDesc, CommandBufferId, CommandEncoder, CommandQueue, LoadOp, Operations,
    RenderPass, StoreOp, SurfacePassDescriptor, TextureSlot,
};
use tessella_core::delegate::{GraphicsDevice, RenderDelegate};
use tessella_core::error::{FrameError, ResolveError, ResourceError};
use tessella_core::handle::{BufferId, ShaderModuleId, TextureId, TextureViewId};
use tessella_core::model::{
    GpuModel, LineMesh, ModelStore, PatchBatch, PatchKind, PtexBindings, RefinedMesh,
};
use tessella_core::options::{ColorMode, EndCapMode, RenderOptions, TessellationMode};
use tessella_core::pipeline::{
    DepthStencilStateDescriptor, IndexFormat, PipelineKey, RenderPipelineDescriptor,
    RenderPipelineId,
};
use tessella_core::uniforms::SurfaceUniforms;
use tessella_lanes::Renderer;

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    BeginPass,
    SetPipeline(usize),
    SetUniforms(Box<SurfaceUniforms>),
    BindTexture(TextureSlot, u64),
    SetVertexBuffer(u32, u64),
    SetIndexBuffer(u64),
    Draw(u32),
    DrawIndexed(u32),
    DrawPatches(u32, u32),
}

#[derive(Default)]
struct RecordingEncoder {
    commands: Vec<Recorded>,
}

struct RecordingPass<'a> {
    commands: &'a mut Vec<Recorded>,
}

impl<'a> RenderPass<'a> for RecordingPass<'a> {
    fn set_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.commands.push(Recorded::SetPipeline(pipeline.0));
    }

    fn set_uniforms(&mut self, uniforms: &SurfaceUniforms) {
        self.commands.push(Recorded::SetUniforms(Box::new(*uniforms)));
    }

    fn bind_texture(&mut self, slot: TextureSlot, texture: TextureId) {
        self.commands.push(Recorded::BindTexture(slot, texture.0));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId, _offset: u64) {
        self.commands.push(Recorded::SetVertexBuffer(slot, buffer.0));
    }

    fn set_index_buffer(&mut self, buffer: BufferId, _offset: u64, _index_format: IndexFormat) {
        self.commands.push(Recorded::SetIndexBuffer(buffer.0));
    }

    fn draw(&mut self, vertices: Range<u32>, _instances: Range<u32>) {
        self.commands.push(Recorded::Draw(vertices.end));
    }

    fn draw_indexed(&mut self, indices: Range<u32>, _base_vertex: i32, _instances: Range<u32>) {
        self.commands.push(Recorded::DrawIndexed(indices.end));
    }

    fn draw_patches(&mut self, patch_count: u32, control_points: u32) {
        self.commands
            .push(Recorded::DrawPatches(patch_count, control_points));
    }
}

impl CommandEncoder for RecordingEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        _descriptor: &SurfacePassDescriptor,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder> {
        self.commands.push(Recorded::BeginPass);
        Box::new(RecordingPass {
            commands: &mut self.commands,
        })
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        CommandBufferId(0)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Default)]
struct StubDevice {
    fail_pipelines: bool,
    cache: Mutex<HashMap<PipelineKey, RenderPipelineId>>,
    next_id: AtomicUsize,
}

impl GraphicsDevice for StubDevice {
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        if self.fail_pipelines {
            return Err(ResourceError::PipelineCreationFailed {
                label: descriptor.label.clone(),
                details: "stub device refuses pipelines".to_string(),
            });
        }
        let mut cache = self.cache.lock().unwrap();
        if let Some(id) = cache.get(&descriptor.key) {
            return Ok(*id);
        }
        let id = RenderPipelineId(self.next_id.fetch_add(1, Ordering::Relaxed));
        cache.insert(descriptor.key, id);
        Ok(id)
    }

    fn write_buffer(
        &self,
        _buffer: BufferId,
        _offset: u64,
        _data: &[u8],
    ) -> Result<(), ResourceError> {
        Ok(())
    }
}

struct NullQueue;

impl CommandQueue for NullQueue {
    fn submit(&self, _buffer: CommandBufferId) {}
}

struct StubDelegate {
    device: Arc<StubDevice>,
    caps: CapabilitySet,
    fail_pass: bool,
}

impl StubDelegate {
    fn new(caps: CapabilitySet) -> Self {
        Self {
            device: Arc::new(StubDevice::default()),
            caps,
            fail_pass: false,
        }
    }
}

impl RenderDelegate for StubDelegate {
    fn device(&self) -> Arc<dyn GraphicsDevice> {
        self.device.clone()
    }

    fn command_queue(&self) -> Arc<dyn CommandQueue> {
        Arc::new(NullQueue)
    }

    fn capabilities(&self) -> CapabilitySet {
        self.caps
    }

    fn render_pass_descriptor(&self) -> Result<SurfacePassDescriptor, FrameError> {
        if self.fail_pass {
            return Err(FrameError::PassUnavailable("surface lost".to_string()));
        }
        Ok(SurfacePassDescriptor {
            label: Some("test-frame".to_string()),
            color: ColorAttachmentDesc {
                view: TextureViewId(1),
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(LinearRgba::CHARCOAL),
                    store: StoreOp::Store,
                },
            },
            depth_stencil: None,
        })
    }

    fn customize_depth_stencil(&self, _descriptor: &mut DepthStencilStateDescriptor) {}

    fn customize_pipeline(&self, descriptor: &mut RenderPipelineDescriptor) {
        descriptor.vertex_shader = Some(ShaderModuleId(1));
        descriptor.fragment_shader = Some(ShaderModuleId(2));
    }
}

struct StubStore {
    models: HashMap<String, GpuModel>,
}

impl StubStore {
    fn with_cube() -> Self {
        let refined = (0..3u64)
            .map(|level| RefinedMesh {
                vertex_buffer: BufferId(10 + level * 2),
                index_buffer: BufferId(11 + level * 2),
                index_count: 36 * (level as u32 + 1),
                index_format: IndexFormat::Uint32,
            })
            .collect();
        let line_mesh = |base: u64| LineMesh {
            vertex_buffer: BufferId(base),
            index_buffer: BufferId(base + 1),
            index_count: 24,
            index_format: IndexFormat::Uint32,
        };
        let cube = GpuModel {
            name: "cube".to_string(),
            control_vertex_buffer: BufferId(1),
            patch_batches: vec![
                PatchBatch {
                    kind: PatchKind::Regular,
                    index_buffer: BufferId(40),
                    patch_count: 100,
                    control_points_per_patch: 16,
                },
                PatchBatch {
                    kind: PatchKind::SingleCrease,
                    index_buffer: BufferId(41),
                    patch_count: 12,
                    control_points_per_patch: 16,
                },
                PatchBatch {
                    kind: PatchKind::EndCap,
                    index_buffer: BufferId(42),
                    patch_count: 8,
                    control_points_per_patch: 20,
                },
            ],
            refined,
            wireframe_edges: Some(line_mesh(50)),
            control_edges: Some(line_mesh(52)),
            bezier_edges: Some(line_mesh(54)),
            ptex: PtexBindings {
                color: Some(TextureId(70)),
                displacement: Some(TextureId(71)),
                occlusion: Some(TextureId(72)),
                specular: None,
            },
        };
        let mut models = HashMap::new();
        models.insert("cube".to_string(), cube);
        Self { models }
    }
}

impl ModelStore for StubStore {
    fn model(&self, name: &str) -> Option<&GpuModel> {
        self.models.get(name)
    }
}

fn renderer_with(caps: CapabilitySet) -> Renderer {
    let delegate = Arc::new(StubDelegate::new(caps));
    let store = Arc::new(StubStore::with_cube());
    let mut renderer = Renderer::new(delegate, store);
    renderer.register_model("cube");
    renderer.set_current_model("cube").unwrap();
    renderer
}

fn encode_one(renderer: &mut Renderer) -> (Result<(), FrameError>, Vec<Recorded>) {
    let mut encoder = RecordingEncoder::default();
    let result = renderer.draw_frame(&mut encoder).map(|_| ());
    (result, encoder.commands)
}

#[test]
fn identical_frames_encode_identical_commands() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    let mut options = renderer.options().clone();
    options.wireframe = true;
    renderer.set_options(options);

    let mut first = RecordingEncoder::default();
    let stats_first = renderer.draw_frame(&mut first).unwrap();
    let mut second = RecordingEncoder::default();
    let stats_second = renderer.draw_frame(&mut second).unwrap();

    assert_eq!(first.commands, second.commands);
    assert!(!stats_first.strategy_reused);
    assert!(stats_second.strategy_reused);
}

#[test]
fn overlays_are_encoded_strictly_after_the_fill() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    let mut options = renderer.options().clone();
    options.wireframe = true;
    options.control_edges = true;
    options.bezier_edges = true;
    renderer.set_options(options);

    let (result, commands) = encode_one(&mut renderer);
    result.unwrap();

    let draw_positions: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Recorded::DrawIndexed(_)))
        .map(|(i, _)| i)
        .collect();
    // One fill draw plus three overlay draws.
    assert_eq!(draw_positions.len(), 4);

    let pipeline_positions: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Recorded::SetPipeline(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(pipeline_positions.len(), 4);

    // The fill draw precedes every overlay pipeline bind, so no overlay
    // line work can be occluded by a later fill.
    let fill_draw = draw_positions[0];
    for overlay_bind in &pipeline_positions[1..] {
        assert!(fill_draw < *overlay_bind);
    }
}

#[test]
fn uniforms_are_bound_after_the_fill_pipeline_and_before_any_draw() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    let (result, commands) = encode_one(&mut renderer);
    result.unwrap();

    let pipeline = commands
        .iter()
        .position(|c| matches!(c, Recorded::SetPipeline(_)))
        .unwrap();
    let uniforms = commands
        .iter()
        .position(|c| matches!(c, Recorded::SetUniforms(_)))
        .unwrap();
    let first_draw = commands
        .iter()
        .position(|c| matches!(c, Recorded::DrawIndexed(_) | Recorded::DrawPatches(_, _)))
        .unwrap();
    assert!(pipeline < uniforms);
    assert!(uniforms < first_draw);
}

#[test]
fn pipeline_failure_aborts_before_any_command_is_recorded() {
    let mut delegate = StubDelegate::new(CapabilitySet::host_only());
    Arc::get_mut(&mut delegate.device).unwrap().fail_pipelines = true;
    let store = Arc::new(StubStore::with_cube());
    let mut renderer = Renderer::new(Arc::new(delegate), store);
    renderer.register_model("cube");
    renderer.set_current_model("cube").unwrap();

    let (result, commands) = encode_one(&mut renderer);
    assert!(matches!(result, Err(FrameError::Pipeline(_))));
    assert!(commands.is_empty());
}

#[test]
fn pass_failure_aborts_before_any_command_is_recorded() {
    let mut delegate = StubDelegate::new(CapabilitySet::host_only());
    delegate.fail_pass = true;
    let store = Arc::new(StubStore::with_cube());
    let mut renderer = Renderer::new(Arc::new(delegate), store);
    renderer.register_model("cube");
    renderer.set_current_model("cube").unwrap();

    let (result, commands) = encode_one(&mut renderer);
    assert!(matches!(result, Err(FrameError::PassUnavailable(_))));
    assert!(commands.is_empty());
}

#[test]
fn drawing_without_a_selection_fails_cleanly() {
    let delegate = Arc::new(StubDelegate::new(CapabilitySet::host_only()));
    let store = Arc::new(StubStore::with_cube());
    let mut renderer = Renderer::new(delegate, store);

    let (result, commands) = encode_one(&mut renderer);
    assert!(matches!(result, Err(FrameError::NoModelSelected)));
    assert!(commands.is_empty());
}

#[test]
fn drawing_an_unloaded_model_fails_cleanly() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    renderer.register_model("ghost");
    renderer.set_current_model("ghost").unwrap();

    let (result, commands) = encode_one(&mut renderer);
    assert!(matches!(result, Err(FrameError::ModelNotLoaded { name }) if name == "ghost"));
    assert!(commands.is_empty());
}

#[test]
fn minimal_fast_path_frame_binds_no_textures() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    renderer.set_options(RenderOptions {
        tessellation_mode: TessellationMode::Host,
        end_cap_mode: EndCapMode::None,
        refinement_level: 0,
        color_mode: ColorMode::None,
        ..RenderOptions::default()
    });

    let strategy = renderer.resolve_strategy().unwrap();
    assert!(strategy.pipeline_key.fast_path);

    let (result, commands) = encode_one(&mut renderer);
    result.unwrap();
    assert!(!commands
        .iter()
        .any(|c| matches!(c, Recorded::BindTexture(_, _))));
    let draws = commands
        .iter()
        .filter(|c| matches!(c, Recorded::DrawIndexed(_)))
        .count();
    assert_eq!(draws, 1);
}

#[test]
fn device_tessellation_without_the_stage_fails_naming_it() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    renderer.set_options(RenderOptions {
        tessellation_mode: TessellationMode::Device,
        ..RenderOptions::default()
    });

    let (result, commands) = encode_one(&mut renderer);
    match result {
        Err(FrameError::Resolve(ResolveError::UnsupportedConfiguration { feature })) => {
            assert_eq!(feature, GpuFeature::TessellationStage);
            assert_eq!(feature.name(), "tessellation-stage");
        }
        other => panic!("expected unsupported-configuration, got {other:?}"),
    }
    assert!(commands.is_empty());
}

#[test]
fn device_path_draws_patch_batches_and_skips_end_caps_when_disabled() {
    let mut renderer = renderer_with(CapabilitySet::full());
    renderer.set_options(RenderOptions {
        tessellation_mode: TessellationMode::Device,
        ..RenderOptions::default()
    });

    let mut encoder = RecordingEncoder::default();
    let stats = renderer.draw_frame(&mut encoder).unwrap();
    let patch_draws: Vec<&Recorded> = encoder
        .commands
        .iter()
        .filter(|c| matches!(c, Recorded::DrawPatches(_, _)))
        .collect();
    // Regular + single-crease + end-cap batches.
    assert_eq!(patch_draws.len(), 3);
    assert_eq!(stats.patches_drawn, 100 + 12 + 8);

    renderer.set_options(RenderOptions {
        tessellation_mode: TessellationMode::Device,
        end_cap_mode: EndCapMode::None,
        ..RenderOptions::default()
    });
    let mut encoder = RecordingEncoder::default();
    let stats = renderer.draw_frame(&mut encoder).unwrap();
    let patch_draws = encoder
        .commands
        .iter()
        .filter(|c| matches!(c, Recorded::DrawPatches(_, _)))
        .count();
    assert_eq!(patch_draws, 2);
    assert_eq!(stats.patches_drawn, 100 + 12);
}

#[test]
fn option_changes_invalidate_the_cached_strategy() {
    let mut renderer = renderer_with(CapabilitySet::host_only());

    let mut encoder = RecordingEncoder::default();
    assert!(!renderer.draw_frame(&mut encoder).unwrap().strategy_reused);

    let mut options = renderer.options().clone();
    options.wireframe = true;
    renderer.set_options(options.clone());
    let mut encoder = RecordingEncoder::default();
    assert!(!renderer.draw_frame(&mut encoder).unwrap().strategy_reused);

    // Re-assigning an identical value keeps the cache warm.
    renderer.set_options(options);
    let mut encoder = RecordingEncoder::default();
    assert!(renderer.draw_frame(&mut encoder).unwrap().strategy_reused);
}

#[test]
fn textured_shading_binds_color_and_optional_extras() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    renderer.set_options(RenderOptions {
        color_mode: ColorMode::TextureBilinear,
        color_texture: "assets/cube_color.ptx".to_string(),
        ..RenderOptions::default()
    });

    let (result, commands) = encode_one(&mut renderer);
    result.unwrap();
    assert!(commands
        .iter()
        .any(|c| matches!(c, Recorded::BindTexture(TextureSlot::Color, 70))));
    // Occlusion rides along because the store carries it; specular is
    // absent from the store and never bound.
    assert!(commands
        .iter()
        .any(|c| matches!(c, Recorded::BindTexture(TextureSlot::Occlusion, 72))));
    assert!(!commands
        .iter()
        .any(|c| matches!(c, Recorded::BindTexture(TextureSlot::Specular, _))));

    // The binds happen before the fill draw.
    let first_bind = commands
        .iter()
        .position(|c| matches!(c, Recorded::BindTexture(_, _)))
        .unwrap();
    let fill_draw = commands
        .iter()
        .position(|c| matches!(c, Recorded::DrawIndexed(_)))
        .unwrap();
    assert!(first_bind < fill_draw);
}

#[test]
fn missing_color_reference_surfaces_as_missing_resource() {
    let mut renderer = renderer_with(CapabilitySet::host_only());
    renderer.set_options(RenderOptions {
        color_mode: ColorMode::TextureBilinear,
        color_texture: String::new(),
        ..RenderOptions::default()
    });

    let (result, commands) = encode_one(&mut renderer);
    match result {
        Err(FrameError::Resolve(ResolveError::MissingResource { resource })) => {
            assert_eq!(resource.name(), "color texture");
        }
        other => panic!("expected missing-resource, got {other:?}"),
    }
    assert!(commands.is_empty());
}
