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

//! Interactive subdivision-surface viewer.
//!
//! Controls: drag to orbit, scroll to dolly, Tab cycles models,
//! W/E/B toggle the wireframe/control-edge/Bezier-edge overlays,
//! Up/Down change the refinement level.

mod models;

use anyhow::{Context, Result};
use std::sync::Arc;
use tessella_core::command::CommandEncoder;
use tessella_core::delegate::RenderDelegate;
use tessella_infra::{WgpuCommandEncoder, WindowedDelegate};
use tessella_lanes::Renderer;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const SURFACE_SHADER: &str = include_str!("shaders/surface.wgsl");

struct ViewerState {
    window: Arc<Window>,
    delegate: Arc<WindowedDelegate>,
    renderer: Renderer,
    model_names: Vec<String>,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl ViewerState {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("Tessella Viewer")
            .with_inner_size(LogicalSize::new(1280u32, 800u32));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let delegate = Arc::new(WindowedDelegate::new(window.clone())?);
        let shader = delegate
            .surface_device()
            .register_shader_module("tessella.surface-shader", SURFACE_SHADER);
        delegate.set_surface_shaders(shader, shader);

        let store = Arc::new(models::build_store(delegate.surface_device()));
        let model_names = store.names();
        let mut renderer = Renderer::new(delegate.clone(), store);
        for name in &model_names {
            renderer.register_model(name.clone());
        }
        if let Some(first) = model_names.first() {
            renderer.set_current_model(first)?;
        }
        let size = window.inner_size();
        renderer
            .camera_mut()
            .set_aspect_from_surface(size.width, size.height);

        Ok(Self {
            window,
            delegate,
            renderer,
            model_names,
            dragging: false,
            last_cursor: None,
        })
    }

    fn render(&mut self) {
        let mut encoder =
            WgpuCommandEncoder::new(self.delegate.surface_device(), Some("tessella.frame"));
        match self.renderer.draw_frame(&mut encoder) {
            Ok(stats) => {
                let buffer = Box::new(encoder).finish();
                self.delegate.command_queue().submit(buffer);
                self.delegate.present();
                if stats.frame_number % 600 == 0 {
                    log::debug!(
                        "Frame {}: {} draws, encoded in {:.2} ms",
                        stats.frame_number,
                        stats.draw_calls,
                        stats.cpu_encode_time_ms
                    );
                }
            }
            Err(err) => {
                // Recoverable at frame granularity: skip and retry.
                log::error!("Frame skipped: {err}");
            }
        }
    }

    fn cycle_model(&mut self) {
        let Some(current) = self.renderer.current_model() else {
            return;
        };
        let index = self
            .model_names
            .iter()
            .position(|name| name == current)
            .unwrap_or(0);
        let next = self.model_names[(index + 1) % self.model_names.len()].clone();
        if let Err(err) = self.renderer.set_current_model(&next) {
            log::error!("Model selection failed: {err}");
        } else {
            log::info!("Model: {next}");
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let mut options = self.renderer.options().clone();
        match code {
            KeyCode::Tab => {
                self.cycle_model();
                return;
            }
            KeyCode::KeyW => options.wireframe = !options.wireframe,
            KeyCode::KeyE => options.control_edges = !options.control_edges,
            KeyCode::KeyB => options.bezier_edges = !options.bezier_edges,
            KeyCode::ArrowUp => options.refinement_level += 1,
            KeyCode::ArrowDown => {
                options.refinement_level = options.refinement_level.saturating_sub(1);
            }
            _ => return,
        }
        self.renderer.set_options(options);
    }
}

#[derive(Default)]
struct ViewerApp {
    state: Option<ViewerState>,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            match ViewerState::new(event_loop) {
                Ok(state) => {
                    state.window.request_redraw();
                    self.state = Some(state);
                }
                Err(err) => {
                    log::error!("Viewer initialization failed: {err:#}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.delegate.resize(size.width, size.height);
                state
                    .renderer
                    .camera_mut()
                    .set_aspect_from_surface(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.render();
                state.window.request_redraw();
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                state.dragging = button_state == ElementState::Pressed;
                if !state.dragging {
                    state.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if state.dragging {
                    if let Some((last_x, last_y)) = state.last_cursor {
                        let camera = state.renderer.camera_mut();
                        let rotation_x = camera.rotation_x() + (position.y - last_y) as f32 * 0.4;
                        let rotation_y = camera.rotation_y() + (position.x - last_x) as f32 * 0.4;
                        camera.set_rotation(rotation_x, rotation_y);
                    }
                    state.last_cursor = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                };
                let camera = state.renderer.camera_mut();
                camera.set_dolly_distance(camera.dolly_distance() - amount * 0.5);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        state.handle_key(code);
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = ViewerApp::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
