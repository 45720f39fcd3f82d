use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod cli;
mod error;
mod mesh;
mod renderer;
mod ui;

use cli::{Cli, initialize_tracing};
use error::{ViewerError, ViewerResult};
use mesh::{MeshFormat, MeshLoader};
use renderer::interaction::screen_point;
use renderer::{GpuState, Scene, TransformController};
use ui::{MeshInfo, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct FrameStats {
    frame_count: u32,
    fps_timer: Instant,
    fps: f32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    loader: Option<MeshLoader>,
    scene: Option<Scene>,
    mesh_info: Option<MeshInfo>,
    controller: Option<TransformController>,
    ui_state: UiState,

    cursor: Vec2,
    stats: FrameStats,
    fatal: Option<ViewerError>,
}

impl App {
    fn new(loader: MeshLoader) -> Self {
        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            loader: Some(loader),
            scene: None,
            mesh_info: None,
            controller: None,
            ui_state: UiState::default(),

            cursor: Vec2::ZERO,
            stats: FrameStats::new(),
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> ViewerResult<()> {
        let window_attrs = Window::default_attributes()
            .with_title("meshview")
            .with_inner_size(PhysicalSize::new(1280, 800));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = pollster::block_on(GpuState::new(window.clone()))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);
        apply_theme(&self.egui_ctx);

        // projection is fixed to the startup viewport
        self.controller = Some(TransformController::new(gpu.config.width, gpu.config.height));
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Builds the scene once the loader delivers. Returns whether it did.
    fn poll_loader(&mut self) -> ViewerResult<bool> {
        let (Some(loader), Some(gpu)) = (&self.loader, &self.gpu) else {
            return Ok(false);
        };
        let Some(result) = loader.try_recv() else {
            return Ok(false);
        };
        self.loader = None;

        let loaded = result?;
        let scene = Scene::new(gpu, &loaded)?;
        self.mesh_info = Some(MeshInfo::from_loaded(&loaded));
        self.scene = Some(scene);
        Ok(true)
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Self {
            window: Some(window),
            gpu: Some(gpu),
            egui_state: Some(egui_state),
            egui_renderer: Some(egui_renderer),
            scene: Some(scene),
            mesh_info: Some(mesh_info),
            controller: Some(controller),
            ..
        } = self
        else {
            return;
        };

        self.stats.tick();

        let raw_input = egui_state.take_egui_input(window);
        let fps = self.stats.fps;
        let rotation = controller.rotation();
        let dragging = controller.interaction.is_dragging();
        let ui_state = &mut self.ui_state;
        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, ui_state, mesh_info, fps);
            draw_help_overlay(ctx, rotation, dragging);
        });

        if ui_actions.toggle_interior {
            ui_state.toggle_interior();
        }

        egui_state.handle_platform_output(window, full_output.platform_output);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                gpu.resize(gpu.size);
                window.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        scene.render_frame(
            gpu,
            controller,
            ui_state.show_only_interior,
            &view,
            &mut encoder,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_pointer(&mut self, event: &WindowEvent, egui_consumed: bool) {
        let (Some(controller), Some(window)) = (&mut self.controller, &self.window) else {
            return;
        };
        let interaction = &mut controller.interaction;
        let scale_factor = window.scale_factor();

        match *event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed if !egui_consumed => interaction.pointer_down(self.cursor),
                ElementState::Pressed => {}
                ElementState::Released => interaction.pointer_up(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = screen_point(position, scale_factor);
                interaction.pointer_move(self.cursor);
            }
            WindowEvent::CursorLeft { .. } => interaction.pointer_up(),
            WindowEvent::Touch(Touch {
                phase,
                location,
                id,
                ..
            }) => {
                let position = screen_point(location, scale_factor);
                match phase {
                    TouchPhase::Started if !egui_consumed => interaction.touch_start(id, position),
                    TouchPhase::Started => {}
                    TouchPhase::Moved => interaction.touch_move(id, position),
                    TouchPhase::Ended | TouchPhase::Cancelled => interaction.touch_end(id),
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_gpu(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let mut egui_consumed = false;
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            egui_consumed = egui_state.on_window_event(window, &event).consumed;
        }

        self.handle_pointer(&event, egui_consumed);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.render(event_loop),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }

        match self.poll_loader() {
            Ok(true) => {
                // frames now reschedule themselves
                event_loop.set_control_flow(ControlFlow::Wait);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Ok(false) => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(
                    Instant::now() + LOAD_POLL_INTERVAL,
                ));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }
}

fn run(cli: Cli) -> ViewerResult<()> {
    let format = MeshFormat::from_path(&cli.mesh)?;
    let loader = MeshLoader::spawn(cli.mesh, format)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(loader);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_filter, cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
