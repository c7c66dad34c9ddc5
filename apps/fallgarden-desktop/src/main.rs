use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use fallgarden_input::{Action, CameraMovement, HeldMovement};
use fallgarden_lighting::{FrameLighting, LightingRig};
use fallgarden_persist::ProgramState;
use fallgarden_render::{CameraView, SCREEN_HEIGHT, SCREEN_WIDTH, SceneAssets, SceneSession};
use fallgarden_render_wgpu::{FlyCamera, ProxyBackend, WgpuRenderer};
use fallgarden_tools::SceneInspector;
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "fallgarden-desktop", about = "Garden scene with a one-shot lighting event")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding shaders, objects and textures
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Session state file, read at startup and written at exit
    #[arg(long, default_value = "resources/program_state.txt")]
    state_file: PathBuf,
}

/// Translate a key transition into an action.
fn action_for_key(key: KeyCode, pressed: bool) -> Action {
    let direction = match key {
        KeyCode::KeyW => CameraMovement::Forward,
        KeyCode::KeyS => CameraMovement::Backward,
        KeyCode::KeyA => CameraMovement::Left,
        KeyCode::KeyD => CameraMovement::Right,
        KeyCode::F1 if pressed => return Action::ToggleOverlay,
        KeyCode::Escape if pressed => return Action::Quit,
        _ => return Action::Noop,
    };
    Action::Move { direction, pressed }
}

fn action_for_scroll(delta: MouseScrollDelta) -> Action {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => Action::Zoom(y),
        MouseScrollDelta::PixelDelta(p) => Action::Zoom(p.y as f32 / 20.0),
    }
}

/// Application state.
struct AppState {
    session: SceneSession,
    backend: ProxyBackend,
    camera: FlyCamera,
    held: HeldMovement,
    clear_color: Vec3,
    overlay_enabled: bool,
    camera_mouse_update: bool,
    lighting: Option<FrameLighting>,
    state_file: PathBuf,
    start: Instant,
    last_frame: Instant,
}

impl AppState {
    fn new(resources: PathBuf, state_file: PathBuf) -> Result<Self> {
        let saved = ProgramState::load(&state_file).unwrap_or_else(|e| {
            tracing::warn!("ignoring state file {}: {e}", state_file.display());
            ProgramState::default()
        });

        let mut backend = ProxyBackend::new();
        let assets = SceneAssets::load(&mut backend, &resources)
            .with_context(|| format!("loading scene from {}", resources.display()))?;
        let session = SceneSession::new(assets, LightingRig::new());

        let now = Instant::now();
        Ok(Self {
            session,
            backend,
            camera: FlyCamera::from_pose(saved.camera_position, saved.camera_front),
            held: HeldMovement::new(),
            clear_color: saved.clear_color,
            overlay_enabled: saved.overlay_enabled,
            camera_mouse_update: !saved.overlay_enabled,
            lighting: None,
            state_file,
            start: now,
            last_frame: now,
        })
    }

    /// Apply an action. Returns `true` when the program should quit.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Move { direction, pressed } => self.held.set(direction, pressed),
            Action::Look { dx, dy } => {
                if self.camera_mouse_update {
                    self.camera.process_mouse_movement(dx, dy);
                }
            }
            Action::Zoom(dy) => self.camera.process_scroll(dy),
            Action::ToggleOverlay => {
                self.overlay_enabled = !self.overlay_enabled;
                self.camera_mouse_update = !self.overlay_enabled;
                tracing::debug!(overlay = self.overlay_enabled, "overlay toggled");
            }
            Action::Quit => return true,
            Action::Noop => {}
        }
        false
    }

    /// Drop held movement keys; their releases go to another window.
    fn focus_lost(&mut self) {
        self.held.clear();
    }

    fn update(&mut self, dt: f32) {
        let scale = self.held.step_scale();
        for direction in self.held.active() {
            self.camera.process_keyboard(direction, dt, scale);
        }
    }

    /// Submit the scene for time `now` into the proxy backend.
    fn render_scene(&mut self, aspect: f32) {
        let now = self.start.elapsed().as_secs_f32();
        let view = CameraView {
            position: self.camera.position,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect),
        };
        let lighting = self
            .session
            .render_frame(&mut self.backend, now, &view, self.clear_color);
        self.lighting = Some(lighting);
    }

    fn to_program_state(&self) -> ProgramState {
        ProgramState {
            clear_color: self.clear_color,
            overlay_enabled: self.overlay_enabled,
            camera_position: self.camera.position,
            camera_front: self.camera.front(),
        }
    }

    fn save(&self) {
        if let Err(e) = self.to_program_state().save(&self.state_file) {
            tracing::error!("failed to save {}: {e}", self.state_file.display());
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.overlay_enabled {
            return;
        }

        egui::SidePanel::left("overlay")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Garden");
                ui.separator();

                let mut color = self.clear_color.to_array();
                ui.horizontal(|ui| {
                    ui.label("Clear color");
                    ui.color_edit_button_rgb(&mut color);
                });
                self.clear_color = Vec3::from(color);

                ui.separator();
                ui.label("Point light attenuation");
                let point = self.session.rig_mut().point_light_mut();
                ui.add(egui::Slider::new(&mut point.constant, 0.0..=1.0).text("constant"));
                ui.add(egui::Slider::new(&mut point.linear, 0.0..=1.0).text("linear"));
                ui.add(egui::Slider::new(&mut point.quadratic, 0.0..=1.0).text("quadratic"));

                ui.separator();
                let p = self.camera.position;
                let f = self.camera.front();
                ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}  Zoom: {:.1}",
                    self.camera.yaw, self.camera.pitch, self.camera.zoom
                ));
                ui.label(format!("Front: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
                ui.checkbox(&mut self.camera_mouse_update, "Camera mouse update");

                if let Some(lighting) = &self.lighting {
                    ui.separator();
                    let summary = SceneInspector::summary(&self.session, lighting);
                    ui.label(format!("Instances: {}", summary.instances));
                    match summary.trigger_time {
                        Some(at) => ui.label(format!("Event: triggered at {at:.2}s")),
                        None => ui.label("Event: dormant"),
                    };
                    ui.label(format!("Coef: {:.3}", summary.coef));
                }

                ui.separator();
                ui.small("F1: Toggle Overlay | WASD: Move | Esc: Quit");
            });
    }
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Fall Garden")
            .with_inner_size(PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fallgarden_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Capture the cursor for mouse look, or release it for the overlay.
    fn capture_cursor(&self, captured: bool) {
        let result = if captured {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = result {
            tracing::debug!("cursor grab unavailable: {e}");
        }
        self.window.set_cursor_visible(!captured);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            fatal: None,
        }
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        let overlay_before = self.state.overlay_enabled;
        if self.state.apply(action) {
            event_loop.exit();
        }
        if self.state.overlay_enabled != overlay_before {
            if let Some(gpu) = &self.gpu {
                gpu.capture_cursor(!self.state.overlay_enabled);
            }
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.state.render_scene(gpu.aspect());
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, self.state.backend.frame());

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                gpu.capture_cursor(!self.state.overlay_enabled);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed && self.state.overlay_enabled {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => self.state.focus_lost(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let action = action_for_key(key, key_state == ElementState::Pressed);
                self.apply(event_loop, action);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.apply(event_loop, action_for_scroll(delta));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            // Window y grows downwards; look offsets grow upwards.
            let action = Action::Look {
                dx: delta.0 as f32,
                dy: -delta.1 as f32,
            };
            self.apply(event_loop, action);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("fallgarden-desktop starting");

    let state = AppState::new(cli.resources, cli.state_file)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.fatal {
        return Err(e);
    }
    app.state.save();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallgarden_scene::Species;

    #[test]
    fn wasd_maps_to_movement() {
        assert_eq!(
            action_for_key(KeyCode::KeyW, true),
            Action::Move {
                direction: CameraMovement::Forward,
                pressed: true
            }
        );
        assert_eq!(
            action_for_key(KeyCode::KeyD, false),
            Action::Move {
                direction: CameraMovement::Right,
                pressed: false
            }
        );
    }

    #[test]
    fn toggles_fire_on_press_only() {
        assert_eq!(action_for_key(KeyCode::F1, true), Action::ToggleOverlay);
        assert_eq!(action_for_key(KeyCode::F1, false), Action::Noop);
        assert_eq!(action_for_key(KeyCode::Escape, true), Action::Quit);
        assert_eq!(action_for_key(KeyCode::KeyQ, true), Action::Noop);
    }

    fn app_state(saved: Option<ProgramState>) -> (tempfile::TempDir, AppState) {
        let tmp = tempfile::tempdir().unwrap();
        for species in Species::ALL {
            let path = tmp.path().join(species.model_path());
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"").unwrap();
        }
        let state_file = tmp.path().join("program_state.txt");
        if let Some(saved) = saved {
            saved.save(&state_file).unwrap();
        }
        let state = AppState::new(tmp.path().to_path_buf(), state_file).unwrap();
        (tmp, state)
    }

    #[test]
    fn overlay_toggle_gates_mouse_look() {
        let (_tmp, mut state) = app_state(None);
        assert!(!state.overlay_enabled);
        assert!(state.camera_mouse_update);

        assert!(!state.apply(Action::ToggleOverlay));
        assert!(state.overlay_enabled);
        assert!(!state.camera_mouse_update);

        let (yaw, pitch) = (state.camera.yaw, state.camera.pitch);
        state.apply(Action::Look { dx: 40.0, dy: 25.0 });
        assert_eq!((state.camera.yaw, state.camera.pitch), (yaw, pitch));

        state.apply(Action::ToggleOverlay);
        assert!(!state.overlay_enabled);
        assert!(state.camera_mouse_update);
        state.apply(Action::Look { dx: 40.0, dy: 25.0 });
        assert_ne!(state.camera.yaw, yaw);
        assert_ne!(state.camera.pitch, pitch);
    }

    #[test]
    fn quit_action_requests_exit() {
        let (_tmp, mut state) = app_state(None);
        assert!(state.apply(Action::Quit));
        assert!(!state.apply(Action::Noop));
    }

    #[test]
    fn saved_overlay_starts_with_mouse_look_off() {
        let saved = ProgramState {
            overlay_enabled: true,
            ..ProgramState::default()
        };
        let (_tmp, state) = app_state(Some(saved));
        assert!(state.overlay_enabled);
        assert!(!state.camera_mouse_update);
    }

    #[test]
    fn program_state_carries_camera_pose() {
        let (_tmp, mut state) = app_state(None);
        state.clear_color = Vec3::new(0.1, 0.2, 0.3);
        state.apply(Action::ToggleOverlay);
        state.apply(Action::Move {
            direction: CameraMovement::Forward,
            pressed: true,
        });
        state.update(0.5);

        let saved = state.to_program_state();
        assert_eq!(saved.camera_position, state.camera.position);
        assert_eq!(saved.camera_front, state.camera.front());
        assert_eq!(saved.clear_color, Vec3::new(0.1, 0.2, 0.3));
        assert!(saved.overlay_enabled);
        assert_ne!(saved.camera_position, ProgramState::default().camera_position);

        state.save();
        let reloaded = ProgramState::load(&state.state_file).unwrap();
        assert!(reloaded.overlay_enabled);
        assert!(reloaded.camera_position.abs_diff_eq(saved.camera_position, 1e-4));
        assert!(reloaded.camera_front.abs_diff_eq(saved.camera_front, 1e-4));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let (_tmp, mut state) = app_state(None);
        state.apply(Action::Move {
            direction: CameraMovement::Left,
            pressed: true,
        });
        state.focus_lost();
        let before = state.camera.position;
        state.update(0.5);
        assert_eq!(state.camera.position, before);
    }

    #[test]
    fn scroll_lines_zoom() {
        assert_eq!(
            action_for_scroll(MouseScrollDelta::LineDelta(0.0, 2.0)),
            Action::Zoom(2.0)
        );
    }
}
