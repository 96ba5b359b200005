//! Windowed application: the render-loop driver that owns the views.
//!
//! The driver constructs the controller and both views once at startup and
//! owns the single scheduler: winit's redraw cycle calls
//! [`PlaybackController::tick`] each frame while the controller reports
//! itself running. The scene renders continuously either way, so the orbit
//! camera stays interactive while playback is stopped.
//!
//! Input mapping: Space toggles playback, R resets, Escape quits; left-drag
//! orbits the camera and the scroll wheel zooms.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::playback::{PlaybackController, TickOutcome, TraceSink};
use crate::scene::{OverlayVertex, SceneConfig, SceneView, palette};
use crate::series::SampleSeries;
use crate::trace::{OverlayRect, TraceView};

/// Chart placement in normalized device coordinates (lower right)
const CHART_RECT: OverlayRect = OverlayRect {
    x: 0.28,
    y: -0.92,
    width: 0.64,
    height: 0.44,
};

/// Orbit/zoom input sensitivity
const ORBIT_SENSITIVITY: f64 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.5;

/// Keep the chart polyline under this many segments per frame
const MAX_CHART_SEGMENTS: usize = 30000;

/// Startup configuration for a playback session
pub struct PlayOptions {
    /// The solver result to play
    pub series: SampleSeries,
    /// Model name shown in the window title
    pub model_name: String,
    /// Mass magnitude; drives the block's visual scale
    pub mass: f64,
    /// Slider-derived rest position used before/without a series
    pub initial_position: f64,
    /// Start playback immediately instead of waiting for Space
    pub autoplay: bool,
}

/// Open the window and block until it closes
pub fn run(options: PlayOptions) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;
    match app.init_error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct Gfx {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    scene: SceneView,
}

struct App {
    options: PlayOptions,
    controller: PlaybackController,
    trace: TraceView,
    gfx: Option<Gfx>,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(options: PlayOptions) -> Self {
        let mut trace = TraceView::new();
        trace.set_full_data(options.series.times(), options.series.values());
        Self {
            options,
            controller: PlaybackController::new(),
            trace,
            gfx: None,
            dragging: false,
            last_cursor: None,
            init_error: None,
        }
    }

    fn init_gfx(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Gfx> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(format!("springscope - {}", self.options.model_name))
                    .with_inner_size(LogicalSize::new(1280.0, 800.0)),
            )?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;
        let (device, queue) = (Arc::new(device), Arc::new(queue));

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let scene = SceneView::new(
            device,
            queue,
            SceneConfig {
                width: surface_config.width,
                height: surface_config.height,
                format,
                ..SceneConfig::default()
            },
        );
        info!(
            width = surface_config.width,
            height = surface_config.height,
            "window and scene initialized"
        );
        Ok(Gfx {
            window,
            surface,
            surface_config,
            scene,
        })
    }

    fn toggle_playback(&mut self) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };
        if self.controller.is_running() {
            self.controller.stop();
            gfx.window
                .set_title(&format!("springscope - {}", self.options.model_name));
        } else {
            self.trace.reveal_none();
            self.controller
                .start(self.options.series.clone(), Instant::now());
        }
    }

    fn reset_playback(&mut self) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };
        self.controller
            .reset(&mut gfx.scene, &mut self.trace, self.options.initial_position);
        gfx.window
            .set_title(&format!("springscope - {}", self.options.model_name));
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        let now = Instant::now();
        if self.controller.is_running() {
            let elapsed = self.controller.elapsed(now);
            if self.controller.tick(now, &mut gfx.scene, &mut self.trace)
                == TickOutcome::Finished
            {
                info!("playback reached the end of the series");
            }
            if let Some(elapsed) = elapsed {
                gfx.window.set_title(&format!(
                    "springscope - {} - {elapsed:.2}s",
                    self.options.model_name
                ));
            }
        }

        let overlay = chart_overlay(&self.trace, &CHART_RECT);

        let frame = match gfx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.surface
                    .configure(gfx.scene.device(), &gfx.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                warn!("surface out of memory; closing");
                event_loop.exit();
                return;
            }
            Err(error) => {
                warn!(%error, "skipping frame");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gfx.scene.render(&view, &overlay);
        frame.present();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }
        match self.init_gfx(event_loop) {
            Ok(mut gfx) => {
                gfx.scene.set_mass_scale(self.options.mass);
                gfx.scene
                    .set_mass_position(self.options.series.first_value());
                gfx.scene
                    .set_indicator_position(self.options.initial_position);
                self.gfx = Some(gfx);
                if self.options.autoplay {
                    self.controller
                        .start(self.options.series.clone(), Instant::now());
                }
            }
            Err(error) => {
                self.init_error = Some(error);
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
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gfx) = self.gfx.as_mut() {
                    gfx.surface_config.width = size.width.max(1);
                    gfx.surface_config.height = size.height.max(1);
                    gfx.surface
                        .configure(gfx.scene.device(), &gfx.surface_config);
                    gfx.scene.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.logical_key {
                    Key::Named(NamedKey::Space) => self.toggle_playback(),
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Character(ref c) if c == "r" => self.reset_playback(),
                    _ => {}
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let (Some(gfx), Some((lx, ly))) = (self.gfx.as_mut(), self.last_cursor) {
                        let dx = position.x - lx;
                        let dy = position.y - ly;
                        gfx.scene.camera.orbit(
                            (-dx * ORBIT_SENSITIVITY) as f32,
                            (-dy * ORBIT_SENSITIVITY) as f32,
                        );
                    }
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(gfx) = self.gfx.as_mut() {
                    let amount = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => (pos.y / 60.0) as f32,
                    };
                    gfx.scene.camera.zoom(amount * ZOOM_SENSITIVITY);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}

/// Build the overlay vertex list for one frame: chart frame plus the
/// revealed portion of the trace.
///
/// Very long traces are stride-decimated so the overlay stays within its
/// buffer capacity.
fn chart_overlay(trace: &TraceView, rect: &OverlayRect) -> Vec<OverlayVertex> {
    let mut vertices = Vec::new();

    let corners = [
        [rect.x, rect.y],
        [rect.x + rect.width, rect.y],
        [rect.x + rect.width, rect.y + rect.height],
        [rect.x, rect.y + rect.height],
    ];
    for i in 0..4 {
        vertices.push(OverlayVertex::new(corners[i], palette::CHART_FRAME));
        vertices.push(OverlayVertex::new(corners[(i + 1) % 4], palette::CHART_FRAME));
    }

    let points = trace.revealed_polyline(rect);
    let stride = points.len().div_ceil(MAX_CHART_SEGMENTS).max(1);
    let decimated: Vec<[f32; 2]> = points.iter().copied().step_by(stride).collect();
    for pair in decimated.windows(2) {
        vertices.push(OverlayVertex::new(pair[0], palette::CHART_LINE));
        vertices.push(OverlayVertex::new(pair[1], palette::CHART_LINE));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_trace() -> TraceView {
        let mut trace = TraceView::new();
        trace.set_full_data(&[0.0, 1.0, 2.0, 3.0], &[0.0, -1.0, -2.0, -1.0]);
        trace
    }

    #[test]
    fn overlay_has_frame_only_before_reveal() {
        let overlay = chart_overlay(&loaded_trace(), &CHART_RECT);
        // Four frame edges, two vertices each.
        assert_eq!(overlay.len(), 8);
    }

    #[test]
    fn overlay_grows_with_revealed_points() {
        let mut trace = loaded_trace();
        trace.reveal_all();
        let overlay = chart_overlay(&trace, &CHART_RECT);
        // Frame plus three trace segments.
        assert_eq!(overlay.len(), 8 + 3 * 2);
    }

    #[test]
    fn overlay_stays_within_capacity_for_huge_traces() {
        let n = 200_000;
        let times: Vec<f64> = (0..n).map(|i| i as f64 * 0.001).collect();
        let values: Vec<f64> = (0..n).map(|i| (i as f64 * 0.01).sin()).collect();
        let mut trace = TraceView::new();
        trace.set_full_data(&times, &values);
        trace.reveal_all();

        let overlay = chart_overlay(&trace, &CHART_RECT);
        assert!(overlay.len() <= 2 * MAX_CHART_SEGMENTS + 8);
    }

    #[test]
    fn overlay_vertices_stay_inside_ndc() {
        let mut trace = loaded_trace();
        trace.reveal_all();
        for vertex in chart_overlay(&trace, &CHART_RECT) {
            assert!(vertex.position[0] >= -1.0 && vertex.position[0] <= 1.0);
            assert!(vertex.position[1] >= -1.0 && vertex.position[1] <= 1.0);
        }
    }
}
