//! Window and event loop.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowId};

use crate::config::AppConfig;
use crate::drawing::StrokeRecorder;
use crate::error::AppError;
use crate::gpu::{EguiIntegration, FrameParams, GpuState};
use crate::input::Input;
use crate::panel::{self, PanelAction, UiState};
use crate::sampling::Sampler;
use crate::scene::Scene;
use crate::shape::{ShapeKind, ShapeSelector};
use crate::time::Time;
use crate::tracking::{HandFeed, SimulatedHandControl};

const PRESET_KEYS: [(KeyCode, ShapeKind); 4] = [
    (KeyCode::Digit1, ShapeKind::PRESETS[0]),
    (KeyCode::Digit2, ShapeKind::PRESETS[1]),
    (KeyCode::Digit3, ShapeKind::PRESETS[2]),
    (KeyCode::Digit4, ShapeKind::PRESETS[3]),
];

pub(crate) struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui: Option<EguiIntegration>,
    error: Option<AppError>,

    scene: Scene,
    feed: HandFeed,
    sim_hand: Option<SimulatedHandControl>,

    input: Input,
    time: Time,
    stroke: StrokeRecorder,
    drawing: bool,
}

impl App {
    pub(crate) fn new(config: AppConfig) -> Self {
        let scene = Scene::new(&config, Sampler::from_entropy());
        let (feed, sim_hand) = HandFeed::start(&config.tracking);
        let input = Input::new(config.window.width, config.window.height);

        log::info!(
            "{} particles, initial shape {}",
            config.particle_count,
            scene.kind().label()
        );

        Self {
            config,
            window: None,
            gpu: None,
            egui: None,
            error: None,
            scene,
            feed,
            sim_hand,
            input,
            time: Time::new(),
            stroke: StrokeRecorder::new(),
            drawing: false,
        }
    }

    /// Error that stopped the event loop, if any.
    pub(crate) fn into_result(mut self) -> Result<(), AppError> {
        self.feed.shutdown();
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let capacity = u32::try_from(self.config.particle_count).unwrap_or(u32::MAX);
        let gpu = pollster::block_on(GpuState::new(window.clone(), capacity))?;
        let egui = EguiIntegration::new(gpu.device(), gpu.format(), &window);

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        window.request_redraw();

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui = Some(egui);
        Ok(())
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::SelectPreset(kind) => {
                self.stop_drawing();
                self.scene.select(ShapeSelector::from(kind));
            }
            PanelAction::OpenDrawing => {
                self.stroke.cancel();
                self.drawing = true;
            }
            PanelAction::CancelDrawing => self.stop_drawing(),
        }
    }

    fn stop_drawing(&mut self) {
        self.stroke.cancel();
        self.drawing = false;
    }

    /// Stroke capture straight from window events, so every reported
    /// pointer position is kept.
    fn handle_stroke_event(&mut self, event: &WindowEvent, pointer_captured: bool) {
        if !self.drawing {
            return;
        }
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !pointer_captured => self.stroke.begin(self.input.cursor()),
            WindowEvent::CursorMoved { .. } => self.stroke.extend(self.input.cursor()),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                let Some(gpu) = &self.gpu else { return };
                let (w, h) = (gpu.config.width as f32, gpu.config.height as f32);
                if let Some(points) = self.stroke.finish(w, h) {
                    log::info!("custom shape from {} stroke points", points.len());
                    self.scene.select(ShapeSelector::Custom(points));
                    self.drawing = false;
                }
            }
            _ => {}
        }
    }

    fn handle_shortcuts(&mut self, keyboard_captured: bool) {
        if !keyboard_captured {
            if self.drawing {
                if self.input.key_pressed(KeyCode::Escape) {
                    self.apply(PanelAction::CancelDrawing);
                }
            } else {
                for (key, kind) in PRESET_KEYS {
                    if self.input.key_pressed(key) {
                        self.apply(PanelAction::SelectPreset(kind));
                    }
                }
                if self.input.key_pressed(KeyCode::KeyC) {
                    self.apply(PanelAction::OpenDrawing);
                }
            }
        }

        if let Some(sim) = &mut self.sim_hand {
            if !keyboard_captured && self.input.key_pressed(KeyCode::KeyH) {
                sim.toggle_presence();
            }
            sim.set_pinched(self.input.key_held(KeyCode::Space));
            sim.set_cursor(self.input.cursor_ndc());
        }

        if !self.drawing {
            if let Some(gpu) = &mut self.gpu {
                if self.input.button_held(MouseButton::Right) {
                    let delta = self.input.cursor_delta();
                    gpu.camera.orbit(delta.x, delta.y);
                }
                gpu.camera.zoom(self.input.scroll_delta());
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.time.tick();

        let keyboard_captured = self
            .egui
            .as_ref()
            .is_some_and(|egui| egui.ctx.wants_keyboard_input());
        self.handle_shortcuts(keyboard_captured);

        let hand = self.feed.latest();

        let (Some(window), Some(egui)) = (&self.window, &mut self.egui) else {
            return;
        };

        let mut actions = Vec::new();
        let active = self.scene.kind();
        let particle_count = self.scene.buffer().len();
        let fps = self.time.fps();
        let ui_output = {
            let mut ui_state = UiState {
                shape: self.scene.shape_mut(),
                active,
                drawing: self.drawing,
                stroke: self.stroke.points(),
                status: self.feed.status(),
                hand,
                simulated_hand: self.sim_hand.is_some(),
                fps,
                particle_count,
            };
            egui.run(window, |ctx| actions = panel::show(ctx, &mut ui_state))
        };
        let window = window.clone();

        for action in actions {
            self.apply(action);
        }

        self.scene.step(&hand, self.time.elapsed());

        if let (Some(gpu), Some(egui)) = (&mut self.gpu, &mut self.egui) {
            let shape = self.scene.shape();
            let frame = FrameParams {
                positions: self.scene.visible_positions(),
                color: shape.color,
                particle_size: shape.particle_size,
                time: self.time.elapsed(),
            };
            match gpu.render(&frame, egui, &ui_output) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => log::error!("render error: {:?}", e),
            }
        }

        self.input.end_frame();
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("{}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let pointer_captured = match (&self.window, &mut self.egui) {
            (Some(window), Some(egui)) => {
                let consumed = egui.on_window_event(window, &event);
                consumed && egui.wants_pointer()
            }
            _ => false,
        };

        self.input.handle_event(&event, pointer_captured);
        self.handle_stroke_event(&event, pointer_captured);

        match event {
            WindowEvent::CloseRequested => {
                self.feed.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.input.set_window_size(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.feed.shutdown();
    }
}
