//! Player application implementing winit ApplicationHandler
//!
//! Runs the frame loop: tick the clock, apply input actions, resolve pending
//! resizes, update and draw the active scene into the software canvas, then
//! blit the canvas to the window.

use crate::config::PulseConfig;
use crate::scenes::{create_scene, scene_index, Scene, SCENE_NAMES};
use anyhow::Context;
use pulse_render::{BlitPipeline, Canvas, RenderContext};
use pulse_runtime::{actions, GameClock, InputState, LoopEvent, LoopState, RuntimeSystem};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

pub struct PlayerApp {
    config: PulseConfig,
    scene_index: usize,
    scene: Box<dyn Scene>,

    // Loop state
    clock: GameClock,
    input: InputState,
    loop_state: LoopState,
    frame_count: u64,

    // Rendering
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    blit: Option<BlitPipeline>,
    canvas: Canvas,

    /// First fatal error; `main` reports it after the event loop returns
    error: Option<anyhow::Error>,
}

impl PlayerApp {
    /// Build the player and its starting scene. The window opens on `resumed`.
    pub fn new(config: PulseConfig) -> anyhow::Result<Self> {
        let scene = create_scene(&config.window.scene, &config.scene_settings())
            .with_context(|| format!("Failed to create scene '{}'", config.window.scene))?;
        let scene_index = scene_index(&config.window.scene).unwrap_or(0);

        Ok(Self {
            clock: GameClock::with_target_fps(config.window.target_fps),
            canvas: Canvas::new(config.window.width, config.window.height),
            config,
            scene_index,
            scene,
            input: InputState::new(),
            loop_state: LoopState::default(),
            frame_count: 0,
            window: None,
            render_context: None,
            blit: None,
            error: None,
        })
    }

    /// Name of the active scene
    pub fn scene_name(&self) -> &str {
        self.scene.name()
    }

    /// Error that stopped the loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to initialize rendering")?;
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        self.canvas.resize(width, height);
        self.blit = Some(BlitPipeline::new(
            &render_context.device,
            render_context.surface_format(),
            width,
            height,
        ));
        self.render_context = Some(render_context);
        self.window = Some(window);

        self.scene
            .initialize(width, height)
            .with_context(|| format!("Failed to initialize scene '{}'", self.scene.name()))?;
        log::info!("playing '{}' at {width}x{height}", self.scene.name());
        Ok(())
    }

    fn title(&self) -> String {
        format!("{} - {}", self.config.window.title, self.scene.name())
    }

    /// Replace the active scene with its neighbour in `SCENE_NAMES`
    fn switch_scene(&mut self, forward: bool) -> anyhow::Result<()> {
        let count = SCENE_NAMES.len();
        let next = if forward {
            (self.scene_index + 1) % count
        } else {
            (self.scene_index + count - 1) % count
        };

        let mut scene = create_scene(SCENE_NAMES[next], &self.config.scene_settings())?;
        scene.initialize(self.canvas.width(), self.canvas.height())?;
        if let Err(e) = self.scene.shutdown() {
            log::warn!("scene '{}' failed to shut down: {e}", self.scene.name());
        }
        self.scene = scene;
        self.scene_index = next;

        log::info!("switched to scene '{}'", self.scene.name());
        if let Some(window) = &self.window {
            window.set_title(&self.title());
        }
        Ok(())
    }

    fn handle_actions(&mut self) -> anyhow::Result<()> {
        if self.input.is_action_just_pressed(actions::QUIT) {
            self.loop_state = self.loop_state.handle(LoopEvent::Quit);
            return Ok(());
        }
        if self.input.is_action_just_pressed(actions::BEAT_FASTER) {
            let heartbeat = self.scene.heartbeat_mut();
            heartbeat.speed_up();
            log::info!("heartbeat at {:.3} Hz", heartbeat.frequency());
        }
        if self.input.is_action_just_pressed(actions::BEAT_SLOWER) {
            let heartbeat = self.scene.heartbeat_mut();
            heartbeat.slow_down();
            log::info!("heartbeat at {:.3} Hz", heartbeat.frequency());
        }
        if self.input.is_action_just_pressed(actions::NEXT_SCENE) {
            self.switch_scene(true)?;
        } else if self.input.is_action_just_pressed(actions::PREVIOUS_SCENE) {
            self.switch_scene(false)?;
        }
        Ok(())
    }

    /// Rebuild window-sized buffers if a resize is pending
    fn apply_resize(&mut self) -> anyhow::Result<()> {
        let Some((width, height)) = self.loop_state.pending_size() else {
            return Ok(());
        };
        self.canvas.resize(width, height);
        if let (Some(context), Some(blit)) = (&self.render_context, &mut self.blit) {
            blit.resize(&context.device, width, height);
        }
        self.scene.resize(width, height)?;
        self.loop_state = self.loop_state.resized();
        log::debug!("resized to {width}x{height}");
        Ok(())
    }

    fn frame(&mut self) -> anyhow::Result<()> {
        self.clock.tick();
        self.handle_actions()?;
        if !self.loop_state.is_running() {
            return Ok(());
        }
        self.apply_resize()?;

        self.scene.update(&self.clock)?;
        let stats = self.scene.draw(&mut self.canvas);
        if stats.skipped > 0 {
            log::trace!("frame skipped {} drawables", stats.skipped);
        }

        self.render()?;
        self.frame_count += 1;
        if self.frame_count % 600 == 0 {
            log::debug!(
                "{} frames in {} ms, {} drawn last frame",
                self.frame_count,
                self.clock.ticks_since_start(),
                stats.drawn
            );
        }

        self.input.end_frame();
        self.clock.cap_frame_rate();
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let (Some(context), Some(blit)) = (&mut self.render_context, &mut self.blit) else {
            return Ok(());
        };
        let Some(output) = context.acquire_frame()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        blit.upload(&context.device, &context.queue, &self.canvas);
        blit.draw(&context.device, &context.queue, &view);
        output.present();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        self.stop(event_loop);
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.loop_state = self.loop_state.handle(LoopEvent::Quit);
        if let Err(e) = self.scene.shutdown() {
            log::warn!("scene '{}' failed to shut down: {e}", self.scene.name());
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for PlayerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                self.fail(event_loop, e);
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
            WindowEvent::CloseRequested => {
                self.stop(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
                self.loop_state = self.loop_state.handle(LoopEvent::Resize {
                    width: new_size.width,
                    height: new_size.height,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.input.process_key_down(key_code),
                        ElementState::Released => self.input.process_key_up(key_code),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                } else if !self.loop_state.is_running() {
                    self.stop(event_loop);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
