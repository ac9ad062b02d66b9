//! Quest Arena entry point
//!
//! winit drives the event loop via `ApplicationHandler`. Each redraw:
//!
//!   1. feed wall-clock time into the fixed-step clock
//!   2. run `tick` once per due step with the current key snapshot
//!   3. log what happened, then draw the arena (or the end screen)
//!
//! When a run ends the summary is logged and the win/lose screen stays up for
//! a few seconds before the window closes.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use quest_arena::consts::{END_SCREEN_US, SIM_DT_US};
use quest_arena::platform::{FrameClock, HostError, InputState, Key, PlatformConfig, map_key};
use quest_arena::renderer::{RenderState, build_scene, captions, colors};
use quest_arena::sim::{GameEvent, GameState, tick};

/// Everything that exists once the window is up
struct Game {
    window: Arc<Window>,
    render: RenderState,
    state: GameState,
    clock: FrameClock,
    input: InputState,
    /// Clock time when the run ended
    ended_at_us: Option<u64>,
}

impl Game {
    fn new(window: Arc<Window>, render: RenderState, seed: u64) -> Self {
        let state = GameState::new(seed);
        match serde_json::to_string(&state.tuning) {
            Ok(json) => log::debug!("Tuning: {}", json),
            Err(e) => log::warn!("Could not serialize tuning: {}", e),
        }
        Self {
            window,
            render,
            state,
            clock: FrameClock::new(),
            input: InputState::new(),
            ended_at_us: None,
        }
    }

    /// Advance the simulation; returns true once the end screen has been shown
    /// long enough
    fn update(&mut self) -> bool {
        self.clock.begin_frame();

        while self.clock.should_step() {
            let input = self.input.to_tick_input();
            tick(&mut self.state, &input, SIM_DT_US);
            // Interact/action apply to one step only
            self.input.end_frame();
        }

        for event in self.state.drain_events() {
            log_event(&event);
        }

        if self.state.phase.is_terminal() {
            match self.ended_at_us {
                None => {
                    self.ended_at_us = Some(self.clock.total_us);
                    self.log_summary();
                }
                Some(ended) => return self.clock.total_us - ended >= END_SCREEN_US,
            }
        }
        false
    }

    fn log_summary(&self) {
        let summary = self.state.summary();
        match serde_json::to_string(&summary) {
            Ok(json) => log::info!("Run summary: {}", json),
            Err(e) => log::warn!("Could not serialize run summary: {}", e),
        }
    }

    fn render(&mut self) -> Result<(), HostError> {
        let vertices = build_scene(&self.state);
        let captions = captions(&self.state);
        match self
            .render
            .render(&self.window, &vertices, &captions, colors::BACKGROUND)
        {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.render.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(HostError::OutOfMemory),
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                Ok(())
            }
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::MobSpawned { id } => log::debug!("Mob {} spawned", id),
        GameEvent::MobDefeated { id, points } => {
            log::debug!("Mob {} defeated for {} points", id, points)
        }
        GameEvent::BallFired { id } => log::debug!("Ball {} fired", id),
        GameEvent::OutOfStamina => log::debug!("Out of stamina"),
        GameEvent::QuestOffered => log::info!("NPC: quest offered"),
        GameEvent::QuestAccepted => log::info!("Quest accepted"),
        GameEvent::BossSpawned { id } => log::info!("Boss {} appeared", id),
        GameEvent::BossWounded => log::info!("Boss wounded"),
        GameEvent::BossDefeated => log::info!("Boss defeated"),
        GameEvent::LevelUp => log::info!("Level up!"),
        GameEvent::Won => log::info!("Victory"),
        GameEvent::Lost => log::info!("Defeat"),
    }
}

struct App {
    config: PlatformConfig,
    seed: u64,
    game: Option<Game>,
    /// First fatal error; reported by `main` after the loop exits
    error: Option<HostError>,
}

impl App {
    fn new(seed: u64) -> Self {
        Self {
            config: PlatformConfig::default(),
            seed,
            game: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: HostError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Game, HostError> {
        let window = Arc::new(event_loop.create_window(self.config.window_attributes())?);
        log::info!("Window created: {}x{}", self.config.width, self.config.height);
        let render = pollster::block_on(RenderState::new(window.clone()))?;
        Ok(Game::new(window, render, self.seed))
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.game.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(game) => self.game = Some(game),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(game) = &self.game {
            game.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.render.overlay.handle_window_event(&game.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_key(key_code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed if key == Key::Quit => {
                        log::info!("Quit key pressed, exiting");
                        event_loop.exit();
                    }
                    ElementState::Pressed => game.input.key_down(key),
                    ElementState::Released => game.input.key_up(key),
                }
            }

            WindowEvent::RedrawRequested => {
                if game.update() {
                    event_loop.exit();
                    return;
                }
                if let Err(e) = game.render() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}

fn run() -> Result<(), HostError> {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    log::info!("Quest Arena starting (seed {})", seed);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
