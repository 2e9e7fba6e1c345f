//! Frame driver
//!
//! Owns the game state and the audio sink. The platform layer calls
//! [`Game::frame`] once per rendered frame with the elapsed time; the driver
//! bounds it, steps the simulation and forwards audio requests.

use crate::audio::{self, AudioSink};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameState, Mode, MoveInput, TickInput, tick};

/// Game instance holding all state
pub struct Game {
    pub state: GameState,
    audio: Box<dyn AudioSink>,
    /// Pending input; one-shot actions are cleared once consumed
    pub input: TickInput,
    accumulator: f32,
    fixed_timestep: bool,
    max_frame_dt: f32,
}

impl Game {
    pub fn new(settings: &Settings, audio: Box<dyn AudioSink>) -> Self {
        let seed = settings.resolve_seed();
        log::info!("Game created with seed {}", seed);
        let mut state = GameState::new(seed);
        state.music_enabled = settings.music_enabled;
        Self {
            state,
            audio,
            input: TickInput {
                autopilot: settings.autopilot,
                ..Default::default()
            },
            accumulator: 0.0,
            fixed_timestep: settings.fixed_timestep,
            max_frame_dt: settings.max_frame_dt,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Replace the held directional keys
    pub fn set_movement(&mut self, movement: MoveInput) {
        self.input.movement = movement;
    }

    pub fn request_start(&mut self) {
        self.input.start = true;
    }

    pub fn request_back(&mut self) {
        self.input.back = true;
    }

    pub fn request_exit(&mut self) {
        self.input.exit = true;
    }

    pub fn request_toggle_music(&mut self) {
        self.input.toggle_music = true;
    }

    /// Advance by one frame of `dt` seconds; returns the number of
    /// simulation ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        };

        if !self.fixed_timestep {
            self.step(dt);
            return 1;
        }

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
        substeps
    }

    fn step(&mut self, dt: f32) {
        let input = self.input.clone();
        tick(&mut self.state, &input, dt);
        self.input.clear_actions();

        let events = self.state.drain_events();
        audio::dispatch(self.audio.as_mut(), &events, self.state.music_enabled);
    }
}
