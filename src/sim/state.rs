//! Game state and core simulation types
//!
//! Everything the per-frame update mutates lives in [`GameState`]; entities
//! hold no references back to it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::enemy::Enemy;
use super::mode::Mode;
use super::tick::{generate_items, spawn_enemies};
use crate::audio::{Sound, Track};
use crate::consts::*;
use crate::{clamp, playfield_center};

/// Directional input after alias bindings (arrows / WASD) are merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    /// Raw intent vector (screen coordinates: +y is down)
    pub fn intent(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        v
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Collision box size (centered on `pos`)
    pub size: Vec2,
    pub health: i32,
    pub score: u64,
    pub speed: f32,
    /// Unit vector of the last movement (starts facing up)
    pub direction: Vec2,
    pub frame: u8,
    pub frame_timer: f32,
    /// Seconds spent standing still
    pub idle_timer: f32,
    /// Session time before which damage is ignored
    pub invulnerable_until: f64,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            health: PLAYER_MAX_HEALTH,
            score: 0,
            speed: PLAYER_SPEED,
            direction: Vec2::new(0.0, -1.0),
            frame: 0,
            frame_timer: 0.0,
            idle_timer: 0.0,
            invulnerable_until: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }

    /// Lowest and highest allowed positions
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.size / 2.0 + Vec2::splat(PLAYER_EDGE_GAP);
        let max = Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT) - half;
        (half, max)
    }

    /// Move according to input, animate, and keep inside the playfield
    pub fn update(&mut self, dt: f32, input: &MoveInput) {
        let intent = input.intent();
        let moving = intent != Vec2::ZERO;

        if moving {
            // Normalize first so diagonals are not faster
            let dir = intent.normalize_or_zero();
            self.pos += dir * self.speed * dt;
            self.direction = dir;
            self.frame_timer += dt;
            self.idle_timer = 0.0;
        } else {
            self.idle_timer += dt;
            self.frame_timer += dt * 0.5;
        }

        let frame_time = if moving {
            PLAYER_WALK_FRAME_TIME
        } else {
            PLAYER_IDLE_FRAME_TIME
        };
        if self.frame_timer >= frame_time {
            self.frame_timer = 0.0;
            self.frame = (self.frame + 1) % ANIMATION_FRAMES;
        }

        let (min, max) = self.bounds();
        self.pos.x = clamp(self.pos.x, min.x, max.x);
        self.pos.y = clamp(self.pos.y, min.y, max.y);
    }

    #[inline]
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Apply damage unless invulnerable. Returns whether it was applied.
    /// Health may go below zero; callers check [`Player::is_dead`].
    pub fn take_damage(&mut self, amount: i32, now: f64) -> bool {
        if self.is_invulnerable(now) {
            return false;
        }
        self.health -= amount;
        self.invulnerable_until = now + INVULNERABILITY_TIME;
        true
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// A collectible item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub pos: Vec2,
    pub collected: bool,
    /// Cosmetic pulse phase (seconds)
    pub pulse_timer: f32,
}

impl Item {
    pub fn new<R: Rng + ?Sized>(pos: Vec2, rng: &mut R) -> Self {
        Self {
            pos,
            collected: false,
            pulse_timer: rng.random::<f32>() * 2.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(ITEM_SIZE))
    }

    pub fn update(&mut self, dt: f32) {
        self.pulse_timer += dt;
    }
}

/// Something that happened during a tick. Drained by the driver, which turns
/// the audio-related ones into sink calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Fire a one-shot sound effect
    SoundRequested(Sound),
    /// Start looping background music
    MusicStarted(Track),
    MusicStopped,
    ItemCollected { pos: Vec2 },
    /// Damage landed; carries the remaining health
    PlayerHit { health: i32 },
    ModeChanged { from: Mode, to: Mode },
    /// Every item collected; carries the wave count so far
    WaveCleared { waves: u32 },
}

/// Complete game state (deterministic given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: Mode,
    /// Audio-only flag; gates sound effects and music start
    pub music_enabled: bool,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    /// Session clock: accumulated dt while playing. Kept in f64 so long
    /// sessions keep advancing by small steps.
    pub level_time: f64,
    /// Item batches cleared this session
    pub waves_cleared: u32,
    /// Events produced by the current tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state in the menu, with a populated session behind it
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: Mode::Menu,
            music_enabled: true,
            player: Player::new(playfield_center()),
            enemies: Vec::new(),
            items: Vec::new(),
            level_time: 0.0,
            waves_cleared: 0,
            events: Vec::new(),
        };
        state.reset_session();
        state
    }

    /// Replace player, enemies and items wholesale and zero the clock
    pub fn reset_session(&mut self) {
        self.player = Player::new(playfield_center());
        self.enemies = spawn_enemies(&mut self.rng, ENEMY_COUNT, self.player.pos);
        self.items = generate_items(&mut self.rng, INITIAL_ITEM_COUNT);
        self.level_time = 0.0;
        self.waves_cleared = 0;
    }

    /// Session score (mirrors the player's)
    #[inline]
    pub fn score(&self) -> u64 {
        self.player.score
    }

    /// Session time used by every gameplay timer
    #[inline]
    pub fn now(&self) -> f64 {
        self.level_time
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Switch mode, recording the transition
    pub fn set_mode(&mut self, to: Mode) {
        let from = self.mode;
        if from != to {
            log::info!("Mode {:?} -> {:?}", from, to);
            self.mode = to;
            self.emit(GameEvent::ModeChanged { from, to });
        }
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn uncollected_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|it| !it.collected)
    }
}
