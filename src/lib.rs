//! Little Echoes - a single-screen crypt crawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, enemy AI, mode state machine)
//! - `audio`: Fire-and-forget audio capability injected into the driver
//! - `driver`: Frame driver (timestep policy, event dispatch)
//! - `settings`: JSON configuration

pub mod audio;
pub mod driver;
pub mod settings;
pub mod sim;

pub use driver::Game;
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest dt a single frame may feed the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 900.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 130.0; // units per second
    pub const PLAYER_MAX_HEALTH: i32 = 5;
    pub const PLAYER_WIDTH: f32 = 22.0;
    pub const PLAYER_HEIGHT: f32 = 28.0;
    /// Gap kept between the player's box and the playfield edge
    pub const PLAYER_EDGE_GAP: f32 = 2.0;
    /// Seconds of damage immunity after a hit
    pub const INVULNERABILITY_TIME: f64 = 1.0;

    /// Enemy defaults
    pub const ENEMY_SPEED: f32 = 70.0;
    pub const ENEMY_COUNT: usize = 6;
    pub const ENEMY_WIDTH: f32 = 20.0;
    pub const ENEMY_HEIGHT: f32 = 26.0;
    pub const ENEMY_MIN_PATROL: i32 = 60;
    pub const ENEMY_MAX_PATROL: i32 = 220;
    /// Per-instance speed multiplier range: 0.85 + [0, 0.4)
    pub const ENEMY_SPEED_JITTER_BASE: f32 = 0.85;
    pub const ENEMY_SPEED_JITTER_SPAN: f32 = 0.4;
    pub const PERCEPTION_RADIUS: f32 = 100.0;
    pub const CHASE_DURATION: f64 = 2.0;
    pub const CHASE_SPEED_BONUS: f32 = 1.2;
    /// Patrol target counts as reached below this distance
    pub const ARRIVE_DISTANCE: f32 = 6.0;
    pub const PATROL_PAUSE_MIN: f64 = 0.6;
    pub const PATROL_PAUSE_MAX: f64 = 1.6;
    /// Patrol targets are never closer to the territory center than this
    pub const PATROL_MIN_RADIUS: f32 = 10.0;
    /// Soft fence: enemies past radius + slack get snapped to radius - inset
    pub const TERRITORY_SLACK: f32 = 10.0;
    pub const TERRITORY_SNAP_INSET: f32 = 6.0;
    /// Territory centers keep this margin from the playfield edge
    pub const ENEMY_SPAWN_MARGIN: i32 = 80;
    /// Territory centers must be farther than this from the player
    pub const ENEMY_SPAWN_CLEARANCE: f32 = 120.0;

    /// Item defaults
    pub const ITEM_SIZE: f32 = 16.0;
    pub const ITEM_MARGIN: i32 = 40;
    pub const INITIAL_ITEM_COUNT: usize = 10;
    pub const REFRESH_ITEM_COUNT: usize = 6;
    pub const ITEM_REWARD: u64 = 10;

    /// Wave refresh (all items collected)
    pub const WAVE_BONUS: u64 = 50;
    pub const WAVE_EXTRA_ENEMIES: usize = 2;

    /// Animation cadences (seconds per frame)
    pub const ANIMATION_FRAMES: u8 = 4;
    pub const PLAYER_WALK_FRAME_TIME: f32 = 0.12;
    pub const PLAYER_IDLE_FRAME_TIME: f32 = 0.28;
    pub const ENEMY_FRAME_TIME: f32 = 0.16;
}

/// Limit `value` to `[lo, hi]`; `lo` wins if the bounds cross
#[inline]
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(value))
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Center of the playfield (player spawn point)
#[inline]
pub fn playfield_center() -> Vec2 {
    Vec2::new(consts::PLAYFIELD_WIDTH / 2.0, consts::PLAYFIELD_HEIGHT / 2.0)
}
