//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Session clock advanced only by supplied dt
//! - Seeded RNG only
//! - No rendering or audio calls; side effects leave as `GameEvent`s

pub mod collision;
pub mod enemy;
pub mod mode;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use enemy::{Behavior, Enemy};
pub use mode::{Action, Mode};
pub use state::{GameEvent, GameState, Item, MoveInput, Player};
pub use tick::{TickInput, generate_items, spawn_enemies, start_new_game, tick};
