//! Game-mode state machine
//!
//! The transition table is pure; side effects (session reset, music) are
//! applied by the tick when a transition fires.

use serde::{Deserialize, Serialize};

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Title menu (initial)
    #[default]
    Menu,
    /// Active gameplay; the only mode in which the session advances
    Playing,
    /// Player ran out of health
    GameOver,
    /// Exit chosen; absorbing
    Quit,
}

/// Discrete player requests that can move the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Begin a fresh session
    Start,
    /// Escape back to the menu
    Back,
    /// Leave the game
    Exit,
}

impl Mode {
    /// Mode reached by applying `action`, or `None` if it is ignored here.
    ///
    /// Starting from game over routes through the menu in one step, so it
    /// always lands in a fresh session.
    pub fn on_action(self, action: Action) -> Option<Mode> {
        match (self, action) {
            (Mode::Menu | Mode::GameOver, Action::Start) => Some(Mode::Playing),
            (Mode::Playing | Mode::GameOver, Action::Back) => Some(Mode::Menu),
            (Mode::Menu, Action::Exit) => Some(Mode::Quit),
            _ => None,
        }
    }

    /// Whether the session update runs in this mode
    #[inline]
    pub fn is_simulating(self) -> bool {
        self == Mode::Playing
    }

    /// Whether the menu is accepting clicks
    #[inline]
    pub fn accepts_menu_clicks(self) -> bool {
        self == Mode::Menu
    }
}
