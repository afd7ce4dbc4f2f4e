//! Game-state machine.

use serde::{Deserialize, Serialize};

/// Top-level phase of a session. Only `Playing` runs the fixed update;
/// snapshots can be taken in any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn is_playing(self) -> bool {
        self == GamePhase::Playing
    }

    pub fn name(self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game_over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_menu() {
        assert_eq!(GamePhase::default(), GamePhase::Menu);
        assert!(!GamePhase::default().is_playing());
        assert!(GamePhase::Playing.is_playing());
    }
}
