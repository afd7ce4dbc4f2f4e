//! Game configuration validated at the boundary.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when a configuration fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("play area must be positive, got {width}x{height}")]
    InvalidPlayArea { width: f32, height: f32 },
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    #[error("starting lives must be at least 1")]
    NoLives,
}

/// Tunable parameters for a Nebula Strike session.
///
/// Held as an ECS resource; systems read it, never write it.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Play-area width in world units.
    pub width: f32,
    /// Play-area height in world units.
    pub height: f32,
    /// Fixed simulation timestep in seconds.
    pub fixed_timestep: f32,
    /// Lives the player starts with.
    pub starting_lives: u32,
    /// Player ship maximum health.
    pub player_health: f32,
    /// Seed for all gameplay randomness. Same seed, same run.
    pub rng_seed: u64,
    /// Invulnerability window after the player takes a hit, in seconds.
    pub hit_invulnerability: f32,
    /// Margin beyond the play area before off-screen entities are pruned.
    pub offscreen_margin: f32,
    /// Chance a destroyed enemy drops a power-up.
    pub drop_chance: f64,
    /// Kills required to finish level 1; scales up per level.
    pub base_kill_requirement: u32,
    /// Level at which bosses start appearing at the end of a level.
    pub boss_start_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            fixed_timestep: 1.0 / 60.0,
            starting_lives: 3,
            player_health: 100.0,
            rng_seed: 0x4E45_4255_4C41,
            hit_invulnerability: 1.0,
            offscreen_margin: 64.0,
            drop_chance: 0.15,
            base_kill_requirement: 15,
            boss_start_level: 3,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::InvalidPlayArea {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fixed_timestep > 0.0 && self.fixed_timestep.is_finite()) {
            return Err(ConfigError::InvalidTimestep(self.fixed_timestep));
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        Ok(())
    }

    /// Where the player spawns and respawns.
    pub fn player_spawn(&self) -> (f32, f32) {
        (self.width * 0.5, self.height - 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPlayArea { .. })
        ));

        let mut config = GameConfig::default();
        config.fixed_timestep = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimestep(_))
        ));

        let mut config = GameConfig::default();
        config.starting_lives = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NoLives)));
    }
}
