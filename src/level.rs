//! Level schedule and progression.
//!
//! The [`LevelSchedule`] resource drives enemy/power-up spawn timing, the
//! enemy mix for the current level, kill requirements, and the boss
//! milestone. The progression system advances the level once its
//! requirements are met.

use crate::audio::{MusicCue, SoundKind, SoundQueue};
use crate::components::{EnemyKind, PlayerShip};
use crate::config::GameConfig;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

/// Seeded RNG for all gameplay randomness. One stream, deterministic runs.
#[derive(Resource)]
pub struct SpawnRng(pub StdRng);

/// Running session totals.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
}

/// Spawn timing and progression state for the current level.
#[derive(Resource, Debug, Clone)]
pub struct LevelSchedule {
    pub level: u32,
    /// Seconds between enemy spawns.
    pub spawn_interval: f32,
    pub spawn_timer: f32,
    /// Master switch; tests disable it to isolate hand-placed entities.
    pub spawning_enabled: bool,
    pub enemies_defeated: u32,
    pub enemies_required: u32,
    /// Seconds between scheduled power-up spawns.
    pub powerup_interval: f32,
    pub powerup_timer: f32,
    /// Level at which the end-of-level boss appears.
    pub boss_start_level: u32,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    /// Set for one snapshot when the level just finished.
    pub level_complete: bool,
}

impl Default for LevelSchedule {
    fn default() -> Self {
        Self::for_level(1, &GameConfig::default())
    }
}

impl LevelSchedule {
    pub fn for_level(level: u32, config: &GameConfig) -> Self {
        let steps = level.saturating_sub(1) as f32;
        Self {
            level,
            // Density ramps up; floor keeps late levels playable
            spawn_interval: (2.0 * 0.92f32.powf(steps)).max(0.5),
            spawn_timer: 0.0,
            spawning_enabled: true,
            enemies_defeated: 0,
            enemies_required: config.base_kill_requirement + (level - 1) * 5,
            powerup_interval: 12.0,
            powerup_timer: 0.0,
            boss_start_level: config.boss_start_level,
            boss_spawned: false,
            boss_defeated: false,
            level_complete: false,
        }
    }

    /// Whether this level ends with a boss fight.
    pub fn has_boss(&self) -> bool {
        self.level >= self.boss_start_level
    }

    /// Kill quota reached (the boss gate is checked separately).
    pub fn quota_met(&self) -> bool {
        self.enemies_defeated >= self.enemies_required
    }

    /// Weighted enemy mix for the current level. Kinds unlock as levels
    /// advance; weights of locked kinds redistribute proportionally.
    pub fn enemy_mix(&self) -> Vec<(EnemyKind, f32)> {
        let table: [(EnemyKind, f32, u32); 7] = [
            (EnemyKind::Basic, 0.4, 1),
            (EnemyKind::Fast, 0.2, 2),
            (EnemyKind::Shooter, 0.15, 2),
            (EnemyKind::Tank, 0.15, 3),
            (EnemyKind::Swarm, 0.1, 3),
            (EnemyKind::Kamikaze, 0.1, 4),
            (EnemyKind::Elite, 0.1, 5),
        ];
        table
            .iter()
            .filter(|(_, _, unlock)| self.level >= *unlock)
            .map(|(kind, weight, _)| (*kind, *weight))
            .collect()
    }

    /// Pick an enemy kind using the level's weights.
    pub fn roll_enemy_kind(&self, rng: &mut StdRng) -> EnemyKind {
        let mix = self.enemy_mix();
        let total: f32 = mix.iter().map(|(_, w)| w).sum();
        let mut roll = rng.gen_range(0.0..total);
        for (kind, weight) in &mix {
            if roll < *weight {
                return *kind;
            }
            roll -= weight;
        }
        EnemyKind::Basic
    }
}

/// System that advances the level once the kill quota is met and, where the
/// level has one, the boss is down. Awards a completion bonus, raises the
/// ship's weapon tier, and rescales the schedule.
pub fn level_progress_system(
    dt: Res<DeltaTime>,
    config: Res<GameConfig>,
    mut schedule: ResMut<LevelSchedule>,
    mut session: ResMut<Session>,
    mut sounds: ResMut<SoundQueue>,
    mut ships: Query<&mut PlayerShip>,
) {
    schedule.spawn_timer += dt.0;
    schedule.powerup_timer += dt.0;
    schedule.level_complete = false;

    let boss_gate_open = !schedule.has_boss() || schedule.boss_defeated;
    if schedule.quota_met() && boss_gate_open {
        let completed = schedule.level;
        session.score += completed * 100;
        for mut ship in ships.iter_mut() {
            ship.upgrade_weapon();
        }
        *schedule = LevelSchedule::for_level(completed + 1, &config);
        schedule.level_complete = true;
        sounds.push(SoundKind::LevelUp);
        sounds.push_music(MusicCue::Gameplay);
        info!(level = schedule.level, "level advanced");
    }
}
