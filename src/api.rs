//! Public API for the game core.
//!
//! This module provides the main interface for a rendering client
//! to drive the game: input, stepping, snapshots, and session control.
//!
//! ## Fixed Timestep
//!
//! The core uses a fixed timestep internally (default 60 Hz). When `step(dt)`
//! is called while the session is `Playing`, time accumulates and fixed
//! updates run as needed, so behavior is deterministic regardless of the
//! caller's frame rate. In any other phase `step` is a no-op: nothing moves,
//! nothing takes damage, timers hold.

use crate::audio::{MusicCue, SoundKind, SoundQueue};
use crate::components::*;
use crate::config::{ConfigError, GameConfig};
use crate::level::{level_progress_system, LevelSchedule, Session, SpawnRng};
use crate::score::record_score;
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::state::GamePhase;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use rand::SeedableRng;
use tracing::info;

/// The main game container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting, pausing and ending a session
/// - Feeding input and stepping the game forward
/// - Extracting render snapshots and draining audio events
pub struct GameWorld {
    world: World,
    schedule: Schedule,
    phase: GamePhase,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
    /// High-score file; game over records the run when set.
    score_path: Option<std::path::PathBuf>,
}

impl GameWorld {
    /// Create a new game world with the default configuration.
    pub fn new() -> Self {
        // Default config always validates
        Self::with_config(GameConfig::default()).unwrap_or_else(|_| unreachable!())
    }

    /// Create a new game world with a custom configuration.
    pub fn with_config(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(GameClock::default());
        world.insert_resource(InputState::default());
        world.insert_resource(PlayerStatus::default());
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(PendingCollisions::default());
        world.insert_resource(SoundQueue::default());
        world.insert_resource(SpawnRng(rand::rngs::StdRng::seed_from_u64(config.rng_seed)));
        world.insert_resource(Session {
            score: 0,
            lives: config.starting_lives,
        });
        world.insert_resource(LevelSchedule::for_level(1, &config));
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                // Input / bookkeeping
                player_status_system,
                player_control_system,
                // Behavior
                enemy_behavior_system,
                boss_movement_system,
                boss_attack_system,
                homing_bullet_system,
                // Integration and broad phase
                movement_system,
                player_bounds_system,
                spatial_grid_update_system,
                // Fire and collision
                player_fire_system,
                collision_gather_system,
                collision_apply_system,
                boss_phase_system,
            )
                .chain(),
        );
        schedule.add_systems(
            (
                // Cleanup and scheduling
                effect_timer_system,
                lifetime_system,
                bullet_bounds_system,
                offscreen_despawn_system,
                enemy_spawn_system,
                powerup_spawn_system,
                boss_spawn_system,
                level_progress_system,
            )
                .chain()
                .after(boss_phase_system),
        );

        Ok(Self {
            world,
            schedule,
            phase: GamePhase::Menu,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            score_path: None,
        })
    }

    /// Persist finished runs to the given high-score file.
    pub fn set_score_path(&mut self, path: impl Into<std::path::PathBuf>) {
        self.score_path = Some(path.into());
    }

    // ------------------------------------------------------------------
    // Session control
    // ------------------------------------------------------------------

    /// Start a fresh run from the menu or a finished game.
    /// Clears the field, resets score, lives, level and RNG, spawns the ship.
    pub fn start_game(&mut self) {
        if self.phase == GamePhase::Playing || self.phase == GamePhase::Paused {
            return;
        }
        self.reset_session();
        self.phase = GamePhase::Playing;
        self.world
            .resource_mut::<SoundQueue>()
            .push_music(MusicCue::Gameplay);
        info!("game started");
    }

    /// Toggle between Playing and Paused. No effect in other phases.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }

    /// Leave the game-over screen back to the menu.
    pub fn continue_to_menu(&mut self) {
        if self.phase == GamePhase::GameOver {
            self.phase = GamePhase::Menu;
            self.world
                .resource_mut::<SoundQueue>()
                .push_music(MusicCue::Menu);
        }
    }

    /// Set the player input for subsequent fixed updates.
    pub fn set_input(&mut self, move_x: f32, move_y: f32, fire: bool) {
        let mut input = self.world.resource_mut::<InputState>();
        input.move_x = move_x.clamp(-1.0, 1.0);
        input.move_y = move_y.clamp(-1.0, 1.0);
        input.fire = fire;
    }

    fn reset_session(&mut self) {
        let config = self.world.resource::<GameConfig>().clone();

        // Tear down every session entity
        let mut query = self.world.query_filtered::<Entity, Or<(
            With<PlayerShip>,
            With<Enemy>,
            With<Boss>,
            With<Bullet>,
            With<PowerUp>,
            With<Particle>,
        )>>();
        let entities: Vec<Entity> = query.iter(&self.world).collect();
        for entity in entities {
            self.world.despawn(entity);
        }

        *self.world.resource_mut::<Session>() = Session {
            score: 0,
            lives: config.starting_lives,
        };
        *self.world.resource_mut::<LevelSchedule>() = LevelSchedule::for_level(1, &config);
        self.world.resource_mut::<SpawnRng>().0 =
            rand::rngs::StdRng::seed_from_u64(config.rng_seed);
        *self.world.resource_mut::<GameClock>() = GameClock::default();
        *self.world.resource_mut::<InputState>() = InputState::default();
        self.tick = 0;
        self.time = 0.0;
        self.time_accumulator = 0.0;

        let (x, y) = config.player_spawn();
        self.world
            .spawn(PlayerBundle::new(x, y, config.player_health));
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Step the game forward by `dt` seconds.
    ///
    /// Runs zero or more fixed updates depending on accumulated time.
    /// Only the Playing phase advances; Menu, Paused and GameOver hold
    /// every entity and timer exactly as they are.
    pub fn step(&mut self, dt: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }

        let fixed_dt = self.world.resource::<GameConfig>().fixed_timestep;
        self.time_accumulator += dt;

        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
            if self.phase != GamePhase::Playing {
                break;
            }
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<GameClock>().advance(dt);

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;

        self.handle_player_death();
    }

    /// Respawn the ship while lives remain; otherwise the run is over.
    /// The weapon tier is session progression and carries across respawns.
    fn handle_player_death(&mut self) {
        let dead: Option<(Entity, u32)> = {
            let mut query = self.world.query::<(Entity, &Health, &PlayerShip)>();
            query
                .iter(&self.world)
                .find(|(_, health, _)| !health.is_alive())
                .map(|(entity, _, ship)| (entity, ship.weapon_level))
        };
        let Some((entity, weapon_level)) = dead else {
            return;
        };

        self.world.despawn(entity);

        let lives = {
            let mut session = self.world.resource_mut::<Session>();
            session.lives = session.lives.saturating_sub(1);
            session.lives
        };

        if lives > 0 {
            let config = self.world.resource::<GameConfig>().clone();
            let (x, y) = config.player_spawn();
            let mut bundle = PlayerBundle::new(x, y, config.player_health);
            // Grace period so the respawn is never an instant death
            bundle.ship.invulnerability = 2.0;
            bundle.ship.weapon_level = weapon_level;
            self.world.spawn(bundle);
            self.world
                .resource_mut::<SoundQueue>()
                .push(SoundKind::PlayerDeath);
            info!(lives, "player respawned");
        } else {
            self.phase = GamePhase::GameOver;
            {
                let mut sounds = self.world.resource_mut::<SoundQueue>();
                sounds.push(SoundKind::GameOver);
                sounds.push_music(MusicCue::Silence);
            }
            if let Some(path) = &self.score_path {
                record_score(path, self.score(), self.level());
            }
            info!(score = self.score(), "game over");
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get a snapshot of the current state. Valid in any phase.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time, self.phase)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Take all pending sound events.
    pub fn drain_sounds(&mut self) -> Vec<SoundKind> {
        self.world.resource_mut::<SoundQueue>().drain_sounds()
    }

    /// Take all pending music cues.
    pub fn drain_music(&mut self) -> Vec<MusicCue> {
        self.world.resource_mut::<SoundQueue>().drain_music()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<Session>().score
    }

    pub fn lives(&self) -> u32 {
        self.world.resource::<Session>().lives
    }

    pub fn level(&self) -> u32 {
        self.world.resource::<LevelSchedule>().level
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed game time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Disable schedule-driven spawning (used by tests and demos that
    /// hand-place entities).
    pub fn set_spawning_enabled(&mut self, enabled: bool) {
        self.world.resource_mut::<LevelSchedule>().spawning_enabled = enabled;
    }

    /// Spawn an enemy directly.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, x: f32, y: f32) -> Entity {
        let level = self.level();
        self.world.spawn(EnemyBundle::scaled(kind, x, y, level)).id()
    }

    /// Spawn a boss directly.
    pub fn spawn_boss(&mut self, kind: BossKind, x: f32, y: f32) -> Entity {
        let level = self.level();
        self.world.spawn(BossBundle::new(kind, x, y, level)).id()
    }

    /// Spawn a power-up pickup directly.
    pub fn spawn_powerup(&mut self, kind: PowerUpKind, x: f32, y: f32) -> Entity {
        self.world.spawn(PowerUpBundle::new(kind, x, y)).id()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_world() -> GameWorld {
        let mut game = GameWorld::new();
        game.start_game();
        game.set_spawning_enabled(false);
        game
    }

    fn fixed_dt() -> f32 {
        GameConfig::default().fixed_timestep
    }

    #[test]
    fn test_menu_steps_are_noops() {
        let mut game = GameWorld::new();
        game.step(1.0);
        assert_eq!(game.current_tick(), 0);
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_start_game_spawns_ship_and_plays() {
        let mut game = playing_world();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.score(), 0);

        game.step(fixed_dt());
        assert_eq!(game.current_tick(), 1);

        let snapshot = game.snapshot();
        assert_eq!(snapshot.player_health, Some(100.0));
    }

    #[test]
    fn test_pause_freezes_health_and_entities() {
        let mut game = playing_world();
        let enemy = game.spawn_enemy(EnemyKind::Basic, 200.0, 100.0);
        for _ in 0..4 {
            game.step(fixed_dt());
        }

        let before_pos = *game.world().get::<Position>(enemy).unwrap();
        let before_health = game.snapshot().player_health.unwrap();
        let before_tick = game.current_tick();

        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        for _ in 0..100 {
            game.step(fixed_dt());
        }

        assert_eq!(game.current_tick(), before_tick);
        let after_pos = *game.world().get::<Position>(enemy).unwrap();
        assert_eq!(after_pos.y, before_pos.y);
        assert_eq!(game.snapshot().player_health.unwrap(), before_health);

        // Resume picks up where it left off
        game.toggle_pause();
        game.step(fixed_dt());
        assert_eq!(game.current_tick(), before_tick + 1);
    }

    #[test]
    fn test_bullet_damage_and_removal_scenario() {
        let mut game = playing_world();

        // Park the enemy and the bullet on top of each other, far from the ship
        let enemy = game.spawn_enemy(EnemyKind::Tank, 100.0, 100.0);
        game.world_mut().get_mut::<Enemy>(enemy).unwrap().speed = 0.0;
        game.world_mut().spawn(BulletBundle::new(
            Bullet::straight(Faction::Player, 10.0),
            100.0,
            100.0,
            0.0,
            0.0,
        ));

        game.step(fixed_dt());

        let health = game.world().get::<Health>(enemy).unwrap();
        assert_eq!(health.current, health.max - 10.0);

        let mut bullets = game.world_mut().query::<&Bullet>();
        assert_eq!(bullets.iter(game.world()).count(), 0);
    }

    #[test]
    fn test_lives_respawn_then_game_over() {
        let mut game = playing_world();

        for expected_lives in [2u32, 1] {
            let entity = {
                let mut query = game
                    .world_mut()
                    .query_filtered::<Entity, With<PlayerShip>>();
                query.single(game.world())
            };
            game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
            game.step(fixed_dt());
            assert_eq!(game.lives(), expected_lives);
            assert_eq!(game.phase(), GamePhase::Playing);
        }

        let entity = {
            let mut query = game
                .world_mut()
                .query_filtered::<Entity, With<PlayerShip>>();
            query.single(game.world())
        };
        game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
        game.step(fixed_dt());
        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), GamePhase::GameOver);

        // Further steps hold
        let tick = game.current_tick();
        game.step(1.0);
        assert_eq!(game.current_tick(), tick);

        game.continue_to_menu();
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_weapon_level_survives_respawn_not_restart() {
        let mut game = playing_world();
        let entity = {
            let mut query = game
                .world_mut()
                .query_filtered::<Entity, With<PlayerShip>>();
            query.single(game.world())
        };
        game.world_mut()
            .get_mut::<PlayerShip>(entity)
            .unwrap()
            .upgrade_weapon();
        game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
        game.step(fixed_dt());
        assert_eq!(game.lives(), 2);

        let mut ships = game.world_mut().query::<&PlayerShip>();
        assert_eq!(ships.single(game.world()).weapon_level, 2);

        game.world_mut().resource_mut::<Session>().lives = 1;
        let entity = {
            let mut query = game
                .world_mut()
                .query_filtered::<Entity, With<PlayerShip>>();
            query.single(game.world())
        };
        game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
        game.step(fixed_dt());
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.start_game();
        let mut ships = game.world_mut().query::<&PlayerShip>();
        assert_eq!(ships.single(game.world()).weapon_level, 1);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut game = playing_world();
        game.world_mut().resource_mut::<Session>().score = 999;
        game.spawn_enemy(EnemyKind::Basic, 100.0, 100.0);

        // Force game over, then start again
        let entity = {
            let mut query = game
                .world_mut()
                .query_filtered::<Entity, With<PlayerShip>>();
            query.single(game.world())
        };
        game.world_mut().resource_mut::<Session>().lives = 1;
        game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
        game.step(fixed_dt());
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.start_game();
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.level(), 1);
        assert_eq!(game.current_tick(), 0);

        let mut enemies = game.world_mut().query::<&Enemy>();
        assert_eq!(enemies.iter(game.world()).count(), 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut game = GameWorld::new();
            game.start_game();
            game.set_input(0.3, -0.2, true);
            for _ in 0..300 {
                game.step(fixed_dt());
            }
            let snapshot = game.snapshot();
            runs.push((
                snapshot.score,
                snapshot.drawables.len(),
                snapshot.to_json().unwrap(),
            ));
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[test]
    fn test_sound_queue_drains() {
        let mut game = playing_world();
        game.set_input(0.0, 0.0, true);
        game.step(fixed_dt());

        let sounds = game.drain_sounds();
        assert!(sounds.contains(&SoundKind::PlayerShoot));
        assert!(game.drain_sounds().is_empty());
    }

    #[test]
    fn test_game_over_records_high_score() {
        let mut path = std::env::temp_dir();
        path.push(format!("nebula_api_scores_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut game = playing_world();
        game.set_score_path(&path);
        {
            let mut session = game.world_mut().resource_mut::<Session>();
            session.score = 777;
            session.lives = 1;
        }
        let entity = {
            let mut query = game
                .world_mut()
                .query_filtered::<Entity, With<PlayerShip>>();
            query.single(game.world())
        };
        game.world_mut().get_mut::<Health>(entity).unwrap().current = 0.0;
        game.step(fixed_dt());
        assert_eq!(game.phase(), GamePhase::GameOver);

        let scores = crate::score::HighScores::load(&path).unwrap();
        assert_eq!(scores.best(), Some(777));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            starting_lives: 0,
            ..Default::default()
        };
        assert!(GameWorld::with_config(config).is_err());
    }
}
