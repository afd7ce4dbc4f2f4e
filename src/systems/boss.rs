//! Boss systems - arrival, hover movement, phase transitions, attacks, defeat.

use crate::audio::{MusicCue, SoundKind, SoundQueue};
use crate::components::*;
use crate::config::GameConfig;
use crate::level::{LevelSchedule, Session};
use crate::systems::movement::{DeltaTime, PlayerStatus};
use crate::systems::particles::spawn_explosion_burst;
use crate::systems::weapons::{
    spawn_aimed_shot, spawn_homing_volley, spawn_spiral_ring, spawn_spread, spawn_wave,
};
use bevy_ecs::prelude::*;
use tracing::info;

const BOSS_HOVER_Y: f32 = 110.0;
const BOSS_HOVER_SPEED: f32 = 80.0;
const BOSS_BULLET_DAMAGE: f32 = 15.0;

/// Which boss guards the end of a level.
fn boss_kind_for_level(level: u32, boss_start: u32) -> BossKind {
    match level.saturating_sub(boss_start) % 4 {
        0 => BossKind::Basic,
        1 => BossKind::Twin,
        2 => BossKind::Mega,
        _ => BossKind::Final,
    }
}

/// System that spawns the level boss once the kill quota is met.
/// Regular spawning stops while the boss holds the field.
pub fn boss_spawn_system(
    config: Res<GameConfig>,
    mut schedule: ResMut<LevelSchedule>,
    mut sounds: ResMut<SoundQueue>,
    mut commands: Commands,
) {
    if !schedule.has_boss() || schedule.boss_spawned || !schedule.quota_met() {
        return;
    }
    schedule.boss_spawned = true;

    let kind = boss_kind_for_level(schedule.level, schedule.boss_start_level);
    commands.spawn(BossBundle::new(kind, config.width * 0.5, -80.0, schedule.level));
    sounds.push(SoundKind::BossArrival);
    sounds.push_music(MusicCue::BossFight);
    info!(level = schedule.level, ?kind, "boss spawned");
}

/// System that moves the boss: descend to the hover line, then weave
/// horizontally along it. Velocity is capped at the hover speed.
pub fn boss_movement_system(
    dt: Res<DeltaTime>,
    config: Res<GameConfig>,
    mut query: Query<(&mut Boss, &Position, &mut Velocity)>,
) {
    for (mut boss, pos, mut vel) in query.iter_mut() {
        boss.attack_timer += dt.0;

        let target = Position::new(
            config.width * 0.5 + (boss.attack_timer * 0.6).sin() * config.width * 0.3,
            BOSS_HOVER_Y,
        );
        let desired = Velocity::toward(pos, &target, BOSS_HOVER_SPEED);
        // Ease in when close so the boss settles instead of oscillating
        let dist = pos.distance_to(&target);
        let scale = (dist / 40.0).min(1.0);
        vel.vx = desired.vx * scale;
        vel.vy = desired.vy * scale;
    }
}

/// System that fires the current phase's attack pattern on cooldown.
pub fn boss_attack_system(
    dt: Res<DeltaTime>,
    player: Res<PlayerStatus>,
    mut sounds: ResMut<SoundQueue>,
    mut commands: Commands,
    mut query: Query<(&mut Boss, &Position)>,
) {
    for (mut boss, pos) in query.iter_mut() {
        boss.fire_cooldown -= dt.0;
        if boss.fire_cooldown > 0.0 || !player.alive {
            continue;
        }
        boss.fire_cooldown = boss.phase_fire_interval();

        let target = Position::new(player.x, player.y);
        let muzzle = Position::new(pos.x, pos.y + 40.0);
        match boss.current_pattern() {
            AttackPattern::Single => {
                spawn_aimed_shot(&mut commands, &muzzle, &target, BOSS_BULLET_DAMAGE);
            }
            AttackPattern::Spread => {
                spawn_spread(&mut commands, &muzzle, 5, BOSS_BULLET_DAMAGE);
            }
            AttackPattern::Spiral => {
                spawn_spiral_ring(&mut commands, &muzzle, 10, boss.attack_timer * 2.0, BOSS_BULLET_DAMAGE);
            }
            AttackPattern::Wave => {
                spawn_wave(&mut commands, &muzzle, 6, boss.attack_timer, BOSS_BULLET_DAMAGE);
            }
            AttackPattern::Homing => {
                spawn_homing_volley(&mut commands, &muzzle, &target, 3, BOSS_BULLET_DAMAGE);
            }
        }
        sounds.push(SoundKind::EnemyShoot);
    }
}

/// System that advances boss phases at health thresholds and handles defeat.
/// Phases only ever advance; defeat triggers exactly when health reaches 0.
pub fn boss_phase_system(
    mut schedule: ResMut<LevelSchedule>,
    mut session: ResMut<Session>,
    mut sounds: ResMut<SoundQueue>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Boss, &Health, &Position)>,
) {
    for (entity, mut boss, health, pos) in query.iter_mut() {
        if !health.is_alive() {
            session.score += boss.score_value;
            schedule.boss_defeated = true;
            spawn_explosion_burst(&mut commands, pos, [255, 180, 60], 36);
            commands.entity(entity).despawn();
            sounds.push(SoundKind::BossDefeated);
            sounds.push_music(MusicCue::Gameplay);
            info!(score = session.score, "boss defeated");
            continue;
        }

        let mut target_phase = boss.phase;
        for (i, threshold) in boss.thresholds.iter().enumerate() {
            if health.current <= *threshold {
                target_phase = target_phase.max(i + 1);
            }
        }
        if target_phase > boss.phase {
            boss.phase = target_phase;
            // New phase opens with an immediate volley
            boss.fire_cooldown = 0.0;
            sounds.push(SoundKind::BossPhase);
            info!(phase = boss.phase, "boss phase advanced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss_world() -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 60.0));
        world.insert_resource(GameConfig::default());
        world.insert_resource(LevelSchedule::for_level(3, &GameConfig::default()));
        world.insert_resource(Session::default());
        world.insert_resource(SoundQueue::default());
        world.insert_resource(PlayerStatus {
            entity: None,
            x: 400.0,
            y: 550.0,
            alive: true,
        });
        world
    }

    #[test]
    fn test_boss_spawns_when_quota_met() {
        let mut world = boss_world();
        {
            let mut schedule = world.resource_mut::<LevelSchedule>();
            schedule.enemies_defeated = schedule.enemies_required;
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(boss_spawn_system);
        schedule.run(&mut world);

        let mut bosses = world.query::<&Boss>();
        assert_eq!(bosses.iter(&world).count(), 1);
        assert!(world.resource::<LevelSchedule>().boss_spawned);

        // No duplicate on subsequent runs
        schedule.run(&mut world);
        assert_eq!(bosses.iter(&world).count(), 1);
    }

    #[test]
    fn test_phase_advances_monotonically() {
        let mut world = boss_world();
        let max = BossKind::Basic.base_health();
        let entity = world
            .spawn(BossBundle::new(BossKind::Basic, 400.0, 110.0, 1))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(boss_phase_system);

        // Drop below the 66% threshold
        world.get_mut::<Health>(entity).unwrap().current = max * 0.5;
        schedule.run(&mut world);
        assert_eq!(world.get::<Boss>(entity).unwrap().phase, 1);

        // Healing back above the threshold must not regress the phase
        world.get_mut::<Health>(entity).unwrap().current = max * 0.9;
        schedule.run(&mut world);
        assert_eq!(world.get::<Boss>(entity).unwrap().phase, 1);

        // Crash straight past two thresholds
        world.get_mut::<Health>(entity).unwrap().current = max * 0.05;
        schedule.run(&mut world);
        assert_eq!(world.get::<Boss>(entity).unwrap().phase, 3);
    }

    #[test]
    fn test_defeat_exactly_at_zero_health() {
        let mut world = boss_world();
        let entity = world
            .spawn(BossBundle::new(BossKind::Basic, 400.0, 110.0, 1))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(boss_phase_system);

        // Barely alive: still on the field
        world.get_mut::<Health>(entity).unwrap().current = 0.1;
        schedule.run(&mut world);
        assert!(world.get::<Boss>(entity).is_some());
        assert!(!world.resource::<LevelSchedule>().boss_defeated);

        world.get_mut::<Health>(entity).unwrap().current = 0.0;
        schedule.run(&mut world);
        assert!(world.get::<Boss>(entity).is_none());
        assert!(world.resource::<LevelSchedule>().boss_defeated);
        assert!(world.resource::<Session>().score >= 500);
    }

    #[test]
    fn test_attack_patterns_follow_phase_table() {
        let boss = Boss::new(BossKind::Mega, 1000.0);
        assert_eq!(boss.current_pattern(), AttackPattern::Spiral);

        let mut boss = Boss::new(BossKind::Mega, 1000.0);
        boss.phase = 3;
        assert_eq!(boss.current_pattern(), AttackPattern::Homing);
        assert!(boss.phase_fire_interval() < boss.fire_interval);
    }

    #[test]
    fn test_attack_spawns_bullets() {
        let mut world = boss_world();
        let mut bundle = BossBundle::new(BossKind::Basic, 400.0, 110.0, 1);
        bundle.boss.fire_cooldown = 0.0;
        world.spawn(bundle);

        let mut schedule = Schedule::default();
        schedule.add_systems(boss_attack_system);
        schedule.run(&mut world);

        let mut bullets = world.query::<&Bullet>();
        let fired: Vec<_> = bullets.iter(&world).collect();
        assert_eq!(fired.len(), 1); // phase 0 of Basic fires a single shot
        assert_eq!(fired[0].faction, Faction::Enemy);
    }
}
