//! Enemy behavior systems.
//!
//! One update function dispatches on the [`EnemyKind`] tag to drive per-kind
//! motion and fire control. A separate spawn system feeds new enemies from
//! the level schedule, and a pruning system despawns anything that drifted
//! below the play area.

use crate::components::*;
use crate::config::GameConfig;
use crate::level::{LevelSchedule, SpawnRng};
use crate::systems::movement::{DeltaTime, GameClock, PlayerStatus};
use bevy_ecs::prelude::*;
use rand::Rng;

/// Shooter kinds hold fire beyond this distance to the player.
const SHOOTER_RANGE: f32 = 420.0;
/// Enemy bullet speed in units per second.
const ENEMY_BULLET_SPEED: f32 = 260.0;
/// Swarm zigzag shape, shared by every swarm member via the global clock.
const SWARM_FREQUENCY: f32 = 3.0;
const SWARM_AMPLITUDE: f32 = 90.0;
/// Elite orbit radius around its entry point.
const ELITE_ORBIT_RADIUS: f32 = 70.0;

/// System that updates velocity and fire cooldowns for every enemy kind.
pub fn enemy_behavior_system(
    dt: Res<DeltaTime>,
    clock: Res<GameClock>,
    player: Res<PlayerStatus>,
    mut commands: Commands,
    mut query: Query<(&mut Enemy, &Position, &mut Velocity)>,
) {
    let delta = dt.0;

    for (mut enemy, pos, mut vel) in query.iter_mut() {
        match enemy.kind {
            EnemyKind::Basic | EnemyKind::Tank | EnemyKind::Fast => {
                vel.vx = 0.0;
                vel.vy = enemy.speed;
            }
            EnemyKind::Shooter => {
                vel.vx = 0.0;
                vel.vy = enemy.speed;
            }
            EnemyKind::Kamikaze => {
                if player.alive {
                    let target = Position::new(player.x, player.y);
                    *vel = Velocity::toward(pos, &target, enemy.speed);
                } else {
                    vel.vx = 0.0;
                    vel.vy = enemy.speed;
                }
            }
            EnemyKind::Swarm => {
                vel.vy = enemy.speed;
                vel.vx = (clock.time * SWARM_FREQUENCY).sin() * SWARM_AMPLITUDE;
            }
            EnemyKind::Elite => {
                // Follow the orbit circle: velocity points at the next point
                // on the circle so the entity stays on it under integration.
                let prev = enemy.orbit_angle;
                enemy.orbit_angle += delta * 1.2;
                let (cx, cy) = (
                    pos.x - prev.cos() * ELITE_ORBIT_RADIUS,
                    pos.y - prev.sin() * ELITE_ORBIT_RADIUS,
                );
                let next_x = cx + enemy.orbit_angle.cos() * ELITE_ORBIT_RADIUS;
                let next_y = cy + enemy.orbit_angle.sin() * ELITE_ORBIT_RADIUS + enemy.speed * 0.3 * delta;
                vel.vx = (next_x - pos.x) / delta.max(0.0001);
                vel.vy = (next_y - pos.y) / delta.max(0.0001);
            }
        }

        // Fire control for the kinds that shoot
        let stats = enemy.kind.stats();
        if let Some(interval) = stats.fire_interval {
            enemy.fire_cooldown -= delta;
            if enemy.fire_cooldown <= 0.0 && player.alive {
                let target = Position::new(player.x, player.y);
                let in_range = match enemy.kind {
                    EnemyKind::Shooter => pos.distance_to(&target) <= SHOOTER_RANGE,
                    _ => true,
                };
                if in_range {
                    enemy.fire_cooldown = interval;
                    fire_enemy_volley(&mut commands, enemy.kind, pos, &target);
                }
            }
        }
    }
}

/// Spawn the volley an enemy kind fires: Shooter aims one bullet at the
/// player, Elite adds two flanking shots.
fn fire_enemy_volley(commands: &mut Commands, kind: EnemyKind, pos: &Position, target: &Position) {
    let aimed = Velocity::toward(pos, target, ENEMY_BULLET_SPEED);
    let damage = 10.0;
    commands.spawn(BulletBundle::new(
        Bullet::straight(Faction::Enemy, damage),
        pos.x,
        pos.y,
        aimed.vx,
        aimed.vy,
    ));

    if kind == EnemyKind::Elite {
        let base = aimed.vy.atan2(aimed.vx);
        for offset in [-0.3f32, 0.3] {
            let angle = base + offset;
            commands.spawn(BulletBundle::new(
                Bullet::straight(Faction::Enemy, damage),
                pos.x,
                pos.y,
                angle.cos() * ENEMY_BULLET_SPEED,
                angle.sin() * ENEMY_BULLET_SPEED,
            ));
        }
    }
}

/// System that spawns enemies from the level schedule.
/// Swarm rolls produce a cluster instead of a single ship.
pub fn enemy_spawn_system(
    config: Res<GameConfig>,
    mut schedule: ResMut<LevelSchedule>,
    mut rng: ResMut<SpawnRng>,
    mut commands: Commands,
) {
    if !schedule.spawning_enabled || schedule.boss_spawned {
        return;
    }
    if schedule.spawn_timer < schedule.spawn_interval {
        return;
    }
    schedule.spawn_timer = 0.0;

    let kind = schedule.roll_enemy_kind(&mut rng.0);
    let margin = 40.0;
    let x = rng.0.gen_range(margin..config.width - margin);
    let y = -margin;

    if kind == EnemyKind::Swarm {
        for i in 0..4 {
            let dx = (i as f32 - 1.5) * 36.0;
            let sx = (x + dx).clamp(margin, config.width - margin);
            commands.spawn(EnemyBundle::scaled(kind, sx, y - (i % 2) as f32 * 28.0, schedule.level));
        }
    } else {
        commands.spawn(EnemyBundle::scaled(kind, x, y, schedule.level));
    }
}

/// System that despawns enemies and neutral pickups that left the play area
/// through the bottom (plus margin). Bullets are pruned by the weapons pass.
pub fn offscreen_despawn_system(
    config: Res<GameConfig>,
    mut commands: Commands,
    query: Query<(Entity, &Position), Or<(With<Enemy>, With<PowerUp>)>>,
) {
    let limit = config.height + config.offscreen_margin;
    for (entity, pos) in query.iter() {
        if pos.y > limit {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn behavior_world(player_x: f32, player_y: f32) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 60.0));
        world.insert_resource(GameClock::default());
        world.insert_resource(PlayerStatus {
            entity: None,
            x: player_x,
            y: player_y,
            alive: true,
        });
        world
    }

    fn behavior_and_movement() -> Schedule {
        use crate::systems::movement::movement_system;
        let mut schedule = Schedule::default();
        schedule.add_systems((enemy_behavior_system, movement_system).chain());
        schedule
    }

    #[test]
    fn test_fast_enemy_descends_without_firing() {
        let mut world = behavior_world(400.0, 550.0);
        // Fixed-step world: dt = 1 so 10 frames at speed 5 travel 50 units
        world.insert_resource(DeltaTime(1.0));

        let mut bundle = EnemyBundle::new(EnemyKind::Fast, 100.0, 0.0);
        bundle.enemy.speed = 5.0;
        world.spawn(bundle);

        let mut schedule = behavior_and_movement();
        for _ in 0..10 {
            schedule.run(&mut world);
        }

        let mut query = world.query::<(&Position, &Enemy)>();
        let (pos, _) = query.single(&world);
        assert!((pos.x - 100.0).abs() < 0.001);
        assert!((pos.y - 50.0).abs() < 0.001);

        let mut bullets = world.query::<&Bullet>();
        assert_eq!(bullets.iter(&world).count(), 0);
    }

    #[test]
    fn test_shooter_fires_at_player_in_range() {
        let mut world = behavior_world(100.0, 300.0);
        world.spawn(EnemyBundle::new(EnemyKind::Shooter, 100.0, 100.0));

        let mut schedule = behavior_and_movement();
        // Enough frames for the initial cooldown (1.5s at 60 Hz) to elapse
        for _ in 0..120 {
            schedule.run(&mut world);
        }

        let mut bullets = world.query::<(&Bullet, &Velocity)>();
        let fired: Vec<_> = bullets.iter(&world).collect();
        assert!(!fired.is_empty());
        for (bullet, vel) in fired {
            assert_eq!(bullet.faction, Faction::Enemy);
            // Player is straight below; shots head down
            assert!(vel.vy > 0.0);
        }
    }

    #[test]
    fn test_shooter_holds_fire_out_of_range() {
        let mut world = behavior_world(100.0, 2000.0);
        world.spawn(EnemyBundle::new(EnemyKind::Shooter, 100.0, 0.0));

        let mut schedule = behavior_and_movement();
        for _ in 0..120 {
            schedule.run(&mut world);
        }

        let mut bullets = world.query::<&Bullet>();
        assert_eq!(bullets.iter(&world).count(), 0);
    }

    #[test]
    fn test_kamikaze_homes_on_player() {
        let mut world = behavior_world(400.0, 500.0);
        world.spawn(EnemyBundle::new(EnemyKind::Kamikaze, 100.0, 100.0));

        let mut schedule = behavior_and_movement();
        schedule.run(&mut world);

        let mut query = world.query::<(&Velocity, &Enemy)>();
        let (vel, _) = query.single(&world);
        // Heads down-right toward the player
        assert!(vel.vx > 0.0);
        assert!(vel.vy > 0.0);
    }

    #[test]
    fn test_spawn_system_respects_interval_and_boss_gate() {
        let mut world = World::new();
        let config = GameConfig::default();
        world.insert_resource(SpawnRng(StdRng::seed_from_u64(3)));
        let mut level = LevelSchedule::for_level(1, &config);
        level.spawn_timer = level.spawn_interval; // due now
        world.insert_resource(config);
        world.insert_resource(level);

        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_spawn_system);
        schedule.run(&mut world);

        let mut enemies = world.query::<&Enemy>();
        assert_eq!(enemies.iter(&world).count(), 1);

        // Timer was reset; nothing new
        schedule.run(&mut world);
        assert_eq!(enemies.iter(&world).count(), 1);

        // Boss on the field suppresses regular spawns
        {
            let mut level = world.resource_mut::<LevelSchedule>();
            level.spawn_timer = level.spawn_interval;
            level.boss_spawned = true;
        }
        schedule.run(&mut world);
        assert_eq!(enemies.iter(&world).count(), 1);
    }

    #[test]
    fn test_offscreen_enemies_pruned() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.spawn(EnemyBundle::new(EnemyKind::Basic, 100.0, 700.0));
        world.spawn(EnemyBundle::new(EnemyKind::Basic, 100.0, 100.0));

        let mut schedule = Schedule::default();
        schedule.add_systems(offscreen_despawn_system);
        schedule.run(&mut world);

        let mut enemies = world.query::<&Enemy>();
        assert_eq!(enemies.iter(&world).count(), 1);
    }
}
