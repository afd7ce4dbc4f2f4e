//! Power-up systems - scheduled spawning, effect timers, application.
//!
//! Pickup detection itself happens in the collision pass; this module owns
//! the spawn timer, the per-kind effect timers on the player, and the
//! function that applies a picked-up effect.

use crate::components::*;
use crate::config::GameConfig;
use crate::level::{LevelSchedule, SpawnRng};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

/// Pick a random power-up kind.
pub fn roll_powerup_kind(rng: &mut StdRng) -> PowerUpKind {
    PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())]
}

/// System that spawns a power-up from the level schedule timer.
/// At most one scheduled power-up floats at a time; drops from destroyed
/// enemies are handled separately by the collision pass.
pub fn powerup_spawn_system(
    config: Res<GameConfig>,
    mut schedule: ResMut<LevelSchedule>,
    mut rng: ResMut<SpawnRng>,
    mut commands: Commands,
    existing: Query<(), With<PowerUp>>,
) {
    if !schedule.spawning_enabled || schedule.powerup_timer < schedule.powerup_interval {
        return;
    }
    schedule.powerup_timer = 0.0;

    if !existing.is_empty() {
        return;
    }

    let kind = roll_powerup_kind(&mut rng.0);
    let x = rng.0.gen_range(40.0..config.width - 40.0);
    commands.spawn(PowerUpBundle::new(kind, x, -20.0));
}

/// Apply a picked-up effect to the player. Same-kind pickups refresh the
/// timer to the full duration; different kinds stack independently.
pub fn apply_powerup(
    kind: PowerUpKind,
    duration: f32,
    health: &mut Health,
    effects: &mut ActiveEffects,
) {
    match kind {
        PowerUpKind::Health => health.heal(30.0),
        PowerUpKind::Speed => effects.speed_timer = duration,
        PowerUpKind::Damage => effects.damage_timer = duration,
        PowerUpKind::RapidFire => effects.rapid_fire_timer = duration,
        PowerUpKind::MultiShot => effects.multi_shot_timer = duration,
        PowerUpKind::Shield => {
            effects.shield_timer = duration;
            effects.shield_health = ActiveEffects::SHIELD_HEALTH;
        }
    }
}

/// System that decrements every active effect timer and the player's
/// post-hit invulnerability. A timer hitting zero is the revert; the
/// modifier accessors read baseline from that frame on.
pub fn effect_timer_system(dt: Res<DeltaTime>, mut query: Query<(&mut ActiveEffects, &mut PlayerShip)>) {
    let delta = dt.0;
    for (mut effects, mut ship) in query.iter_mut() {
        effects.damage_timer = (effects.damage_timer - delta).max(0.0);
        effects.rapid_fire_timer = (effects.rapid_fire_timer - delta).max(0.0);
        effects.speed_timer = (effects.speed_timer - delta).max(0.0);
        effects.multi_shot_timer = (effects.multi_shot_timer - delta).max(0.0);

        effects.shield_timer = (effects.shield_timer - delta).max(0.0);
        if effects.shield_timer <= 0.0 {
            effects.shield_health = 0.0;
        }

        ship.invulnerability = (ship.invulnerability - delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_effect_reverts_exactly_after_duration() {
        let mut world = World::new();
        let dt = 0.1;
        world.insert_resource(DeltaTime(dt));

        let entity = world
            .spawn((
                PlayerShip::default(),
                ActiveEffects {
                    damage_timer: 1.0,
                    ..Default::default()
                },
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(effect_timer_system);

        // Active for the full duration
        for _ in 0..9 {
            schedule.run(&mut world);
            let fx = world.get::<ActiveEffects>(entity).unwrap();
            assert_eq!(fx.damage_multiplier(), ActiveEffects::DAMAGE_MULTIPLIER);
        }

        // Frame 10 crosses zero: baseline from here on
        schedule.run(&mut world);
        let fx = world.get::<ActiveEffects>(entity).unwrap();
        assert_eq!(fx.damage_multiplier(), 1.0);
    }

    #[test]
    fn test_kinds_stack_independently() {
        let mut health = Health::new(100.0);
        let mut fx = ActiveEffects::default();

        apply_powerup(PowerUpKind::Speed, 5.0, &mut health, &mut fx);
        apply_powerup(PowerUpKind::RapidFire, 3.0, &mut health, &mut fx);
        assert!(fx.speed_timer > fx.rapid_fire_timer);
        assert_eq!(fx.damage_multiplier(), 1.0);

        // Same-kind pickup refreshes rather than accumulates
        fx.speed_timer = 1.0;
        apply_powerup(PowerUpKind::Speed, 5.0, &mut health, &mut fx);
        assert_eq!(fx.speed_timer, 5.0);
    }

    #[test]
    fn test_health_pickup_heals_and_clamps() {
        let mut health = Health::new(100.0);
        health.damage(20.0);
        let mut fx = ActiveEffects::default();

        apply_powerup(PowerUpKind::Health, 0.0, &mut health, &mut fx);
        assert_eq!(health.current, 100.0);
    }

    #[test]
    fn test_shield_grants_absorption() {
        let mut health = Health::new(100.0);
        let mut fx = ActiveEffects::default();
        apply_powerup(PowerUpKind::Shield, 6.0, &mut health, &mut fx);
        assert!(fx.shield_up());
        assert_eq!(fx.shield_health, ActiveEffects::SHIELD_HEALTH);
    }

    #[test]
    fn test_scheduled_spawner_keeps_one_alive() {
        let mut world = World::new();
        let config = GameConfig::default();
        world.insert_resource(SpawnRng(StdRng::seed_from_u64(11)));
        let mut level = LevelSchedule::for_level(1, &config);
        level.powerup_timer = level.powerup_interval;
        world.insert_resource(config);
        world.insert_resource(level);

        let mut schedule = Schedule::default();
        schedule.add_systems(powerup_spawn_system);
        schedule.run(&mut world);

        let mut pickups = world.query::<&PowerUp>();
        assert_eq!(pickups.iter(&world).count(), 1);

        // Timer due again, but one is still on the field
        world.resource_mut::<LevelSchedule>().powerup_timer = 100.0;
        schedule.run(&mut world);
        assert_eq!(pickups.iter(&world).count(), 1);
    }
}
