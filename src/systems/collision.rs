//! Collision pass, split into a gather phase and an apply phase.
//!
//! The gather phase is read-only on entities: it walks the tested faction
//! pairs (player bullets vs enemies/boss, enemy bullets vs player, player vs
//! enemies/boss contact, player vs power-ups) using the spatial grid as the
//! broad phase and AABB overlap as the narrow phase, accumulating intents in
//! the [`PendingCollisions`] resource. The apply phase then mutates health,
//! score and effects, and issues despawns through `Commands` so removals
//! land at the end of the frame.
//!
//! Same-faction pairs are never tested.

use crate::audio::{SoundKind, SoundQueue};
use crate::components::*;
use crate::config::GameConfig;
use crate::level::{LevelSchedule, Session, SpawnRng};
use crate::spatial::SpatialGrid;
use crate::systems::particles::{spawn_explosion_burst, spawn_hit_spark, spawn_pickup_flash};
use crate::systems::powerup::{apply_powerup, roll_powerup_kind};
use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::HashMap;

/// Collision intents collected during the gather phase.
#[derive(Resource, Default)]
pub struct PendingCollisions {
    /// Damage to enemies and the boss, keyed by target.
    pub damage: HashMap<Entity, f32>,
    /// Enemies rammed by the player; destroyed outright.
    pub contact_kills: Vec<Entity>,
    /// Total damage aimed at the player this frame (shield and
    /// invulnerability are resolved in the apply phase).
    pub player_damage: f32,
    /// Bullets and pickups consumed this frame.
    pub consumed: Vec<Entity>,
    /// Power-up effects to grant the player.
    pub pickups: Vec<(PowerUpKind, f32, (f32, f32))>,
    /// Positions for hit sparks.
    pub sparks: Vec<(f32, f32)>,
}

impl PendingCollisions {
    pub fn clear(&mut self) {
        self.damage.clear();
        self.contact_kills.clear();
        self.player_damage = 0.0;
        self.consumed.clear();
        self.pickups.clear();
        self.sparks.clear();
    }
}

/// Gather phase. Read-only on entities; writes only [`PendingCollisions`].
pub fn collision_gather_system(
    grid: Res<SpatialGrid>,
    mut pending: ResMut<PendingCollisions>,
    bullets: Query<(Entity, &Bullet, &Position, &BoundingBox)>,
    player: Query<(Entity, &Position, &BoundingBox), With<PlayerShip>>,
    enemies: Query<&Enemy>,
    bosses: Query<&Boss>,
    powerups: Query<&PowerUp>,
) {
    pending.clear();

    let player_data = player.iter().next();

    for (bullet_entity, bullet, pos, bbox) in bullets.iter() {
        match bullet.faction {
            Faction::Player => {
                // Broad phase over enemy-faction entries, narrow phase AABB.
                let candidates = grid.query_overlap_candidates(
                    pos.x,
                    pos.y,
                    bbox.half_w,
                    bbox.half_h,
                    Faction::Enemy.as_index(),
                );
                for candidate in candidates {
                    let target = BoundingBox {
                        half_w: candidate.half_w,
                        half_h: candidate.half_h,
                    };
                    let target_pos = Position::new(candidate.x, candidate.y);
                    if bbox.overlaps(pos, &target, &target_pos) {
                        *pending.damage.entry(candidate.entity).or_insert(0.0) += bullet.damage;
                        pending.consumed.push(bullet_entity);
                        pending.sparks.push((pos.x, pos.y));
                        break; // one bullet, one target
                    }
                }
            }
            Faction::Enemy => {
                if let Some((_, player_pos, player_bbox)) = player_data {
                    if bbox.overlaps(pos, player_bbox, player_pos) {
                        pending.player_damage += bullet.damage;
                        pending.consumed.push(bullet_entity);
                        pending.sparks.push((pos.x, pos.y));
                    }
                }
            }
            Faction::Neutral => {}
        }
    }

    // Player contact with enemies, the boss, and power-ups.
    if let Some((_, player_pos, player_bbox)) = player_data {
        let candidates = grid.query_overlap_candidates(
            player_pos.x,
            player_pos.y,
            player_bbox.half_w,
            player_bbox.half_h,
            Faction::Enemy.as_index(),
        );
        for candidate in candidates {
            let target = BoundingBox {
                half_w: candidate.half_w,
                half_h: candidate.half_h,
            };
            let target_pos = Position::new(candidate.x, candidate.y);
            if !player_bbox.overlaps(player_pos, &target, &target_pos) {
                continue;
            }
            if let Ok(enemy) = enemies.get(candidate.entity) {
                pending.player_damage += enemy.contact_damage;
                pending.contact_kills.push(candidate.entity);
            } else if let Ok(boss) = bosses.get(candidate.entity) {
                // The boss shrugs off the ram; only the player is hurt
                pending.player_damage += boss.contact_damage;
            }
        }

        let neutrals = grid.query_overlap_candidates(
            player_pos.x,
            player_pos.y,
            player_bbox.half_w,
            player_bbox.half_h,
            Faction::Neutral.as_index(),
        );
        for candidate in neutrals {
            let target = BoundingBox {
                half_w: candidate.half_w,
                half_h: candidate.half_h,
            };
            let target_pos = Position::new(candidate.x, candidate.y);
            if !player_bbox.overlaps(player_pos, &target, &target_pos) {
                continue;
            }
            if let Ok(powerup) = powerups.get(candidate.entity) {
                pending.pickups.push((
                    powerup.kind,
                    powerup.duration,
                    (candidate.x, candidate.y),
                ));
                pending.consumed.push(candidate.entity);
            }
        }
    }
}

/// Apply phase. Resolves gathered intents: enemy/boss damage and deaths,
/// player damage through shield and invulnerability, pickups, despawns.
pub fn collision_apply_system(
    config: Res<GameConfig>,
    mut pending: ResMut<PendingCollisions>,
    mut schedule: ResMut<LevelSchedule>,
    mut session: ResMut<Session>,
    mut rng: ResMut<SpawnRng>,
    mut sounds: ResMut<SoundQueue>,
    mut commands: Commands,
    mut enemies: Query<(Entity, &Enemy, &Position, &mut Health), Without<PlayerShip>>,
    mut bosses: Query<&mut Health, (With<Boss>, Without<Enemy>, Without<PlayerShip>)>,
    mut player: Query<(&mut PlayerShip, &mut ActiveEffects, &mut Health), (Without<Enemy>, Without<Boss>)>,
) {
    // Enemy damage and deaths
    for (entity, enemy, pos, mut health) in enemies.iter_mut() {
        if let Some(&damage) = pending.damage.get(&entity) {
            health.damage(damage);
        }
        let rammed = pending.contact_kills.contains(&entity);
        if rammed {
            health.current = 0.0;
        }
        if !health.is_alive() {
            session.score += enemy.score_value;
            schedule.enemies_defeated += 1;
            spawn_explosion_burst(&mut commands, pos, enemy.kind.color(), 14);
            sounds.push(SoundKind::Explosion);

            // Drop roll; independent of the scheduled power-up stream, which
            // throttles itself separately
            if rng.0.gen_bool(config.drop_chance) {
                let kind = roll_powerup_kind(&mut rng.0);
                commands.spawn(PowerUpBundle::new(kind, pos.x, pos.y));
            }
            commands.entity(entity).despawn();
        } else if pending.damage.contains_key(&entity) {
            sounds.push(SoundKind::Hit);
        }
    }

    // Boss damage; defeat itself is resolved by the boss phase system
    for (entity, damage) in pending.damage.iter() {
        if let Ok(mut health) = bosses.get_mut(*entity) {
            health.damage(*damage);
            sounds.push(SoundKind::Hit);
        }
    }

    // Player damage and pickups
    if let Some((mut ship, mut effects, mut health)) = player.iter_mut().next() {
        if pending.player_damage > 0.0 && ship.invulnerability <= 0.0 {
            let mut damage = pending.player_damage;
            if effects.shield_up() {
                let absorbed = damage.min(effects.shield_health);
                effects.shield_health -= absorbed;
                damage -= absorbed;
            }
            if damage > 0.0 {
                health.damage(damage);
                ship.invulnerability = config.hit_invulnerability;
                sounds.push(SoundKind::PlayerHit);
            }
        }

        for (kind, duration, (x, y)) in pending.pickups.drain(..) {
            apply_powerup(kind, duration, &mut health, &mut effects);
            spawn_pickup_flash(&mut commands, &Position::new(x, y), kind.color());
            sounds.push(SoundKind::PowerUpPickup);
        }
    }

    for (x, y) in pending.sparks.drain(..) {
        spawn_hit_spark(&mut commands, &Position::new(x, y), [255, 255, 255]);
    }

    pending.consumed.sort_unstable();
    pending.consumed.dedup();
    for entity in pending.consumed.drain(..) {
        commands.entity(entity).despawn();
    }
}
