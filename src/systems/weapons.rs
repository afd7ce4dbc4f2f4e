//! Weapon systems - player fire control, bullet bookkeeping, volley helpers.

use crate::audio::{SoundKind, SoundQueue};
use crate::components::*;
use crate::config::GameConfig;
use crate::systems::movement::{DeltaTime, InputState, PlayerStatus};
use bevy_ecs::prelude::*;

/// Player bullet speed in units per second (straight up).
const PLAYER_BULLET_SPEED: f32 = 520.0;
/// Boss bullet speed used by the volley helpers.
pub const BOSS_BULLET_SPEED: f32 = 220.0;

/// System that fires player bullets while the fire input is held.
/// Rapid fire shortens the cooldown, multi-shot fans three bullets, and the
/// weapon tier scales damage up and cooldown down on top of both.
pub fn player_fire_system(
    dt: Res<DeltaTime>,
    input: Res<InputState>,
    mut sounds: ResMut<SoundQueue>,
    mut commands: Commands,
    mut query: Query<(&mut PlayerShip, &ActiveEffects, &Position)>,
) {
    for (mut ship, effects, pos) in query.iter_mut() {
        ship.fire_cooldown = (ship.fire_cooldown - dt.0).max(0.0);
        if !input.fire || ship.fire_cooldown > 0.0 {
            continue;
        }
        ship.fire_cooldown =
            ship.fire_interval * effects.fire_interval_factor() * ship.weapon_cooldown_factor();

        let damage = ship.bullet_damage * effects.damage_multiplier() * ship.weapon_damage_factor();
        let muzzle_y = pos.y - 24.0;

        if effects.multi_shot() {
            let spread = ActiveEffects::MULTI_SHOT_ANGLE_DEG.to_radians();
            let count = ActiveEffects::MULTI_SHOT_COUNT as i32;
            for i in 0..count {
                // Fan centered on straight up
                let angle = -std::f32::consts::FRAC_PI_2 + (i - count / 2) as f32 * spread;
                commands.spawn(BulletBundle::new(
                    Bullet::straight(Faction::Player, damage),
                    pos.x,
                    muzzle_y,
                    angle.cos() * PLAYER_BULLET_SPEED,
                    angle.sin() * PLAYER_BULLET_SPEED,
                ));
            }
        } else {
            commands.spawn(BulletBundle::new(
                Bullet::straight(Faction::Player, damage),
                pos.x,
                muzzle_y,
                0.0,
                -PLAYER_BULLET_SPEED,
            ));
        }
        sounds.push(SoundKind::PlayerShoot);
    }
}

/// System that steers homing bullets toward the player.
/// Only enemy-faction bullets home; the turn rate caps how fast they bend.
pub fn homing_bullet_system(
    dt: Res<DeltaTime>,
    player: Res<PlayerStatus>,
    mut query: Query<(&Bullet, &Position, &mut Velocity)>,
) {
    if !player.alive {
        return;
    }
    let target = Position::new(player.x, player.y);

    for (bullet, pos, mut vel) in query.iter_mut() {
        let Some(turn_rate) = bullet.homing else {
            continue;
        };
        let speed = vel.magnitude();
        if speed < 0.0001 {
            continue;
        }
        let current = vel.vy.atan2(vel.vx);
        let desired = (target.y - pos.y).atan2(target.x - pos.x);
        let mut diff = desired - current;
        // Wrap to [-pi, pi] so the bullet turns the short way
        while diff > std::f32::consts::PI {
            diff -= std::f32::consts::TAU;
        }
        while diff < -std::f32::consts::PI {
            diff += std::f32::consts::TAU;
        }
        let step = diff.clamp(-turn_rate * dt.0, turn_rate * dt.0);
        let heading = current + step;
        vel.vx = heading.cos() * speed;
        vel.vy = heading.sin() * speed;
    }
}

/// System that ticks every [`Lifetime`] and despawns expired entities.
/// Covers bullets, power-ups on the field, and particles.
pub fn lifetime_system(
    dt: Res<DeltaTime>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in query.iter_mut() {
        if lifetime.tick(dt.0) {
            commands.entity(entity).despawn();
        }
    }
}

/// System that prunes bullets outside the play area plus margin.
pub fn bullet_bounds_system(
    config: Res<GameConfig>,
    mut commands: Commands,
    query: Query<(Entity, &Position), With<Bullet>>,
) {
    let margin = config.offscreen_margin;
    for (entity, pos) in query.iter() {
        if pos.x < -margin
            || pos.x > config.width + margin
            || pos.y < -margin
            || pos.y > config.height + margin
        {
            commands.entity(entity).despawn();
        }
    }
}

// ============================================================================
// VOLLEY HELPERS (used by boss attack patterns)
// ============================================================================

/// Spawn one aimed bullet from `pos` toward `target`.
pub fn spawn_aimed_shot(commands: &mut Commands, pos: &Position, target: &Position, damage: f32) {
    let vel = Velocity::toward(pos, target, BOSS_BULLET_SPEED);
    commands.spawn(BulletBundle::new(
        Bullet::straight(Faction::Enemy, damage),
        pos.x,
        pos.y,
        vel.vx,
        vel.vy,
    ));
}

/// Spawn a symmetric fan of `count` bullets centered straight down.
pub fn spawn_spread(commands: &mut Commands, pos: &Position, count: usize, damage: f32) {
    let spread = 0.25f32;
    let half = (count as f32 - 1.0) * 0.5;
    for i in 0..count {
        let angle = std::f32::consts::FRAC_PI_2 + (i as f32 - half) * spread;
        commands.spawn(BulletBundle::new(
            Bullet::straight(Faction::Enemy, damage),
            pos.x,
            pos.y,
            angle.cos() * BOSS_BULLET_SPEED,
            angle.sin() * BOSS_BULLET_SPEED,
        ));
    }
}

/// Spawn a full ring of `count` bullets rotated by `phase` radians.
pub fn spawn_spiral_ring(
    commands: &mut Commands,
    pos: &Position,
    count: usize,
    phase: f32,
    damage: f32,
) {
    for i in 0..count {
        let angle = phase + i as f32 * std::f32::consts::TAU / count as f32;
        commands.spawn(BulletBundle::new(
            Bullet::straight(Faction::Enemy, damage),
            pos.x,
            pos.y,
            angle.cos() * BOSS_BULLET_SPEED,
            angle.sin() * BOSS_BULLET_SPEED,
        ));
    }
}

/// Spawn a horizontal row of downward bullets with sine-modulated headings.
pub fn spawn_wave(commands: &mut Commands, pos: &Position, count: usize, phase: f32, damage: f32) {
    let half = (count as f32 - 1.0) * 0.5;
    for i in 0..count {
        let offset_x = (i as f32 - half) * 28.0;
        let angle = std::f32::consts::FRAC_PI_2 + (phase + i as f32 * 0.7).sin() * 0.4;
        commands.spawn(BulletBundle::new(
            Bullet::straight(Faction::Enemy, damage),
            pos.x + offset_x,
            pos.y,
            angle.cos() * BOSS_BULLET_SPEED,
            angle.sin() * BOSS_BULLET_SPEED,
        ));
    }
}

/// Spawn a volley of homing bullets aimed at `target`.
pub fn spawn_homing_volley(
    commands: &mut Commands,
    pos: &Position,
    target: &Position,
    count: usize,
    damage: f32,
) {
    let base = Velocity::toward(pos, target, BOSS_BULLET_SPEED * 0.8);
    let base_angle = base.vy.atan2(base.vx);
    let half = (count as f32 - 1.0) * 0.5;
    for i in 0..count {
        let angle = base_angle + (i as f32 - half) * 0.35;
        commands.spawn(BulletBundle::new(
            Bullet::homing(Faction::Enemy, damage, 1.6),
            pos.x,
            pos.y,
            angle.cos() * BOSS_BULLET_SPEED * 0.8,
            angle.sin() * BOSS_BULLET_SPEED * 0.8,
        ));
    }
}
