//! Cosmetic particle bursts. Particles carry no bounding box so they never
//! enter the spatial grid or the collision pass; the shared lifetime system
//! prunes them when they fade out.

use crate::components::{ParticleBundle, Position};
use bevy_ecs::prelude::*;

/// Ring of particles for a destroyed ship or boss.
pub fn spawn_explosion_burst(
    commands: &mut Commands,
    pos: &Position,
    color: [u8; 3],
    count: usize,
) {
    for i in 0..count {
        let angle = i as f32 * std::f32::consts::TAU / count as f32;
        // Staggered speeds give the burst some depth
        let speed = 80.0 + (i % 3) as f32 * 45.0;
        commands.spawn(ParticleBundle::new(
            pos.x,
            pos.y,
            angle.cos() * speed,
            angle.sin() * speed,
            color,
            0.6,
            4.0,
        ));
    }
}

/// Small spark where a bullet connected.
pub fn spawn_hit_spark(commands: &mut Commands, pos: &Position, color: [u8; 3]) {
    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2 + 0.4;
        commands.spawn(ParticleBundle::new(
            pos.x,
            pos.y,
            angle.cos() * 60.0,
            angle.sin() * 60.0,
            color,
            0.25,
            2.0,
        ));
    }
}

/// Short flash when the player grabs a power-up.
pub fn spawn_pickup_flash(commands: &mut Commands, pos: &Position, color: [u8; 3]) {
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        commands.spawn(ParticleBundle::new(
            pos.x,
            pos.y,
            angle.cos() * 100.0,
            angle.sin() * 100.0,
            color,
            0.35,
            3.0,
        ));
    }
}
