//! Snapshot types for the rendering collaborator.
//!
//! The `Snapshot` struct is a serializable view of the game state: session
//! numbers plus an ordered list of drawables, back to front, ready to be
//! handed to whatever draws the frame.

use crate::components::*;
use crate::level::{LevelSchedule, Session};
use crate::state::GamePhase;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// What a drawable is, so the client can pick a sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawableKind {
    Particle,
    PowerUp { effect: String },
    Bullet { friendly: bool },
    Enemy { variant: String },
    Boss { phase: usize, health_fraction: f32 },
    Player { invulnerable: bool, shield: bool },
}

/// One entity to draw: position, size, color, alpha, plus the kind tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawable {
    #[serde(flatten)]
    pub kind: DrawableKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 3],
    pub alpha: f32,
}

/// Complete render-ready state for one frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current fixed-update tick.
    pub tick: u64,
    /// Elapsed game time in seconds.
    pub time: f32,
    pub phase: GamePhase,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Set for the frame on which a level just completed.
    pub level_complete: bool,
    /// Player health, if a ship is on the field.
    pub player_health: Option<f32>,
    pub player_health_max: Option<f32>,
    /// Drawables in draw order (back to front).
    pub drawables: Vec<Drawable>,
}

impl Snapshot {
    /// Build a snapshot from the ECS world. Draw order: particles, power-ups,
    /// bullets, enemies, boss, player.
    pub fn from_world(world: &mut World, tick: u64, time: f32, phase: GamePhase) -> Self {
        let session = world
            .get_resource::<Session>()
            .copied()
            .unwrap_or_default();
        let (level, level_complete) = world
            .get_resource::<LevelSchedule>()
            .map(|s| (s.level, s.level_complete))
            .unwrap_or((1, false));

        let mut drawables = Vec::new();

        let mut particles = world.query::<(&Particle, &Position, &Lifetime)>();
        for (particle, pos, lifetime) in particles.iter(world) {
            drawables.push(Drawable {
                kind: DrawableKind::Particle,
                x: pos.x,
                y: pos.y,
                width: particle.size,
                height: particle.size,
                color: particle.color,
                alpha: 1.0 - lifetime.elapsed_fraction(),
            });
        }

        let mut powerups = world.query::<(&PowerUp, &Position, &BoundingBox)>();
        for (powerup, pos, bbox) in powerups.iter(world) {
            drawables.push(Drawable {
                kind: DrawableKind::PowerUp {
                    effect: powerup.kind.name().to_string(),
                },
                x: pos.x,
                y: pos.y,
                width: bbox.half_w * 2.0,
                height: bbox.half_h * 2.0,
                color: powerup.kind.color(),
                alpha: 1.0,
            });
        }

        let mut bullets = world.query::<(&Bullet, &Position, &BoundingBox)>();
        for (bullet, pos, bbox) in bullets.iter(world) {
            let friendly = bullet.faction == Faction::Player;
            drawables.push(Drawable {
                kind: DrawableKind::Bullet { friendly },
                x: pos.x,
                y: pos.y,
                width: bbox.half_w * 2.0,
                height: bbox.half_h * 2.0,
                color: if friendly { [120, 220, 255] } else { [255, 120, 120] },
                alpha: 1.0,
            });
        }

        let mut enemies = world.query::<(&Enemy, &Position, &BoundingBox)>();
        for (enemy, pos, bbox) in enemies.iter(world) {
            drawables.push(Drawable {
                kind: DrawableKind::Enemy {
                    variant: enemy.kind.name().to_string(),
                },
                x: pos.x,
                y: pos.y,
                width: bbox.half_w * 2.0,
                height: bbox.half_h * 2.0,
                color: enemy.kind.color(),
                alpha: 1.0,
            });
        }

        let mut bosses = world.query::<(&Boss, &Position, &BoundingBox, &Health)>();
        for (boss, pos, bbox, health) in bosses.iter(world) {
            drawables.push(Drawable {
                kind: DrawableKind::Boss {
                    phase: boss.phase,
                    health_fraction: health.fraction(),
                },
                x: pos.x,
                y: pos.y,
                width: bbox.half_w * 2.0,
                height: bbox.half_h * 2.0,
                color: [200, 60, 200],
                alpha: 1.0,
            });
        }

        let mut player_health = None;
        let mut player_health_max = None;
        let mut players =
            world.query::<(&PlayerShip, &ActiveEffects, &Position, &BoundingBox, &Health)>();
        for (ship, effects, pos, bbox, health) in players.iter(world) {
            player_health = Some(health.current);
            player_health_max = Some(health.max);
            drawables.push(Drawable {
                kind: DrawableKind::Player {
                    invulnerable: ship.invulnerability > 0.0,
                    shield: effects.shield_up(),
                },
                x: pos.x,
                y: pos.y,
                width: bbox.half_w * 2.0,
                height: bbox.half_h * 2.0,
                color: [90, 200, 255],
                alpha: if ship.invulnerability > 0.0 { 0.5 } else { 1.0 },
            });
        }

        Self {
            tick,
            time,
            phase,
            score: session.score,
            lives: session.lives,
            level,
            level_complete,
            player_health,
            player_health_max,
            drawables,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
