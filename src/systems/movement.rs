//! Movement systems - velocity integration, player steering, timekeeping.

use crate::components::*;
use crate::config::GameConfig;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current fixed update.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Global clock advanced once per fixed update.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameClock {
    pub tick: u64,
    pub time: f32,
}

impl GameClock {
    pub fn advance(&mut self, dt: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.time += dt;
    }
}

/// Player input for the current frame, set by the client before stepping.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputState {
    /// Horizontal steering in [-1, 1].
    pub move_x: f32,
    /// Vertical steering in [-1, 1].
    pub move_y: f32,
    /// Fire button held.
    pub fire: bool,
}

/// Cached player location, refreshed at the start of every fixed update so
/// enemy and boss systems can aim without a second player query.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerStatus {
    pub entity: Option<Entity>,
    pub x: f32,
    pub y: f32,
    pub alive: bool,
}

/// System that caches the player's entity and position for this frame.
pub fn player_status_system(
    mut status: ResMut<PlayerStatus>,
    query: Query<(Entity, &Position, &Health), With<PlayerShip>>,
) {
    if let Some((entity, pos, health)) = query.iter().next() {
        status.entity = Some(entity);
        status.x = pos.x;
        status.y = pos.y;
        status.alive = health.is_alive();
    } else {
        status.entity = None;
        status.alive = false;
    }
}

/// System that steers the player ship from the input vector.
/// Velocity = input × speed × active speed multiplier; the next movement
/// pass integrates it and this system clamps the result to the play area.
pub fn player_control_system(
    input: Res<InputState>,
    config: Res<GameConfig>,
    mut query: Query<(&PlayerShip, &ActiveEffects, &mut Velocity, &mut Position)>,
) {
    for (ship, effects, mut vel, mut pos) in query.iter_mut() {
        let speed = ship.speed * effects.speed_multiplier();
        // Normalize diagonals so they aren't faster than straight movement
        let mag = (input.move_x * input.move_x + input.move_y * input.move_y).sqrt();
        if mag > 1.0 {
            vel.vx = input.move_x / mag * speed;
            vel.vy = input.move_y / mag * speed;
        } else {
            vel.vx = input.move_x * speed;
            vel.vy = input.move_y * speed;
        }

        pos.x = pos.x.clamp(0.0, config.width);
        pos.y = pos.y.clamp(0.0, config.height);
    }
}

/// System that applies velocity to position for every moving entity.
pub fn movement_system(dt: Res<DeltaTime>, mut query: Query<(&mut Position, &Velocity)>) {
    let delta = dt.0;
    for (mut pos, vel) in query.iter_mut() {
        pos.x += vel.vx * delta;
        pos.y += vel.vy * delta;
    }
}

/// System that re-clamps the player to the play area after integration.
pub fn player_bounds_system(
    config: Res<GameConfig>,
    mut query: Query<&mut Position, With<PlayerShip>>,
) {
    for mut pos in query.iter_mut() {
        pos.x = pos.x.clamp(0.0, config.width);
        pos.y = pos.y.clamp(0.0, config.height);
    }
}
