//! ECS systems for the Nebula Strike game core.
//!
//! Systems contain the game logic that operates on components. The fixed
//! update runs them as one chained schedule, in this order:
//!
//! **Input / bookkeeping**
//! - `player_status_system` - caches the player position for aiming
//! - `player_control_system` - steering from the input vector
//!
//! **Behavior**
//! - `enemy_behavior_system` - per-kind motion and fire control
//! - `boss_movement_system`, `boss_attack_system` - boss hover and volleys
//! - `homing_bullet_system` - bends homing bullets toward the player
//!
//! **Integration / broad phase**
//! - `movement_system` - applies velocity to position
//! - `player_bounds_system` - clamps the player to the play area
//! - `spatial_grid_update_system` - rebuilds the collision grid
//!
//! **Fire / collision**
//! - `player_fire_system` - spawns player bullets
//! - `collision_gather_system`, `collision_apply_system` - gather/apply pass
//! - `boss_phase_system` - phase thresholds and defeat
//!
//! **Cleanup / scheduling**
//! - `effect_timer_system` - power-up and invulnerability timers
//! - `lifetime_system`, `bullet_bounds_system`, `offscreen_despawn_system`
//! - `enemy_spawn_system`, `powerup_spawn_system`, `boss_spawn_system`
//! - `level_progress_system` - quota checks and level advance

pub mod behavior;
pub mod boss;
pub mod collision;
pub mod movement;
pub mod particles;
pub mod powerup;
pub mod weapons;

pub use behavior::*;
pub use boss::*;
pub use collision::*;
pub use movement::*;
pub use particles::*;
pub use powerup::*;
pub use weapons::*;
