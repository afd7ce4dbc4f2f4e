//! Nebula Strike - Game Core
//!
//! A deterministic, fixed-timestep ECS game core for two desktop arcade
//! games: the Nebula Strike space shooter and the Pixel Painter Battle
//! grid duel. Uses `bevy_ecs` for the entity-component-system architecture.
//! Headless by design: rendering, audio playback and menus are clients of
//! the snapshot, sound-queue and config seams.

pub mod api;
pub mod audio;
pub mod components;
pub mod config;
pub mod level;
pub mod painter;
pub mod score;
pub mod spatial;
pub mod state;
pub mod systems;
pub mod world;

pub use api::GameWorld;
pub use audio::{MusicCue, SoundKind, SoundQueue};
pub use components::*;
pub use config::{ConfigError, GameConfig};
pub use level::{LevelSchedule, Session, SpawnRng};
pub use painter::{PainterConfig, PainterConfigError, PainterSession};
pub use score::{HighScores, ScoreEntry, ScoreError};
pub use spatial::{SpatialEntry, SpatialGrid};
pub use state::GamePhase;
pub use systems::*;
pub use world::{Drawable, DrawableKind, Snapshot};
