//! Audio event queue for the playback collaborator.
//!
//! Systems push fire-and-forget sound and music events here; the client
//! drains them each frame and maps them to actual assets. Pushing never
//! fails and unplayed events are simply dropped with the queue.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    PlayerShoot,
    EnemyShoot,
    Hit,
    Explosion,
    PlayerHit,
    PlayerDeath,
    PowerUpPickup,
    BossArrival,
    BossPhase,
    BossDefeated,
    LevelUp,
    GameOver,
}

/// Background music changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicCue {
    Menu,
    Gameplay,
    BossFight,
    Silence,
}

/// Queue of audio events produced during the last update(s).
#[derive(Resource, Debug, Default)]
pub struct SoundQueue {
    sounds: Vec<SoundKind>,
    music: Vec<MusicCue>,
}

impl SoundQueue {
    pub fn push(&mut self, sound: SoundKind) {
        self.sounds.push(sound);
    }

    pub fn push_music(&mut self, cue: MusicCue) {
        self.music.push(cue);
    }

    /// Take all pending sound events, leaving the queue empty.
    pub fn drain_sounds(&mut self) -> Vec<SoundKind> {
        std::mem::take(&mut self.sounds)
    }

    /// Take all pending music cues, leaving the queue empty.
    pub fn drain_music(&mut self) -> Vec<MusicCue> {
        std::mem::take(&mut self.music)
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty() && self.music.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = SoundQueue::default();
        queue.push(SoundKind::PlayerShoot);
        queue.push(SoundKind::Explosion);
        queue.push_music(MusicCue::BossFight);

        assert_eq!(
            queue.drain_sounds(),
            vec![SoundKind::PlayerShoot, SoundKind::Explosion]
        );
        assert_eq!(queue.drain_music(), vec![MusicCue::BossFight]);
        assert!(queue.is_empty());
        assert!(queue.drain_sounds().is_empty());
    }
}
