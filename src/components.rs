//! ECS components for the Nebula Strike game core.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in play-area coordinates (x = right, y = down).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D velocity vector in units per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Velocity of the given speed pointing from `from` toward `to`.
    /// Zero if the points coincide.
    pub fn toward(from: &Position, to: &Position, speed: f32) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < 0.0001 {
            Self::default()
        } else {
            Self {
                vx: dx / dist * speed,
                vy: dy / dist * speed,
            }
        }
    }
}

/// Axis-aligned collision box stored as half extents around the position.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub half_w: f32,
    pub half_h: f32,
}

impl BoundingBox {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            half_w: w * 0.5,
            half_h: h * 0.5,
        }
    }

    /// AABB overlap test between two boxes at the given centers.
    pub fn overlaps(&self, pos: &Position, other: &BoundingBox, other_pos: &Position) -> bool {
        (pos.x - other_pos.x).abs() <= self.half_w + other.half_w
            && (pos.y - other_pos.y).abs() <= self.half_h + other.half_h
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(16.0, 16.0)
    }
}

// ============================================================================
// IDENTITY / COMBAT COMPONENTS
// ============================================================================

/// Ownership tag restricting which collision pairs apply.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Faction {
    Player,
    #[default]
    Enemy,
    Neutral,
}

impl Faction {
    pub fn as_index(self) -> u8 {
        match self {
            Faction::Player => 0,
            Faction::Enemy => 1,
            Faction::Neutral => 2,
        }
    }
}

/// Hit points of a ship, enemy, or boss.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Remaining time before an entity is pruned regardless of other state.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: f32,
    pub initial: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds,
            initial: seconds,
        }
    }

    /// Advance by `dt`. Returns true once expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    pub fn elapsed_fraction(&self) -> f32 {
        if self.initial <= 0.0 {
            1.0
        } else {
            1.0 - (self.remaining / self.initial).clamp(0.0, 1.0)
        }
    }
}

// ============================================================================
// PLAYER COMPONENTS
// ============================================================================

/// The player ship. One instance per session, owned by the state controller.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerShip {
    /// Base steering speed (units per second).
    pub speed: f32,
    /// Seconds between shots at baseline fire rate.
    pub fire_interval: f32,
    /// Cooldown until the next shot is allowed.
    pub fire_cooldown: f32,
    /// Baseline damage per bullet.
    pub bullet_damage: f32,
    /// Post-hit grace period; damage is ignored while positive.
    pub invulnerability: f32,
    /// Permanent upgrade tier, 1..=[`PlayerShip::WEAPON_LEVEL_MAX`].
    /// Scales bullet damage up and fire cooldown down. Survives respawns,
    /// resets with the session.
    pub weapon_level: u32,
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self {
            speed: 300.0,
            fire_interval: 0.25,
            fire_cooldown: 0.0,
            bullet_damage: 10.0,
            invulnerability: 0.0,
            weapon_level: 1,
        }
    }
}

impl PlayerShip {
    pub const WEAPON_LEVEL_MAX: u32 = 5;
    /// Damage multiplier gained per upgrade tier.
    pub const WEAPON_DAMAGE_STEP: f32 = 1.25;
    /// Fire-cooldown multiplier per upgrade tier (below 1.0 shoots faster).
    pub const WEAPON_COOLDOWN_STEP: f32 = 0.9;

    /// Raise the weapon tier, capped at the maximum.
    pub fn upgrade_weapon(&mut self) {
        if self.weapon_level < Self::WEAPON_LEVEL_MAX {
            self.weapon_level += 1;
        }
    }

    pub fn weapon_damage_factor(&self) -> f32 {
        Self::WEAPON_DAMAGE_STEP.powi(self.weapon_level.saturating_sub(1) as i32)
    }

    pub fn weapon_cooldown_factor(&self) -> f32 {
        Self::WEAPON_COOLDOWN_STEP.powi(self.weapon_level.saturating_sub(1) as i32)
    }
}

/// Active timed power-up modifiers on the player.
///
/// Each kind has its own expiry timer. A modifier is in effect while its
/// timer is positive and reverts to baseline the moment it reaches zero,
/// so expiry is a single event per kind. Different kinds stack.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ActiveEffects {
    pub damage_timer: f32,
    pub rapid_fire_timer: f32,
    pub speed_timer: f32,
    pub multi_shot_timer: f32,
    pub shield_timer: f32,
    /// Remaining absorption while the shield is up.
    pub shield_health: f32,
}

impl ActiveEffects {
    pub const DAMAGE_MULTIPLIER: f32 = 2.0;
    pub const SPEED_MULTIPLIER: f32 = 1.5;
    pub const RAPID_FIRE_FACTOR: f32 = 0.4;
    pub const MULTI_SHOT_COUNT: usize = 3;
    pub const MULTI_SHOT_ANGLE_DEG: f32 = 15.0;
    pub const SHIELD_HEALTH: f32 = 50.0;

    pub fn damage_multiplier(&self) -> f32 {
        if self.damage_timer > 0.0 {
            Self::DAMAGE_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.speed_timer > 0.0 {
            Self::SPEED_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Fire-interval multiplier; below 1.0 means faster shots.
    pub fn fire_interval_factor(&self) -> f32 {
        if self.rapid_fire_timer > 0.0 {
            Self::RAPID_FIRE_FACTOR
        } else {
            1.0
        }
    }

    pub fn multi_shot(&self) -> bool {
        self.multi_shot_timer > 0.0
    }

    pub fn shield_up(&self) -> bool {
        self.shield_timer > 0.0 && self.shield_health > 0.0
    }
}

// ============================================================================
// ENEMY COMPONENTS
// ============================================================================

/// Behavior variant; fully determines per-frame motion and fire policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Shooter,
    Kamikaze,
    Swarm,
    Elite,
}

/// Static per-kind tuning.
pub struct EnemyStats {
    pub health: f32,
    pub speed: f32,
    pub score_value: u32,
    pub contact_damage: f32,
    /// Seconds between shots; `None` means the kind never fires.
    pub fire_interval: Option<f32>,
    pub size: (f32, f32),
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                health: 20.0,
                speed: 60.0,
                score_value: 10,
                contact_damage: 10.0,
                fire_interval: None,
                size: (32.0, 32.0),
            },
            EnemyKind::Fast => EnemyStats {
                health: 10.0,
                speed: 150.0,
                score_value: 15,
                contact_damage: 10.0,
                fire_interval: None,
                size: (28.0, 28.0),
            },
            EnemyKind::Tank => EnemyStats {
                health: 80.0,
                speed: 30.0,
                score_value: 30,
                contact_damage: 20.0,
                fire_interval: None,
                size: (48.0, 48.0),
            },
            EnemyKind::Shooter => EnemyStats {
                health: 20.0,
                speed: 50.0,
                score_value: 25,
                contact_damage: 10.0,
                fire_interval: Some(1.5),
                size: (32.0, 32.0),
            },
            EnemyKind::Kamikaze => EnemyStats {
                health: 10.0,
                speed: 180.0,
                score_value: 20,
                contact_damage: 25.0,
                fire_interval: None,
                size: (28.0, 28.0),
            },
            EnemyKind::Swarm => EnemyStats {
                health: 8.0,
                speed: 80.0,
                score_value: 12,
                contact_damage: 8.0,
                fire_interval: None,
                size: (22.0, 22.0),
            },
            EnemyKind::Elite => EnemyStats {
                health: 60.0,
                speed: 70.0,
                score_value: 50,
                contact_damage: 15.0,
                fire_interval: Some(1.2),
                size: (40.0, 40.0),
            },
        }
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            EnemyKind::Basic => [200, 60, 60],
            EnemyKind::Fast => [230, 220, 60],
            EnemyKind::Tank => [110, 110, 120],
            EnemyKind::Shooter => [240, 80, 80],
            EnemyKind::Kamikaze => [240, 150, 40],
            EnemyKind::Swarm => [70, 210, 210],
            EnemyKind::Elite => [170, 80, 220],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Kamikaze => "kamikaze",
            EnemyKind::Swarm => "swarm",
            EnemyKind::Elite => "elite",
        }
    }
}

/// Runtime enemy state; paired with an [`EnemyKind`] tag.
#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Speed after level scaling.
    pub speed: f32,
    /// Score awarded on destruction after level scaling.
    pub score_value: u32,
    pub contact_damage: f32,
    /// Cooldown until the next shot (kinds that fire).
    pub fire_cooldown: f32,
    /// Orbit angle in radians (Elite only).
    pub orbit_angle: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            speed: stats.speed,
            score_value: stats.score_value,
            contact_damage: stats.contact_damage,
            fire_cooldown: stats.fire_interval.unwrap_or(0.0),
            orbit_angle: 0.0,
        }
    }
}

// ============================================================================
// BOSS COMPONENTS
// ============================================================================

/// Boss variant; determines size, health and the phase-to-pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    Basic,
    Twin,
    Mega,
    Final,
}

impl BossKind {
    pub fn base_health(self) -> f32 {
        match self {
            BossKind::Basic => 500.0,
            BossKind::Twin => 350.0,
            BossKind::Mega => 1000.0,
            BossKind::Final => 1500.0,
        }
    }

    pub fn size(self) -> (f32, f32) {
        match self {
            BossKind::Basic => (96.0, 96.0),
            BossKind::Twin => (80.0, 80.0),
            BossKind::Mega => (144.0, 144.0),
            BossKind::Final => (172.0, 172.0),
        }
    }

    /// Attack pattern for each phase index 0..=3.
    pub fn pattern_table(self) -> [AttackPattern; 4] {
        match self {
            BossKind::Basic => [
                AttackPattern::Single,
                AttackPattern::Single,
                AttackPattern::Spread,
                AttackPattern::Spread,
            ],
            BossKind::Twin => [
                AttackPattern::Spread,
                AttackPattern::Spread,
                AttackPattern::Wave,
                AttackPattern::Homing,
            ],
            BossKind::Mega => [
                AttackPattern::Spiral,
                AttackPattern::Spiral,
                AttackPattern::Spread,
                AttackPattern::Homing,
            ],
            BossKind::Final => [
                AttackPattern::Wave,
                AttackPattern::Spiral,
                AttackPattern::Homing,
                AttackPattern::Homing,
            ],
        }
    }
}

/// Attack pattern fired by a boss phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// One aimed shot at the player.
    Single,
    /// Fan of shots around the downward axis.
    Spread,
    /// Full ring rotating over time.
    Spiral,
    /// Row of bullets with sine-modulated headings.
    Wave,
    /// Volley of homing bullets.
    Homing,
}

/// Multi-phase boss state. Phase index only ever advances.
#[derive(Component, Debug, Clone)]
pub struct Boss {
    pub kind: BossKind,
    /// Current phase, 0..=3. Advanced by health thresholds.
    pub phase: usize,
    /// Absolute health values that trigger phases 1, 2 and 3.
    pub thresholds: [f32; 3],
    /// Seconds between volleys at phase 0; tightens per phase.
    pub fire_interval: f32,
    pub fire_cooldown: f32,
    /// Running timer driving spiral rotation and wave modulation.
    pub attack_timer: f32,
    pub contact_damage: f32,
    pub score_value: u32,
}

impl Boss {
    pub fn new(kind: BossKind, max_health: f32) -> Self {
        Self {
            kind,
            phase: 0,
            thresholds: [max_health * 0.66, max_health * 0.33, max_health * 0.10],
            fire_interval: 1.5,
            fire_cooldown: 1.5,
            attack_timer: 0.0,
            contact_damage: 30.0,
            score_value: 500,
        }
    }

    pub fn current_pattern(&self) -> AttackPattern {
        self.kind.pattern_table()[self.phase.min(3)]
    }

    /// Effective cooldown for the current phase (later phases fire faster).
    pub fn phase_fire_interval(&self) -> f32 {
        self.fire_interval / (1.0 + self.phase as f32 * 0.3)
    }
}

// ============================================================================
// PROJECTILE / PICKUP / COSMETIC COMPONENTS
// ============================================================================

/// A projectile. The faction decides which collision pairs it participates in.
#[derive(Component, Debug, Clone, Copy)]
pub struct Bullet {
    pub faction: Faction,
    pub damage: f32,
    /// Turn rate in radians per second; `None` flies straight.
    pub homing: Option<f32>,
}

impl Bullet {
    pub fn straight(faction: Faction, damage: f32) -> Self {
        Self {
            faction,
            damage,
            homing: None,
        }
    }

    pub fn homing(faction: Faction, damage: f32, turn_rate: f32) -> Self {
        Self {
            faction,
            damage,
            homing: Some(turn_rate),
        }
    }
}

/// Timed modifier kinds a power-up can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
    Damage,
    Shield,
    RapidFire,
    MultiShot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Damage,
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::MultiShot,
    ];

    pub fn color(self) -> [u8; 3] {
        match self {
            PowerUpKind::Health => [80, 220, 80],
            PowerUpKind::Speed => [80, 160, 250],
            PowerUpKind::Damage => [240, 90, 90],
            PowerUpKind::Shield => [120, 120, 250],
            PowerUpKind::RapidFire => [250, 200, 60],
            PowerUpKind::MultiShot => [220, 90, 220],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Health => "health",
            PowerUpKind::Speed => "speed",
            PowerUpKind::Damage => "damage",
            PowerUpKind::Shield => "shield",
            PowerUpKind::RapidFire => "rapid_fire",
            PowerUpKind::MultiShot => "multi_shot",
        }
    }
}

/// A floating pickup. Applies its effect to the player on overlap.
#[derive(Component, Debug, Clone, Copy)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Effect duration granted on pickup, in seconds.
    pub duration: f32,
}

/// Short-lived cosmetic effect. Never participates in collision.
#[derive(Component, Debug, Clone, Copy)]
pub struct Particle {
    pub color: [u8; 3],
    pub size: f32,
}

// ============================================================================
// BUNDLES
// ============================================================================

/// Bundle for the player ship entity.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub ship: PlayerShip,
    pub effects: ActiveEffects,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub bbox: BoundingBox,
    pub health: Health,
}

impl PlayerBundle {
    pub fn new(x: f32, y: f32, max_health: f32) -> Self {
        Self {
            ship: PlayerShip::default(),
            effects: ActiveEffects::default(),
            faction: Faction::Player,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            bbox: BoundingBox::new(36.0, 36.0),
            health: Health::new(max_health),
        }
    }
}

/// Bundle for an enemy entity, scaled for the given level.
#[derive(Bundle)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub bbox: BoundingBox,
    pub health: Health,
}

impl EnemyBundle {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        Self::scaled(kind, x, y, 1)
    }

    /// Spawn scaled by the level's difficulty multipliers.
    pub fn scaled(kind: EnemyKind, x: f32, y: f32, level: u32) -> Self {
        let stats = kind.stats();
        let steps = level.saturating_sub(1) as f32;
        let health = stats.health * 1.2f32.powf(steps);
        let mut enemy = Enemy::new(kind);
        enemy.speed = stats.speed * 1.05f32.powf(steps);
        enemy.score_value = (stats.score_value as f32 * (1.0 + steps * 0.2)) as u32;
        Self {
            enemy,
            faction: Faction::Enemy,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            bbox: BoundingBox::new(stats.size.0, stats.size.1),
            health: Health::new(health),
        }
    }
}

/// Bundle for a boss entity, scaled for the given level.
#[derive(Bundle)]
pub struct BossBundle {
    pub boss: Boss,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub bbox: BoundingBox,
    pub health: Health,
}

impl BossBundle {
    pub fn new(kind: BossKind, x: f32, y: f32, level: u32) -> Self {
        let steps = level.saturating_sub(1) as f32;
        let max_health = kind.base_health() * (1.0 + steps * 0.25);
        let (w, h) = kind.size();
        let mut boss = Boss::new(kind, max_health);
        boss.score_value = (boss.score_value as f32 * (1.0 + steps * 0.25)) as u32;
        Self {
            boss,
            faction: Faction::Enemy,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            bbox: BoundingBox::new(w, h),
            health: Health::new(max_health),
        }
    }
}

/// Bundle for a projectile.
#[derive(Bundle)]
pub struct BulletBundle {
    pub bullet: Bullet,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub bbox: BoundingBox,
    pub lifetime: Lifetime,
}

impl BulletBundle {
    pub fn new(bullet: Bullet, x: f32, y: f32, vx: f32, vy: f32) -> Self {
        let faction = bullet.faction;
        let lifetime = match faction {
            Faction::Player => 5.0,
            _ => 8.0,
        };
        Self {
            bullet,
            faction,
            position: Position::new(x, y),
            velocity: Velocity::new(vx, vy),
            bbox: BoundingBox::new(8.0, 12.0),
            lifetime: Lifetime::new(lifetime),
        }
    }
}

/// Bundle for a power-up pickup. Descends slowly and expires.
#[derive(Bundle)]
pub struct PowerUpBundle {
    pub powerup: PowerUp,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub bbox: BoundingBox,
    pub lifetime: Lifetime,
}

impl PowerUpBundle {
    pub const FALL_SPEED: f32 = 60.0;
    pub const DEFAULT_DURATION: f32 = 8.0;
    pub const ON_SCREEN_LIFETIME: f32 = 15.0;

    pub fn new(kind: PowerUpKind, x: f32, y: f32) -> Self {
        Self {
            powerup: PowerUp {
                kind,
                duration: Self::DEFAULT_DURATION,
            },
            faction: Faction::Neutral,
            position: Position::new(x, y),
            velocity: Velocity::new(0.0, Self::FALL_SPEED),
            bbox: BoundingBox::new(24.0, 24.0),
            lifetime: Lifetime::new(Self::ON_SCREEN_LIFETIME),
        }
    }
}

/// Bundle for a cosmetic particle.
#[derive(Bundle)]
pub struct ParticleBundle {
    pub particle: Particle,
    pub position: Position,
    pub velocity: Velocity,
    pub lifetime: Lifetime,
}

impl ParticleBundle {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, color: [u8; 3], lifetime: f32, size: f32) -> Self {
        Self {
            particle: Particle { color, size },
            position: Position::new(x, y),
            velocity: Velocity::new(vx, vy),
            lifetime: Lifetime::new(lifetime),
        }
    }
}
