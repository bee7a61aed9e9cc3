//! Actor records, handles and events
//!
//! Each faction gets its own typed record rather than a bag of tagged data.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::powerup::PowerupKind;
use crate::consts::*;

/// Stable identifier of a live or destroyed actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Actor allegiance, used for iteration and overlap dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
    Ally,
    Boss,
    Pickup,
}

/// Enemy behavior role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRole {
    /// Runs at the player at full chase speed
    Chaser,
    /// Drifts and fires aimed shots
    Ranged,
    /// Drifts and fires; tougher than the rest
    Leader,
    /// Drifts, never fires
    Minion,
}

impl EnemyRole {
    /// Whether this role fires at the player
    pub fn fires(&self) -> bool {
        matches!(self, EnemyRole::Ranged | EnemyRole::Leader)
    }

    /// Starting health for this role
    pub fn base_health(&self) -> i32 {
        match self {
            EnemyRole::Leader => LEADER_HEALTH,
            _ => ENEMY_HEALTH,
        }
    }
}

/// Number of distinct enemy textures
pub const ENEMY_VARIANTS: u8 = 6;

/// Texture ids for enemy variants, indexed by `variant`
const ENEMY_TEXTURES: [&str; ENEMY_VARIANTS as usize] =
    ["enemy", "enemy2", "enemy3", "enemy4", "enemy5", "enemy6"];

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerActor {
    pub id: ActorId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    /// Last aim point supplied by the host
    pub aim: Vec2,
    /// Session time of the last shot (None = never fired)
    pub last_shot_ms: Option<f64>,
    /// Session time of the last dash
    pub last_dash_ms: Option<f64>,
}

impl PlayerActor {
    pub fn new(id: ActorId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            health: PLAYER_MAX_HEALTH,
            aim: pos + Vec2::new(0.0, -1.0),
            last_shot_ms: None,
            last_dash_ms: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Unit aim direction, facing up when the aim point sits on the player
    pub fn aim_dir(&self) -> Vec2 {
        crate::direction_or(self.pos, self.aim, Vec2::new(0.0, -1.0))
    }
}

/// A regular formation enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyActor {
    pub id: ActorId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub role: EnemyRole,
    /// Texture variant (0..ENEMY_VARIANTS)
    pub variant: u8,
    pub health: i32,
    /// World-clock time of the last shot (staggered at spawn)
    pub last_shot_ms: f64,
}

impl EnemyActor {
    pub fn texture_id(&self) -> &'static str {
        ENEMY_TEXTURES[(self.variant % ENEMY_VARIANTS) as usize]
    }
}

/// An escort ally; dies to any hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllyActor {
    pub id: ActorId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index into the flanking formation around the player
    pub slot_index: usize,
    pub last_shot_ms: Option<f64>,
}

/// The multi-phase boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossActor {
    pub id: ActorId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub max_health: i32,
    /// 1..=3, never decreases
    pub phase: u8,
    /// World-clock time of the last burst
    pub last_burst_ms: f64,
    /// Angular offset of the next burst
    pub burst_rotation: f32,
}

impl BossActor {
    pub fn new(id: ActorId, pos: Vec2, now_ms: f64) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            health: BOSS_HEALTH,
            max_health: BOSS_HEALTH,
            phase: 1,
            last_burst_ms: now_ms,
            burst_rotation: 0.0,
        }
    }
}

/// Boss phase implied by a health fraction: 3 at or below 33%, 2 at or
/// below 66%, otherwise 1.
pub fn boss_phase_for(health: i32, max_health: i32) -> u8 {
    let h = health as f32;
    let max = max_health as f32;
    if h <= max * 0.33 {
        3
    } else if h <= max * 0.66 {
        2
    } else {
        1
    }
}

/// A collectible powerup lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupActor {
    pub id: ActorId,
    pub pos: Vec2,
    pub kind: PowerupKind,
}

/// Bullet owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletFaction {
    Player,
    Ally,
    Enemy,
}

/// Reference to a pooled bullet. Stale once the slot is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BulletHandle {
    pub faction: BulletFaction,
    pub slot: usize,
    pub generation: u32,
}

/// Anything the overlap collaborator can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    Actor(ActorId),
    Bullet(BulletHandle),
}

impl From<ActorId> for Handle {
    fn from(id: ActorId) -> Self {
        Handle::Actor(id)
    }
}

impl From<BulletHandle> for Handle {
    fn from(handle: BulletHandle) -> Self {
        Handle::Bullet(handle)
    }
}

/// Wave progression phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WavePhase {
    /// Session created, no wave started yet
    #[default]
    Idle,
    /// Formation being instantiated
    Spawning,
    /// Regular wave in progress
    Active,
    /// Wave cleared, next wave pending
    Clearing,
    /// Boss warning banner showing
    BossIntro,
    /// Boss in play
    BossActive,
}

/// Presentation/audio events produced by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// An actor entered the arena
    Spawned {
        id: ActorId,
        faction: Faction,
        pos: Vec2,
    },
    /// An actor was removed
    Destroyed {
        id: ActorId,
        faction: Faction,
        pos: Vec2,
    },
    /// Non-lethal damage
    HitFlash { id: ActorId, pos: Vec2 },
    /// Hit effect to draw at a destruction point
    Splatter { pos: Vec2, intensity: f32 },
    /// A bullet was fired
    Shot { faction: BulletFaction, pos: Vec2 },
    /// HUD wave banner text changed
    WaveTextChanged { wave: u32, text: String },
    /// "Boss incoming" banner
    BossWarning { wave: u32 },
    BossPhaseChanged { phase: u8 },
    PowerupActivated { kind: PowerupKind },
    PowerupExpired { kind: PowerupKind },
    /// Player health reached zero
    GameOver { wave: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_phase_boundaries() {
        // 66% of 6 is 3.96, 33% is 1.98
        assert_eq!(boss_phase_for(6, 6), 1);
        assert_eq!(boss_phase_for(4, 6), 1);
        assert_eq!(boss_phase_for(3, 6), 2);
        assert_eq!(boss_phase_for(2, 6), 2);
        assert_eq!(boss_phase_for(1, 6), 3);
        assert_eq!(boss_phase_for(0, 6), 3);
    }

    #[test]
    fn test_roles() {
        assert!(EnemyRole::Ranged.fires());
        assert!(EnemyRole::Leader.fires());
        assert!(!EnemyRole::Chaser.fires());
        assert!(!EnemyRole::Minion.fires());
        assert_eq!(EnemyRole::Minion.base_health(), ENEMY_HEALTH);
        assert_eq!(EnemyRole::Leader.base_health(), LEADER_HEALTH);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let json = serde_json::to_string(&GameEvent::BossPhaseChanged { phase: 2 }).unwrap();
        assert!(json.contains("\"type\":\"BossPhaseChanged\""));
    }
}
