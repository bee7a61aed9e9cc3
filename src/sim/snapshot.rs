//! Presentation snapshot
//!
//! A serializable view of everything a renderer needs for one frame: sprite
//! positions with texture ids, and the HUD values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::ActorRegistry;
use super::state::{BulletFaction, Faction, Handle};

/// HUD readout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub health: i32,
    pub max_health: i32,
    pub wave: u32,
    /// Current wave banner
    pub wave_text: String,
    /// Label of the active powerup
    pub powerup: Option<String>,
    pub powerup_remaining_ms: Option<f64>,
    pub powerup_uses_left: Option<u32>,
    pub allies: usize,
    pub boss_health: Option<i32>,
    pub game_over: bool,
}

/// One drawable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub handle: Handle,
    pub texture: String,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub hud: Hud,
    pub sprites: Vec<Sprite>,
}

fn bullet_texture(faction: BulletFaction) -> &'static str {
    match faction {
        BulletFaction::Player => "bullet",
        BulletFaction::Ally => "ally_bullet",
        BulletFaction::Enemy => "enemy_bullet",
    }
}

impl Snapshot {
    /// Sprites in draw order: pickups, hostiles, the player's side, bullets
    pub fn capture(registry: &ActorRegistry, hud: Hud) -> Self {
        let actors = [
            Faction::Pickup,
            Faction::Enemy,
            Faction::Boss,
            Faction::Ally,
            Faction::Player,
        ]
        .into_iter()
        .flat_map(|f| registry.iter(f))
        .map(|a| Sprite {
            handle: a.id().into(),
            texture: a.texture_id().to_string(),
            pos: a.pos(),
        });

        let bullets = [BulletFaction::Player, BulletFaction::Ally, BulletFaction::Enemy]
            .into_iter()
            .flat_map(|f| registry.pool(f).iter())
            .map(|(handle, bullet)| Sprite {
                handle: handle.into(),
                texture: bullet_texture(handle.faction).to_string(),
                pos: bullet.pos,
            });

        Self {
            hud,
            sprites: actors.chain(bullets).collect(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::registry::ActorSpawn;
    use crate::sim::state::EnemyRole;

    fn hud() -> Hud {
        Hud {
            health: 5,
            max_health: 5,
            wave: 1,
            wave_text: "WAVE 1".to_string(),
            powerup: None,
            powerup_remaining_ms: None,
            powerup_uses_left: None,
            allies: 0,
            boss_health: None,
            game_over: false,
        }
    }

    #[test]
    fn test_textures() {
        let mut reg = ActorRegistry::new(Vec2::ZERO);
        reg.spawn(ActorSpawn::Enemy {
            pos: Vec2::ONE,
            role: EnemyRole::Minion,
            variant: 2,
            last_shot_ms: 0.0,
        });
        reg.spawn(ActorSpawn::Ally {
            pos: Vec2::ONE,
            slot_index: 0,
        });
        reg.spawn_bullet(BulletFaction::Enemy, Vec2::ONE, Vec2::ZERO, false);

        let snap = Snapshot::capture(&reg, hud());
        let textures: Vec<&str> = snap.sprites.iter().map(|s| s.texture.as_str()).collect();
        assert_eq!(textures, vec!["enemy3", "friendly", "player", "enemy_bullet"]);
    }

    #[test]
    fn test_dead_player_not_drawn() {
        let mut reg = ActorRegistry::new(Vec2::ZERO);
        reg.player_mut().health = 0;
        let snap = Snapshot::capture(&reg, hud());
        assert!(snap.sprites.is_empty());
        assert!(snap.to_json().contains("\"wave_text\":\"WAVE 1\""));
    }
}
