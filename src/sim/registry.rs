//! Actor registry
//!
//! Owns every live actor and the three bullet pools. Collections are kept in
//! ascending id order so iteration is deterministic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::{Bullet, BulletPool};
use super::powerup::PowerupKind;
use super::state::{
    ActorId, AllyActor, BossActor, BulletFaction, BulletHandle, EnemyActor, EnemyRole, Faction,
    PickupActor, PlayerActor,
};
use crate::consts::*;

/// What to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorSpawn {
    Enemy {
        pos: Vec2,
        role: EnemyRole,
        variant: u8,
        /// World-clock time treated as the last shot, for staggering
        last_shot_ms: f64,
    },
    Ally {
        pos: Vec2,
        slot_index: usize,
    },
    Boss {
        pos: Vec2,
        now_ms: f64,
    },
    Pickup {
        pos: Vec2,
        kind: PowerupKind,
    },
}

/// Borrowed view of any live actor
#[derive(Debug, Clone, Copy)]
pub enum ActorRef<'a> {
    Player(&'a PlayerActor),
    Enemy(&'a EnemyActor),
    Ally(&'a AllyActor),
    Boss(&'a BossActor),
    Pickup(&'a PickupActor),
}

impl ActorRef<'_> {
    pub fn id(&self) -> ActorId {
        match self {
            ActorRef::Player(a) => a.id,
            ActorRef::Enemy(a) => a.id,
            ActorRef::Ally(a) => a.id,
            ActorRef::Boss(a) => a.id,
            ActorRef::Pickup(a) => a.id,
        }
    }

    pub fn pos(&self) -> Vec2 {
        match self {
            ActorRef::Player(a) => a.pos,
            ActorRef::Enemy(a) => a.pos,
            ActorRef::Ally(a) => a.pos,
            ActorRef::Boss(a) => a.pos,
            ActorRef::Pickup(a) => a.pos,
        }
    }

    pub fn faction(&self) -> Faction {
        match self {
            ActorRef::Player(_) => Faction::Player,
            ActorRef::Enemy(_) => Faction::Enemy,
            ActorRef::Ally(_) => Faction::Ally,
            ActorRef::Boss(_) => Faction::Boss,
            ActorRef::Pickup(_) => Faction::Pickup,
        }
    }

    /// Texture id for the presentation layer
    pub fn texture_id(&self) -> &'static str {
        match self {
            ActorRef::Player(_) => "player",
            ActorRef::Enemy(e) => e.texture_id(),
            ActorRef::Ally(_) => "friendly",
            ActorRef::Boss(_) => "boss",
            ActorRef::Pickup(_) => "pickup",
        }
    }
}

/// Record of an actor that was just removed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyedActor {
    pub id: ActorId,
    pub faction: Faction,
    pub pos: Vec2,
}

/// Owner of all actors and bullets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRegistry {
    player: PlayerActor,
    enemies: Vec<EnemyActor>,
    allies: Vec<AllyActor>,
    boss: Option<BossActor>,
    pickups: Vec<PickupActor>,
    player_bullets: BulletPool,
    ally_bullets: BulletPool,
    enemy_bullets: BulletPool,
    next_id: u32,
}

impl ActorRegistry {
    /// Fresh registry with the player at `player_pos`
    pub fn new(player_pos: Vec2) -> Self {
        Self {
            player: PlayerActor::new(ActorId(1), player_pos),
            enemies: Vec::new(),
            allies: Vec::new(),
            boss: None,
            pickups: Vec::new(),
            player_bullets: BulletPool::new(BulletFaction::Player, PLAYER_BULLET_CAPACITY),
            ally_bullets: BulletPool::new(BulletFaction::Ally, ALLY_BULLET_CAPACITY),
            enemy_bullets: BulletPool::new(BulletFaction::Enemy, ENEMY_BULLET_CAPACITY),
            next_id: 2,
        }
    }

    /// Allocate a new actor id
    fn next_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn an actor. The boss is a singleton: spawning a second boss
    /// replaces the first.
    pub fn spawn(&mut self, spawn: ActorSpawn) -> ActorId {
        let id = self.next_actor_id();
        match spawn {
            ActorSpawn::Enemy {
                pos,
                role,
                variant,
                last_shot_ms,
            } => self.enemies.push(EnemyActor {
                id,
                pos,
                vel: Vec2::ZERO,
                role,
                variant,
                health: role.base_health(),
                last_shot_ms,
            }),
            ActorSpawn::Ally { pos, slot_index } => self.allies.push(AllyActor {
                id,
                pos,
                vel: Vec2::ZERO,
                slot_index,
                last_shot_ms: None,
            }),
            ActorSpawn::Boss { pos, now_ms } => {
                if let Some(old) = self.boss.replace(BossActor::new(id, pos, now_ms)) {
                    log::warn!("Boss {:?} replaced by {:?} without being destroyed", old.id, id);
                }
            }
            ActorSpawn::Pickup { pos, kind } => self.pickups.push(PickupActor { id, pos, kind }),
        }
        id
    }

    /// Remove an actor. Destroying an unknown or already-dead id is a no-op.
    /// The player is never removed here; its death is game over.
    pub fn destroy(&mut self, id: ActorId) -> Option<DestroyedActor> {
        if let Some(i) = self.enemies.iter().position(|e| e.id == id) {
            let e = self.enemies.remove(i);
            return Some(DestroyedActor {
                id,
                faction: Faction::Enemy,
                pos: e.pos,
            });
        }
        if let Some(i) = self.allies.iter().position(|a| a.id == id) {
            let a = self.allies.remove(i);
            return Some(DestroyedActor {
                id,
                faction: Faction::Ally,
                pos: a.pos,
            });
        }
        if let Some(i) = self.pickups.iter().position(|p| p.id == id) {
            let p = self.pickups.remove(i);
            return Some(DestroyedActor {
                id,
                faction: Faction::Pickup,
                pos: p.pos,
            });
        }
        if self.boss.as_ref().is_some_and(|b| b.id == id) {
            return self.boss.take().map(|b| DestroyedActor {
                id,
                faction: Faction::Boss,
                pos: b.pos,
            });
        }
        None
    }

    /// Look up a live actor by id
    pub fn get(&self, id: ActorId) -> Option<ActorRef<'_>> {
        self.iter_all().find(|a| a.id() == id)
    }

    /// Faction of a live actor
    pub fn faction_of(&self, id: ActorId) -> Option<Faction> {
        self.get(id).map(|a| a.faction())
    }

    /// Live actors of one faction, in id order
    pub fn iter(&self, faction: Faction) -> Box<dyn Iterator<Item = ActorRef<'_>> + '_> {
        match faction {
            Faction::Player => Box::new(
                std::iter::once(&self.player)
                    .filter(|p| p.is_alive())
                    .map(ActorRef::Player),
            ),
            Faction::Enemy => Box::new(self.enemies.iter().map(ActorRef::Enemy)),
            Faction::Ally => Box::new(self.allies.iter().map(ActorRef::Ally)),
            Faction::Boss => Box::new(self.boss.iter().map(ActorRef::Boss)),
            Faction::Pickup => Box::new(self.pickups.iter().map(ActorRef::Pickup)),
        }
    }

    /// Every live actor
    pub fn iter_all(&self) -> impl Iterator<Item = ActorRef<'_>> + '_ {
        [
            Faction::Player,
            Faction::Ally,
            Faction::Enemy,
            Faction::Boss,
            Faction::Pickup,
        ]
        .into_iter()
        .flat_map(move |f| self.iter(f))
    }

    pub fn count_alive(&self, faction: Faction) -> usize {
        match faction {
            Faction::Player => usize::from(self.player.is_alive()),
            Faction::Enemy => self.enemies.len(),
            Faction::Ally => self.allies.len(),
            Faction::Boss => usize::from(self.boss.is_some()),
            Faction::Pickup => self.pickups.len(),
        }
    }

    pub fn player(&self) -> &PlayerActor {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerActor {
        &mut self.player
    }

    pub fn enemies(&self) -> &[EnemyActor] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [EnemyActor] {
        &mut self.enemies
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut EnemyActor> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn allies(&self) -> &[AllyActor] {
        &self.allies
    }

    pub fn allies_mut(&mut self) -> &mut [AllyActor] {
        &mut self.allies
    }

    pub fn boss(&self) -> Option<&BossActor> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut BossActor> {
        self.boss.as_mut()
    }

    pub fn pickups(&self) -> &[PickupActor] {
        &self.pickups
    }

    pub fn pool(&self, faction: BulletFaction) -> &BulletPool {
        match faction {
            BulletFaction::Player => &self.player_bullets,
            BulletFaction::Ally => &self.ally_bullets,
            BulletFaction::Enemy => &self.enemy_bullets,
        }
    }

    pub fn pool_mut(&mut self, faction: BulletFaction) -> &mut BulletPool {
        match faction {
            BulletFaction::Player => &mut self.player_bullets,
            BulletFaction::Ally => &mut self.ally_bullets,
            BulletFaction::Enemy => &mut self.enemy_bullets,
        }
    }

    /// Best-effort bullet spawn; None means the shot was dropped
    pub fn spawn_bullet(
        &mut self,
        faction: BulletFaction,
        pos: Vec2,
        vel: Vec2,
        piercing: bool,
    ) -> Option<BulletHandle> {
        let handle = self.pool_mut(faction).spawn(pos, vel, piercing);
        if handle.is_none() {
            log::debug!("{:?} bullet pool exhausted, shot dropped", faction);
        }
        handle
    }

    /// Idempotent bullet removal
    pub fn despawn_bullet(&mut self, handle: BulletHandle) -> Option<Bullet> {
        self.pool_mut(handle.faction).despawn(handle)
    }

    pub fn bullet(&self, handle: BulletHandle) -> Option<&Bullet> {
        self.pool(handle.faction).get(handle)
    }

    pub fn bullet_mut(&mut self, handle: BulletHandle) -> Option<&mut Bullet> {
        self.pool_mut(handle.faction).get_mut(handle)
    }

    /// Nearest live enemy or boss to `from` within `range`
    pub fn nearest_hostile(&self, from: Vec2, range: f32) -> Option<(ActorId, Vec2)> {
        self.enemies
            .iter()
            .map(|e| (e.id, e.pos))
            .chain(self.boss.iter().map(|b| (b.id, b.pos)))
            .map(|(id, pos)| (id, pos, pos.distance_squared(from)))
            .filter(|(_, _, d2)| *d2 <= range * range)
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, pos, _)| (id, pos))
    }

    /// True when no enemies remain and no boss is present
    pub fn hostiles_cleared(&self) -> bool {
        self.enemies.is_empty() && self.boss.is_none()
    }
}
