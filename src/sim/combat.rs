//! Hit resolution between factions
//!
//! The host's collision collaborator reports overlapping handle pairs; this
//! module decides what each pair means. Health is only ever changed here.

use glam::Vec2;

use super::powerup::{PAINTBOMB_RADIUS, PowerupKind, PowerupState};
use super::registry::{ActorRegistry, DestroyedActor};
use super::state::{
    ActorId, BulletFaction, BulletHandle, Faction, GameEvent, Handle, boss_phase_for,
};
use crate::consts::*;

/// Splatter intensities per destruction kind
const ENEMY_SPLATTER: f32 = 1.0;
const BOSS_SPLATTER: f32 = 2.5;
const ALLY_SPLATTER: f32 = 0.6;
const BOMB_SPLATTER: f32 = 1.5;
const BULLET_SPLATTER: f32 = 0.3;
const PICKUP_SPLATTER: f32 = 0.2;

/// Mutable state a hit may touch
pub struct CombatContext<'a> {
    pub registry: &'a mut ActorRegistry,
    pub powerup: &'a mut PowerupState,
    pub events: &'a mut Vec<GameEvent>,
    /// Session clock, for powerup deadlines
    pub now_ms: f64,
}

/// What a resolved overlap changed, for the wave director and game-over check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    /// At least one enemy or the boss was destroyed
    pub hostile_destroyed: bool,
    pub boss_defeated: bool,
    /// Player health reached zero on this hit
    pub player_killed: bool,
}

impl CombatOutcome {
    pub fn merge(&mut self, other: CombatOutcome) {
        self.hostile_destroyed |= other.hostile_destroyed;
        self.boss_defeated |= other.boss_defeated;
        self.player_killed |= other.player_killed;
    }
}

/// A live participant in an overlap
#[derive(Debug, Clone, Copy)]
enum Party {
    Player,
    Enemy(ActorId),
    Ally(ActorId),
    Boss(ActorId),
    Pickup(ActorId),
    Bullet(BulletHandle),
}

fn classify(registry: &ActorRegistry, handle: Handle) -> Option<Party> {
    match handle {
        Handle::Bullet(b) => registry.bullet(b).map(|_| Party::Bullet(b)),
        Handle::Actor(id) => match registry.faction_of(id)? {
            Faction::Player => Some(Party::Player),
            Faction::Enemy => Some(Party::Enemy(id)),
            Faction::Ally => Some(Party::Ally(id)),
            Faction::Boss => Some(Party::Boss(id)),
            Faction::Pickup => Some(Party::Pickup(id)),
        },
    }
}

/// Resolve one overlap. Order of the pair does not matter; stale handles and
/// pairs with no rule are ignored.
pub fn resolve(ctx: &mut CombatContext<'_>, a: Handle, b: Handle) -> CombatOutcome {
    let (Some(pa), Some(pb)) = (classify(ctx.registry, a), classify(ctx.registry, b)) else {
        return CombatOutcome::default();
    };
    dispatch(ctx, pa, pb)
        .or_else(|| dispatch(ctx, pb, pa))
        .unwrap_or_default()
}

/// Apply the rule for (x, y) if one exists in this orientation
fn dispatch(ctx: &mut CombatContext<'_>, x: Party, y: Party) -> Option<CombatOutcome> {
    use BulletFaction as BF;

    let outcome = match (x, y) {
        (Party::Bullet(bullet), Party::Enemy(id)) if bullet.faction != BF::Enemy => {
            bullet_hits_enemy(ctx, bullet, id)
        }
        (Party::Bullet(bullet), Party::Boss(id)) if bullet.faction != BF::Enemy => {
            bullet_hits_boss(ctx, bullet, id)
        }
        (Party::Bullet(bullet), Party::Player) if bullet.faction == BF::Enemy => {
            bullet_hits_player(ctx, bullet)
        }
        (Party::Bullet(bullet), Party::Ally(id)) if bullet.faction == BF::Enemy => {
            ctx.registry.despawn_bullet(bullet);
            kill_ally(ctx, id);
            CombatOutcome::default()
        }
        (Party::Enemy(_), Party::Ally(id)) => {
            kill_ally(ctx, id);
            CombatOutcome::default()
        }
        (Party::Bullet(friendly), Party::Bullet(hostile))
            if friendly.faction != BF::Enemy && hostile.faction == BF::Enemy =>
        {
            cancel_bullets(ctx, friendly, hostile);
            CombatOutcome::default()
        }
        (Party::Player, Party::Pickup(id)) => collect_pickup(ctx, id),
        _ => return None,
    };
    Some(outcome)
}

fn bullet_damage(faction: BulletFaction) -> i32 {
    match faction {
        BulletFaction::Player => PLAYER_DAMAGE,
        BulletFaction::Ally => ALLY_DAMAGE,
        BulletFaction::Enemy => ENEMY_DAMAGE,
    }
}

/// Consume the bullet unless it pierces. Returns false if a piercing bullet
/// already damaged this target on its current pass.
fn spend_bullet(ctx: &mut CombatContext<'_>, handle: BulletHandle, target: ActorId) -> bool {
    let Some(bullet) = ctx.registry.bullet_mut(handle) else {
        return false;
    };
    // Ally bullets never pierce
    if bullet.piercing && handle.faction == BulletFaction::Player {
        if bullet.hit_targets.contains(&target) {
            return false;
        }
        bullet.hit_targets.push(target);
    } else {
        ctx.registry.despawn_bullet(handle);
    }
    true
}

fn emit_destroyed(events: &mut Vec<GameEvent>, gone: DestroyedActor, intensity: f32) {
    events.push(GameEvent::Destroyed {
        id: gone.id,
        faction: gone.faction,
        pos: gone.pos,
    });
    events.push(GameEvent::Splatter {
        pos: gone.pos,
        intensity,
    });
}

fn bullet_hits_enemy(ctx: &mut CombatContext<'_>, bullet: BulletHandle, id: ActorId) -> CombatOutcome {
    if !spend_bullet(ctx, bullet, id) {
        return CombatOutcome::default();
    }
    let Some(enemy) = ctx.registry.enemy_mut(id) else {
        return CombatOutcome::default();
    };
    enemy.health -= bullet_damage(bullet.faction);
    if enemy.health > 0 {
        ctx.events.push(GameEvent::HitFlash { id, pos: enemy.pos });
        return CombatOutcome::default();
    }

    match ctx.registry.destroy(id) {
        Some(gone) => {
            emit_destroyed(ctx.events, gone, ENEMY_SPLATTER);
            CombatOutcome {
                hostile_destroyed: true,
                ..Default::default()
            }
        }
        None => CombatOutcome::default(),
    }
}

fn bullet_hits_boss(ctx: &mut CombatContext<'_>, bullet: BulletHandle, id: ActorId) -> CombatOutcome {
    if !spend_bullet(ctx, bullet, id) {
        return CombatOutcome::default();
    }
    let Some(boss) = ctx.registry.boss_mut() else {
        return CombatOutcome::default();
    };
    boss.health -= bullet_damage(bullet.faction);
    if boss.health > 0 {
        let phase = boss_phase_for(boss.health, boss.max_health);
        if phase > boss.phase {
            boss.phase = phase;
            log::info!("Boss entered phase {}", phase);
            ctx.events.push(GameEvent::BossPhaseChanged { phase });
        }
        ctx.events.push(GameEvent::HitFlash { id, pos: boss.pos });
        return CombatOutcome::default();
    }

    match ctx.registry.destroy(id) {
        Some(gone) => {
            log::info!("Boss defeated");
            emit_destroyed(ctx.events, gone, BOSS_SPLATTER);
            CombatOutcome {
                hostile_destroyed: true,
                boss_defeated: true,
                ..Default::default()
            }
        }
        None => CombatOutcome::default(),
    }
}

fn bullet_hits_player(ctx: &mut CombatContext<'_>, bullet: BulletHandle) -> CombatOutcome {
    ctx.registry.despawn_bullet(bullet);
    let player = ctx.registry.player_mut();
    player.health -= bullet_damage(bullet.faction);
    ctx.events.push(GameEvent::HitFlash {
        id: player.id,
        pos: player.pos,
    });
    CombatOutcome {
        player_killed: player.health <= 0,
        ..Default::default()
    }
}

fn kill_ally(ctx: &mut CombatContext<'_>, id: ActorId) {
    if let Some(gone) = ctx.registry.destroy(id) {
        emit_destroyed(ctx.events, gone, ALLY_SPLATTER);
    }
}

fn cancel_bullets(ctx: &mut CombatContext<'_>, friendly: BulletHandle, hostile: BulletHandle) {
    let pos = ctx
        .registry
        .despawn_bullet(hostile)
        .map(|b| b.pos)
        .unwrap_or(Vec2::ZERO);
    let survives = friendly.faction == BulletFaction::Player
        && ctx.registry.bullet(friendly).is_some_and(|b| b.piercing);
    if !survives {
        ctx.registry.despawn_bullet(friendly);
    }
    ctx.events.push(GameEvent::Splatter {
        pos,
        intensity: BULLET_SPLATTER,
    });
}

fn collect_pickup(ctx: &mut CombatContext<'_>, id: ActorId) -> CombatOutcome {
    let Some(kind) = ctx
        .registry
        .pickups()
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.kind)
    else {
        return CombatOutcome::default();
    };
    if let Some(gone) = ctx.registry.destroy(id) {
        emit_destroyed(ctx.events, gone, PICKUP_SPLATTER);
    }

    if let Some(previous) = ctx.powerup.activate(kind, ctx.now_ms) {
        ctx.events.push(GameEvent::PowerupExpired { kind: previous });
    }
    ctx.events.push(GameEvent::PowerupActivated { kind });

    if kind == PowerupKind::PaintBomb {
        paint_bomb(ctx)
    } else {
        CombatOutcome::default()
    }
}

/// Kill every enemy within the bomb radius of the player. The boss is immune.
fn paint_bomb(ctx: &mut CombatContext<'_>) -> CombatOutcome {
    let center = ctx.registry.player().pos;
    let victims: Vec<ActorId> = ctx
        .registry
        .enemies()
        .iter()
        .filter(|e| e.pos.distance(center) <= PAINTBOMB_RADIUS)
        .map(|e| e.id)
        .collect();

    log::debug!("Paint bomb hit {} enemies", victims.len());
    let mut outcome = CombatOutcome::default();
    for id in victims {
        if let Some(gone) = ctx.registry.destroy(id) {
            emit_destroyed(ctx.events, gone, BOMB_SPLATTER);
            outcome.hostile_destroyed = true;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::registry::ActorSpawn;
    use crate::sim::state::EnemyRole;

    struct Fixture {
        registry: ActorRegistry,
        powerup: PowerupState,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: ActorRegistry::new(Vec2::new(500.0, 300.0)),
                powerup: PowerupState::default(),
                events: Vec::new(),
            }
        }

        fn hit(&mut self, a: impl Into<Handle>, b: impl Into<Handle>) -> CombatOutcome {
            let mut ctx = CombatContext {
                registry: &mut self.registry,
                powerup: &mut self.powerup,
                events: &mut self.events,
                now_ms: 0.0,
            };
            resolve(&mut ctx, a.into(), b.into())
        }

        fn enemy(&mut self, pos: Vec2) -> ActorId {
            self.registry.spawn(ActorSpawn::Enemy {
                pos,
                role: EnemyRole::Minion,
                variant: 0,
                last_shot_ms: 0.0,
            })
        }

        fn bullet(&mut self, faction: BulletFaction, piercing: bool) -> BulletHandle {
            self.registry
                .spawn_bullet(faction, Vec2::ZERO, Vec2::X, piercing)
                .unwrap()
        }
    }

    #[test]
    fn test_player_bullet_kills_in_one_hit() {
        let mut f = Fixture::new();
        let enemy = f.enemy(Vec2::ZERO);
        let bullet = f.bullet(BulletFaction::Player, false);
        let outcome = f.hit(bullet, enemy);
        assert!(outcome.hostile_destroyed);
        assert!(f.registry.get(enemy).is_none());
        assert!(f.registry.bullet(bullet).is_none());
        assert!(f.events.iter().any(|e| matches!(e, GameEvent::Splatter { .. })));
    }

    #[test]
    fn test_ally_bullet_needs_two_hits() {
        let mut f = Fixture::new();
        let enemy = f.enemy(Vec2::ZERO);
        let first = f.bullet(BulletFaction::Ally, false);
        assert!(!f.hit(enemy, first).hostile_destroyed);
        assert_eq!(f.registry.enemies()[0].health, 1);
        assert!(f.registry.bullet(first).is_none());
        let second = f.bullet(BulletFaction::Ally, false);
        assert!(f.hit(second, enemy).hostile_destroyed);
    }

    #[test]
    fn test_piercing_bullet_passes_through_two_enemies() {
        let mut f = Fixture::new();
        let a = f.enemy(Vec2::ZERO);
        let b = f.enemy(Vec2::new(10.0, 0.0));
        let bullet = f.bullet(BulletFaction::Player, true);
        assert!(f.hit(bullet, a).hostile_destroyed);
        assert!(f.hit(bullet, b).hostile_destroyed);
        assert!(f.registry.bullet(bullet).is_some());
        assert_eq!(f.registry.count_alive(Faction::Enemy), 0);
    }

    #[test]
    fn test_piercing_bullet_damages_same_target_once_per_pass() {
        let mut f = Fixture::new();
        let leader = f.registry.spawn(ActorSpawn::Enemy {
            pos: Vec2::ZERO,
            role: EnemyRole::Leader,
            variant: 0,
            last_shot_ms: 0.0,
        });
        let bullet = f.bullet(BulletFaction::Player, true);
        f.hit(bullet, leader);
        f.hit(bullet, leader);
        assert_eq!(f.registry.enemies()[0].health, LEADER_HEALTH - PLAYER_DAMAGE);
    }

    #[test]
    fn test_piercing_damage_ignores_stacking() {
        let mut f = Fixture::new();
        let leader = |f: &mut Fixture| {
            f.registry.spawn(ActorSpawn::Enemy {
                pos: Vec2::ZERO,
                role: EnemyRole::Leader,
                variant: 0,
                last_shot_ms: 0.0,
            })
        };
        let solo = leader(&mut f);
        let stacked_a = leader(&mut f);
        let stacked_b = leader(&mut f);
        let solo_bullet = f.bullet(BulletFaction::Player, true);
        let stacked_bullet = f.bullet(BulletFaction::Player, true);

        // Two frames of continuous overlap
        for _ in 0..2 {
            f.hit(solo_bullet, solo);
            f.hit(stacked_bullet, stacked_a);
            f.hit(stacked_bullet, stacked_b);
        }
        let health = |f: &Fixture, id: ActorId| {
            f.registry.enemies().iter().find(|e| e.id == id).map(|e| e.health)
        };
        let expected = Some(LEADER_HEALTH - PLAYER_DAMAGE);
        assert_eq!(health(&f, solo), expected);
        assert_eq!(health(&f, stacked_a), expected);
        assert_eq!(health(&f, stacked_b), expected);
    }

    #[test]
    fn test_boss_phases_never_decrease() {
        let mut f = Fixture::new();
        let boss = f.registry.spawn(ActorSpawn::Boss {
            pos: Vec2::ZERO,
            now_ms: 0.0,
        });
        let mut phases = Vec::new();
        for _ in 0..5 {
            let bullet = f.bullet(BulletFaction::Ally, false);
            f.hit(bullet, boss);
            phases.push(f.registry.boss().map(|b| b.phase).unwrap());
        }
        // health 5, 4, 3, 2, 1
        assert_eq!(phases, vec![1, 1, 2, 2, 3]);
        let bullet = f.bullet(BulletFaction::Ally, false);
        let outcome = f.hit(bullet, boss);
        assert!(outcome.boss_defeated);
        assert!(f.registry.boss().is_none());
    }

    #[test]
    fn test_enemy_bullet_hurts_player() {
        let mut f = Fixture::new();
        let player = f.registry.player().id;
        for _ in 0..PLAYER_MAX_HEALTH - 1 {
            let bullet = f.bullet(BulletFaction::Enemy, false);
            assert!(!f.hit(bullet, player).player_killed);
        }
        let bullet = f.bullet(BulletFaction::Enemy, false);
        assert!(f.hit(player, bullet).player_killed);
        assert_eq!(f.registry.player().health, 0);
        // Dead players take no further hits
        let bullet = f.bullet(BulletFaction::Enemy, false);
        assert!(!f.hit(bullet, player).player_killed);
    }

    #[test]
    fn test_allies_die_to_any_hostile_contact() {
        let mut f = Fixture::new();
        let ally = f.registry.spawn(ActorSpawn::Ally {
            pos: Vec2::ZERO,
            slot_index: 0,
        });
        let bullet = f.bullet(BulletFaction::Enemy, false);
        f.hit(bullet, ally);
        assert_eq!(f.registry.count_alive(Faction::Ally), 0);
        assert!(f.registry.bullet(bullet).is_none());

        let ally = f.registry.spawn(ActorSpawn::Ally {
            pos: Vec2::ZERO,
            slot_index: 0,
        });
        let enemy = f.enemy(Vec2::ZERO);
        f.hit(ally, enemy);
        assert_eq!(f.registry.count_alive(Faction::Ally), 0);
        assert_eq!(f.registry.count_alive(Faction::Enemy), 1);
    }

    #[test]
    fn test_bullets_cancel() {
        let mut f = Fixture::new();
        let ours = f.bullet(BulletFaction::Player, false);
        let theirs = f.bullet(BulletFaction::Enemy, false);
        f.hit(theirs, ours);
        assert!(f.registry.pool(BulletFaction::Player).is_empty());
        assert!(f.registry.pool(BulletFaction::Enemy).is_empty());

        // Piercing player bullets survive; ally bullets never do
        let piercing = f.bullet(BulletFaction::Player, true);
        let theirs = f.bullet(BulletFaction::Enemy, false);
        f.hit(piercing, theirs);
        assert!(f.registry.bullet(piercing).is_some());
        let ally = f.bullet(BulletFaction::Ally, true);
        let theirs = f.bullet(BulletFaction::Enemy, false);
        f.hit(ally, theirs);
        assert!(f.registry.bullet(ally).is_none());
    }

    #[test]
    fn test_friendly_pairs_ignored() {
        let mut f = Fixture::new();
        let ours = f.bullet(BulletFaction::Player, false);
        let ally = f.bullet(BulletFaction::Ally, false);
        let player = f.registry.player().id;
        assert_eq!(f.hit(ours, ally), CombatOutcome::default());
        assert_eq!(f.hit(ours, player), CombatOutcome::default());
        assert_eq!(f.registry.pool(BulletFaction::Player).len(), 1);
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_paint_bomb_clears_radius() {
        let mut f = Fixture::new();
        let player_pos = f.registry.player().pos;
        let near = f.enemy(player_pos + Vec2::new(100.0, 0.0));
        let far = f.enemy(player_pos + Vec2::new(PAINTBOMB_RADIUS + 50.0, 0.0));
        f.powerup.activate(PowerupKind::Piercing, 0.0);
        let pickup = f.registry.spawn(ActorSpawn::Pickup {
            pos: player_pos,
            kind: PowerupKind::PaintBomb,
        });
        let outcome = f.hit(f.registry.player().id, pickup);
        assert!(outcome.hostile_destroyed);
        assert!(f.registry.get(near).is_none());
        assert!(f.registry.get(far).is_some());
        assert!(f.registry.pickups().is_empty());
        assert!(f.events.contains(&GameEvent::Splatter {
            pos: player_pos,
            intensity: PICKUP_SPLATTER
        }));
        assert_eq!(f.powerup.kind(), None);
        assert!(f.events.contains(&GameEvent::PowerupExpired {
            kind: PowerupKind::Piercing
        }));
    }
}
