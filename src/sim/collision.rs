//! Reference overlap detection
//!
//! Hosts normally bring their own physics and call
//! [`Simulation::report_overlap`](super::Simulation::report_overlap) for each
//! contact. This detector does the same job with plain circle tests so the
//! headless binary and the integration tests can drive full sessions.

use glam::Vec2;

use super::registry::ActorRegistry;
use super::state::{ActorId, BulletFaction, Handle};

/// Collision radii per body type
pub const PLAYER_RADIUS: f32 = 14.0;
pub const ENEMY_RADIUS: f32 = 16.0;
pub const ALLY_RADIUS: f32 = 12.0;
pub const BOSS_RADIUS: f32 = 40.0;
pub const PICKUP_RADIUS: f32 = 14.0;
pub const BULLET_RADIUS: f32 = 4.0;

/// A pair of touching bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub a: Handle,
    pub b: Handle,
    /// How far the circles interpenetrate
    pub penetration: f32,
}

/// Penetration depth of two circles, or None if they do not touch
#[inline]
pub fn circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<f32> {
    let reach = ra + rb;
    let d2 = a.distance_squared(b);
    if d2 < reach * reach {
        Some(reach - d2.sqrt())
    } else {
        None
    }
}

/// Collect every overlap between bodies that have a combat rule, in a stable
/// order: friendly bullets against hostiles, then enemy bullets against the
/// player's side, then bullet cancels, melee against allies and pickups.
pub fn detect_overlaps(registry: &ActorRegistry) -> Vec<Overlap> {
    let mut found = Vec::new();
    let mut push = |a: Handle, b: Handle, pa: Vec2, ra: f32, pb: Vec2, rb: f32| {
        if let Some(penetration) = circle_overlap(pa, ra, pb, rb) {
            found.push(Overlap { a, b, penetration });
        }
    };

    let hostiles: Vec<(ActorId, Vec2, f32)> = registry
        .enemies()
        .iter()
        .map(|e| (e.id, e.pos, ENEMY_RADIUS))
        .chain(registry.boss().map(|b| (b.id, b.pos, BOSS_RADIUS)))
        .collect();

    for faction in [BulletFaction::Player, BulletFaction::Ally] {
        for (handle, bullet) in registry.pool(faction).iter() {
            for &(id, pos, r) in &hostiles {
                push(handle.into(), id.into(), bullet.pos, BULLET_RADIUS, pos, r);
            }
        }
    }

    let player = registry.player();
    for (handle, bullet) in registry.pool(BulletFaction::Enemy).iter() {
        if player.is_alive() {
            push(
                handle.into(),
                player.id.into(),
                bullet.pos,
                BULLET_RADIUS,
                player.pos,
                PLAYER_RADIUS,
            );
        }
        for ally in registry.allies() {
            push(
                handle.into(),
                ally.id.into(),
                bullet.pos,
                BULLET_RADIUS,
                ally.pos,
                ALLY_RADIUS,
            );
        }
        for faction in [BulletFaction::Player, BulletFaction::Ally] {
            for (friendly, fb) in registry.pool(faction).iter() {
                push(
                    friendly.into(),
                    handle.into(),
                    fb.pos,
                    BULLET_RADIUS,
                    bullet.pos,
                    BULLET_RADIUS,
                );
            }
        }
    }

    for enemy in registry.enemies() {
        for ally in registry.allies() {
            push(
                enemy.id.into(),
                ally.id.into(),
                enemy.pos,
                ENEMY_RADIUS,
                ally.pos,
                ALLY_RADIUS,
            );
        }
    }

    if player.is_alive() {
        for pickup in registry.pickups() {
            push(
                player.id.into(),
                pickup.id.into(),
                player.pos,
                PLAYER_RADIUS,
                pickup.pos,
                PICKUP_RADIUS,
            );
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::powerup::PowerupKind;
    use crate::sim::registry::ActorSpawn;
    use crate::sim::state::EnemyRole;

    #[test]
    fn test_circle_overlap() {
        assert_eq!(circle_overlap(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 5.0), None);
        let depth = circle_overlap(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 5.0).unwrap();
        assert!((depth - 2.0).abs() < 1e-5);
        // Touching edges do not count
        assert_eq!(circle_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0), None);
    }

    #[test]
    fn test_detects_only_ruled_pairs() {
        let mut reg = ActorRegistry::new(Vec2::new(500.0, 500.0));
        let enemy = reg.spawn(ActorSpawn::Enemy {
            pos: Vec2::new(100.0, 100.0),
            role: EnemyRole::Minion,
            variant: 0,
            last_shot_ms: 0.0,
        });
        let shot = reg
            .spawn_bullet(BulletFaction::Player, Vec2::new(105.0, 100.0), Vec2::ZERO, false)
            .unwrap();
        // Friendly bullets stacked on each other are not a pair
        reg.spawn_bullet(BulletFaction::Ally, Vec2::new(105.0, 100.0), Vec2::ZERO, false);

        let overlaps = detect_overlaps(&reg);
        assert!(
            overlaps
                .iter()
                .any(|o| o.a == Handle::from(shot) && o.b == Handle::from(enemy))
        );
        assert_eq!(overlaps.len(), 2);
    }

    #[test]
    fn test_player_collects_pickup() {
        let mut reg = ActorRegistry::new(Vec2::new(300.0, 300.0));
        let pickup = reg.spawn(ActorSpawn::Pickup {
            pos: Vec2::new(310.0, 300.0),
            kind: PowerupKind::Dash,
        });
        let overlaps = detect_overlaps(&reg);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].b, Handle::from(pickup));
    }
}
