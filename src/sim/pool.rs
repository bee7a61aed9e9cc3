//! Fixed-capacity bullet pools
//!
//! One pool per bullet faction. Slots are recycled through a free list and
//! carry a generation counter so handles to recycled slots go stale.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{ActorId, BulletFaction, BulletHandle};

/// A live projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub faction: BulletFaction,
    /// Passes through enemies instead of being consumed
    pub piercing: bool,
    /// Actors a piercing bullet already damaged on this pass
    pub hit_targets: Vec<ActorId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    bullet: Bullet,
    active: bool,
    generation: u32,
}

/// Bounded pool with get-or-fail allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletPool {
    faction: BulletFaction,
    slots: Vec<Slot>,
    /// Inactive slot indices; popped from the back
    free: Vec<usize>,
}

impl BulletPool {
    pub fn new(faction: BulletFaction, capacity: usize) -> Self {
        let idle = Bullet {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            faction,
            piercing: false,
            hit_targets: Vec::new(),
        };
        Self {
            faction,
            slots: vec![
                Slot {
                    bullet: idle,
                    active: false,
                    generation: 0,
                };
                capacity
            ],
            // Reversed so slot 0 is handed out first
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn faction(&self) -> BulletFaction {
        self.faction
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live bullets
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take an inactive slot. Returns None when the pool is exhausted.
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, piercing: bool) -> Option<BulletHandle> {
        let slot_index = self.free.pop()?;
        let slot = &mut self.slots[slot_index];
        slot.active = true;
        slot.bullet.pos = pos;
        slot.bullet.vel = vel;
        slot.bullet.piercing = piercing;
        slot.bullet.hit_targets.clear();
        Some(BulletHandle {
            faction: self.faction,
            slot: slot_index,
            generation: slot.generation,
        })
    }

    /// Return a bullet to the pool. Stale or foreign handles are ignored.
    pub fn despawn(&mut self, handle: BulletHandle) -> Option<Bullet> {
        if !self.is_live(handle) {
            return None;
        }
        let slot = &mut self.slots[handle.slot];
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot);
        Some(slot.bullet.clone())
    }

    pub fn is_live(&self, handle: BulletHandle) -> bool {
        handle.faction == self.faction
            && self
                .slots
                .get(handle.slot)
                .is_some_and(|s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: BulletHandle) -> Option<&Bullet> {
        if self.is_live(handle) {
            Some(&self.slots[handle.slot].bullet)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: BulletHandle) -> Option<&mut Bullet> {
        if self.is_live(handle) {
            Some(&mut self.slots[handle.slot].bullet)
        } else {
            None
        }
    }

    /// Live bullets in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BulletHandle, &Bullet)> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                BulletHandle {
                    faction: self.faction,
                    slot: i,
                    generation: s.generation,
                },
                &s.bullet,
            )
        })
    }

    /// Integrate every live bullet by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.bullet.pos += slot.bullet.vel * dt;
        }
    }

    /// Despawn every live bullet for which `outside` returns true.
    /// Returns the number culled.
    pub fn cull(&mut self, mut outside: impl FnMut(Vec2) -> bool) -> usize {
        let doomed: Vec<BulletHandle> = self
            .iter()
            .filter(|(_, b)| outside(b.pos))
            .map(|(h, _)| h)
            .collect();
        for handle in &doomed {
            self.despawn(*handle);
        }
        doomed.len()
    }

    /// Deactivate everything
    pub fn clear(&mut self) {
        let live: Vec<BulletHandle> = self.iter().map(|(h, _)| h).collect();
        for handle in live {
            self.despawn(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_drops_shot() {
        let mut pool = BulletPool::new(BulletFaction::Player, 40);
        for _ in 0..40 {
            assert!(pool.spawn(Vec2::ZERO, Vec2::X, false).is_some());
        }
        assert!(pool.spawn(Vec2::ZERO, Vec2::X, false).is_none());
        assert_eq!(pool.len(), 40);
    }

    #[test]
    fn test_recycled_handle_goes_stale() {
        let mut pool = BulletPool::new(BulletFaction::Enemy, 1);
        let first = pool.spawn(Vec2::ZERO, Vec2::X, false).unwrap();
        assert!(pool.despawn(first).is_some());
        assert!(pool.despawn(first).is_none());
        let second = pool.spawn(Vec2::ONE, Vec2::Y, false).unwrap();
        assert_eq!(first.slot, second.slot);
        assert!(!pool.is_live(first));
        assert!(pool.despawn(first).is_none());
        assert_eq!(pool.get(second).map(|b| b.pos), Some(Vec2::ONE));
    }

    #[test]
    fn test_reused_slot_forgets_hit_targets() {
        let mut pool = BulletPool::new(BulletFaction::Player, 1);
        let first = pool.spawn(Vec2::ZERO, Vec2::X, true).unwrap();
        pool.get_mut(first).unwrap().hit_targets.push(ActorId(7));
        pool.despawn(first);
        let second = pool.spawn(Vec2::ZERO, Vec2::X, true).unwrap();
        assert!(pool.get(second).unwrap().hit_targets.is_empty());
    }

    #[test]
    fn test_foreign_handle_ignored() {
        let mut ally = BulletPool::new(BulletFaction::Ally, 2);
        let mut enemy = BulletPool::new(BulletFaction::Enemy, 2);
        let handle = ally.spawn(Vec2::ZERO, Vec2::X, false).unwrap();
        let _ = enemy.spawn(Vec2::ZERO, Vec2::X, false).unwrap();
        assert!(enemy.despawn(handle).is_none());
        assert_eq!(enemy.len(), 1);
    }

    #[test]
    fn test_advance_and_cull() {
        let mut pool = BulletPool::new(BulletFaction::Player, 4);
        pool.spawn(Vec2::ZERO, Vec2::new(100.0, 0.0), false);
        pool.spawn(Vec2::ZERO, Vec2::new(-10.0, 0.0), false);
        pool.advance(0.5);
        let culled = pool.cull(|p| p.x > 40.0);
        assert_eq!(culled, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.iter().next().map(|(_, b)| b.pos.x), Some(-5.0));
    }
}
