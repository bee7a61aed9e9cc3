//! Formation layouts for enemy waves
//!
//! Pure functions: the same wave and arena always produce the same slots.
//! Slot counts and spreads grow with the wave but stay inside 40% (x) / 35%
//! (y) of the arena size around the formation center.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::state::{ENEMY_VARIANTS, EnemyRole};
use crate::consts::BOSS_WAVE;

/// Named formation layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationKind {
    Swarm,
    Line,
    VShape,
    Ring,
    LeaderMinions,
}

/// Rotation order for regular waves
pub const FORMATION_ORDER: [FormationKind; 5] = [
    FormationKind::Swarm,
    FormationKind::Line,
    FormationKind::VShape,
    FormationKind::Ring,
    FormationKind::LeaderMinions,
];

/// First wave that stacks a second formation
pub const ESCALATION_WAVE: u32 = 7;

/// Distance of the first row from the top of the spread band
const ROW_MARGIN: f32 = 60.0;

/// A single enemy spawn point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    pub x: f32,
    pub y: f32,
    pub role: EnemyRole,
    pub variant: u8,
}

/// Half-extents of the spawn band around a center
#[derive(Debug, Clone, Copy)]
struct Spread {
    max_x: f32,
    max_y: f32,
}

impl Spread {
    fn for_arena(arena_w: f32, arena_h: f32) -> Self {
        Self {
            max_x: arena_w * 0.4,
            max_y: arena_h * 0.35,
        }
    }

    fn clamp(&self, slot: &mut FormationSlot, cx: f32, cy: f32) {
        slot.x = slot.x.clamp(cx - self.max_x, cx + self.max_x);
        slot.y = slot.y.clamp(cy - self.max_y, cy + self.max_y);
    }
}

fn variant(i: usize) -> u8 {
    (i % ENEMY_VARIANTS as usize) as u8
}

/// Formation used by a wave, or None for the boss wave and wave 0
pub fn formation_for_wave(wave: u32) -> Option<FormationKind> {
    if wave == 0 || wave == BOSS_WAVE {
        return None;
    }
    Some(FORMATION_ORDER[((wave - 1) % FORMATION_ORDER.len() as u32) as usize])
}

/// Lay out one formation around (center_x, center_y)
pub fn layout(
    kind: FormationKind,
    wave: u32,
    center_x: f32,
    center_y: f32,
    arena_w: f32,
    arena_h: f32,
) -> Vec<FormationSlot> {
    if wave == 0 {
        return Vec::new();
    }
    let (cx, cy) = (center_x, center_y);
    let spread = Spread::for_arena(arena_w, arena_h);
    let (max_x, max_y) = (spread.max_x, spread.max_y);
    // Waves past the first drive the growth
    let level = wave - 1;
    let scale = 1.0 + level as f32 * 0.05;
    let mut slots = Vec::new();

    match kind {
        FormationKind::Swarm => {
            let count = (6 + level).min(14) as usize;
            let r = (80.0 + level as f32 * 8.0).min(max_x).min(max_y);
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU;
                slots.push(FormationSlot {
                    x: cx + angle.cos() * r,
                    y: cy + angle.sin() * r * 0.6,
                    role: if i == 0 {
                        EnemyRole::Chaser
                    } else {
                        EnemyRole::Minion
                    },
                    variant: variant(i),
                });
            }
        }
        FormationKind::Line => {
            let count = (5 + level).min(10) as usize;
            let spacing = (50.0 * scale).min(max_x * 2.0 / (count.max(2) - 1) as f32);
            let start_x = cx - (count - 1) as f32 * spacing / 2.0;
            for i in 0..count {
                slots.push(FormationSlot {
                    x: start_x + i as f32 * spacing,
                    y: cy - max_y + ROW_MARGIN,
                    role: EnemyRole::Ranged,
                    variant: variant(i),
                });
            }
        }
        FormationKind::VShape => {
            let count = (5 + level / 2).min(9) as usize;
            let half = count / 2;
            for i in 0..count {
                let side: f32 = match i.cmp(&half) {
                    std::cmp::Ordering::Less => -1.0,
                    std::cmp::Ordering::Greater => 1.0,
                    std::cmp::Ordering::Equal => 0.0,
                };
                let row = if i == half { 0.0 } else { 1.0 };
                let col = i.abs_diff(half) as f32;
                let arm = (40.0 + col * 45.0).min(max_x - 20.0) * scale;
                slots.push(FormationSlot {
                    x: cx + side * arm,
                    y: cy - max_y + ROW_MARGIN + row * 50.0,
                    role: if i == half {
                        EnemyRole::Leader
                    } else {
                        EnemyRole::Minion
                    },
                    variant: variant(i),
                });
            }
        }
        FormationKind::Ring => {
            let count = (6 + level).min(12) as usize;
            let radius = (120.0 * scale).min(max_x).min(max_y);
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU;
                slots.push(FormationSlot {
                    x: cx + angle.cos() * radius,
                    y: cy + angle.sin() * radius * 0.6,
                    role: EnemyRole::Ranged,
                    variant: variant(i),
                });
            }
        }
        FormationKind::LeaderMinions => {
            let rad = 70.0_f32.min(max_x - 10.0).max(0.0);
            slots.push(FormationSlot {
                x: cx,
                y: cy - max_y + ROW_MARGIN + 30.0,
                role: EnemyRole::Leader,
                variant: 0,
            });
            let minions = (4 + level).min(9) as usize;
            for i in 0..minions {
                let angle = i as f32 / minions as f32 * PI + PI / 2.0;
                slots.push(FormationSlot {
                    x: cx + angle.cos() * rad,
                    y: cy - max_y + ROW_MARGIN + 80.0,
                    role: EnemyRole::Minion,
                    variant: variant(i),
                });
            }
        }
    }

    for slot in &mut slots {
        spread.clamp(slot, cx, cy);
    }
    slots
}

/// Every regular-formation slot for a wave. Empty for the boss wave.
/// From wave 7 the next formation in rotation is stacked on the first.
pub fn formations_for_wave(
    wave: u32,
    center_x: f32,
    center_y: f32,
    arena_w: f32,
    arena_h: f32,
) -> Vec<FormationSlot> {
    let Some(primary) = formation_for_wave(wave) else {
        return Vec::new();
    };
    let mut slots = layout(primary, wave, center_x, center_y, arena_w, arena_h);

    if wave >= ESCALATION_WAVE {
        let secondary = FORMATION_ORDER[(wave % FORMATION_ORDER.len() as u32) as usize];
        let offset_x = if primary == secondary { 80.0 } else { 0.0 };
        let spread = Spread::for_arena(arena_w, arena_h);
        let mut more = layout(
            secondary,
            wave,
            center_x + offset_x,
            center_y + 50.0,
            arena_w,
            arena_h,
        );
        for slot in &mut more {
            spread.clamp(slot, center_x, center_y);
        }
        slots.extend(more);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    use proptest::prelude::*;

    const CX: f32 = ARENA_WIDTH / 2.0;
    const CY: f32 = ARENA_HEIGHT / 2.0;

    fn count(kind: FormationKind, wave: u32) -> usize {
        layout(kind, wave, CX, CY, ARENA_WIDTH, ARENA_HEIGHT).len()
    }

    fn total(wave: u32) -> usize {
        formations_for_wave(wave, CX, CY, ARENA_WIDTH, ARENA_HEIGHT).len()
    }

    #[test]
    fn test_rotation_order() {
        assert_eq!(formation_for_wave(1), Some(FormationKind::Swarm));
        assert_eq!(formation_for_wave(2), Some(FormationKind::Line));
        assert_eq!(formation_for_wave(3), Some(FormationKind::VShape));
        assert_eq!(formation_for_wave(4), Some(FormationKind::Ring));
        assert_eq!(formation_for_wave(5), None);
        assert_eq!(formation_for_wave(6), Some(FormationKind::Swarm));
        assert_eq!(formation_for_wave(10), Some(FormationKind::LeaderMinions));
    }

    #[test]
    fn test_boss_wave_and_wave_zero_are_empty() {
        assert!(formations_for_wave(BOSS_WAVE, CX, CY, ARENA_WIDTH, ARENA_HEIGHT).is_empty());
        assert!(formations_for_wave(0, CX, CY, ARENA_WIDTH, ARENA_HEIGHT).is_empty());
        assert!(layout(FormationKind::Ring, 0, CX, CY, ARENA_WIDTH, ARENA_HEIGHT).is_empty());
    }

    #[test]
    fn test_first_swarm() {
        let slots = layout(FormationKind::Swarm, 1, CX, CY, ARENA_WIDTH, ARENA_HEIGHT);
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0].role, EnemyRole::Chaser);
        assert!(slots[1..].iter().all(|s| s.role == EnemyRole::Minion));
    }

    #[test]
    fn test_leader_roles() {
        let v = layout(FormationKind::VShape, 3, CX, CY, ARENA_WIDTH, ARENA_HEIGHT);
        assert_eq!(v.iter().filter(|s| s.role == EnemyRole::Leader).count(), 1);
        let lm = layout(FormationKind::LeaderMinions, 1, CX, CY, ARENA_WIDTH, ARENA_HEIGHT);
        assert_eq!(lm[0].role, EnemyRole::Leader);
        assert_eq!(lm.len(), 5);
    }

    #[test]
    fn test_escalation_from_wave_seven() {
        // Same rotation position, before and after escalation
        assert!(total(7) > total(2));
        assert!(total(11) > total(6));
        assert!(total(7) > total(6));
        assert_eq!(total(6), count(FormationKind::Swarm, 6));
    }

    #[test]
    fn test_caps() {
        assert_eq!(count(FormationKind::Swarm, 40), 14);
        assert_eq!(count(FormationKind::Line, 40), 10);
        assert_eq!(count(FormationKind::VShape, 40), 9);
        assert_eq!(count(FormationKind::Ring, 40), 12);
        assert_eq!(count(FormationKind::LeaderMinions, 40), 10);
    }

    fn kind_strategy() -> impl Strategy<Value = FormationKind> {
        prop::sample::select(FORMATION_ORDER.to_vec())
    }

    proptest! {
        #[test]
        fn slots_stay_inside_spread(
            kind in kind_strategy(),
            wave in 1u32..=20,
            w in 200.0f32..2400.0,
            h in 200.0f32..1600.0,
        ) {
            let (cx, cy) = (w / 2.0, h / 2.0);
            for slot in layout(kind, wave, cx, cy, w, h) {
                prop_assert!((slot.x - cx).abs() <= 0.4 * w + 1e-3);
                prop_assert!((slot.y - cy).abs() <= 0.35 * h + 1e-3);
            }
            for slot in formations_for_wave(wave, cx, cy, w, h) {
                prop_assert!((slot.x - cx).abs() <= 0.4 * w + 1e-3);
                prop_assert!((slot.y - cy).abs() <= 0.35 * h + 1e-3);
            }
        }

        #[test]
        fn counts_never_shrink(kind in kind_strategy(), wave in 1u32..20) {
            prop_assert!(count(kind, wave + 1) >= count(kind, wave));
        }

        #[test]
        fn layout_is_deterministic(kind in kind_strategy(), wave in 1u32..=20) {
            let a = layout(kind, wave, CX, CY, ARENA_WIDTH, ARENA_HEIGHT);
            let b = layout(kind, wave, CX, CY, ARENA_WIDTH, ARENA_HEIGHT);
            prop_assert_eq!(a, b);
        }
    }
}
