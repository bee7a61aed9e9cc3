//! Wave progression
//!
//! Drives idle → spawning → active → clearing → next wave, with the boss
//! wave inserting a warning banner and a boss fight. Also owns ally
//! recruitment, the clear-time pickup drop and the difficulty ramp.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::formation::formations_for_wave;
use super::powerup::PowerupKind;
use super::registry::{ActorRegistry, ActorSpawn};
use super::schedule::{Schedule, Task};
use super::state::{EnemyRole, Faction, GameEvent, WavePhase};
use crate::consts::*;
use crate::settings::Settings;

/// Keep pickups this far inside the arena edge
const PICKUP_EDGE_MARGIN: f32 = 20.0;

/// Clamp `v` into `[margin, extent - margin]`, shrinking the margin on
/// arenas too small to hold it
fn clamp_inside(v: f32, extent: f32) -> f32 {
    let margin = PICKUP_EDGE_MARGIN.min(extent / 2.0);
    v.clamp(margin, extent - margin)
}

/// Difficulty multiplier after `elapsed_ms` of session time
pub fn difficulty_ramp(elapsed_ms: f64) -> f32 {
    (1.0 + (elapsed_ms / 1000.0) as f32 * RAMP_PER_SECOND).min(RAMP_MAX)
}

/// Position of ally slot `slot_index`: two flanking columns beside the
/// player, rows stepping back against the aim direction.
pub fn ally_slot_position(slot_index: usize, player_pos: Vec2, aim_dir: Vec2) -> Vec2 {
    let side = if slot_index % 2 == 0 { -1.0 } else { 1.0 };
    let row = (slot_index / 2) as f32;
    let perp = aim_dir.perp();
    player_pos + perp * side * ALLY_SIDE_OFFSET - aim_dir * row * ALLY_ROW_SPACING
}

/// Where the boss and the extra center minion appear
fn upper_center(settings: &Settings) -> Vec2 {
    settings.center() - Vec2::new(0.0, settings.arena_height * 0.25)
}

/// Everything the director may touch while acting
pub struct WaveContext<'a> {
    pub registry: &'a mut ActorRegistry,
    pub schedule: &'a mut Schedule,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<GameEvent>,
    pub settings: &'a Settings,
    /// Session clock (unscaled)
    pub now_ms: f64,
    /// Hostile world clock (time-scaled)
    pub world_ms: f64,
}

/// Wave state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveDirector {
    wave: u32,
    phase: WavePhase,
    /// Single-flight guard for the clear → next wave transition
    advance_pending: bool,
}

impl WaveDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn advance_pending(&self) -> bool {
        self.advance_pending
    }

    /// Start the first wave of a session
    pub fn begin(&mut self, ctx: &mut WaveContext<'_>) {
        if self.phase == WavePhase::Idle {
            self.start_next_wave(ctx);
        }
    }

    /// Schedule the next wave if the current one is cleared. Returns true only
    /// for the call that actually scheduled it.
    pub fn check_wave_complete(&mut self, ctx: &mut WaveContext<'_>) -> bool {
        if self.advance_pending
            || !matches!(self.phase, WavePhase::Active | WavePhase::BossActive)
            || !ctx.registry.hostiles_cleared()
        {
            return false;
        }

        log::info!("Wave {} cleared", self.wave);
        self.phase = WavePhase::Clearing;
        self.advance_pending = true;
        ctx.schedule
            .schedule(ctx.now_ms + WAVE_CLEAR_DELAY_MS, Task::AdvanceWave);
        self.repack_allies(ctx);
        self.maybe_drop_pickup(ctx);
        true
    }

    /// Run a due scheduled task after re-checking that it still applies
    pub fn run_task(&mut self, task: Task, ctx: &mut WaveContext<'_>) {
        match task {
            Task::AdvanceWave => {
                if self.phase != WavePhase::Clearing || !self.advance_pending {
                    return;
                }
                self.advance_pending = false;
                self.start_next_wave(ctx);
            }
            Task::SpawnBoss => {
                if self.phase != WavePhase::BossIntro {
                    return;
                }
                self.spawn_boss(ctx);
            }
        }
    }

    fn start_next_wave(&mut self, ctx: &mut WaveContext<'_>) {
        self.wave += 1;
        if self.wave == BOSS_WAVE {
            log::info!("Wave {}: boss incoming", self.wave);
            self.phase = WavePhase::BossIntro;
            ctx.events.push(GameEvent::BossWarning { wave: self.wave });
            ctx.events.push(GameEvent::WaveTextChanged {
                wave: self.wave,
                text: "BOSS INCOMING".to_string(),
            });
            ctx.schedule
                .schedule(ctx.now_ms + BOSS_WARNING_MS, Task::SpawnBoss);
            return;
        }

        self.phase = WavePhase::Spawning;
        self.spawn_formation(ctx);
        self.recruit_allies(ctx);
        self.phase = WavePhase::Active;
        ctx.events.push(GameEvent::WaveTextChanged {
            wave: self.wave,
            text: format!("WAVE {}", self.wave),
        });
    }

    fn spawn_formation(&mut self, ctx: &mut WaveContext<'_>) {
        let center = ctx.settings.center();
        let slots = formations_for_wave(
            self.wave,
            center.x,
            center.y,
            ctx.settings.arena_width,
            ctx.settings.arena_height,
        );
        log::info!("Wave {}: {} formation slots", self.wave, slots.len());

        let extra = (upper_center(ctx.settings), EnemyRole::Minion, 0u8);
        let spawns = slots
            .iter()
            .map(|s| (Vec2::new(s.x, s.y), s.role, s.variant))
            .chain(std::iter::once(extra));
        for (pos, role, variant) in spawns {
            // Stagger first shots across one fire interval
            let stagger = ctx.rng.random_range(0.0..ENEMY_FIRE_INTERVAL_MS);
            let id = ctx.registry.spawn(ActorSpawn::Enemy {
                pos,
                role,
                variant,
                last_shot_ms: ctx.world_ms - stagger,
            });
            ctx.events.push(GameEvent::Spawned {
                id,
                faction: Faction::Enemy,
                pos,
            });
        }
    }

    fn spawn_boss(&mut self, ctx: &mut WaveContext<'_>) {
        // A leftover boss is retired with its events before the new one arrives
        let stale = ctx.registry.boss().map(|b| b.id);
        if let Some(gone) = stale.and_then(|id| ctx.registry.destroy(id)) {
            ctx.events.push(GameEvent::Destroyed {
                id: gone.id,
                faction: gone.faction,
                pos: gone.pos,
            });
        }
        let pos = upper_center(ctx.settings);
        let id = ctx.registry.spawn(ActorSpawn::Boss {
            pos,
            now_ms: ctx.world_ms,
        });
        log::info!("Boss spawned");
        self.phase = WavePhase::BossActive;
        ctx.events.push(GameEvent::Spawned {
            id,
            faction: Faction::Boss,
            pos,
        });
        ctx.events.push(GameEvent::WaveTextChanged {
            wave: self.wave,
            text: "BOSS".to_string(),
        });
    }

    /// Add one more ally than currently survive, into the lowest free slots
    fn recruit_allies(&mut self, ctx: &mut WaveContext<'_>) {
        let surviving = ctx.registry.count_alive(Faction::Ally);
        let target = (surviving + 1).min(MAX_ALLIES);
        let taken: Vec<usize> = ctx.registry.allies().iter().map(|a| a.slot_index).collect();
        let free = (0..MAX_ALLIES).filter(|i| !taken.contains(i));

        let player = ctx.registry.player();
        let (player_pos, aim_dir) = (player.pos, player.aim_dir());
        for slot_index in free.take(target - surviving) {
            let pos = ally_slot_position(slot_index, player_pos, aim_dir);
            let id = ctx.registry.spawn(ActorSpawn::Ally { pos, slot_index });
            ctx.events.push(GameEvent::Spawned {
                id,
                faction: Faction::Ally,
                pos,
            });
        }
        log::debug!(
            "Recruited allies: {} -> {}",
            surviving,
            ctx.registry.count_alive(Faction::Ally)
        );
    }

    /// Close gaps left by fallen allies so survivors fill slots 0..n
    fn repack_allies(&mut self, ctx: &mut WaveContext<'_>) {
        for (i, ally) in ctx.registry.allies_mut().iter_mut().enumerate() {
            ally.slot_index = i;
        }
    }

    fn maybe_drop_pickup(&mut self, ctx: &mut WaveContext<'_>) {
        if !ctx.rng.random_bool(POWERUP_DROP_CHANCE) {
            return;
        }
        let kind = PowerupKind::ALL[ctx.rng.random_range(0..PowerupKind::ALL.len())];
        let angle = ctx.rng.random_range(0.0..TAU);
        let dist = ctx
            .rng
            .random_range(PICKUP_MIN_DISTANCE..=PICKUP_MAX_DISTANCE);
        let s = ctx.settings;
        let raw = ctx.registry.player().pos + Vec2::from_angle(angle) * dist;
        let pos = Vec2::new(
            clamp_inside(raw.x, s.arena_width),
            clamp_inside(raw.y, s.arena_height),
        );
        let id = ctx.registry.spawn(ActorSpawn::Pickup { pos, kind });
        log::debug!("Dropped {:?} pickup", kind);
        ctx.events.push(GameEvent::Spawned {
            id,
            faction: Faction::Pickup,
            pos,
        });
    }
}
