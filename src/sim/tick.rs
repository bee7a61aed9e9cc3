//! Frame-driven simulation tick
//!
//! `Simulation` is the host surface: feed it frame deltas, input and overlap
//! reports; read back events, queries and snapshots.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::combat::{self, CombatContext, CombatOutcome};
use super::powerup::{DASH_COOLDOWN_MS, DASH_DISTANCE, PowerupKind, PowerupState};
use super::registry::ActorRegistry;
use super::schedule::Schedule;
use super::snapshot::{Hud, Snapshot};
use super::state::{BulletFaction, EnemyRole, GameEvent, Handle, WavePhase};
use super::wave::{WaveContext, WaveDirector, ally_slot_position, difficulty_ramp};
use crate::consts::*;
use crate::settings::Settings;
use crate::{direction_or, move_toward, polar_to_cartesian};

/// Longest frame the simulation will integrate in one step
pub const MAX_FRAME_MS: f64 = 100.0;

/// Host input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim point in arena coordinates; None keeps the previous aim
    pub aim: Option<Vec2>,
    /// Movement intent; clamped to unit length
    pub movement: Vec2,
    /// Fire held
    pub fire: bool,
    /// Dash pressed
    pub dash: bool,
}

/// One play session
pub struct Simulation {
    settings: Settings,
    /// Session clock, unscaled
    real_ms: f64,
    /// Hostile clock, scaled by the active time-scale
    world_ms: f64,
    registry: ActorRegistry,
    powerup: PowerupState,
    director: WaveDirector,
    schedule: Schedule,
    rng: Pcg32,
    events: Vec<GameEvent>,
    wave_text: String,
    game_over: bool,
}

impl Simulation {
    /// Create a session and start wave 1
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        let mut sim = Self {
            registry: ActorRegistry::new(settings.player_start()),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            real_ms: 0.0,
            world_ms: 0.0,
            powerup: PowerupState::default(),
            director: WaveDirector::new(),
            schedule: Schedule::new(),
            events: Vec::new(),
            wave_text: String::new(),
            game_over: false,
        };
        sim.begin();
        sim
    }

    /// Throw away every actor, timer and powerup and start over from wave 1
    pub fn reset_session(&mut self) {
        log::info!("Session reset (seed {})", self.settings.seed);
        *self = Self::new(self.settings.clone());
    }

    fn begin(&mut self) {
        log::info!(
            "Session start: arena {}x{}, seed {}",
            self.settings.arena_width,
            self.settings.arena_height,
            self.settings.seed
        );
        self.with_wave_ctx(|director, ctx| director.begin(ctx));
        self.track_wave_text();
    }

    fn with_wave_ctx<R>(
        &mut self,
        f: impl FnOnce(&mut WaveDirector, &mut WaveContext<'_>) -> R,
    ) -> R {
        let mut ctx = WaveContext {
            registry: &mut self.registry,
            schedule: &mut self.schedule,
            rng: &mut self.rng,
            events: &mut self.events,
            settings: &self.settings,
            now_ms: self.real_ms,
            world_ms: self.world_ms,
        };
        f(&mut self.director, &mut ctx)
    }

    /// Keep the latest banner text for the HUD
    fn track_wave_text(&mut self) {
        if let Some(text) = self.events.iter().rev().find_map(|e| match e {
            GameEvent::WaveTextChanged { text, .. } => Some(text),
            _ => None,
        }) {
            self.wave_text.clone_from(text);
        }
    }

    /// Advance the session by `delta_ms` and return everything that happened
    /// since the previous call.
    pub fn tick(&mut self, delta_ms: f64, input: &TickInput) -> Vec<GameEvent> {
        if self.game_over {
            return self.drain_events();
        }
        let delta_ms = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };

        // Clocks and scheduled work
        let scale = self.powerup.time_scale() as f64;
        self.real_ms += delta_ms;
        self.world_ms += delta_ms * scale;
        let real_dt = (delta_ms / 1000.0) as f32;
        let world_dt = (delta_ms * scale / 1000.0) as f32;
        for task in self.schedule.take_due(self.real_ms) {
            self.with_wave_ctx(|director, ctx| director.run_task(task, ctx));
        }

        if let Some(kind) = self.powerup.expire(self.real_ms) {
            log::debug!("Powerup {:?} expired", kind);
            self.events.push(GameEvent::PowerupExpired { kind });
        }
        self.update_player(input, real_dt);
        self.update_allies(real_dt);
        self.update_enemies(world_dt);
        self.update_boss(world_dt);
        self.update_bullets(real_dt, world_dt);

        self.with_wave_ctx(|director, ctx| director.check_wave_complete(ctx));
        self.track_wave_text();
        self.drain_events()
    }

    /// Resolve an overlap reported by the host's collision collaborator.
    /// Events surface on the next `tick` or `drain_events`.
    pub fn report_overlap(&mut self, a: Handle, b: Handle) -> CombatOutcome {
        if self.game_over {
            return CombatOutcome::default();
        }
        let mut ctx = CombatContext {
            registry: &mut self.registry,
            powerup: &mut self.powerup,
            events: &mut self.events,
            now_ms: self.real_ms,
        };
        let outcome = combat::resolve(&mut ctx, a, b);

        if outcome.player_killed {
            self.game_over = true;
            self.schedule.clear();
            log::info!("Game over on wave {}", self.director.wave());
            self.events.push(GameEvent::GameOver {
                wave: self.director.wave(),
            });
        } else if outcome.hostile_destroyed {
            self.with_wave_ctx(|director, ctx| director.check_wave_complete(ctx));
        }
        outcome
    }

    /// Take pending events without advancing time
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_player(&mut self, input: &TickInput, dt: f32) {
        let (w, h) = (self.settings.arena_width, self.settings.arena_height);
        let now = self.real_ms;
        let movement = input.movement.clamp_length_max(1.0);
        let player = self.registry.player_mut();
        if let Some(aim) = input.aim {
            player.aim = aim;
        }
        player.vel = movement * PLAYER_SPEED;
        player.pos = (player.pos + player.vel * dt).clamp(Vec2::ZERO, Vec2::new(w, h));

        let dash_ready = player
            .last_dash_ms
            .is_none_or(|t| now - t >= DASH_COOLDOWN_MS);
        if input.dash && dash_ready && self.powerup.consume_use(PowerupKind::Dash) {
            let dir = if movement == Vec2::ZERO {
                player.aim_dir()
            } else {
                movement.normalize()
            };
            player.pos = (player.pos + dir * DASH_DISTANCE).clamp(Vec2::ZERO, Vec2::new(w, h));
            player.last_dash_ms = Some(now);
            log::debug!("Dash, {:?} uses left", self.powerup.uses_left());
            if self.powerup.kind().is_none() {
                self.events.push(GameEvent::PowerupExpired {
                    kind: PowerupKind::Dash,
                });
            }
        }

        let fire_ready = player
            .last_shot_ms
            .is_none_or(|t| now - t >= PLAYER_FIRE_COOLDOWN_MS);
        if input.fire && fire_ready {
            player.last_shot_ms = Some(now);
            let (pos, dir) = (player.pos, player.aim_dir());
            let piercing = self.powerup.is_active(PowerupKind::Piercing);
            if self
                .registry
                .spawn_bullet(BulletFaction::Player, pos, dir * PLAYER_BULLET_SPEED, piercing)
                .is_some()
            {
                self.events.push(GameEvent::Shot {
                    faction: BulletFaction::Player,
                    pos,
                });
            }
        }
    }

    fn update_allies(&mut self, dt: f32) {
        let now = self.real_ms;
        let player = self.registry.player();
        let (player_pos, aim_dir) = (player.pos, player.aim_dir());

        for ally in self.registry.allies_mut() {
            let target = ally_slot_position(ally.slot_index, player_pos, aim_dir);
            let next = move_toward(ally.pos, target, ALLY_SPEED * dt, ALLY_SNAP_DISTANCE);
            ally.vel = if dt > 0.0 { (next - ally.pos) / dt } else { Vec2::ZERO };
            ally.pos = next;
        }

        for i in 0..self.registry.allies().len() {
            let ally = &self.registry.allies()[i];
            if ally
                .last_shot_ms
                .is_some_and(|t| now - t < ALLY_FIRE_COOLDOWN_MS)
            {
                continue;
            }
            let pos = ally.pos;
            let Some((_, target)) = self.registry.nearest_hostile(pos, ALLY_RANGE) else {
                continue;
            };
            self.registry.allies_mut()[i].last_shot_ms = Some(now);
            let dir = direction_or(pos, target, aim_dir);
            if self
                .registry
                .spawn_bullet(BulletFaction::Ally, pos, dir * ALLY_BULLET_SPEED, false)
                .is_some()
            {
                self.events.push(GameEvent::Shot {
                    faction: BulletFaction::Ally,
                    pos,
                });
            }
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let now = self.world_ms;
        let ramp = difficulty_ramp(self.real_ms);
        let interval = ENEMY_FIRE_INTERVAL_MS / ramp as f64;
        let player_pos = self.registry.player().pos;

        let mut shots = Vec::new();
        for enemy in self.registry.enemies_mut() {
            let speed = match enemy.role {
                EnemyRole::Chaser => ENEMY_CHASE_SPEED,
                _ => ENEMY_DRIFT_SPEED,
            } * ramp;
            let next = move_toward(enemy.pos, player_pos, speed * dt, 0.0);
            enemy.vel = if dt > 0.0 { (next - enemy.pos) / dt } else { Vec2::ZERO };
            enemy.pos = next;

            if enemy.role.fires() && now - enemy.last_shot_ms >= interval {
                enemy.last_shot_ms = now;
                shots.push(enemy.pos);
            }
        }

        for pos in shots {
            let dir = direction_or(pos, player_pos, Vec2::Y);
            self.fire_hostile(pos, dir * ENEMY_BULLET_SPEED * ramp);
        }
    }

    fn update_boss(&mut self, dt: f32) {
        let now = self.world_ms;
        let player_pos = self.registry.player().pos;
        let Some(boss) = self.registry.boss_mut() else {
            return;
        };
        let next = move_toward(boss.pos, player_pos, BOSS_SPEED * dt, 0.0);
        boss.vel = if dt > 0.0 { (next - boss.pos) / dt } else { Vec2::ZERO };
        boss.pos = next;

        if boss.phase < 2 || now - boss.last_burst_ms < BOSS_BURST_INTERVAL_MS {
            return;
        }
        boss.last_burst_ms = now;
        let (origin, rotation) = (boss.pos, boss.burst_rotation);
        boss.burst_rotation = (boss.burst_rotation + BOSS_BURST_ROTATION) % TAU;

        let step = TAU / BOSS_BURST_BULLETS as f32;
        for i in 0..BOSS_BURST_BULLETS {
            let vel = polar_to_cartesian(BOSS_BULLET_SPEED, rotation + step * i as f32);
            self.fire_hostile(origin, vel);
        }
    }

    fn fire_hostile(&mut self, pos: Vec2, vel: Vec2) {
        if self
            .registry
            .spawn_bullet(BulletFaction::Enemy, pos, vel, false)
            .is_some()
        {
            self.events.push(GameEvent::Shot {
                faction: BulletFaction::Enemy,
                pos,
            });
        }
    }

    fn update_bullets(&mut self, real_dt: f32, world_dt: f32) {
        self.registry.pool_mut(BulletFaction::Player).advance(real_dt);
        self.registry.pool_mut(BulletFaction::Ally).advance(real_dt);
        self.registry.pool_mut(BulletFaction::Enemy).advance(world_dt);

        let pad = self.settings.cull_padding;
        let min = Vec2::splat(-pad);
        let max = Vec2::new(
            self.settings.arena_width + pad,
            self.settings.arena_height + pad,
        );
        for faction in [BulletFaction::Player, BulletFaction::Ally, BulletFaction::Enemy] {
            self.registry
                .pool_mut(faction)
                .cull(|p| p.cmplt(min).any() || p.cmpgt(max).any());
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn health(&self) -> i32 {
        self.registry.player().health
    }

    pub fn wave_number(&self) -> u32 {
        self.director.wave()
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.director.phase()
    }

    pub fn active_powerup(&self) -> Option<PowerupKind> {
        self.powerup.kind()
    }

    pub fn powerup(&self) -> &PowerupState {
        &self.powerup
    }

    pub fn ally_count(&self) -> usize {
        self.registry.allies().len()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Session clock in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.real_ms
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    /// Presentation view of the current state
    pub fn snapshot(&self) -> Snapshot {
        let hud = Hud {
            health: self.health().max(0),
            max_health: PLAYER_MAX_HEALTH,
            wave: self.director.wave(),
            wave_text: self.wave_text.clone(),
            powerup: self.powerup.kind().map(|k| k.spec().label.to_string()),
            powerup_remaining_ms: self.powerup.remaining_ms(self.real_ms),
            powerup_uses_left: self.powerup.uses_left(),
            allies: self.ally_count(),
            boss_health: self.registry.boss().map(|b| b.health),
            game_over: self.game_over,
        };
        Snapshot::capture(&self.registry, hud)
    }
}
