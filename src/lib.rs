//! Formation Breaker - wave/combat simulation core for an arcade wave-shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (formations, actors, combat, waves)
//! - `settings`: Arena and session configuration
//!
//! Rendering, audio and input polling live in the host. The host feeds
//! [`sim::TickInput`] and overlap reports in, and reads [`sim::GameEvent`]s out.

pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::Simulation;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default arena (and view) dimensions
    pub const ARENA_WIDTH: f32 = 1120.0;
    pub const ARENA_HEIGHT: f32 = 630.0;
    /// Bullets are culled once this far outside the arena
    pub const CULL_PADDING: f32 = 40.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 200.0;
    pub const PLAYER_MAX_HEALTH: i32 = 5;
    pub const PLAYER_FIRE_COOLDOWN_MS: f64 = 150.0;
    pub const PLAYER_BULLET_SPEED: f32 = 500.0;

    /// Damage per bullet hit
    pub const PLAYER_DAMAGE: i32 = 2;
    pub const ALLY_DAMAGE: i32 = 1;
    pub const ENEMY_DAMAGE: i32 = 1;

    /// Bullet pool capacities
    pub const PLAYER_BULLET_CAPACITY: usize = 40;
    pub const ALLY_BULLET_CAPACITY: usize = 50;
    pub const ENEMY_BULLET_CAPACITY: usize = 50;

    /// Enemy defaults
    pub const ENEMY_HEALTH: i32 = 2;
    pub const LEADER_HEALTH: i32 = 4;
    pub const ENEMY_CHASE_SPEED: f32 = 70.0;
    pub const ENEMY_DRIFT_SPEED: f32 = 35.0;
    pub const ENEMY_FIRE_INTERVAL_MS: f64 = 1800.0;
    pub const ENEMY_BULLET_SPEED: f32 = 180.0;

    /// Ally escort defaults
    pub const MAX_ALLIES: usize = 6;
    pub const ALLY_SPEED: f32 = 260.0;
    pub const ALLY_SNAP_DISTANCE: f32 = 4.0;
    pub const ALLY_FIRE_COOLDOWN_MS: f64 = 600.0;
    pub const ALLY_RANGE: f32 = 380.0;
    pub const ALLY_BULLET_SPEED: f32 = 450.0;
    /// Sideways distance of each flanking column from the player
    pub const ALLY_SIDE_OFFSET: f32 = 55.0;
    /// Distance between rows in a flanking column
    pub const ALLY_ROW_SPACING: f32 = 45.0;

    /// Boss defaults
    pub const BOSS_WAVE: u32 = 5;
    pub const BOSS_HEALTH: i32 = 6;
    pub const BOSS_SPEED: f32 = 40.0;
    pub const BOSS_BURST_INTERVAL_MS: f64 = 800.0;
    pub const BOSS_BURST_BULLETS: u32 = 3;
    pub const BOSS_BURST_ROTATION: f32 = 0.35;
    pub const BOSS_BULLET_SPEED: f32 = 160.0;

    /// Wave flow timings
    pub const WAVE_CLEAR_DELAY_MS: f64 = 800.0;
    pub const BOSS_WARNING_MS: f64 = 2000.0;
    /// Chance of a powerup pickup dropping when a wave clears
    pub const POWERUP_DROP_CHANCE: f64 = 0.15;
    pub const PICKUP_MIN_DISTANCE: f32 = 100.0;
    pub const PICKUP_MAX_DISTANCE: f32 = 160.0;

    /// Difficulty ramp: +0.5% per second of session time, capped
    pub const RAMP_PER_SECOND: f32 = 0.005;
    pub const RAMP_MAX: f32 = 1.5;
}

/// Step `from` toward `to` by at most `max_step`, landing exactly on `to`
/// when within `snap` or when the step would overshoot.
#[inline]
pub fn move_toward(from: Vec2, to: Vec2, max_step: f32, snap: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= snap.max(max_step) {
        to
    } else {
        from + delta / dist * max_step
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit direction from `from` to `to`, or `fallback` when they coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO { fallback } else { dir }
}
