//! Formation Breaker headless runner
//!
//! Plays a session with a simple autopilot and the reference overlap
//! detector, logging wave progress. Usage:
//!
//! ```text
//! formation-breaker [settings.json] [frames]
//! ```

use glam::Vec2;

use formation_breaker::Settings;
use formation_breaker::sim::{
    BulletFaction, Faction, GameEvent, Simulation, TickInput, detect_overlaps,
};

const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_FRAMES: u64 = 60 * 120;
/// Enemy bullets closer than this trigger a dash
const DODGE_RADIUS: f32 = 60.0;

/// Aim at the nearest hostile, chase pickups, dash away from close shots
fn autopilot(sim: &Simulation) -> TickInput {
    let registry = sim.registry();
    let player = registry.player().pos;

    let aim = registry
        .nearest_hostile(player, f32::INFINITY)
        .map(|(_, pos)| pos);
    let movement = registry
        .pickups()
        .first()
        .map(|p| (p.pos - player).normalize_or_zero())
        .unwrap_or(Vec2::ZERO);
    let threat = registry
        .pool(BulletFaction::Enemy)
        .iter()
        .any(|(_, b)| b.pos.distance(player) < DODGE_RADIUS);

    TickInput {
        aim,
        movement,
        fire: aim.is_some(),
        dash: threat,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    log::info!("Formation Breaker (headless) starting, {} frames", frames);
    let mut sim = Simulation::new(settings);
    let mut kills = 0u64;

    for frame in 0..frames {
        let input = autopilot(&sim);
        for event in sim.tick(FRAME_MS, &input) {
            match event {
                GameEvent::Destroyed {
                    faction: Faction::Enemy | Faction::Boss,
                    ..
                } => kills += 1,
                GameEvent::WaveTextChanged { wave, text } => {
                    log::info!("[frame {}] wave {}: {}", frame, wave, text)
                }
                GameEvent::PowerupActivated { kind } => {
                    log::info!("[frame {}] powerup {:?}", frame, kind)
                }
                GameEvent::GameOver { wave } => {
                    log::info!("[frame {}] game over on wave {}", frame, wave)
                }
                _ => {}
            }
        }
        if sim.is_game_over() {
            break;
        }
        for overlap in detect_overlaps(sim.registry()) {
            sim.report_overlap(overlap.a, overlap.b);
        }
    }

    let hud = sim.snapshot().hud;
    log::info!(
        "Finished: wave {}, health {}/{}, {} kills, {} allies, {:.1}s",
        hud.wave,
        hud.health,
        hud.max_health,
        kills,
        hud.allies,
        sim.elapsed_ms() / 1000.0
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {}
