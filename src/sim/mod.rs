//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied frame deltas only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod formation;
pub mod pool;
pub mod powerup;
pub mod registry;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Overlap, detect_overlaps};
pub use combat::CombatOutcome;
pub use formation::{FormationKind, FormationSlot, formation_for_wave, formations_for_wave, layout};
pub use pool::{Bullet, BulletPool};
pub use powerup::{PowerupKind, PowerupSpec, PowerupState};
pub use registry::{ActorRef, ActorRegistry, ActorSpawn};
pub use snapshot::{Hud, Snapshot, Sprite};
pub use state::{
    ActorId, BulletFaction, BulletHandle, EnemyRole, Faction, GameEvent, Handle, WavePhase,
};
pub use tick::{Simulation, TickInput};
pub use wave::{WaveDirector, difficulty_ramp};
