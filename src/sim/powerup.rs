//! Powerup table and the single active-powerup slot

use serde::{Deserialize, Serialize};

/// Time-scale applied to hostiles while slowtime is active
pub const SLOWTIME_SCALE: f32 = 0.4;
/// Paint bomb kill radius around the player
pub const PAINTBOMB_RADIUS: f32 = 260.0;
/// Distance covered by one dash
pub const DASH_DISTANCE: f32 = 140.0;
/// Minimum time between dashes
pub const DASH_COOLDOWN_MS: f64 = 250.0;

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Piercing,
    Dash,
    SlowTime,
    PaintBomb,
}

/// Static effect parameters for a powerup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerupSpec {
    /// Effect duration; 0 for use-counted powerups
    pub duration_ms: u32,
    /// Uses granted; None for duration-based powerups
    pub uses: Option<u32>,
    /// HUD label
    pub label: &'static str,
}

impl PowerupKind {
    /// All kinds, in drop-table order
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::Piercing,
        PowerupKind::Dash,
        PowerupKind::SlowTime,
        PowerupKind::PaintBomb,
    ];

    pub fn spec(&self) -> PowerupSpec {
        match self {
            PowerupKind::Piercing => PowerupSpec {
                duration_ms: 10_000,
                uses: None,
                label: "PIERCE",
            },
            PowerupKind::Dash => PowerupSpec {
                duration_ms: 0,
                uses: Some(3),
                label: "DASH",
            },
            PowerupKind::SlowTime => PowerupSpec {
                duration_ms: 6_000,
                uses: None,
                label: "SLOW",
            },
            PowerupKind::PaintBomb => PowerupSpec {
                duration_ms: 0,
                uses: Some(1),
                label: "BOMB",
            },
        }
    }

    /// Consumed on pickup instead of occupying the active slot
    pub fn is_instant(&self) -> bool {
        matches!(self, PowerupKind::PaintBomb)
    }
}

/// The currently active powerup. Only one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PowerupState {
    #[default]
    None,
    /// Expires at a session-clock deadline
    Timed { kind: PowerupKind, expires_at_ms: f64 },
    /// Expires when the uses run out
    Counted { kind: PowerupKind, uses_left: u32 },
}

impl PowerupState {
    /// Activate `kind`, discarding whatever was active. Returns the
    /// discarded kind, if any. Instant kinds leave the slot empty.
    pub fn activate(&mut self, kind: PowerupKind, now_ms: f64) -> Option<PowerupKind> {
        let previous = self.kind();
        let spec = kind.spec();
        *self = if kind.is_instant() {
            PowerupState::None
        } else if let Some(uses) = spec.uses {
            PowerupState::Counted {
                kind,
                uses_left: uses,
            }
        } else {
            PowerupState::Timed {
                kind,
                expires_at_ms: now_ms + spec.duration_ms as f64,
            }
        };
        log::debug!("Powerup {:?} activated (replaced {:?})", kind, previous);
        previous
    }

    /// Clear a timed powerup whose deadline has passed. Returns the expired kind.
    pub fn expire(&mut self, now_ms: f64) -> Option<PowerupKind> {
        match *self {
            PowerupState::Timed {
                kind,
                expires_at_ms,
            } if now_ms >= expires_at_ms => {
                *self = PowerupState::None;
                Some(kind)
            }
            _ => None,
        }
    }

    /// Spend one use of `kind`. Returns false (and changes nothing) if `kind`
    /// is not the active counted powerup. Clears the slot on the last use.
    pub fn consume_use(&mut self, kind: PowerupKind) -> bool {
        match self {
            PowerupState::Counted {
                kind: active,
                uses_left,
            } if *active == kind && *uses_left > 0 => {
                *uses_left -= 1;
                if *uses_left == 0 {
                    *self = PowerupState::None;
                }
                true
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> Option<PowerupKind> {
        match self {
            PowerupState::None => None,
            PowerupState::Timed { kind, .. } | PowerupState::Counted { kind, .. } => Some(*kind),
        }
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Time-scale for hostile actors
    pub fn time_scale(&self) -> f32 {
        if self.is_active(PowerupKind::SlowTime) {
            SLOWTIME_SCALE
        } else {
            1.0
        }
    }

    /// Remaining milliseconds for timed powerups
    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        match self {
            PowerupState::Timed { expires_at_ms, .. } => Some((expires_at_ms - now_ms).max(0.0)),
            _ => None,
        }
    }

    /// Remaining uses for counted powerups
    pub fn uses_left(&self) -> Option<u32> {
        match self {
            PowerupState::Counted { uses_left, .. } => Some(*uses_left),
            _ => None,
        }
    }
}
