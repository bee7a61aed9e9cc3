//! Session settings
//!
//! Arena geometry and the RNG seed. Difficulty is a fixed formula and is not
//! configurable here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Arena (and visible view) width in pixels
    pub arena_width: f32,
    /// Arena (and visible view) height in pixels
    pub arena_height: f32,
    /// Margin outside the arena before a bullet is culled
    pub cull_padding: f32,
    /// Session seed for reproducible pickup drops and fire staggering
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            cull_padding: CULL_PADDING,
            seed: 42,
        }
    }
}

impl Settings {
    /// Settings with the given seed and default arena
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Arena center point
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width / 2.0, self.arena_height / 2.0)
    }

    /// Where the player appears: horizontally centered, low in the arena
    pub fn player_start(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width / 2.0, self.arena_height * 0.8)
    }

    /// Replace degenerate dimensions with defaults
    pub fn sanitized(mut self) -> Self {
        if !self.arena_width.is_finite() || self.arena_width <= 0.0 {
            self.arena_width = ARENA_WIDTH;
        }
        if !self.arena_height.is_finite() || self.arena_height <= 0.0 {
            self.arena_height = ARENA_HEIGHT;
        }
        self.cull_padding = self.cull_padding.max(0.0);
        self
    }
}
