//! Simulation settings.
//!
//! The core reads these every tick and never writes them. External controls
//! may change the rule parameters between ticks; the chunk size is fixed for
//! the lifetime of a core.

use lifegrid_common::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};

/// Smallest supported chunk side length.
pub const MIN_CHUNK_SIZE: u32 = 1;

/// Largest supported chunk side length (local coordinates are 16-bit).
pub const MAX_CHUNK_SIZE: u32 = 4096;

/// Parameters of the energy-augmented life rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    // === World ===
    /// Chunk side length in cells
    pub chunk_size: u32,
    /// Nominal world size (informational, does not bound coordinates)
    pub world_size: u32,

    // === Rule ===
    /// Energy gained per free neighbor slot
    pub gain_free: f32,
    /// Flat energy cost of staying alive
    pub cost_alive: f32,
    /// Energy cost per living neighbor
    pub cost_crowd: f32,
    /// Minimum neighbor energy that allows a birth
    pub reproduce_threshold: f32,
    /// Minimum free slots around a dead cell for a birth
    pub free_threshold: u32,
    /// Energy of a newborn cell
    pub newborn_energy: f32,
    /// Live-neighbor count at which a cell tries to move
    pub move_stress_threshold: u32,
    /// Enable the movement pass
    pub enable_movement: bool,

    // === Debug ===
    /// Clamp negative energy of living cells after every tick
    pub validate_world: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            world_size: 100_000,

            gain_free: 0.12,
            cost_alive: 0.2,
            cost_crowd: 0.05,
            reproduce_threshold: 1.2,
            free_threshold: 3,
            newborn_energy: 1.5,
            move_stress_threshold: 5,
            enable_movement: true,

            validate_world: cfg!(debug_assertions),
        }
    }
}

impl SimulationSettings {
    /// Returns default settings with a different chunk size.
    #[must_use]
    pub fn with_chunk_size(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            ..Default::default()
        }
    }

    /// Checks that the chunk size is usable.
    pub fn check(&self) -> WorldResult<()> {
        if (MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            Ok(())
        } else {
            Err(WorldError::InvalidChunkSize {
                size: self.chunk_size,
                min: MIN_CHUNK_SIZE,
                max: MAX_CHUNK_SIZE,
            })
        }
    }

    /// Clamps values to sensible ranges.
    pub fn validate(&mut self) {
        self.chunk_size = self.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self.free_threshold = self.free_threshold.min(8);
        self.move_stress_threshold = self.move_stress_threshold.min(9);

        for value in [
            &mut self.gain_free,
            &mut self.cost_alive,
            &mut self.cost_crowd,
            &mut self.reproduce_threshold,
            &mut self.newborn_energy,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
    }

    /// Net energy change of a living cell with `live_neighbors` neighbors.
    #[must_use]
    pub fn energy_delta(&self, live_neighbors: u32) -> f32 {
        let free = 8 - live_neighbors;
        self.gain_free * free as f32 - self.cost_alive - self.cost_crowd * live_neighbors as f32
    }
}
