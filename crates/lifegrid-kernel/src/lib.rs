//! # Lifegrid Kernel
//!
//! Sparse, chunked simulation core for the energy-augmented cellular
//! automaton.
//!
//! This crate provides:
//! - Chunk storage (alive flag, energy and age per cell)
//! - A sparse chunk map where only populated chunks exist
//! - The per-tick generation step with dirty-region tracking
//! - Deterministic movement of crowded cells
//! - World-changed notification, world validation and seeding presets
//!
//! ## Determinism
//!
//! Chunk coordinates hash through a pinned 17/31 combine into `FxHasher`, and
//! every scan whose result could depend on map order (active chunks, movement
//! sources, movement destinations) is sorted. The same settings and the same
//! sequence of calls always produce the same world.
//!
//! ## Dirty Tracking
//!
//! A tick recomputes only the dirty chunks and their Moore neighbors. When
//! nothing is dirty, every populated chunk is recomputed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod event;
pub mod movement;
pub mod neighbors;
pub mod presets;
pub mod settings;
pub mod simulation;
pub mod validation;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::event::*;
    pub use crate::movement::*;
    pub use crate::neighbors::*;
    pub use crate::presets::*;
    pub use crate::settings::*;
    pub use crate::simulation::*;
    pub use crate::validation::*;
    pub use crate::world::*;
    pub use lifegrid_common::{ChunkCoord, LocalCoord, WorldCoord, WorldError, WorldResult};
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_core_is_empty() {
        let core = SimulationCore::new(SimulationSettings::default());
        assert_eq!(core.tick_count(), 0);
        assert_eq!(core.population(), 0);
        assert!(core.active_chunks().is_empty());
    }

    #[test]
    fn test_glider_survives_a_tick() {
        let mut settings = SimulationSettings::default();
        settings.enable_movement = false;
        let mut core = SimulationCore::new(settings);
        Preset::Glider.apply(&mut core, &SeedOptions::default());
        core.tick();
        assert_eq!(core.population(), 5);
        assert!(check_world(core.world(), core.tick_count()).is_clean());
    }
}
