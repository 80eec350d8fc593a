//! World consistency checks.
//!
//! The clamp pass runs after a tick when `validate_world` is set. The
//! invariant check is read-only and is meant for tests and debug drivers.

use tracing::warn;

use crate::world::SparseWorld;

/// Result of checking a world against the storage invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Tick at which the world was checked
    pub tick: u64,
    /// Dead cells carrying non-zero energy or age
    pub dirty_dead_cells: usize,
    /// Stored chunks without a living cell
    pub empty_chunks: usize,
    /// Living cells with negative or non-finite energy
    pub bad_energy_cells: usize,
}

impl ValidationReport {
    /// Whether no violation was found.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.dirty_dead_cells == 0 && self.empty_chunks == 0 && self.bad_energy_cells == 0
    }
}

/// Sets the energy of every living cell with negative energy to zero.
///
/// Returns the number of cells corrected.
pub fn clamp_negative_energy(world: &mut SparseWorld, tick: u64) -> usize {
    let mut clamped = 0;
    for (_, chunk) in world.iter_mut() {
        let negative: Vec<usize> = chunk
            .live_indices()
            .filter(|&index| chunk.energy(index) < 0.0)
            .collect();
        for index in negative {
            chunk.set_energy(index, 0.0);
            clamped += 1;
        }
    }

    if clamped > 0 {
        warn!("Clamped negative energy on {clamped} cells at tick {tick}");
    }
    clamped
}

/// Checks every stored chunk against the storage invariants.
#[must_use]
pub fn check_world(world: &SparseWorld, tick: u64) -> ValidationReport {
    let mut report = ValidationReport {
        tick,
        ..Default::default()
    };

    for (_, chunk) in world.iter() {
        if !chunk.has_living_cells() {
            report.empty_chunks += 1;
        }
        for index in 0..chunk.cell_count() {
            if chunk.is_alive(index) {
                let energy = chunk.energy(index);
                if !energy.is_finite() || energy < 0.0 {
                    report.bad_energy_cells += 1;
                }
            } else if chunk.energy(index) != 0.0 || chunk.age(index) != 0 {
                report.dirty_dead_cells += 1;
            }
        }
    }

    if !report.is_clean() {
        warn!(
            "World validation failed at tick {tick}: {} dirty dead cells, {} empty chunks, {} bad energies",
            report.dirty_dead_cells, report.empty_chunks, report.bad_energy_cells
        );
    }
    report
}
