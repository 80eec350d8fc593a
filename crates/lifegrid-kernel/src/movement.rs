//! Movement of crowded cells.
//!
//! After a generation is committed, every living cell whose live-neighbor
//! count reaches the stress threshold proposes a move to its roomiest dead
//! neighbor. Proposals targeting the same destination are resolved by energy,
//! then by the stable hash of the source coordinate.

use std::collections::BTreeMap;

use lifegrid_common::{LocalCoord, WorldCoord};

use crate::chunk::CellState;
use crate::neighbors::{count_live_neighbors, MOORE_OFFSETS};
use crate::world::SparseWorld;

/// Energies closer than this are considered equal when ranking candidates.
pub const ENERGY_TOLERANCE: f32 = 1e-4;

/// A dead neighbor a cell could move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTarget {
    /// Destination cell
    pub coord: WorldCoord,
    /// Free slots around the destination
    pub free: u32,
}

/// A proposed relocation of one living cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCandidate {
    /// Source cell
    pub source: WorldCoord,
    /// Energy carried to the destination
    pub energy: f32,
    /// Age carried to the destination
    pub age: u32,
    /// Stable hash of `source`
    pub hash: i32,
}

impl MoveCandidate {
    /// Builds a candidate for the cell at `source`.
    #[must_use]
    pub const fn new(source: WorldCoord, state: CellState) -> Self {
        Self {
            source,
            energy: state.energy,
            age: state.age,
            hash: source.stable_hash(),
        }
    }

    /// Whether this candidate should replace `other` for the same destination.
    #[must_use]
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.energy > other.energy {
            return true;
        }
        if (self.energy - other.energy).abs() > ENERGY_TOLERANCE {
            return false;
        }
        self.hash > other.hash
    }
}

/// Finds the dead neighbor of `coord` with the most free slots.
///
/// Ties keep the first neighbor in scan order.
#[must_use]
pub fn find_best_move(world: &SparseWorld, coord: WorldCoord) -> Option<MoveTarget> {
    let mut best: Option<MoveTarget> = None;
    for &(dx, dy) in &MOORE_OFFSETS {
        let target = coord.offset(dx, dy);
        if world.is_alive(target) {
            continue;
        }
        let free = 8 - count_live_neighbors(world, target);
        if best.map_or(true, |current| free > current.free) {
            best = Some(MoveTarget {
                coord: target,
                free,
            });
        }
    }
    best
}

/// Collects the winning candidate for every contested destination.
///
/// Sources are visited in sorted chunk order, row-major within each chunk.
#[must_use]
pub fn collect_moves(
    world: &SparseWorld,
    stress_threshold: u32,
) -> BTreeMap<WorldCoord, MoveCandidate> {
    let chunk_size = world.chunk_size();
    let mut moves: BTreeMap<WorldCoord, MoveCandidate> = BTreeMap::new();

    for chunk_coord in world.coords_sorted() {
        let Some(chunk) = world.try_get_chunk(chunk_coord) else {
            continue;
        };
        for index in chunk.live_indices() {
            let local = LocalCoord::from_index(index, chunk_size);
            let source = WorldCoord::from_chunk_local(chunk_coord, local, chunk_size);

            if count_live_neighbors(world, source) < stress_threshold {
                continue;
            }
            let Some(target) = find_best_move(world, source) else {
                continue;
            };
            let Some(state) = chunk.cell(index) else {
                continue;
            };

            let candidate = MoveCandidate::new(source, state);
            moves
                .entry(target.coord)
                .and_modify(|existing| {
                    if candidate.is_better_than(existing) {
                        *existing = candidate;
                    }
                })
                .or_insert(candidate);
        }
    }

    moves
}
