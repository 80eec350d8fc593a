//! Moore-neighborhood helpers.
//!
//! Neighbor scans always visit offsets in the same order (dy outer, dx inner,
//! each from -1 to 1, skipping the center). Movement tie-breaking depends on
//! that order.

use lifegrid_common::{ChunkCoord, WorldCoord};

use crate::chunk::{CellState, Chunk};
use crate::world::SparseWorld;

/// The 8 Moore offsets in scan order.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counts living cells around `coord`.
#[must_use]
pub fn count_live_neighbors(world: &SparseWorld, coord: WorldCoord) -> u32 {
    MOORE_OFFSETS
        .iter()
        .filter(|&&(dx, dy)| world.is_alive(coord.offset(dx, dy)))
        .count() as u32
}

/// Borrowed 3x3 block of chunks centered on one chunk.
///
/// Lets the generation step read any cell of the center chunk and its
/// one-cell border with array indexing instead of a map lookup per cell.
pub struct ChunkNeighborhood<'a> {
    /// Row-major, index 4 is the center
    chunks: [Option<&'a Chunk>; 9],
    /// Chunk side length
    size: i32,
}

impl<'a> ChunkNeighborhood<'a> {
    /// Collects the neighborhood of `center` from `world`.
    #[must_use]
    pub fn new(world: &'a SparseWorld, center: ChunkCoord) -> Self {
        let hood = center.moore_neighborhood();
        Self {
            chunks: hood.map(|coord| world.try_get_chunk(coord)),
            size: world.chunk_size() as i32,
        }
    }

    /// Whether none of the 9 chunks is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Option::is_none)
    }

    /// The center chunk, if stored.
    #[must_use]
    pub fn center(&self) -> Option<&'a Chunk> {
        self.chunks[4]
    }

    /// Living cell at local `(x, y)` relative to the center chunk.
    ///
    /// `x` and `y` may range from -1 to `size` inclusive.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<CellState> {
        let column = Self::band(x, self.size);
        let row = Self::band(y, self.size);
        let chunk = self.chunks[row * 3 + column]?;
        let index = (x.rem_euclid(self.size) + y.rem_euclid(self.size) * self.size) as usize;
        chunk.cell(index)
    }

    /// Whether the cell at local `(x, y)` is alive.
    #[must_use]
    pub fn is_alive(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some()
    }

    /// Living Moore neighbors of local `(x, y)`.
    #[must_use]
    pub fn count_live_neighbors(&self, x: i32, y: i32) -> u32 {
        MOORE_OFFSETS
            .iter()
            .filter(|&&(dx, dy)| self.is_alive(x + dx, y + dy))
            .count() as u32
    }

    /// Whether any living neighbor of `(x, y)` has at least `threshold` energy.
    #[must_use]
    pub fn has_neighbor_with_energy(&self, x: i32, y: i32, threshold: f32) -> bool {
        MOORE_OFFSETS.iter().any(|&(dx, dy)| {
            self.cell(x + dx, y + dy)
                .is_some_and(|cell| cell.energy >= threshold)
        })
    }

    fn band(value: i32, size: i32) -> usize {
        if value < 0 {
            0
        } else if value >= size {
            2
        } else {
            1
        }
    }
}
