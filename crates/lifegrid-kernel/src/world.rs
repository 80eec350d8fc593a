//! Sparse chunk store.
//!
//! Only chunks holding at least one living cell are kept. Callers enforce that
//! invariant; the store itself is a plain map.

use std::collections::hash_map::Entry;

use lifegrid_common::{ChunkCoord, WorldCoord};
use rustc_hash::FxHashMap;

use crate::chunk::{CellState, Chunk};

/// Mapping from chunk coordinate to chunk.
///
/// `FxHashMap` is seeded deterministically and `ChunkCoord` hashes through the
/// pinned stable hash, so the map behaves identically on every run. Anything
/// that needs an ordering still goes through [`SparseWorld::coords_sorted`].
#[derive(Debug, Clone)]
pub struct SparseWorld {
    /// Populated chunks
    chunks: FxHashMap<ChunkCoord, Chunk>,
    /// Side length shared by every chunk
    chunk_size: u32,
}

impl SparseWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunks: FxHashMap::default(),
            chunk_size,
        }
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Resolves a world coordinate to its chunk and local index.
    #[must_use]
    pub const fn locate(&self, coord: WorldCoord) -> (ChunkCoord, usize) {
        let chunk = coord.to_chunk_coord(self.chunk_size);
        let index = coord.to_local_coord(self.chunk_size).to_index(self.chunk_size);
        (chunk, index)
    }

    /// State of the living cell at `coord`, or `None` when it is dead.
    #[must_use]
    pub fn cell(&self, coord: WorldCoord) -> Option<CellState> {
        let (chunk, index) = self.locate(coord);
        self.chunks.get(&chunk).and_then(|chunk| chunk.cell(index))
    }

    /// Whether the cell at `coord` is alive.
    #[must_use]
    pub fn is_alive(&self, coord: WorldCoord) -> bool {
        let (chunk, index) = self.locate(coord);
        self.chunks
            .get(&chunk)
            .is_some_and(|chunk| chunk.is_alive(index))
    }

    /// Returns the chunk at `coord`, if present.
    #[must_use]
    pub fn try_get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Mutable access to the chunk at `coord`, if present.
    pub fn try_get_chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Returns the existing chunk or inserts a fresh dead one.
    pub fn get_or_create_chunk(&mut self, coord: ChunkCoord) -> &mut Chunk {
        match self.chunks.entry(coord) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Chunk::new(self.chunk_size)),
        }
    }

    /// Removes the chunk at `coord`. No-op if absent.
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    /// Stores `chunk` at `coord`, replacing any previous chunk.
    pub fn insert_chunk(&mut self, coord: ChunkCoord, chunk: Chunk) {
        self.chunks.insert(coord, chunk);
    }

    /// Whether a chunk is stored at `coord`.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drops every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Stored chunk coordinates in row-major order.
    #[must_use]
    pub fn coords_sorted(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Iterates stored chunks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    /// Mutable iteration over stored chunks in unspecified order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut Chunk)> {
        self.chunks.iter_mut()
    }

    /// Total living cells across all chunks.
    #[must_use]
    pub fn live_cell_count(&self) -> usize {
        self.chunks.values().map(Chunk::live_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_lazy_and_idempotent() {
        let mut world = SparseWorld::new(8);
        let coord = ChunkCoord::new(-1, 2);
        assert!(world.try_get_chunk(coord).is_none());

        world.get_or_create_chunk(coord).set_alive(3, 1.0, 0);
        assert_eq!(world.len(), 1);

        // Second call returns the same chunk, not a fresh one
        assert!(world.get_or_create_chunk(coord).is_alive(3));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut world = SparseWorld::new(8);
        assert!(world.remove_chunk(ChunkCoord::new(0, 0)).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn test_coords_sorted() {
        let mut world = SparseWorld::new(4);
        for coord in [
            ChunkCoord::new(2, 0),
            ChunkCoord::new(-1, 3),
            ChunkCoord::new(0, 0),
        ] {
            world.get_or_create_chunk(coord).set_alive(0, 1.0, 0);
        }
        assert_eq!(
            world.coords_sorted(),
            vec![
                ChunkCoord::new(0, 0),
                ChunkCoord::new(2, 0),
                ChunkCoord::new(-1, 3),
            ]
        );
        assert_eq!(world.live_cell_count(), 3);
    }

    #[test]
    fn test_cell_lookup_negative_coords() {
        let mut world = SparseWorld::new(4);
        let coord = WorldCoord::new(-1, -5);
        let (chunk, index) = world.locate(coord);
        assert_eq!(chunk, ChunkCoord::new(-1, -2));
        assert_eq!(index, 3 + 3 * 4);

        world.get_or_create_chunk(chunk).set_alive(index, 2.0, 4);
        assert!(world.is_alive(coord));
        assert_eq!(world.cell(coord), Some(CellState::new(2.0, 4)));
        assert!(world.cell(WorldCoord::new(0, 0)).is_none());
    }
}
