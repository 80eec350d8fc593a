//! Coordinate types for world, chunk, and local positions.
//!
//! World coordinates are unbounded 32-bit cell positions. A world coordinate
//! maps to a chunk with floor division and to a local cell with a
//! positive-result modulo, so negative coordinates land in the chunk to the
//! left/below without special cases.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Deterministic hash of a coordinate pair.
///
/// `hash = 17; hash = hash * 31 + x; hash = hash * 31 + y` with wrapping
/// 32-bit arithmetic. The value is identical on every platform and every run.
#[must_use]
pub const fn stable_hash(x: i32, y: i32) -> i32 {
    let mut hash: i32 = 17;
    hash = hash.wrapping_mul(31).wrapping_add(x);
    hash = hash.wrapping_mul(31).wrapping_add(y);
    hash
}

/// World coordinate of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i32,
    /// Y coordinate in world space
    pub y: i32,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to chunk coordinate given chunk size.
    #[must_use]
    pub const fn to_chunk_coord(self, chunk_size: u32) -> ChunkCoord {
        let size = chunk_size as i32;
        ChunkCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Converts to local coordinate within a chunk.
    #[must_use]
    pub const fn to_local_coord(self, chunk_size: u32) -> LocalCoord {
        let size = chunk_size as i32;
        LocalCoord {
            x: self.x.rem_euclid(size) as u16,
            y: self.y.rem_euclid(size) as u16,
        }
    }

    /// Builds a world coordinate from a chunk and a local position inside it.
    #[must_use]
    pub const fn from_chunk_local(chunk: ChunkCoord, local: LocalCoord, chunk_size: u32) -> Self {
        let origin = chunk.to_world_coord(chunk_size);
        Self {
            x: origin.x.wrapping_add(local.x as i32),
            y: origin.y.wrapping_add(local.y as i32),
        }
    }

    /// Returns this coordinate shifted by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Stable hash of this coordinate (see [`stable_hash`]).
    #[must_use]
    pub const fn stable_hash(self) -> i32 {
        stable_hash(self.x, self.y)
    }
}

impl Hash for WorldCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.stable_hash());
    }
}

// Row-major: y first, then x.
impl Ord for WorldCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for WorldCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for WorldCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (origin cell of the chunk).
    #[must_use]
    pub const fn to_world_coord(self, chunk_size: u32) -> WorldCoord {
        let size = chunk_size as i32;
        WorldCoord {
            x: self.x.wrapping_mul(size),
            y: self.y.wrapping_mul(size),
        }
    }

    /// Returns this chunk and its 8 neighbors, row-major from `(-1, -1)`.
    #[must_use]
    pub const fn moore_neighborhood(self) -> [ChunkCoord; 9] {
        let (x, y) = (self.x, self.y);
        let (left, right) = (x.wrapping_sub(1), x.wrapping_add(1));
        let (up, down) = (y.wrapping_sub(1), y.wrapping_add(1));
        [
            ChunkCoord::new(left, up),
            ChunkCoord::new(x, up),
            ChunkCoord::new(right, up),
            ChunkCoord::new(left, y),
            ChunkCoord::new(x, y),
            ChunkCoord::new(right, y),
            ChunkCoord::new(left, down),
            ChunkCoord::new(x, down),
            ChunkCoord::new(right, down),
        ]
    }

    /// Stable hash of this coordinate (see [`stable_hash`]).
    #[must_use]
    pub const fn stable_hash(self) -> i32 {
        stable_hash(self.x, self.y)
    }
}

impl Hash for ChunkCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.stable_hash());
    }
}

impl Ord for ChunkCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for ChunkCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Local coordinate within a chunk (0 to chunk_size-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u16,
    /// Y coordinate within chunk
    pub y: u16,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Converts to linear index (`x + y * chunk_size`).
    #[must_use]
    pub const fn to_index(self, chunk_size: u32) -> usize {
        (self.y as usize) * (chunk_size as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize, chunk_size: u32) -> Self {
        let size = chunk_size as usize;
        Self {
            x: (index % size) as u16,
            y: (index / size) as u16,
        }
    }
}
