//! Binary chunk stream for save/load.
//!
//! Layout, all little-endian:
//!
//! ```text
//! i32 chunk_count
//! per chunk:
//!     i32 chunk_x
//!     i32 chunk_y
//!     i32 live_count
//!     per live cell:
//!         i32 local_index
//!         f32 energy
//!         i32 age
//! ```
//!
//! The stream does not record the chunk size; the reader supplies it and every
//! local index is checked against it. Chunks are written in sorted coordinate
//! order and cells in ascending index order, so equal worlds encode to equal
//! bytes.

use std::io::{Read, Write};

use lifegrid_common::{ChunkCoord, LocalCoord, WorldCoord, WorldError};
use lifegrid_kernel::{CellState, SimulationCore};
use thiserror::Error;
use tracing::debug;

/// Bytes per encoded live cell.
pub const CELL_RECORD_SIZE: usize = 12;

/// Bytes per encoded chunk header.
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Errors from encoding or decoding the chunk stream.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Stream ended before a complete record
    #[error("Unexpected end of data at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof {
        /// Offset of the truncated read
        offset: usize,
        /// Bytes missing
        needed: usize,
    },

    /// Bytes left after the last chunk
    #[error("{0} trailing bytes after chunk data")]
    TrailingBytes(usize),

    /// Age that cannot be represented
    #[error("Invalid age {age} in chunk {chunk}")]
    InvalidAge {
        /// Value read
        age: i32,
        /// Owning chunk
        chunk: ChunkCoord,
    },

    /// Snapshot taken with a different chunk size than the target core
    #[error("Chunk size mismatch: snapshot uses {snapshot}, core uses {core}")]
    ChunkSizeMismatch {
        /// Snapshot chunk size
        snapshot: u32,
        /// Core chunk size
        core: u32,
    },

    /// Count or index out of range
    #[error(transparent)]
    World(#[from] WorldError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for chunk stream operations.
pub type SerializeResult<T> = Result<T, SerializeError>;

/// One live cell in a chunk record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRecord {
    /// Flat local index (`x + y * chunk_size`)
    pub index: u32,
    /// Energy
    pub energy: f32,
    /// Age in ticks
    pub age: u32,
}

/// Live cells of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// Chunk position
    pub coord: ChunkCoord,
    /// Live cells in ascending index order
    pub cells: Vec<CellRecord>,
}

/// Every live cell of a world, grouped by chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    /// Chunk size the local indices refer to
    pub chunk_size: u32,
    /// Chunks in sorted coordinate order
    pub chunks: Vec<ChunkRecord>,
}

impl WorldSnapshot {
    /// Captures the live cells of `core`.
    #[must_use]
    pub fn capture(core: &SimulationCore) -> Self {
        let world = core.world();
        let chunks = world
            .coords_sorted()
            .into_iter()
            .filter_map(|coord| {
                let chunk = world.try_get_chunk(coord)?;
                let cells = chunk
                    .live_indices()
                    .map(|index| CellRecord {
                        index: index as u32,
                        energy: chunk.energy(index),
                        age: chunk.age(index),
                    })
                    .collect();
                Some(ChunkRecord { coord, cells })
            })
            .collect();

        Self {
            chunk_size: world.chunk_size(),
            chunks,
        }
    }

    /// Total live cells in the snapshot.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.cells.len()).sum()
    }

    /// World coordinates and states of every recorded cell.
    pub fn cells(&self) -> impl Iterator<Item = (WorldCoord, CellState)> + '_ {
        let size = self.chunk_size;
        self.chunks.iter().flat_map(move |chunk| {
            chunk.cells.iter().map(move |cell| {
                let local = LocalCoord::from_index(cell.index as usize, size);
                (
                    WorldCoord::from_chunk_local(chunk.coord, local, size),
                    CellState::new(cell.energy, cell.age),
                )
            })
        })
    }

    /// Replaces the contents of `core` with this snapshot.
    ///
    /// The core is reset first, so its tick count restarts at zero.
    pub fn restore_into(&self, core: &mut SimulationCore) -> SerializeResult<()> {
        let core_size = core.settings().chunk_size;
        if core_size != self.chunk_size {
            return Err(SerializeError::ChunkSizeMismatch {
                snapshot: self.chunk_size,
                core: core_size,
            });
        }
        core.reset();
        core.set_cells_alive(self.cells());
        debug!(
            "Restored {} chunks, population {}",
            self.chunks.len(),
            core.population()
        );
        Ok(())
    }

    /// Encodes the snapshot.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let size = 4
            + self.chunks.len() * CHUNK_HEADER_SIZE
            + self.cell_count() * CELL_RECORD_SIZE;
        let mut out = Vec::with_capacity(size);

        out.extend_from_slice(&(self.chunks.len() as i32).to_le_bytes());
        for chunk in &self.chunks {
            out.extend_from_slice(&chunk.coord.x.to_le_bytes());
            out.extend_from_slice(&chunk.coord.y.to_le_bytes());
            out.extend_from_slice(&(chunk.cells.len() as i32).to_le_bytes());
            for cell in &chunk.cells {
                out.extend_from_slice(&(cell.index as i32).to_le_bytes());
                out.extend_from_slice(&cell.energy.to_le_bytes());
                out.extend_from_slice(&(cell.age.min(i32::MAX as u32) as i32).to_le_bytes());
            }
        }
        out
    }

    /// Writes the encoded snapshot to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> SerializeResult<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Decodes a stream whose local indices refer to `chunk_size`.
    pub fn decode(bytes: &[u8], chunk_size: u32) -> SerializeResult<Self> {
        let cells_per_chunk = i64::from(chunk_size) * i64::from(chunk_size);
        let mut reader = ByteReader::new(bytes);

        let chunk_count = reader.read_i32()?;
        if chunk_count < 0 {
            return Err(WorldError::InvalidCount {
                what: "chunk",
                count: i64::from(chunk_count),
            }
            .into());
        }

        let mut chunks = Vec::new();
        for _ in 0..chunk_count {
            let coord = ChunkCoord::new(reader.read_i32()?, reader.read_i32()?);
            let live_count = reader.read_i32()?;
            if live_count < 0 || i64::from(live_count) > cells_per_chunk {
                return Err(WorldError::InvalidCount {
                    what: "live cell",
                    count: i64::from(live_count),
                }
                .into());
            }

            let capacity = (live_count as usize).min(reader.remaining() / CELL_RECORD_SIZE);
            let mut cells = Vec::with_capacity(capacity);
            for _ in 0..live_count {
                let index = reader.read_i32()?;
                let energy = reader.read_f32()?;
                let age = reader.read_i32()?;

                if index < 0 || i64::from(index) >= cells_per_chunk {
                    return Err(WorldError::LocalIndexOutOfRange {
                        index: i64::from(index),
                        chunk_size,
                    }
                    .into());
                }
                if !energy.is_finite() {
                    return Err(WorldError::InvalidData(format!(
                        "non-finite energy at index {index} in chunk {coord}"
                    ))
                    .into());
                }
                if age < 0 {
                    return Err(SerializeError::InvalidAge { age, chunk: coord });
                }

                cells.push(CellRecord {
                    index: index as u32,
                    energy,
                    age: age as u32,
                });
            }
            chunks.push(ChunkRecord { coord, cells });
        }

        let remaining = reader.remaining();
        if remaining > 0 {
            return Err(SerializeError::TrailingBytes(remaining));
        }

        Ok(Self { chunk_size, chunks })
    }

    /// Reads and decodes a stream from `reader`.
    pub fn read_from<R: Read>(reader: &mut R, chunk_size: u32) -> SerializeResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes, chunk_size)
    }
}

/// Little-endian cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take4(&mut self) -> SerializeResult<[u8; 4]> {
        let end = self.offset + 4;
        let Some(slice) = self.bytes.get(self.offset..end) else {
            return Err(SerializeError::UnexpectedEof {
                offset: self.offset,
                needed: end - self.bytes.len(),
            });
        };
        let mut buf = [0u8; 4];
        buf.copy_from_slice(slice);
        self.offset = end;
        Ok(buf)
    }

    fn read_i32(&mut self) -> SerializeResult<i32> {
        self.take4().map(i32::from_le_bytes)
    }

    fn read_f32(&mut self) -> SerializeResult<f32> {
        self.take4().map(f32::from_le_bytes)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_kernel::SimulationSettings;

    fn sample_core() -> SimulationCore {
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        core.set_cell_alive(-1, -1, 1.25, 3);
        core.set_cell_alive(20, 2, 0.5, 0);
        core.set_cell_alive(3, 4, 2.0, 17);
        core
    }

    #[test]
    fn test_empty_world_encoding() {
        let core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        let bytes = WorldSnapshot::capture(&core).encode();
        assert_eq!(bytes, 0i32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_layout_of_single_cell() {
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        core.set_cell_alive(-1, 2, 1.5, 7);
        let bytes = WorldSnapshot::capture(&core).encode();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&(-1i32).to_le_bytes());
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&(15i32 + 2 * 16).to_le_bytes());
        expected.extend_from_slice(&1.5f32.to_le_bytes());
        expected.extend_from_slice(&7i32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_chunks_sorted() {
        let snapshot = WorldSnapshot::capture(&sample_core());
        let coords: Vec<_> = snapshot.chunks.iter().map(|c| c.coord).collect();
        assert_eq!(
            coords,
            vec![
                ChunkCoord::new(-1, -1),
                ChunkCoord::new(0, 0),
                ChunkCoord::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_restore_into_fresh_core() {
        let core = sample_core();
        let bytes = WorldSnapshot::capture(&core).encode();
        let snapshot = WorldSnapshot::decode(&bytes, 16).expect("decode");

        let mut restored = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        snapshot.restore_into(&mut restored).expect("restore");
        assert_eq!(restored.population(), 3);
        assert_eq!(restored.cell(-1, -1), core.cell(-1, -1));
        assert_eq!(restored.cell(20, 2), core.cell(20, 2));
        assert_eq!(restored.age(3, 4), 17);
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let bytes = WorldSnapshot::capture(&sample_core()).encode();
        let result = WorldSnapshot::decode(&bytes[..bytes.len() - 2], 16);
        assert!(matches!(result, Err(SerializeError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_rejects_negative_chunk_count() {
        let bytes = (-3i32).to_le_bytes();
        let result = WorldSnapshot::decode(&bytes, 16);
        assert!(matches!(
            result,
            Err(SerializeError::World(WorldError::InvalidCount {
                what: "chunk",
                count: -3
            }))
        ));
    }

    #[test]
    fn test_rejects_index_outside_chunk() {
        let mut bytes = Vec::new();
        for value in [1i32, 0, 0, 1, 256] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());

        let result = WorldSnapshot::decode(&bytes, 16);
        assert!(matches!(
            result,
            Err(SerializeError::World(WorldError::LocalIndexOutOfRange {
                index: 256,
                chunk_size: 16
            }))
        ));
        // The same record is valid for a larger chunk size
        assert!(WorldSnapshot::decode(&bytes, 32).is_ok());
    }

    #[test]
    fn test_oversized_live_count_without_records() {
        // One chunk header claiming a full 4096² chunk, no cell records
        let mut bytes = Vec::new();
        for value in [1i32, 0, 0, 4096 * 4096] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        assert!(matches!(
            WorldSnapshot::decode(&bytes, 4096),
            Err(SerializeError::UnexpectedEof { offset: 16, .. })
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = WorldSnapshot::capture(&sample_core()).encode();
        bytes.push(0);
        assert!(matches!(
            WorldSnapshot::decode(&bytes, 16),
            Err(SerializeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_restore_rejects_other_chunk_size() {
        let snapshot = WorldSnapshot::capture(&sample_core());
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(32));
        assert!(matches!(
            snapshot.restore_into(&mut core),
            Err(SerializeError::ChunkSizeMismatch {
                snapshot: 16,
                core: 32
            })
        ));
    }

    #[test]
    fn test_write_and_read_stream() {
        let snapshot = WorldSnapshot::capture(&sample_core());
        let mut buffer = Vec::new();
        snapshot.write_to(&mut buffer).expect("write");
        let read = WorldSnapshot::read_from(&mut buffer.as_slice(), 16).expect("read");
        assert_eq!(read, snapshot);
    }
}
