//! Chunk storage for the sparse world.
//!
//! A chunk is a fixed-size square tile of cells stored as three parallel
//! arrays (alive flag, energy, age) indexed by `x + y * size`. A dead cell
//! always carries zero energy and zero age.

use lifegrid_common::LocalCoord;

/// Energy and age of a living cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellState {
    /// Current energy
    pub energy: f32,
    /// Ticks since birth
    pub age: u32,
}

impl CellState {
    /// Creates a cell state.
    #[must_use]
    pub const fn new(energy: f32, age: u32) -> Self {
        Self { energy, age }
    }
}

/// A square tile of cell state.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Side length in cells
    size: u32,
    /// Alive flags
    alive: Vec<bool>,
    /// Energy per cell (zero when dead)
    energy: Vec<f32>,
    /// Age in ticks since birth (zero when dead)
    age: Vec<u32>,
}

impl Chunk {
    /// Creates a new chunk with every cell dead.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let cell_count = (size as usize) * (size as usize);
        Self {
            size,
            alive: vec![false; cell_count],
            energy: vec![0.0; cell_count],
            age: vec![0; cell_count],
        }
    }

    /// Returns the chunk side length.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the number of cells in the chunk.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.alive.len()
    }

    /// Linear index of a local cell.
    #[must_use]
    pub const fn index(&self, x: u32, y: u32) -> usize {
        LocalCoord::new(x as u16, y as u16).to_index(self.size)
    }

    /// Whether any cell in the chunk is alive.
    #[must_use]
    pub fn has_living_cells(&self) -> bool {
        self.alive.iter().any(|&alive| alive)
    }

    /// Number of living cells.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&alive| alive).count()
    }

    /// Indices of living cells in ascending order.
    pub fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter_map(|(index, &alive)| alive.then_some(index))
    }

    /// Whether the cell at `index` is alive.
    #[must_use]
    pub fn is_alive(&self, index: usize) -> bool {
        self.alive[index]
    }

    /// State of the cell at `index` if it is alive.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<CellState> {
        self.alive[index].then(|| CellState::new(self.energy[index], self.age[index]))
    }

    /// Energy of the cell at `index`.
    #[must_use]
    pub fn energy(&self, index: usize) -> f32 {
        self.energy[index]
    }

    /// Age of the cell at `index`.
    #[must_use]
    pub fn age(&self, index: usize) -> u32 {
        self.age[index]
    }

    /// Marks the cell alive with the given energy and age.
    pub fn set_alive(&mut self, index: usize, energy: f32, age: u32) {
        self.alive[index] = true;
        self.energy[index] = energy;
        self.age[index] = age;
    }

    /// Resets the cell to the dead defaults.
    pub fn set_dead(&mut self, index: usize) {
        self.alive[index] = false;
        self.energy[index] = 0.0;
        self.age[index] = 0;
    }

    /// Overwrites the energy of a living cell.
    pub(crate) fn set_energy(&mut self, index: usize, energy: f32) {
        self.energy[index] = energy;
    }

    /// Alive flags as a slice.
    #[must_use]
    pub fn alive(&self) -> &[bool] {
        &self.alive
    }

    /// Energies as a slice.
    #[must_use]
    pub fn energies(&self) -> &[f32] {
        &self.energy
    }

    /// Ages as a slice.
    #[must_use]
    pub fn ages(&self) -> &[u32] {
        &self.age
    }
}
