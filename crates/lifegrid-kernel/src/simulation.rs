//! The simulation core.
//!
//! [`SimulationCore`] owns the sparse world and advances it one generation
//! per [`SimulationCore::tick`]. Only chunks around recently changed chunks
//! are recomputed; every scan that could depend on hash-map order is sorted
//! first, so a given seed and parameter set always produces the same
//! sequence of states.

use lifegrid_common::{ChunkCoord, WorldCoord};
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::chunk::{CellState, Chunk};
use crate::event::{ChangeNotifier, SubscriptionId};
use crate::movement::{collect_moves, ENERGY_TOLERANCE};
use crate::neighbors::ChunkNeighborhood;
use crate::settings::SimulationSettings;
use crate::validation::clamp_negative_energy;
use crate::world::SparseWorld;

/// Outcome of recomputing one active chunk.
struct ChunkStep {
    coord: ChunkCoord,
    /// Next generation, `None` when no cell survives
    chunk: Option<Chunk>,
    /// Whether anything differs from the pre-tick chunk
    changed: bool,
}

/// Sparse energy-augmented life simulation.
pub struct SimulationCore {
    /// Rule parameters
    settings: SimulationSettings,
    /// Cell storage
    world: SparseWorld,
    /// Chunks changed since the last committed generation
    dirty: FxHashSet<ChunkCoord>,
    /// Completed ticks since construction or the last reset
    tick_count: u64,
    /// Living cells
    population: usize,
    /// World-changed subscribers
    notifier: ChangeNotifier,
}

impl SimulationCore {
    /// Creates an empty simulation. Out-of-range settings are clamped.
    #[must_use]
    pub fn new(mut settings: SimulationSettings) -> Self {
        if let Err(e) = settings.check() {
            warn!("{e}, clamping");
        }
        settings.validate();
        let world = SparseWorld::new(settings.chunk_size);
        Self {
            settings,
            world,
            dirty: FxHashSet::default(),
            tick_count: 0,
            population: 0,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Changes rule parameters between ticks.
    ///
    /// The chunk size is fixed for the lifetime of the core; a changed value
    /// is reverted.
    pub fn update_settings(&mut self, update: impl FnOnce(&mut SimulationSettings)) {
        let chunk_size = self.settings.chunk_size;
        update(&mut self.settings);
        if self.settings.chunk_size != chunk_size {
            warn!(
                "Ignoring chunk size change {} -> {}, chunk size is fixed",
                chunk_size, self.settings.chunk_size
            );
            self.settings.chunk_size = chunk_size;
        }
        self.settings.validate();
    }

    /// Read-only view of the world.
    #[must_use]
    pub const fn world(&self) -> &SparseWorld {
        &self.world
    }

    /// Completed ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of living cells.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Populated chunk coordinates in sorted order.
    #[must_use]
    pub fn active_chunks(&self) -> Vec<ChunkCoord> {
        self.world.coords_sorted()
    }

    /// Dirty chunk coordinates in sorted order.
    #[must_use]
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.dirty.iter().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Marks a chunk for recomputation on the next tick.
    pub fn mark_dirty(&mut self, coord: ChunkCoord) {
        self.dirty.insert(coord);
    }

    // === Cell accessors ===

    /// Whether the cell at `(x, y)` is alive.
    #[must_use]
    pub fn is_alive(&self, x: i32, y: i32) -> bool {
        self.world.is_alive(WorldCoord::new(x, y))
    }

    /// Energy of the cell at `(x, y)`, zero when dead.
    #[must_use]
    pub fn energy(&self, x: i32, y: i32) -> f32 {
        self.cell(x, y).map_or(0.0, |cell| cell.energy)
    }

    /// Age of the cell at `(x, y)`, zero when dead.
    #[must_use]
    pub fn age(&self, x: i32, y: i32) -> u32 {
        self.cell(x, y).map_or(0, |cell| cell.age)
    }

    /// State of the cell at `(x, y)` if it is alive.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<CellState> {
        self.world.cell(WorldCoord::new(x, y))
    }

    // === Mutation ===

    /// Sets the cell at `(x, y)` alive, creating its chunk if needed.
    pub fn set_cell_alive(&mut self, x: i32, y: i32, energy: f32, age: u32) {
        self.write_alive(WorldCoord::new(x, y), energy, age);
        self.recalculate_population();
    }

    /// Kills the cell at `(x, y)`. Drops the chunk once it holds no life.
    pub fn set_cell_dead(&mut self, x: i32, y: i32) {
        self.write_dead(WorldCoord::new(x, y));
        self.recalculate_population();
    }

    /// Sets many cells alive with a single population recount.
    pub fn set_cells_alive<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (WorldCoord, CellState)>,
    {
        for (coord, state) in cells {
            self.write_alive(coord, state.energy, state.age);
        }
        self.recalculate_population();
    }

    /// Clears the world and the tick counter.
    pub fn reset(&mut self) {
        self.world.clear();
        self.dirty.clear();
        self.tick_count = 0;
        self.population = 0;
        info!("Simulation reset");
        self.notifier.notify();
    }

    // === Notification ===

    /// Registers a callback run after every tick and reset.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.notifier.subscribe(callback)
    }

    /// Removes a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // === Tick ===

    /// Advances the world by one generation.
    pub fn tick(&mut self) {
        let active = self.collect_active_chunks();

        let steps: Vec<ChunkStep> = active
            .iter()
            .filter_map(|&coord| {
                let hood = ChunkNeighborhood::new(&self.world, coord);
                (!hood.is_empty()).then(|| next_generation(coord, &hood, &self.settings))
            })
            .collect();

        let mut new_dirty = FxHashSet::default();
        for step in steps {
            if step.changed {
                new_dirty.insert(step.coord);
            }
            match step.chunk {
                Some(chunk) => self.world.insert_chunk(step.coord, chunk),
                None => {
                    self.world.remove_chunk(step.coord);
                }
            }
        }
        self.dirty = new_dirty;

        let moved = if self.settings.enable_movement {
            self.apply_movement()
        } else {
            0
        };

        self.tick_count += 1;
        self.recalculate_population();
        if self.settings.validate_world {
            clamp_negative_energy(&mut self.world, self.tick_count);
        }

        debug!(
            "Tick {}: {} active, {} dirty, {} moved, population {}",
            self.tick_count,
            active.len(),
            self.dirty.len(),
            moved,
            self.population
        );
        self.notifier.notify();
    }

    /// Dirty chunks and their Moore neighbors, or every chunk when nothing is
    /// dirty. Sorted.
    fn collect_active_chunks(&self) -> Vec<ChunkCoord> {
        if self.dirty.is_empty() {
            return self.world.coords_sorted();
        }
        let mut active: FxHashSet<ChunkCoord> = FxHashSet::default();
        for coord in &self.dirty {
            active.extend(coord.moore_neighborhood());
        }
        let mut active: Vec<_> = active.into_iter().collect();
        active.sort_unstable();
        active
    }

    /// Resolves and applies moves. Returns the number of cells moved.
    fn apply_movement(&mut self) -> usize {
        let moves = collect_moves(&self.world, self.settings.move_stress_threshold);
        let mut moved = 0;
        for (destination, mover) in moves {
            if self.world.is_alive(destination) {
                continue;
            }
            self.write_dead(mover.source);
            self.write_alive(destination, mover.energy, mover.age);
            moved += 1;
        }
        moved
    }

    fn write_alive(&mut self, coord: WorldCoord, energy: f32, age: u32) {
        let (chunk_coord, index) = self.world.locate(coord);
        self.world
            .get_or_create_chunk(chunk_coord)
            .set_alive(index, energy, age);
        self.dirty.insert(chunk_coord);
    }

    fn write_dead(&mut self, coord: WorldCoord) {
        let (chunk_coord, index) = self.world.locate(coord);
        let Some(chunk) = self.world.try_get_chunk_mut(chunk_coord) else {
            return;
        };
        chunk.set_dead(index);
        let empty = !chunk.has_living_cells();
        self.dirty.insert(chunk_coord);
        if empty {
            self.world.remove_chunk(chunk_coord);
        }
    }

    fn recalculate_population(&mut self) {
        self.population = self.world.live_cell_count();
    }
}

impl std::fmt::Debug for SimulationCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationCore")
            .field("chunk_size", &self.settings.chunk_size)
            .field("chunks", &self.world.len())
            .field("dirty", &self.dirty.len())
            .field("tick_count", &self.tick_count)
            .field("population", &self.population)
            .finish_non_exhaustive()
    }
}

/// Computes the next state of the center chunk of `hood` from the pre-tick
/// world.
fn next_generation(
    coord: ChunkCoord,
    hood: &ChunkNeighborhood<'_>,
    settings: &SimulationSettings,
) -> ChunkStep {
    let size = settings.chunk_size;
    let mut next = Chunk::new(size);
    let mut has_life = false;
    let mut changed = false;

    for y in 0..size {
        for x in 0..size {
            let (lx, ly) = (x as i32, y as i32);
            let live_neighbors = hood.count_live_neighbors(lx, ly);
            let free = 8 - live_neighbors;
            let index = next.index(x, y);

            match hood.cell(lx, ly) {
                Some(cell) => {
                    let energy = cell.energy + settings.energy_delta(live_neighbors);
                    if energy > 0.0 && (live_neighbors == 2 || live_neighbors == 3) {
                        next.set_alive(index, energy, cell.age.saturating_add(1));
                        has_life = true;
                        if (energy - cell.energy).abs() > ENERGY_TOLERANCE {
                            changed = true;
                        }
                    } else {
                        changed = true;
                    }
                }
                None => {
                    if live_neighbors == 3
                        && free >= settings.free_threshold
                        && hood.has_neighbor_with_energy(lx, ly, settings.reproduce_threshold)
                    {
                        next.set_alive(index, settings.newborn_energy, 0);
                        has_life = true;
                        changed = true;
                    }
                }
            }
        }
    }

    if has_life {
        ChunkStep {
            coord,
            chunk: Some(next),
            changed,
        }
    } else {
        ChunkStep {
            coord,
            chunk: None,
            changed: changed || hood.center().is_some(),
        }
    }
}
