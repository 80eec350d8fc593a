//! Interactive session controller.
//!
//! Owns the simulation core and drives it from frame time: play/pause,
//! single steps, tick rate, live rule parameter edits, painting, and
//! periodic auto-saves.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, info, warn};

use lifegrid_kernel::{Preset, SeedOptions, SimulationCore, SubscriptionId, WorldCoord};
use lifegrid_world::{SaveManager, SaveMetadata, SaveResult, WorldInfo};

use crate::brush::{Brush, BrushMode};
use crate::config::EngineConfig;
use crate::status::StatusLine;
use crate::timing::TickTimer;

/// Rule parameter that can be edited while the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Energy gained per free neighbor slot
    GainFree,
    /// Flat energy cost of staying alive
    CostAlive,
    /// Energy cost per living neighbor
    CostCrowd,
    /// Minimum neighbor energy that allows a birth
    ReproduceThreshold,
    /// Energy of a newborn cell
    NewbornEnergy,
    /// Minimum free slots around a dead cell for a birth
    FreeThreshold,
    /// Live-neighbor count at which a cell tries to move
    MoveStressThreshold,
}

impl Parameter {
    /// Every editable parameter.
    pub const ALL: [Self; 7] = [
        Self::GainFree,
        Self::CostAlive,
        Self::CostCrowd,
        Self::ReproduceThreshold,
        Self::NewbornEnergy,
        Self::FreeThreshold,
        Self::MoveStressThreshold,
    ];

    /// Settings field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GainFree => "gain_free",
            Self::CostAlive => "cost_alive",
            Self::CostCrowd => "cost_crowd",
            Self::ReproduceThreshold => "reproduce_threshold",
            Self::NewbornEnergy => "newborn_energy",
            Self::FreeThreshold => "free_threshold",
            Self::MoveStressThreshold => "move_stress_threshold",
        }
    }

    /// Whether the parameter holds a neighbor count.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::FreeThreshold | Self::MoveStressThreshold)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// A running world with its timing and persistence.
pub struct Session {
    core: SimulationCore,
    timer: TickTimer,
    running: bool,
    saves: SaveManager,
    world: WorldInfo,
    seed_options: SeedOptions,
    preset: Preset,
    brush: Brush,
    auto_save_interval: u64,
    /// Set by the core's change notification, cleared by `take_changed`
    changed: Rc<Cell<bool>>,
    subscription: SubscriptionId,
}

impl Session {
    /// Creates a session from configuration and seeds the configured preset.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let core = SimulationCore::new(config.simulation.clone());
        let mut session = Self::with_core(core, config);
        session.seed_world();
        session
    }

    /// Wraps an existing core without seeding it.
    #[must_use]
    pub fn with_core(mut core: SimulationCore, config: &EngineConfig) -> Self {
        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        let subscription = core.subscribe(move || flag.set(true));

        Self {
            core,
            timer: TickTimer::new(config.ticks_per_second),
            running: false,
            saves: SaveManager::new(&config.save_dir),
            world: config.world_info(),
            seed_options: config.seed_options(),
            preset: config.preset,
            brush: Brush::default(),
            auto_save_interval: config.auto_save_interval,
            changed,
            subscription,
        }
    }

    /// Get the simulation core.
    #[must_use]
    pub const fn core(&self) -> &SimulationCore {
        &self.core
    }

    /// Get the simulation core mutably.
    pub fn core_mut(&mut self) -> &mut SimulationCore {
        &mut self.core
    }

    /// Get the world identity.
    #[must_use]
    pub const fn world_info(&self) -> &WorldInfo {
        &self.world
    }

    /// Get the save manager.
    #[must_use]
    pub const fn saves(&self) -> &SaveManager {
        &self.saves
    }

    /// Get the tick timer.
    #[must_use]
    pub const fn timer(&self) -> &TickTimer {
        &self.timer
    }

    /// Whether the simulation advances on `update`.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Start or stop the simulation.
    pub fn set_running(&mut self, running: bool) {
        if running != self.running {
            self.running = running;
            self.timer.reset();
            info!("Simulation {}", if running { "running" } else { "paused" });
        }
    }

    /// Flip between running and paused. Returns the new state.
    pub fn toggle_play_pause(&mut self) -> bool {
        self.set_running(!self.running);
        self.running
    }

    /// Set the tick rate, clamped to 1..=60.
    pub fn set_ticks_per_second(&mut self, ticks_per_second: u32) {
        self.timer.set_ticks_per_second(ticks_per_second);
        debug!("Tick rate: {}/s", self.timer.ticks_per_second());
    }

    /// Advance by frame time. Returns the number of ticks run.
    pub fn update(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        let ticks = self.timer.accumulate(dt);
        for _ in 0..ticks {
            self.advance();
        }
        ticks
    }

    /// Run exactly one tick, running or not.
    pub fn step(&mut self) {
        self.advance();
    }

    fn advance(&mut self) {
        self.core.tick();

        let tick = self.core.tick_count();
        if self.auto_save_interval > 0 && tick % self.auto_save_interval == 0 {
            if let Err(e) = self.saves.save_current(&self.core, &self.world) {
                warn!("Auto-save at tick {tick} failed: {e}");
            }
        }
    }

    /// Clear the world and seed the configured preset again.
    pub fn reset_world(&mut self) {
        self.core.reset();
        self.seed_world();
        self.timer.reset();
    }

    fn seed_world(&mut self) {
        self.preset.apply(&mut self.core, &self.seed_options);
    }

    /// Set a rule parameter by name.
    ///
    /// Neighbor counts are rounded and floored at zero. Unknown names are
    /// ignored. Returns whether a parameter was changed.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> bool {
        let Ok(parameter) = name.parse::<Parameter>() else {
            warn!("Ignoring unknown parameter '{name}'");
            return false;
        };
        if !value.is_finite() {
            warn!("Ignoring non-finite value for {parameter}");
            return false;
        }

        let count = value.round().max(0.0) as u32;
        self.core.update_settings(|s| match parameter {
            Parameter::GainFree => s.gain_free = value,
            Parameter::CostAlive => s.cost_alive = value,
            Parameter::CostCrowd => s.cost_crowd = value,
            Parameter::ReproduceThreshold => s.reproduce_threshold = value,
            Parameter::NewbornEnergy => s.newborn_energy = value,
            Parameter::FreeThreshold => s.free_threshold = count,
            Parameter::MoveStressThreshold => s.move_stress_threshold = count,
        });
        debug!("Set {parameter} = {value}");
        true
    }

    /// Get a rule parameter as a float.
    #[must_use]
    pub fn parameter(&self, parameter: Parameter) -> f32 {
        let s = self.core.settings();
        match parameter {
            Parameter::GainFree => s.gain_free,
            Parameter::CostAlive => s.cost_alive,
            Parameter::CostCrowd => s.cost_crowd,
            Parameter::ReproduceThreshold => s.reproduce_threshold,
            Parameter::NewbornEnergy => s.newborn_energy,
            Parameter::FreeThreshold => s.free_threshold as f32,
            Parameter::MoveStressThreshold => s.move_stress_threshold as f32,
        }
    }

    /// Get the painting brush.
    #[must_use]
    pub const fn brush(&self) -> Brush {
        self.brush
    }

    /// Set the painting brush radius.
    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush = Brush::new(radius);
    }

    /// Paint with the current brush. Returns the number of cells covered.
    pub fn paint(&mut self, center: WorldCoord, mode: BrushMode) -> usize {
        self.brush.paint(&mut self.core, center, mode)
    }

    /// Save to the current slot.
    pub fn save(&mut self) -> SaveResult<SaveMetadata> {
        self.saves.save_current(&self.core, &self.world)
    }

    /// Save to a named slot.
    pub fn save_as(&mut self, slot_name: &str) -> SaveResult<SaveMetadata> {
        self.saves.save_as(slot_name, &self.core, &self.world)
    }

    /// Load a slot into the running core.
    pub fn load(&mut self, slot_name: &str) -> SaveResult<SaveMetadata> {
        let metadata = self.saves.load(slot_name, &mut self.core)?;
        self.world = WorldInfo::new(metadata.world_name.clone(), metadata.seed);
        self.timer.reset();
        Ok(metadata)
    }

    /// Current HUD status.
    #[must_use]
    pub fn status(&self) -> StatusLine {
        StatusLine::from_core(&self.core)
    }

    /// Whether the world changed since the last call.
    pub fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.core.unsubscribe(self.subscription);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("tick", &self.core.tick_count())
            .field("population", &self.core.population())
            .field("running", &self.running)
            .field("ticks_per_second", &self.timer.ticks_per_second())
            .finish_non_exhaustive()
    }
}
