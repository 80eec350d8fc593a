//! Engine configuration.
//!
//! Provides the world creation parameters, tick rate, persistence and
//! simulation settings for the headless driver. Configuration can be loaded
//! from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use lifegrid_kernel::{Preset, SeedOptions, SimulationSettings};
use lifegrid_world::{WorldInfo, DEFAULT_SAVE_DIR};

use crate::timing::{DEFAULT_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND, MIN_TICKS_PER_SECOND};

/// Configuration file name.
pub const CONFIG_FILE: &str = "lifegrid.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World Settings ===
    /// World display name
    pub world_name: String,
    /// World seed
    pub seed: u64,
    /// Starting pattern
    pub preset: Preset,
    /// Start density for the random preset
    pub start_density: f32,
    /// Half-width of the random preset's scatter square
    pub random_spread: i32,

    // === Timing ===
    /// Simulation ticks per second while running
    pub ticks_per_second: u32,
    /// Ticks between status log lines (0 = disabled)
    pub status_interval: u64,

    // === Persistence ===
    /// Directory holding save slots
    pub save_dir: PathBuf,
    /// Ticks between auto-saves (0 = disabled)
    pub auto_save_interval: u64,

    // === Simulation ===
    /// Rule parameters
    pub simulation: SimulationSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // World
            world_name: "New World".to_string(),
            seed: 0,
            preset: Preset::Random,
            start_density: 0.2,
            random_spread: 64,

            // Timing
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            status_interval: 10,

            // Persistence
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            auto_save_interval: 0,

            // Simulation
            simulation: SimulationSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `lifegrid.toml` in the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let mut config: Self = match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        return Self::default();
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                return Self::default();
            },
        };

        config.validate();
        config
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // World
        if self.world_name.trim().is_empty() {
            self.world_name = "New World".to_string();
        }
        self.start_density = if self.start_density.is_finite() {
            self.start_density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.random_spread = self.random_spread.max(0);

        // Timing
        self.ticks_per_second = self
            .ticks_per_second
            .clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND);

        // Simulation
        self.simulation.validate();
    }

    /// Random preset parameters.
    #[must_use]
    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            seed: self.seed,
            density: self.start_density,
            spread: self.random_spread,
        }
    }

    /// World identity recorded in saves.
    #[must_use]
    pub fn world_info(&self) -> WorldInfo {
        WorldInfo::new(self.world_name.clone(), self.seed)
    }
}
