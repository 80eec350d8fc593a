//! Save slot management.
//!
//! A slot is a pair of files in the save directory:
//! - `<slot>.json`: [`SaveMetadata`] (world name, seed, tick, rule settings)
//! - `<slot>.bin`: the binary chunk stream from [`crate::chunk_serialize`]
//!
//! Both files are written to a temp path and renamed into place. The chunk
//! stream is written first so a metadata file always points at complete
//! chunk data.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lifegrid_kernel::{SimulationCore, SimulationSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::chunk_serialize::{SerializeError, WorldSnapshot};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Slot used when no name is given.
pub const DEFAULT_SLOT: &str = "autosave";

/// Default save directory name.
pub const DEFAULT_SAVE_DIR: &str = "saves";

/// Errors that can occur during save operations.
#[derive(Debug, Error)]
pub enum SaveError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata could not be (de)serialized
    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),

    /// Chunk stream error
    #[error("Chunk data error: {0}")]
    Chunks(#[from] SerializeError),

    /// Save slot not found
    #[error("Save slot not found: {0}")]
    SlotNotFound(String),

    /// Invalid slot name
    #[error("Invalid slot name: {0}")]
    InvalidSlotName(String),

    /// Version mismatch
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Supported version
        expected: u32,
        /// Version in the file
        found: u32,
    },

    /// Saved chunk size differs from the core's
    #[error("Chunk size mismatch: save uses {saved}, core uses {core}")]
    ChunkSizeMismatch {
        /// Chunk size recorded in the save
        saved: u32,
        /// Chunk size of the target core
        core: u32,
    },

    /// Metadata names a chunk file outside the save directory
    #[error("Invalid chunk data file: {0}")]
    InvalidChunkDataFile(String),

    /// Atomic write failed
    #[error("Atomic write failed: {0}")]
    AtomicWriteFailed(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Rule parameters stored with a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSettings {
    /// Energy gained per free neighbor slot
    pub gain_free: f32,
    /// Flat energy cost of staying alive
    pub cost_alive: f32,
    /// Energy cost per living neighbor
    pub cost_crowd: f32,
    /// Minimum neighbor energy for a birth
    pub reproduce_threshold: f32,
    /// Minimum free slots for a birth
    pub free_threshold: u32,
    /// Energy of a newborn
    pub newborn_energy: f32,
    /// Live-neighbor count that triggers movement
    pub move_stress_threshold: u32,
    /// Movement pass enabled
    pub enable_movement: bool,
}

impl SavedSettings {
    /// Copies the persisted subset out of `settings`.
    #[must_use]
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            gain_free: settings.gain_free,
            cost_alive: settings.cost_alive,
            cost_crowd: settings.cost_crowd,
            reproduce_threshold: settings.reproduce_threshold,
            free_threshold: settings.free_threshold,
            newborn_energy: settings.newborn_energy,
            move_stress_threshold: settings.move_stress_threshold,
            enable_movement: settings.enable_movement,
        }
    }

    /// Writes the persisted subset into `settings`.
    pub fn apply_to(&self, settings: &mut SimulationSettings) {
        settings.gain_free = self.gain_free;
        settings.cost_alive = self.cost_alive;
        settings.cost_crowd = self.cost_crowd;
        settings.reproduce_threshold = self.reproduce_threshold;
        settings.free_threshold = self.free_threshold;
        settings.newborn_energy = self.newborn_energy;
        settings.move_stress_threshold = self.move_stress_threshold;
        settings.enable_movement = self.enable_movement;
    }
}

/// Contents of `<slot>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetadata {
    /// Format version
    pub save_version: u32,
    /// World display name
    pub world_name: String,
    /// World seed
    pub seed: u64,
    /// Tick count at save time
    pub tick: u64,
    /// Population at save time
    pub population: usize,
    /// UTC save time, `YYYY-MM-DD HH:MM:SSZ`
    pub save_date: String,
    /// Rule parameters
    pub settings: SavedSettings,
    /// Chunk size the chunk stream was written with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    /// File name of the chunk stream, relative to the save directory
    pub chunk_data_file: String,
}

/// Identity of the world being saved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldInfo {
    /// Display name
    pub name: String,
    /// Seed the world was created from
    pub seed: u64,
}

impl WorldInfo {
    /// Creates world info.
    #[must_use]
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            seed,
        }
    }
}

/// Summary of a slot for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlotInfo {
    /// Slot name (file stem)
    pub slot_name: String,
    /// World display name
    pub world_name: String,
    /// UTC save time
    pub save_date: String,
    /// Tick count at save time
    pub tick: u64,
    /// Population at save time
    pub population: usize,
}

/// Manager for save slots in one directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    /// Base directory for saves
    save_dir: PathBuf,
    /// Slot used by [`SaveManager::save_current`]
    current_slot: String,
}

impl Default for SaveManager {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DIR)
    }
}

impl SaveManager {
    /// Creates a manager rooted at `save_dir`.
    #[must_use]
    pub fn new(save_dir: impl AsRef<Path>) -> Self {
        Self {
            save_dir: save_dir.as_ref().to_path_buf(),
            current_slot: DEFAULT_SLOT.to_string(),
        }
    }

    /// Returns the save directory path.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Slot used by [`SaveManager::save_current`].
    #[must_use]
    pub fn current_slot(&self) -> &str {
        &self.current_slot
    }

    /// Maps a blank name to [`DEFAULT_SLOT`].
    #[must_use]
    pub fn resolve_slot_name(name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            DEFAULT_SLOT.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Validates a slot name.
    fn validate_slot_name(slot_name: &str) -> SaveResult<()> {
        if slot_name.is_empty() {
            return Err(SaveError::InvalidSlotName("Empty slot name".to_string()));
        }
        if slot_name == "." || slot_name == ".." {
            return Err(SaveError::InvalidSlotName(slot_name.to_string()));
        }

        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        for c in invalid_chars {
            if slot_name.contains(c) {
                return Err(SaveError::InvalidSlotName(format!(
                    "Invalid character '{c}' in slot name"
                )));
            }
        }
        Ok(())
    }

    fn metadata_path(&self, slot_name: &str) -> PathBuf {
        self.save_dir.join(format!("{slot_name}.json"))
    }

    /// Path of the chunk stream named by `metadata`.
    ///
    /// The name must be a bare file name inside the save directory.
    fn chunk_data_path(&self, metadata: &SaveMetadata) -> SaveResult<PathBuf> {
        let name = Path::new(&metadata.chunk_data_file);
        match name.file_name() {
            Some(file_name) if file_name == name.as_os_str() => Ok(self.save_dir.join(file_name)),
            _ => Err(SaveError::InvalidChunkDataFile(
                metadata.chunk_data_file.clone(),
            )),
        }
    }

    fn chunk_file_name(slot_name: &str) -> String {
        format!("{slot_name}.bin")
    }

    /// Ensures the save directory exists.
    pub fn ensure_save_dir(&self) -> SaveResult<()> {
        if !self.save_dir.exists() {
            fs::create_dir_all(&self.save_dir)?;
            info!("Created save directory: {:?}", self.save_dir);
        }
        Ok(())
    }

    /// Whether metadata for `slot_name` exists.
    #[must_use]
    pub fn slot_exists(&self, slot_name: &str) -> bool {
        self.metadata_path(&Self::resolve_slot_name(slot_name))
            .exists()
    }

    /// Saves to the current slot.
    pub fn save_current(
        &mut self,
        core: &SimulationCore,
        world: &WorldInfo,
    ) -> SaveResult<SaveMetadata> {
        let slot = self.current_slot.clone();
        self.save_as(&slot, core, world)
    }

    /// Saves `core` to `slot_name` and makes it the current slot.
    pub fn save_as(
        &mut self,
        slot_name: &str,
        core: &SimulationCore,
        world: &WorldInfo,
    ) -> SaveResult<SaveMetadata> {
        let slot = Self::resolve_slot_name(slot_name);
        Self::validate_slot_name(&slot)?;
        self.ensure_save_dir()?;

        let metadata = SaveMetadata {
            save_version: SAVE_VERSION,
            world_name: world.name.clone(),
            seed: world.seed,
            tick: core.tick_count(),
            population: core.population(),
            save_date: chrono::Utc::now().format("%Y-%m-%d %H:%M:%SZ").to_string(),
            settings: SavedSettings::from_settings(core.settings()),
            chunk_size: Some(core.settings().chunk_size),
            chunk_data_file: Self::chunk_file_name(&slot),
        };
        let chunks = WorldSnapshot::capture(core).encode();

        let result = self.write_slot(&slot, &metadata, &chunks);
        match &result {
            Ok(()) => {
                self.current_slot.clone_from(&slot);
                info!(
                    "Saved world '{}' to slot '{}' (tick {}, population {})",
                    metadata.world_name, slot, metadata.tick, metadata.population
                );
            }
            Err(e) => error!("Failed to save slot '{}': {}", slot, e),
        }
        result.map(|()| metadata)
    }

    fn write_slot(&self, slot: &str, metadata: &SaveMetadata, chunks: &[u8]) -> SaveResult<()> {
        let json = serde_json::to_vec_pretty(metadata)?;
        atomic_write(&self.chunk_data_path(metadata)?, chunks)?;
        atomic_write(&self.metadata_path(slot), &json)?;
        debug!("Atomic write complete for slot: {}", slot);
        Ok(())
    }

    /// Reads the metadata of `slot_name` without loading chunks.
    pub fn read_metadata(&self, slot_name: &str) -> SaveResult<SaveMetadata> {
        let slot = Self::resolve_slot_name(slot_name);
        Self::validate_slot_name(&slot)?;
        let path = self.metadata_path(&slot);
        if !path.exists() {
            return Err(SaveError::SlotNotFound(slot));
        }
        let reader = BufReader::new(File::open(&path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads `slot_name` into `core` and makes it the current slot.
    ///
    /// The saved rule settings are applied and the world is restored through
    /// a reset, so the tick count starts again at zero. Nothing in `core` is
    /// touched unless the whole slot decodes.
    pub fn load(&mut self, slot_name: &str, core: &mut SimulationCore) -> SaveResult<SaveMetadata> {
        let slot = Self::resolve_slot_name(slot_name);
        let result = self.load_slot(&slot, core);
        match &result {
            Ok(metadata) => {
                self.current_slot = slot;
                info!(
                    "Loaded world '{}' (population {})",
                    metadata.world_name,
                    core.population()
                );
            }
            Err(e) => error!("Failed to load slot '{}': {}", slot, e),
        }
        result
    }

    fn load_slot(&self, slot: &str, core: &mut SimulationCore) -> SaveResult<SaveMetadata> {
        let metadata = self.read_metadata(slot)?;
        if metadata.save_version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: metadata.save_version,
            });
        }

        let core_size = core.settings().chunk_size;
        if let Some(saved) = metadata.chunk_size {
            if saved != core_size {
                return Err(SaveError::ChunkSizeMismatch {
                    saved,
                    core: core_size,
                });
            }
        }

        let chunk_path = self.chunk_data_path(&metadata)?;
        let snapshot = if chunk_path.exists() {
            let mut reader = BufReader::new(File::open(&chunk_path)?);
            Some(WorldSnapshot::read_from(&mut reader, core_size)?)
        } else {
            warn!("Chunk data {:?} missing, loading an empty world", chunk_path);
            None
        };

        core.update_settings(|settings| metadata.settings.apply_to(settings));
        match snapshot {
            Some(snapshot) => snapshot.restore_into(core)?,
            None => core.reset(),
        }
        Ok(metadata)
    }

    /// Lists all slots, newest first.
    pub fn list_slots(&self) -> SaveResult<Vec<SaveSlotInfo>> {
        if !self.save_dir.exists() {
            return Ok(Vec::new());
        }

        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.save_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let slot_name = stem.to_string_lossy().to_string();

            match self.read_metadata(&slot_name) {
                Ok(metadata) => slots.push(SaveSlotInfo {
                    slot_name,
                    world_name: metadata.world_name,
                    save_date: metadata.save_date,
                    tick: metadata.tick,
                    population: metadata.population,
                }),
                Err(e) => warn!("Skipping unreadable save {:?}: {}", path, e),
            }
        }

        slots.sort_by(|a, b| {
            b.save_date
                .cmp(&a.save_date)
                .then_with(|| a.slot_name.cmp(&b.slot_name))
        });
        Ok(slots)
    }

    /// Deletes both files of a slot.
    pub fn delete_slot(&mut self, slot_name: &str) -> SaveResult<()> {
        let slot = Self::resolve_slot_name(slot_name);
        let metadata = self.read_metadata(&slot)?;

        let chunk_path = self.chunk_data_path(&metadata)?;
        if chunk_path.exists() {
            fs::remove_file(&chunk_path)?;
        }
        fs::remove_file(self.metadata_path(&slot))?;

        if self.current_slot == slot {
            self.current_slot = DEFAULT_SLOT.to_string();
        }
        info!("Deleted save slot: {}", slot);
        Ok(())
    }
}

/// Writes `bytes` to a temp file next to `path` and renames it into place.
fn atomic_write(path: &Path, bytes: &[u8]) -> SaveResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SaveError::AtomicWriteFailed(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn core_with_cells() -> SimulationCore {
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (-40, 9)] {
            core.set_cell_alive(x, y, 1.5, 2);
        }
        core
    }

    #[test]
    fn test_blank_name_uses_autosave() {
        assert_eq!(SaveManager::resolve_slot_name("   "), DEFAULT_SLOT);
        assert_eq!(SaveManager::resolve_slot_name(" mine "), "mine");
    }

    #[test]
    fn test_invalid_slot_names() {
        assert!(SaveManager::validate_slot_name("ok_name").is_ok());
        assert!(SaveManager::validate_slot_name("a/b").is_err());
        assert!(SaveManager::validate_slot_name("..").is_err());
        assert!(SaveManager::validate_slot_name("what?").is_err());
    }

    fn rewrite_chunk_file(dir: &Path, slot: &str, chunk_file: &str) {
        let path = dir.join(format!("{slot}.json"));
        let mut metadata: SaveMetadata =
            serde_json::from_slice(&fs::read(&path).expect("read")).expect("parse");
        metadata.chunk_data_file = chunk_file.to_string();
        fs::write(&path, serde_json::to_vec(&metadata).expect("encode")).expect("write");
    }

    #[test]
    fn test_chunk_file_outside_save_dir_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let outside = TempDir::new().expect("temp dir");
        let victim = outside.path().join("victim.txt");
        fs::write(&victim, b"keep me").expect("write");

        let mut manager = SaveManager::new(temp.path());
        manager
            .save_as("slot", &core_with_cells(), &WorldInfo::default())
            .expect("save");

        for name in [
            victim.to_string_lossy().to_string(),
            "../victim.txt".to_string(),
            "nested/slot.bin".to_string(),
            String::new(),
        ] {
            rewrite_chunk_file(temp.path(), "slot", &name);
            assert!(matches!(
                manager.delete_slot("slot"),
                Err(SaveError::InvalidChunkDataFile(_))
            ));
            let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
            assert!(matches!(
                manager.load("slot", &mut core),
                Err(SaveError::InvalidChunkDataFile(_))
            ));
        }

        assert!(victim.exists());
        assert!(temp.path().join("slot.json").exists());
        assert!(temp.path().join("slot.bin").exists());
    }

    #[test]
    fn test_save_writes_both_files() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path().join("saves"));
        let core = core_with_cells();

        let metadata = manager
            .save_as("first", &core, &WorldInfo::new("Test", 9))
            .expect("save");
        assert_eq!(metadata.chunk_data_file, "first.bin");
        assert_eq!(metadata.population, 5);
        assert!(temp.path().join("saves/first.json").exists());
        assert!(temp.path().join("saves/first.bin").exists());
        assert!(!temp.path().join("saves/first.json.tmp").exists());
        assert_eq!(manager.current_slot(), "first");
    }

    #[test]
    fn test_metadata_uses_camel_case() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path());
        manager
            .save_as("", &core_with_cells(), &WorldInfo::new("Camel", 1))
            .expect("save");

        let json = fs::read_to_string(temp.path().join("autosave.json")).expect("read");
        assert!(json.contains("\"saveVersion\": 1"));
        assert!(json.contains("\"worldName\": \"Camel\""));
        assert!(json.contains("\"chunkDataFile\": \"autosave.bin\""));
        assert!(json.contains("\"moveStressThreshold\""));
    }

    #[test]
    fn test_load_rejects_other_version() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path());
        let core = core_with_cells();
        let mut metadata = manager
            .save_as("future", &core, &WorldInfo::default())
            .expect("save");
        metadata.save_version = 2;
        fs::write(
            temp.path().join("future.json"),
            serde_json::to_vec(&metadata).expect("json"),
        )
        .expect("write");

        let mut target = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        target.set_cell_alive(3, 3, 1.0, 0);
        let result = manager.load("future", &mut target);
        assert!(matches!(
            result,
            Err(SaveError::VersionMismatch {
                expected: 1,
                found: 2
            })
        ));
        // The target is untouched on failure
        assert!(target.is_alive(3, 3));
    }

    #[test]
    fn test_load_missing_slot() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path());
        let mut core = SimulationCore::new(SimulationSettings::default());
        assert!(matches!(
            manager.load("nope", &mut core),
            Err(SaveError::SlotNotFound(_))
        ));
    }

    #[test]
    fn test_load_without_chunk_file_gives_empty_world() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path());
        manager
            .save_as("thin", &core_with_cells(), &WorldInfo::default())
            .expect("save");
        fs::remove_file(temp.path().join("thin.bin")).expect("remove");

        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
        core.set_cell_alive(0, 0, 1.0, 0);
        manager.load("thin", &mut core).expect("load");
        assert_eq!(core.population(), 0);
    }

    #[test]
    fn test_delete_slot() {
        let temp = TempDir::new().expect("temp dir");
        let mut manager = SaveManager::new(temp.path());
        manager
            .save_as("gone", &core_with_cells(), &WorldInfo::default())
            .expect("save");
        assert!(manager.slot_exists("gone"));

        manager.delete_slot("gone").expect("delete");
        assert!(!manager.slot_exists("gone"));
        assert!(!temp.path().join("gone.bin").exists());
        assert_eq!(manager.current_slot(), DEFAULT_SLOT);
        assert!(matches!(
            manager.delete_slot("gone"),
            Err(SaveError::SlotNotFound(_))
        ));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let manager = SaveManager::new(temp.path().join("never_created"));
        assert!(manager.list_slots().expect("list").is_empty());
    }
}
