//! # Lifegrid
//!
//! Headless command line driver: runs a world for a number of ticks, manages
//! save slots and writes the default configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lifegrid_engine::{BrushMode, EngineConfig, PaintStroke, Session, CONFIG_FILE};
use lifegrid_kernel::Preset;
use lifegrid_world::SaveManager;

/// Frame length of the real-time loop.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a world
    Run(RunArgs),
    /// List save slots
    List,
    /// Delete a save slot
    Delete {
        /// Slot name
        slot: String,
    },
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Pace ticks at the configured rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Ticks per second in real-time mode
    #[arg(long)]
    tps: Option<u32>,

    /// Starting pattern (empty, glider, blinker, random)
    #[arg(long)]
    preset: Option<Preset>,

    /// World seed
    #[arg(long)]
    seed: Option<u64>,

    /// Load a save slot instead of seeding a preset
    #[arg(long)]
    load: Option<String>,

    /// Save to this slot when the run ends
    #[arg(long)]
    save: Option<String>,

    /// Rule parameter override, `name=value`
    #[arg(long = "set")]
    overrides: Vec<ParameterOverride>,

    /// Paint live cells before running, `x,y[,radius]`
    #[arg(long = "paint")]
    strokes: Vec<PaintStroke>,

    /// Erase cells before running, `x,y[,radius]`
    #[arg(long = "erase")]
    erasures: Vec<PaintStroke>,
}

/// A `name=value` rule parameter assignment.
#[derive(Debug, Clone)]
struct ParameterOverride {
    name: String,
    value: f32,
}

impl FromStr for ParameterOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
        let value = value
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid value in '{s}': {e}"))?;
        Ok(Self {
            name: name.trim().to_string(),
            value,
        })
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    info!("Lifegrid {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run(args) => run(EngineConfig::load_from(&cli.config), args),
        Command::List => list(&EngineConfig::load_from(&cli.config)),
        Command::Delete { slot } => {
            let config = EngineConfig::load_from(&cli.config);
            SaveManager::new(&config.save_dir).delete_slot(&slot)?;
            Ok(())
        },
        Command::InitConfig { force } => {
            if cli.config.exists() && !force {
                bail!(
                    "{} already exists, pass --force to overwrite",
                    cli.config.display()
                );
            }
            EngineConfig::default()
                .save_to(&cli.config)
                .with_context(|| format!("writing {}", cli.config.display()))
        },
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("lifegrid=info".parse()?);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
    Ok(())
}

fn run(mut config: EngineConfig, args: RunArgs) -> Result<()> {
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.load.is_some() {
        config.preset = Preset::Empty;
    }

    let mut session = Session::from_config(&config);
    if let Some(slot) = &args.load {
        session
            .load(slot)
            .with_context(|| format!("loading slot '{slot}'"))?;
    }
    if let Some(tps) = args.tps {
        session.set_ticks_per_second(tps);
    }
    for o in &args.overrides {
        session.set_parameter(&o.name, o.value);
    }
    for stroke in &args.strokes {
        stroke
            .brush
            .paint(session.core_mut(), stroke.center, BrushMode::Alive);
    }
    for stroke in &args.erasures {
        stroke
            .brush
            .paint(session.core_mut(), stroke.center, BrushMode::Dead);
    }

    info!("Starting: {}", session.status());

    let target = session.core().tick_count() + args.ticks;
    let mut last_status = session.core().tick_count();
    let status_every = config.status_interval;
    let started = Instant::now();

    if args.realtime {
        session.set_running(true);
    }
    let mut last_frame = Instant::now();

    while session.core().tick_count() < target {
        if args.realtime {
            thread::sleep(FRAME);
            let now = Instant::now();
            session.update(now.duration_since(last_frame).as_secs_f32());
            last_frame = now;
        } else {
            session.step();
        }

        let tick = session.core().tick_count();
        if status_every > 0 && tick - last_status >= status_every && session.take_changed() {
            info!("{}", session.status());
            last_status = tick;
        }

        if session.core().population() == 0 {
            warn!("World died out at tick {tick}");
            break;
        }
    }
    session.set_running(false);

    info!(
        "Finished in {:.2}s: {}",
        started.elapsed().as_secs_f32(),
        session.status()
    );

    if let Some(slot) = &args.save {
        let metadata = session
            .save_as(slot)
            .with_context(|| format!("saving slot '{slot}'"))?;
        info!("Saved '{}' at tick {}", metadata.world_name, metadata.tick);
    }
    Ok(())
}

fn list(config: &EngineConfig) -> Result<()> {
    let slots = SaveManager::new(&config.save_dir).list_slots()?;
    if slots.is_empty() {
        println!("No saves in {}", config.save_dir.display());
        return Ok(());
    }
    for slot in slots {
        println!(
            "{:<20} {:<24} {}  tick {:>8}  population {:>8}",
            slot.slot_name, slot.world_name, slot.save_date, slot.tick, slot.population
        );
    }
    Ok(())
}
