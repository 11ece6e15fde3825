#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs endless-defence sessions headlessly.

mod config;
mod script;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use endless_defence_core::GameSpeed;
use endless_defence_persistence::{decode, FileStore, MemoryStore, SnapshotStore};
use endless_defence_session::{Config, SessionManager, SessionSummary};
use endless_defence_world::MapModel;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::FileConfig, script::BuildOrder};

/// Headless driver for endless-wave tower defence sessions.
#[derive(Debug, Parser)]
#[command(name = "endless-defence", version)]
struct Cli {
    /// TOML file with default settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Simulate a session for a number of seconds and print the roster.
    Run(RunArgs),
    /// Print the roster stored in a snapshot file.
    Inspect {
        /// Snapshot file to read.
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Simulated seconds of frame time.
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Frames per simulated second.
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Seed for every field's random stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot file to resume from and autosave to.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Field to make active before building.
    #[arg(long)]
    field: Option<usize>,

    /// Speed multiplier for the active field (1, 2 or 4).
    #[arg(long, value_parser = parse_speed)]
    speed: Option<GameSpeed>,

    /// Tower to build on the active field, as kind@column,row. Repeatable.
    #[arg(long = "build")]
    builds: Vec<BuildOrder>,
}

fn parse_speed(value: &str) -> Result<GameSpeed, String> {
    value
        .parse::<f64>()
        .ok()
        .and_then(GameSpeed::from_multiplier)
        .ok_or_else(|| format!("speed must be 1, 2 or 4, got '{value}'"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    match cli.command {
        Mode::Run(args) => run(&file_config, args),
        Mode::Inspect { path } => inspect(&file_config, &path),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(file_config: &FileConfig, args: RunArgs) -> Result<()> {
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        bail!("--seconds must be a non-negative number");
    }
    let frame_rate = args.frame_rate.unwrap_or_else(|| file_config.frame_rate());
    if frame_rate == 0 {
        bail!("--frame-rate must be positive");
    }
    let config = Config::new(
        file_config.autosave_interval(),
        args.seed.unwrap_or_else(|| file_config.seed()),
    );

    match args.save.clone().or_else(|| file_config.save_path.clone()) {
        Some(path) => {
            let mut manager = SessionManager::new(config, FileStore::new(path));
            simulate(&mut manager, &args, frame_rate)?;
            manager
                .save_now()
                .with_context(|| format!("failed to save {}", manager.store().path().display()))?;
            print_summary(&manager.summary());
        }
        None => {
            let mut manager = SessionManager::new(config, MemoryStore::new());
            simulate(&mut manager, &args, frame_rate)?;
            print_summary(&manager.summary());
        }
    }
    Ok(())
}

fn simulate<S: SnapshotStore>(
    manager: &mut SessionManager<S>,
    args: &RunArgs,
    frame_rate: u32,
) -> Result<()> {
    if let Some(index) = args.field {
        if !manager.set_active_session(index) {
            bail!("field {index} cannot be activated");
        }
    }

    let active = manager.active_index();
    if let Some(speed) = args.speed {
        manager.set_speed(active, speed);
    }
    for order in &args.builds {
        manager.build_tower(active, order.cell, order.kind);
    }

    let frames = (args.seconds * f64::from(frame_rate)).round() as u64;
    let dt = Duration::from_secs_f64(1.0 / f64::from(frame_rate));
    info!(frames, frame_rate, active, "run_started");
    for _ in 0..frames {
        manager.tick(dt);
    }
    Ok(())
}

fn inspect(file_config: &FileConfig, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let map = Arc::new(MapModel::standard());
    let _ = decode(&text, &map, file_config.seed())
        .with_context(|| format!("snapshot {} cannot be used", path.display()))?;

    let config = Config::new(file_config.autosave_interval(), file_config.seed());
    let manager = SessionManager::with_map(config, map, MemoryStore::with_document(text));
    print_summary(&manager.summary());
    Ok(())
}

fn print_summary(lines: &[SessionSummary]) {
    for line in lines {
        println!(
            "{marker} {index} {name:<10} {status:<9} wave {wave:>4}  base {hp:>3}",
            marker = if line.active { '*' } else { ' ' },
            index = line.index,
            name = line.name,
            status = line.status.to_string(),
            wave = line.wave_index,
            hp = line.base_hp,
        );
    }
}
