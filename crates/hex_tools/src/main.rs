//! Hexfront - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hex_core::data::GameModeKind;
use hex_core::math::Fixed;
use hex_tools::simulate::{run_simulation, SimulateOptions};
use hex_tools::ToolResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hex-tools")]
#[command(about = "Development tools for Hexfront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    RealTime,
    TurnBased,
}

impl From<ModeArg> for GameModeKind {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::RealTime => Self::RealTime,
            ModeArg::TurnBased => Self::TurnBased,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON save file
    ValidateSave {
        /// Path to the save
        path: PathBuf,
    },
    /// Validate a RON terrain table
    ValidateTerrain {
        /// Path to the table
        path: PathBuf,
    },
    /// Validate every data file in a directory
    ValidateData {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Run a headless session and report what happened
    Simulate {
        /// Temporal model
        #[arg(long, value_enum, default_value = "turn-based")]
        mode: ModeArg,
        /// Turns to play (seconds in real-time mode)
        #[arg(long, default_value_t = 10)]
        turns: u32,
        /// Map width
        #[arg(long, default_value_t = 16)]
        width: u32,
        /// Map height
        #[arg(long, default_value_t = 16)]
        height: u32,
        /// Time scale
        #[arg(long, default_value = "1", value_parser = parse_scale)]
        scale: Fixed,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_scale(text: &str) -> Result<Fixed, String> {
    text.parse::<Fixed>().map_err(|e| e.to_string())
}

fn run(command: Commands) -> ToolResult<()> {
    match command {
        Commands::ValidateSave { path } => {
            tracing::info!("Validating save: {}", path.display());
            let report = hex_tools::validate::validate_save(&path)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ValidateTerrain { path } => {
            tracing::info!("Validating terrain table: {}", path.display());
            let report = hex_tools::validate::validate_terrain(&path)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ValidateData { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            let checked = hex_tools::validate::validate_data_directory(&path)?;
            tracing::info!("Validation passed ({checked} files)");
        }
        Commands::Simulate {
            mode,
            turns,
            width,
            height,
            scale,
            json,
        } => {
            let report = run_simulation(&SimulateOptions {
                mode: mode.into(),
                turns,
                width,
                height,
                time_scale: scale,
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{:?}: {} ticks, {} turns, {} time units over {} tiles",
                    report.mode, report.ticks, report.turns_completed, report.total_time, report.tiles
                );
            }
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("Failed: {e}");
        std::process::exit(1);
    }
}
