use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use muzicmaze_core::{ConfigManager, Hex, LoggingConfig, MuzicMazeConfig, Track, WorldPosition};
use muzicmaze_graph::{BuildOptions, MazeBuilder, MazeStats};
use muzicmaze_oracle::HttpOracle;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "muzicmaze")]
#[command(about = "MuzicMaze CLI - grow a hex maze of music recommendations", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty, table)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Explicit config file (skips the default search)
    #[arg(long, global = true, env = "MUZICMAZE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a maze from two seed track ids
    Build {
        /// First seed track id
        seed1: String,

        /// Second seed track id
        seed2: String,

        /// Maximum distance from the origin
        #[arg(short, long)]
        depth: Option<u32>,

        /// Recommendation service base URL
        #[arg(long)]
        oracle_url: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

/// One maze cell as handed to the renderer.
#[derive(Serialize)]
struct CellView {
    q: i32,
    r: i32,
    walkable: bool,
    track: Option<Track>,
    track_id: Option<String>,
    position: WorldPosition,
}

impl CellView {
    fn new(hex: &Hex, track: Option<Track>, hex_world_size: f64) -> Self {
        let coordinate = hex.coordinate();
        Self {
            q: coordinate.q,
            r: coordinate.r,
            walkable: hex.is_walkable(),
            track,
            track_id: hex.track_id().map(str::to_string),
            position: coordinate.world_position(hex_world_size),
        }
    }
}

#[derive(Tabled)]
struct CellRow {
    q: i32,
    r: i32,
    role: String,
    track: String,
    x: String,
    z: String,
}

impl From<&CellView> for CellRow {
    fn from(view: &CellView) -> Self {
        let track = match (&view.track, &view.track_id) {
            (Some(track), _) => track.label().replace('\n', " "),
            (None, Some(id)) => id.clone(),
            (None, None) => String::new(),
        };
        Self {
            q: view.q,
            r: view.r,
            role: if view.walkable { "floor" } else { "track" }.to_string(),
            track,
            x: format!("{:.2}", view.position.x),
            z: format!("{:.2}", view.position.z),
        }
    }
}

#[derive(Serialize)]
struct MazeReport {
    stats: MazeStats,
    cells: Vec<CellView>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_path(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&manager.config().logging, cli.verbose);

    if let Err(e) = execute_command(&cli, &manager).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

async fn execute_command(cli: &Cli, manager: &ConfigManager) -> Result<()> {
    match &cli.command {
        Commands::Build {
            seed1,
            seed2,
            depth,
            oracle_url,
        } => {
            let mut config = manager.config().clone();
            if let Some(depth) = depth {
                config.maze.depth = *depth;
            }
            if let Some(url) = oracle_url {
                config.oracle.base_url = url.clone();
            }
            let report = build_maze(&config, seed1, seed2).await?;
            print_report(&cli.output, &report)
        }
        Commands::Config => {
            match manager.config_path() {
                Some(path) => eprintln!("{} {}", "Config file:".cyan().bold(), path.display()),
                None => eprintln!("{}", "Config file: NONE (using defaults)".cyan()),
            }
            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(manager.config())?),
                _ => println!("{}", manager.to_toml_string()?),
            }
            Ok(())
        }
    }
}

async fn build_maze(config: &MuzicMazeConfig, seed1: &str, seed2: &str) -> Result<MazeReport> {
    let oracle = Arc::new(
        HttpOracle::from_config(&config.oracle).context("Failed to create recommendation client")?,
    );
    let builder = MazeBuilder::new(oracle, BuildOptions::from(config));
    let accessor = builder.accessor();

    builder
        .initialize(seed1, seed2)
        .await
        .context("Maze build failed")?;
    builder.join_prefetch().await;

    let cells = accessor
        .renderable_cells(config.maze.min_renderable_cells)
        .await;
    if cells.is_empty() {
        bail!(
            "Maze has fewer than {} cells, nothing to render",
            config.maze.min_renderable_cells
        );
    }

    let cells = cells
        .iter()
        .map(|hex| CellView::new(hex, accessor.get_track_for(hex), config.maze.hex_world_size))
        .collect();

    Ok(MazeReport {
        stats: accessor.stats().await,
        cells,
    })
}

fn print_report(format: &OutputFormat, report: &MazeReport) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Pretty => print_pretty(report),
        OutputFormat::Table => {
            let rows: Vec<CellRow> = report.cells.iter().map(CellRow::from).collect();
            println!("{}", Table::new(rows));
            print_stats(&report.stats);
        }
    }
    Ok(())
}

fn print_pretty(report: &MazeReport) {
    for cell in &report.cells {
        let coordinate = format!("({}, {})", cell.q, cell.r);
        match (&cell.track, &cell.track_id) {
            (Some(track), _) => println!(
                "{} {} {}",
                coordinate.cyan().bold(),
                track.name.green(),
                format!("by {}", track.artist).yellow()
            ),
            (None, Some(id)) => println!(
                "{} {} {}",
                coordinate.cyan().bold(),
                id.green(),
                "(no metadata)".dimmed()
            ),
            (None, None) => println!("{} {}", coordinate.cyan(), "floor".dimmed()),
        }
    }
    println!();
    print_stats(&report.stats);
}

fn print_stats(stats: &MazeStats) {
    println!("{}: {}", "state".cyan().bold(), stats.state.to_string().green());
    println!("{}: {}", "cells".cyan().bold(), stats.total_cells.to_string().yellow());
    println!("{}: {}", "track cells".cyan().bold(), stats.track_cells.to_string().yellow());
    println!("{}: {}", "floor cells".cyan().bold(), stats.walkable_cells.to_string().yellow());
    println!("{}: {}", "cached tracks".cyan().bold(), stats.cached_tracks.to_string().yellow());
}
