//! City generator
//!
//! Generates a city and prints the chosen level as ASCII on stdout.
//! Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use burg_cli::{Summary, load_options};
use burg_core::map::{Rect, TileGrid, TileKind};
use burg_core::mapgen::{City, CityGenerator};
use burg_core::{GameRng, LevelId, LogProgress, World};

#[derive(Parser, Debug)]
#[command(name = "burg")]
#[command(author, version, about = "Generate a roguelike city", long_about = None)]
struct Args {
    /// Random seed; a random one is used when absent
    #[arg(short, long)]
    seed: Option<u64>,

    /// City width, overrides the options
    #[arg(long)]
    width: Option<i32>,

    /// City height, overrides the options
    #[arg(long)]
    height: Option<i32>,

    /// Free land around the city
    #[arg(long, default_value_t = 8)]
    margin: i32,

    /// Options as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Options as OPTIONS= lines
    #[arg(long)]
    rc: Option<PathBuf>,

    /// Print a JSON summary instead of the map
    #[arg(long)]
    summary: bool,

    /// Level to print (0 is the surface, cellars follow)
    #[arg(short, long, default_value_t = 0)]
    level: usize,

    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            eprintln!("burg: {msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let mut options = load_options(args.config.as_deref(), args.rc.as_deref())
        .map_err(|e| format!("cannot load options: {e}"))?;
    if let Some(w) = args.width {
        options.city_width = w;
    }
    if let Some(h) = args.height {
        options.city_height = h;
    }
    options.validate().map_err(|e| format!("invalid options: {e}"))?;

    let mut rng = match args.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    let margin = args.margin.max(0);
    info!(seed = rng.seed(), width = options.city_width, height = options.city_height, "generating");

    let mut world = World::new();
    let surface = world.add_level(TileGrid::new(
        options.city_width + 2 * margin,
        options.city_height + 2 * margin,
        TileKind::Grass,
    ));
    let mut city = City::new(Rect::with_size(margin, margin, options.city_width, options.city_height));
    let mut progress = LogProgress::new();
    CityGenerator::new(options)
        .generate(&mut world, surface, &mut city, &mut rng, &mut progress)
        .map_err(|e| format!("generation failed: {e}"))?;

    if args.summary {
        let summary = Summary::new(rng.seed(), &city, &world);
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    let grid = world
        .level(LevelId(args.level))
        .map_err(|e| format!("{e}; {} levels generated", world.level_count()))?;
    print!("{}", grid.to_ascii());
    Ok(())
}
