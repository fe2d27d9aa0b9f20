use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use plateau_terrain::export::ElevationSnapshot;
use plateau_terrain::sphere::fibonacci_sphere;
use plateau_terrain::{ElevationConfig, ElevationLevel, ElevationTerrain, Result, TerrainError, TerrainStyle};

#[derive(Parser, Debug)]
#[command(name = "plateau_terrain")]
#[command(about = "Generate nested plateaus on a spherical tile grid")]
struct Args {
    /// Number of tiles on the sphere
    #[arg(short = 'n', long, default_value = "2000")]
    tiles: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain style preset: gentle, standard, rugged
    #[arg(long, default_value = "standard")]
    style: String,

    /// JSON config file (overrides the style preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the fraction of eligible tiles raised into primaries
    #[arg(long)]
    coverage: Option<f32>,

    /// Write the elevation snapshot to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            ElevationConfig::load(path)?
        }
        None => {
            let style = TerrainStyle::from_str(&args.style).ok_or_else(|| TerrainError::InvalidConfig {
                field: "style",
                message: format!(
                    "unknown style '{}', expected one of: {}",
                    args.style,
                    TerrainStyle::all().iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
                ),
            })?;
            println!("Style: {}", style.description());
            style.config(0)
        }
    };

    if args.config.is_none() || args.seed.is_some() {
        config.seed = args.seed.unwrap_or_else(rand::random);
    }
    if let Some(coverage) = args.coverage {
        config.coverage_fraction = coverage;
    }

    println!("Generating plateaus with seed: {}", config.seed);
    println!("Building sphere with {} tiles...", args.tiles);
    let graph = fibonacci_sphere(args.tiles, config.planet_radius)?;

    let terrain = ElevationTerrain::generate(config, graph, &[], &[])?;
    print!("{}", terrain.report());

    let tallest = terrain.levels().iter().copied().max().unwrap_or(ElevationLevel::GROUND);
    println!(
        "Tallest level {} extrudes to {:.3}x radius",
        tallest,
        terrain.extrusion_factor(tallest)
    );

    if let Some(path) = &args.export {
        ElevationSnapshot::from_terrain(&terrain).write_json(path)?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}
