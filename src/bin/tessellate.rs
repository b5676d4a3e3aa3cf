//! Tessellate a region seed and print the tiles as GeoJSON
//!
//! Output is the FeatureCollection the map layer consumes: one polygon per
//! hex with `regionId`, `color`, `height` and `health` properties.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexwar::core::config::SimulationConfig;
use hexwar::core::error::Result;
use hexwar::data::{BuiltinSeed, RegionSource, SeedFile};
use hexwar::geometry::Tessellator;
use hexwar::session::TerritorySnapshot;
use hexwar::territory::TerritoryStore;

#[derive(Parser, Debug)]
#[command(name = "tessellate")]
#[command(about = "Tessellate regions into hex tiles and print a GeoJSON FeatureCollection")]
struct Args {
    /// Region seed file (JSON or TOML); defaults to the bundled universities
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Session config (TOML) providing the lattice settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the hexagon side length in kilometers
    #[arg(long)]
    cell_side_km: Option<f64>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexwar=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(side) = args.cell_side_km {
        config.lattice.cell_side_km = side;
        config.validate()?;
    }

    let regions = match &args.regions {
        Some(path) => SeedFile::load(path)?.list_regions()?,
        None => BuiltinSeed.list_regions()?,
    };

    let store = TerritoryStore::bootstrap(regions, Tessellator::from_config(&config))?;
    let collection = TerritorySnapshot::from_store(&store).to_feature_collection();

    let json = if args.pretty {
        serde_json::to_string_pretty(&collection)?
    } else {
        serde_json::to_string(&collection)?
    };
    println!("{}", json);
    Ok(())
}
