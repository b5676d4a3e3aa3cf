//! Hexwar - Headless session runner
//!
//! Bootstraps a session from a seed, runs the clock for a fixed duration,
//! prints every update event and optionally keeps attacking one region.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::runtime::Runtime;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

use hexwar::actions::ActionKind;
use hexwar::core::config::SimulationConfig;
use hexwar::core::error::Result;
use hexwar::core::types::RegionId;
use hexwar::data::{BuiltinSeed, RegionSource, SeedFile};
use hexwar::events::{StateChange, UpdateEvent};
use hexwar::session::{Session, TerritorySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Hexwar - run a territory simulation and stream its updates
#[derive(Parser, Debug)]
#[command(name = "hexwar")]
#[command(about = "Run a contested hex territory simulation and print live updates")]
struct Args {
    /// Session config (TOML); defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Region seed file (JSON or TOML); defaults to the bundled universities
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// How long to run the clock
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,

    /// Event output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Region the first actor keeps acting on
    #[arg(long)]
    target: Option<String>,

    /// Milliseconds between actions against --target
    #[arg(long, default_value_t = 500)]
    attack_every_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexwar=info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let source: Box<dyn RegionSource> = match &args.regions {
        Some(path) => Box::new(SeedFile::load(path)?),
        None => Box::new(BuiltinSeed),
    };

    let rt = Runtime::new()?;
    rt.block_on(run(args, config, source.as_ref()))
}

async fn run(args: Args, config: SimulationConfig, source: &dyn RegionSource) -> Result<()> {
    let actor = config.actors_or_default()[0].clone();
    let mut session = Session::bootstrap(config, source)?;
    let mut observer = session.subscribe();
    session.start();

    let target = args.target.as_deref().map(RegionId::from);
    let kind = match &target {
        Some(id) => {
            let region = session.shared().read(|s| s.store.get_region(id).map(|r| r.faction.clone()));
            match region {
                Ok(faction) if faction == actor.faction => ActionKind::Fortify,
                _ => ActionKind::Attack,
            }
        }
        None => ActionKind::Attack,
    };
    let mut actions = target.as_ref().map(|_| {
        let mut interval = time::interval(Duration::from_millis(args.attack_every_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let deadline = time::sleep(Duration::from_secs(args.duration_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some(event) = observer.recv() => print_event(&event, args.format)?,
            _ = next_tick(&mut actions) => {
                if let Some(target) = &target {
                    match session.submit_action(&actor.id, kind, target) {
                        Ok(report) => tracing::info!(
                            "{} {} for {} -> {} (energy {})",
                            kind, target, report.amount, report.change.new_health, report.remaining_energy
                        ),
                        Err(err) => tracing::info!("Action rejected: {}", err),
                    }
                }
            }
        }
    }

    // Events released before shutdown are still queued
    for event in observer.drain() {
        print_event(&event, args.format)?;
    }

    let snapshot = session.snapshot();
    session.shutdown().await;
    print_summary(&snapshot, args.format)
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn print_event(event: &UpdateEvent, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
        OutputFormat::Text => match &event.change {
            StateChange::RegionHealth {
                region,
                new_health,
                max_health,
                applied,
                ..
            } => println!(
                "#{:<5} {:?} {} {:+} -> {}/{}",
                event.sequence, event.kind, region, applied, new_health, max_health
            ),
            StateChange::Energy { actor, energy } => {
                println!("#{:<5} {:?} {} energy {}", event.sequence, event.kind, actor, energy)
            }
            StateChange::Tiles { region, tile_count } => {
                println!("#{:<5} {:?} {} tiles {}", event.sequence, event.kind, region, tile_count)
            }
        },
    }
    Ok(())
}

fn print_summary(snapshot: &TerritorySnapshot, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&snapshot.regions)?);
        return Ok(());
    }

    println!();
    println!("=== FINAL STATE (sequence {}) ===", snapshot.sequence);
    for region in &snapshot.regions {
        println!(
            "  {:<8} {:>5}/{:<5} {:>4} tiles{}",
            region.id,
            region.health,
            region.max_health,
            region.tile_count,
            if region.captured { "  CAPTURED" } else { "" }
        );
    }
    for actor in &snapshot.actors {
        println!("  {} ({}) energy {}/{}", actor.id, actor.faction, actor.energy, actor.cap);
    }
    Ok(())
}
