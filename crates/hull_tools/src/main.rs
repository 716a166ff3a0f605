//! Hull Grid - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hull_core::transform::ShipTransform;
use hull_tools::barrage::{run_barrage, BarrageConfig};
use hull_tools::render::{known_ids, module_table, render_ascii, LEGEND};
use hull_tools::validate::{load_hull, validate_layout_directory};
use hull_tools::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Layouts shipped with the tools crate.
const SHIPPED_LAYOUTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/layouts");

#[derive(Parser)]
#[command(name = "hull-tools")]
#[command(about = "Development tools for ship hull layouts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a layout's grid and module table
    Inspect {
        /// Layout file
        layout: PathBuf,
        /// Module ids to destroy before printing
        #[arg(long, value_delimiter = ',')]
        kill: Vec<u32>,
    },
    /// Validate layout files
    Validate {
        /// Path to layout directory (defaults to the shipped layouts)
        #[arg(default_value = SHIPPED_LAYOUTS)]
        path: PathBuf,
    },
    /// Fire seeded random volleys at copies of a layout
    Barrage {
        /// Layout file
        layout: PathBuf,
        /// Number of ships
        #[arg(long, default_value_t = 8)]
        ships: u32,
        /// Volleys per ship
        #[arg(long, default_value_t = 100)]
        volleys: u32,
        /// Seed of the first ship
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn inspect(layout: &Path, kill: &[u32]) -> Result<()> {
    let (data, mut hull) = load_hull(layout, ShipTransform::default())?;
    for id in known_ids(&hull, kill) {
        hull.destroy_module(id)?;
    }
    println!("{} - {}", data.name, data.description);
    print!("{}", render_ascii(&hull));
    println!("{LEGEND}");
    print!("{}", module_table(&hull));
    Ok(())
}

fn validate(path: &Path) -> Result<bool> {
    let summary = validate_layout_directory(path)?;
    for report in &summary.reports {
        match (&report.error, report.grid) {
            (None, Some((w, h))) => println!(
                "ok   {} ({}x{}, {} modules)",
                report.path.display(),
                w,
                h,
                report.modules
            ),
            (Some(e), _) => println!("FAIL {}: {e}", report.path.display()),
            (None, None) => println!("ok   {}", report.path.display()),
        }
    }
    Ok(summary.all_valid())
}

fn barrage(layout: &Path, config: BarrageConfig, json: bool) -> Result<()> {
    let (data, _) = load_hull(layout, ShipTransform::default())?;
    let summary = run_barrage(&data, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for ship in &summary.ships {
            println!(
                "ship {:>3}  seed {:>20}  destroyed {:>3}  external {:>3}  shields {:>6}  hull {:>6}  hash {:016x}",
                ship.ship,
                ship.seed,
                ship.destroyed,
                ship.external_left,
                ship.shield_absorbed,
                ship.module_absorbed,
                ship.state_hash
            );
        }
        println!("{} of {} ships wrecked", summary.wrecks(), summary.ships.len());
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

    let result = match cli.command {
        Commands::Inspect { layout, kill } => inspect(&layout, &kill),
        Commands::Validate { path } => {
            tracing::info!("Validating layouts in: {}", path.display());
            match validate(&path) {
                Ok(true) => {
                    tracing::info!("Validation passed");
                    Ok(())
                }
                Ok(false) => {
                    tracing::error!("Validation failed");
                    std::process::exit(1);
                }
                Err(e) => Err(e),
            }
        }
        Commands::Barrage {
            layout,
            ships,
            volleys,
            seed,
            json,
        } => barrage(&layout, BarrageConfig { ships, volleys, seed }, json),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
