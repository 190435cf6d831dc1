//! biosim - CLI Entry Point
//!
//! Predator-prey island simulator.

use biosim::export::ExportSystem;
use biosim::{BioSim, Config, Island, Species, Terrain};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "biosim")]
#[command(version)]
#[command(about = "Predator-prey simulation on a gridded island")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Scenario file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of years to simulate (overrides the scenario)
        #[arg(short, long)]
        years: Option<u32>,

        /// Output directory for stats and CSV exports
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility (overrides the scenario)
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default scenario file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Print the island map and initial population counts
    Map {
        /// Scenario file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Colorize terrain with ANSI codes
        #[arg(long)]
        color: bool,
    },
}

/// Logs pass through env_logger unfiltered unless `RUST_LOG` is set; the
/// global max level does the filtering so a scenario can change it later.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();
    set_log_level("info");
}

/// Apply a level name unless `RUST_LOG` overrides it
fn set_log_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("Unknown log level '{}', keeping current level", level),
    }
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(Config::from_file(path)?)
    } else {
        Ok(Config::default())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            years,
            output,
            seed,
            quiet,
        } => run_simulation(config, years, output, seed, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Map { config, color } => {
            set_log_level("warn");
            show_map(config, color)
        }
    }
}

fn run_simulation(
    config_path: PathBuf,
    years: Option<u32>,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    set_log_level(&config.logging.log_level);

    if config_path.exists() {
        println!("Loading scenario from: {:?}", config_path);
    } else {
        println!("Using default scenario");
    }

    if seed.is_some() {
        config.simulation.seed = seed;
    }
    let years = years.unwrap_or(config.simulation.years);

    std::fs::create_dir_all(&output)?;

    let mut sim = BioSim::from_config(&config)?;

    println!("Starting simulation");
    println!("  Island: {}x{}", sim.island().height(), sim.island().width());
    println!("  Seed: {}", sim.island().seed());
    println!("  Initial animals: {}", sim.num_animals());
    println!("  Years: {}", years);
    println!();

    let start = Instant::now();
    let mut extinct_at = None;

    sim.simulate_with_callback(years, |s, stats| {
        if !quiet && s.history().should_record(stats.year) {
            println!("{}", stats.summary());
        }
        if extinct_at.is_none() && stats.population() == 0 {
            extinct_at = Some(stats.year);
        }
    });

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Years: {}", sim.year());
    println!("Speed: {:.1} years/s", years as f64 / elapsed.as_secs_f64());
    for (species, count) in sim.num_animals_per_species() {
        println!("{}: {}", species, count);
    }
    if sim.island().is_extinct() {
        if let Some(year) = extinct_at {
            println!("Population extinct since year {}", year);
        }
    }

    let stats_path = output.join("stats_history.json");
    sim.history().save(&stats_path)?;
    println!("Stats history: {:?}", stats_path);

    let counts_path = output.join("counts.csv");
    ExportSystem::export_counts_csv(sim.history(), &counts_path)?;
    let animals_path = output.join("animals.csv");
    ExportSystem::export_animals_csv(sim.island(), &animals_path)?;
    ExportSystem::export_grid_json(sim.island(), output.join("grid.json"))?;
    println!("Exports: {:?}, {:?}", counts_path, animals_path);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Scenario saved to: {:?}", output);
    Ok(())
}

fn show_map(config_path: PathBuf, color: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let sim = BioSim::from_config(&config)?;
    let island = sim.island();

    println!("=== Island Map ===");
    if color {
        for row in &island.terrain().grid {
            let line: String = row
                .iter()
                .map(|t| format!("{}{}{}", t.color_code(), t.code(), ANSI_RESET))
                .collect();
            println!("{}", line);
        }
    } else {
        println!("{}", island.render_map());
    }

    println!();
    let counts = island.terrain().terrain_counts();
    for terrain in Terrain::ALL {
        println!(
            "{} ({:?}): {} cells",
            terrain.code(),
            terrain,
            counts.get(&terrain).copied().unwrap_or(0)
        );
    }

    for species in Species::ALL {
        println!();
        println!("=== {} ===", species);
        print_counts(island, species);
    }

    Ok(())
}

fn print_counts(island: &Island, species: Species) {
    for row in island.grid_snapshot(species) {
        let line: Vec<String> = row.iter().map(|n| format!("{:4}", n)).collect();
        println!("{}", line.join(""));
    }
}
