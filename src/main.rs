//! evogrid - CLI Entry Point
//!
//! Evolutionary grid simulator.

use clap::{Parser, Subcommand};
use evogrid::{benchmark, Config, Simulation, Status};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evogrid")]
#[command(version)]
#[command(about = "Evolutionary grid simulator with genome-wired neural networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Override the configured generation limit
        #[arg(short, long)]
        generations: Option<u32>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,

        /// Write per-generation statistics to this JSON file
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "300")]
        ticks: u32,

        /// Population size
        #[arg(short, long, default_value = "1000")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

/// RUST_LOG wins over the configured level
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            seed,
            quiet,
            stats_out,
        } => run_simulation(config, generations, seed, quiet, stats_out),

        Commands::Benchmark { ticks, population } => {
            init_logging("info");
            run_benchmark(ticks, population)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

fn run_simulation(
    config_path: PathBuf,
    generations: Option<u32>,
    seed: Option<u64>,
    quiet: bool,
    stats_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    init_logging(&config.logging.log_level);
    if let Some(g) = generations {
        config.generation.max_generations = g;
    }

    let mut sim = if let Some(s) = seed {
        println!("Using seed: {}", s);
        Simulation::new_with_seed(config.clone(), s)?
    } else {
        Simulation::new(config.clone())?
    };

    println!("Starting simulation");
    println!("  Initial population: {}", sim.population().len());
    println!(
        "  Grid size: {}x{}",
        config.world.grid_width, config.world.grid_height
    );
    println!("  Challenge: {:?}", config.selection.challenge);
    println!("  Generations: {}", config.generation.max_generations);
    println!();

    let start = Instant::now();
    let mut ticks: u64 = 0;
    let mut generation = sim.generation();

    let status = loop {
        let status = sim.update()?;
        ticks += 1;

        if !quiet && sim.generation() != generation {
            generation = sim.generation();
            if let Some(stats) = sim.stats_history().latest() {
                println!("{}", stats.summary());
            }
        }
        if status.is_terminal() {
            break status;
        }
    };

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    match status {
        Status::Extinct => println!("Outcome: extinct at generation {}", sim.generation()),
        Status::GenerationLimitReached => println!("Outcome: generation limit reached"),
        Status::Continuing => {}
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Updates: {}", ticks);
    println!("Speed: {:.1} updates/s", ticks as f64 / elapsed.as_secs_f64());
    println!("Final population: {}", sim.population().living());
    println!("Last diversity: {:.4}", sim.last_diversity());

    if let Some(path) = stats_out {
        sim.stats_history().save(&path)?;
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn run_benchmark(ticks: u32, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== evogrid Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let result = benchmark(ticks, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
