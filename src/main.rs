//! Repository Usage - Entry Point
//!
//! Runs the main page feedback simulation from the command line and writes
//! the optional JSON/CSV exports.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use repository_usage::core::error::Result;
use repository_usage::core::SimulationConfig;
use repository_usage::simulation::simulate;

/// Learning object repository simulation with a main page feedback loop
#[derive(Parser, Debug)]
#[command(name = "repository-usage")]
#[command(about = "Simulate how a curated main page shapes learning object discovery")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of users
    #[arg(long)]
    users: Option<u32>,

    /// Number of ranking cycles
    #[arg(long)]
    cycles: Option<u32>,

    /// Ticks per cycle
    #[arg(long)]
    steps: Option<u32>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full output as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the per-cycle rows as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the final main page
    #[arg(long, default_value_t = false)]
    show_main_page: bool,
}

impl Args {
    fn into_config(self) -> Result<(SimulationConfig, Option<PathBuf>, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(users) = self.users {
            config.init_users = users;
        }
        if let Some(cycles) = self.cycles {
            config.cycles = cycles;
        }
        if let Some(steps) = self.steps {
            config.max_steps_per_cycle = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.show_main_page |= self.show_main_page;
        Ok((config, self.json, self.csv))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repository_usage=info")),
        )
        .init();

    let (config, json_path, csv_path) = Args::parse().into_config()?;
    let show_main_page = config.show_main_page;

    println!("Repository: {}x{} items, {} users", config.grid_width, config.grid_height, config.init_users);
    println!(
        "Running {} cycles of {} ticks (seed {})",
        config.cycles, config.max_steps_per_cycle, config.seed
    );
    println!();

    let output = simulate(config)?;
    println!("{}", output.summary());

    if show_main_page {
        println!("\n--- Main Page ---");
        for (rank, id) in output.main_page.iter().enumerate() {
            if let Some(item) = output.final_items.get(id.0 as usize) {
                println!(
                    "  {}. item {:>3} | V:{:>5} D:{:>5} R:{:>5} L:{:>5} | attractivity {:.2}",
                    rank + 1,
                    item.id,
                    item.views,
                    item.downloads,
                    item.rates,
                    item.likes,
                    item.attractivity
                );
            }
        }
    }

    if let Some(path) = json_path {
        std::fs::write(&path, output.to_json()?)?;
        println!("\nFull output written to {}", path.display());
    }
    if let Some(path) = csv_path {
        std::fs::write(&path, output.to_csv())?;
        println!("Cycle history written to {}", path.display());
    }

    Ok(())
}
