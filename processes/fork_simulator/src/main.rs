//! 'main' for the Arbor fork simulator process

use anyhow::{bail, Result};
use arbor_module_block_chain::BlockChainConfig;
use clap::Parser;
use config::{Config, Environment, File};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod simulator;

use simulator::Simulator;

#[derive(Debug, clap::Parser)]
#[command(name = "fork-simulator")]
#[command(about = "Feeds randomly forking blocks into an Arbor block chain")]
struct Args {
    /// Configuration files, later ones overriding earlier
    #[arg(long, value_name = "PATH", default_values_t = vec!["fork-simulator.toml".to_string()])]
    config: Vec<String>,

    /// Number of blocks to produce
    #[arg(long, default_value_t = 10_000)]
    blocks: u64,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Chance that a block builds on a recent block instead of the best one
    #[arg(long, default_value_t = 0.2)]
    fork_probability: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Standard logging using RUST_LOG for log levels, default INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Arbor fork simulator");

    if !(0.0..=1.0).contains(&args.fork_probability) {
        bail!("fork probability must be between 0 and 1, got {}", args.fork_probability);
    }

    // Read the config
    let mut builder = Config::builder();
    for file in &args.config {
        builder = builder.add_source(File::with_name(file).required(false));
    }
    let config = builder.add_source(Environment::with_prefix("ARBOR")).build()?;
    let chain_config = BlockChainConfig::from_config(&config)?;

    let mut simulator = Simulator::new(chain_config, args.seed, args.fork_probability);
    let report = simulator.run(args.blocks);

    info!(
        submitted = report.submitted,
        accepted = report.accepted,
        rejected = report.rejected,
        best_height = report.best_height,
        switches = report.switches,
        pruned = report.pruned,
        "Simulation finished"
    );
    info!(
        retained = report.retained,
        max_retained = report.max_retained,
        canonical = simulator.chain().canonical_chain().len(),
        "Blocks held in memory"
    );

    Ok(())
}
