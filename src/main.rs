// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use lucerna::export::{save_signal_csv, write_json};
use lucerna::{LucernaConfig, SimulationPipeline};

#[derive(Parser, Debug)]
#[command(name = "lucerna", version, about = "Neuron magnetic-field / ODMR simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// JSON configuration file; omitted fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override `simulation.rng_seed`
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Write the JSON report here instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Magnetic field time series at the sensor grid
    Simulate,
    /// Clean and noisy ODMR frequency-shift signals
    Odmr {
        /// Also write the noisy signal as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Spatiotemporal graph over the noisy signal
    Graph,
    /// Denoised signal
    Denoise {
        /// Also write the denoised signal as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<LucernaConfig> {
    let mut config = match &cli.config {
        Some(path) => LucernaConfig::load(path)?,
        None => LucernaConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.simulation.rng_seed = seed;
    }
    Ok(config)
}

// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let pipeline = SimulationPipeline::new(config).context("invalid configuration")?;
    let output = cli.output.as_deref();
    info!("running {:?}", cli.command);

    match &cli.command {
        Command::Simulate => write_json(&pipeline.simulate()?, output)?,
        Command::Odmr { csv } => {
            let report = pipeline.odmr()?;
            if let Some(path) = csv {
                save_signal_csv(path, &report.df_noisy)?;
            }
            write_json(&report, output)?;
        }
        Command::Graph => write_json(&pipeline.graph()?, output)?,
        Command::Denoise { csv } => {
            let report = pipeline.denoise()?;
            if let Some(path) = csv {
                save_signal_csv(path, &report.df_denoised)?;
            }
            write_json(&report, output)?;
        }
    }
    Ok(())
}
